use serde_json::{Map, Value};

/// Columns searched by the free-text `q` filter, when a table allows them
pub const SEARCH_COLUMNS: &[&str] = &[
    "name",
    "username",
    "email",
    "client_company",
    "contact_person",
    "city",
    "location",
];

/// Non-id columns matched with `=` instead of `LIKE`
pub const EXACT_COLUMNS: &[&str] = &[
    "role",
    "status",
    "type_of_place",
    "transaction_type",
    "entity",
    "module",
    "type",
];

pub struct FilterWhere<'a> {
    allowed_columns: &'a [&'a str],
    alias: Option<&'a str>,
    conditions: Vec<String>,
    params: Vec<Value>,
}

impl<'a> FilterWhere<'a> {
    pub fn new(allowed_columns: &'a [&'a str], alias: Option<&'a str>) -> Self {
        Self {
            allowed_columns,
            alias,
            conditions: vec![],
            params: vec![],
        }
    }

    /// Build the `AND`-joined predicate (without the `WHERE` keyword) and its
    /// positional parameters. Keys outside the allow-list are ignored, so no
    /// request-supplied text ever becomes SQL.
    pub fn generate(
        conditions: &Map<String, Value>,
        allowed_columns: &'a [&'a str],
        alias: Option<&'a str>,
    ) -> (String, Vec<Value>) {
        let mut filter_where = Self::new(allowed_columns, alias);
        for (key, value) in conditions {
            filter_where.push(key, value);
        }
        (filter_where.conditions.join(" AND "), filter_where.params)
    }

    fn push(&mut self, key: &str, value: &Value) {
        if is_blank(value) {
            return;
        }

        if key == "q" {
            if let Value::String(q) = value {
                self.push_search(q);
            }
        } else if let Some(column) = self.allowed(key) {
            let column = self.qualify(column);
            match value {
                Value::String(s) if !Self::is_exact(key) => {
                    self.conditions.push(format!("{} LIKE ?", column));
                    self.params.push(Value::String(format!("%{}%", s)));
                }
                Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                    self.conditions.push(format!("{} = ?", column));
                    self.params.push(value.clone());
                }
                _ => {}
            }
        } else if key == "owner_or_assignee_id"
            && self.allowed("owner_id").is_some()
            && self.allowed("assignee_id").is_some()
        {
            self.conditions.push(format!(
                "({} = ? OR {} = ?)",
                self.qualify("owner_id"),
                self.qualify("assignee_id")
            ));
            self.params.push(value.clone());
            self.params.push(value.clone());
        }
    }

    fn push_search(&mut self, q: &str) {
        let columns: Vec<String> = SEARCH_COLUMNS
            .iter()
            .filter_map(|c| self.allowed(c))
            .map(|c| self.qualify(c))
            .collect();
        if columns.is_empty() {
            return;
        }
        let parts: Vec<String> = columns.iter().map(|c| format!("{} LIKE ?", c)).collect();
        self.conditions.push(format!("({})", parts.join(" OR ")));
        for _ in &columns {
            self.params.push(Value::String(format!("%{}%", q)));
        }
    }

    /// The allow-listed spelling of `key`, if allowed
    fn allowed(&self, key: &str) -> Option<&'a str> {
        self.allowed_columns.iter().copied().find(|c| *c == key)
    }

    fn qualify(&self, column: &str) -> String {
        match self.alias {
            Some(alias) => format!("{}.{}", alias, column),
            None => column.to_string(),
        }
    }

    fn is_exact(key: &str) -> bool {
        key == "id" || key.ends_with("_id") || EXACT_COLUMNS.contains(&key)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
