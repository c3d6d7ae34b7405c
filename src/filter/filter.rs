use serde_json::Value;

use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{ListFilters, PageMeta};
use crate::database::QueryBuilder;

/// Paged list query over one table. Column names only ever come from
/// `allowed_columns`; request values travel as bound parameters.
pub struct Filter {
    table_name: &'static str,
    alias: Option<&'static str>,
    allowed_columns: &'static [&'static str],
    where_sql: String,
    params: Vec<Value>,
    order_sql: String,
    page: i64,
    page_size: i64,
    offset: i64,
}

impl Filter {
    pub fn new(table_name: &'static str, allowed_columns: &'static [&'static str]) -> Self {
        Self {
            table_name,
            alias: None,
            allowed_columns,
            where_sql: String::new(),
            params: vec![],
            order_sql: String::new(),
            page: 1,
            page_size: super::types::DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }

    /// Qualify columns with a table alias, for queries that join
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn assign(mut self, filters: &ListFilters) -> Self {
        let (where_sql, params) = FilterWhere::generate(&filters.conditions, self.allowed_columns, self.alias);
        self.where_sql = where_sql;
        self.params = params;
        self.order_sql = FilterOrder::generate(&filters.sort, filters.sort_order, self.allowed_columns, self.alias);
        self.page = filters.page;
        self.page_size = filters.page_size;
        self.offset = filters.offset();
        self
    }

    fn where_clause(&self) -> String {
        if self.where_sql.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.where_sql)
        }
    }

    fn from_clause(&self) -> String {
        match self.alias {
            Some(alias) => format!("{} {}", self.table_name, alias),
            None => self.table_name.to_string(),
        }
    }

    /// `SELECT COUNT(*) AS count` over the filtered rows
    pub fn count_query(&self) -> QueryBuilder {
        QueryBuilder::new(format!(
            "SELECT COUNT(*) AS count FROM {}{}",
            self.from_clause(),
            self.where_clause()
        ))
        .bind_all(self.params.clone())
    }

    /// `select_from` is everything up to and including the `FROM` list,
    /// e.g. `SELECT l.* FROM leads l LEFT JOIN users o ON ...`
    pub fn select_query(&self, select_from: &str) -> QueryBuilder {
        QueryBuilder::new(format!(
            "{}{} {} LIMIT ? OFFSET ?",
            select_from,
            self.where_clause(),
            self.order_sql
        ))
        .bind_all(self.params.clone())
        .bind(self.page_size)
        .bind(self.offset)
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta::new(total, self.page, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COLUMNS: &[&str] = &["id", "city", "owner_id", "assignee_id", "created_at"];

    #[test]
    fn builds_paged_select_and_count() {
        let filters = ListFilters::from_body(&json!({"city": "Pune", "page": 2, "page_size": 10})).unwrap();
        let filter = Filter::new("leads", COLUMNS).alias("l").assign(&filters);

        let count = filter.count_query();
        assert_eq!(count.sql(), "SELECT COUNT(*) AS count FROM leads l WHERE l.city LIKE ?");
        assert_eq!(count.params(), &[json!("%Pune%")]);

        let select = filter.select_query("SELECT l.* FROM leads l");
        assert_eq!(
            select.sql(),
            "SELECT l.* FROM leads l WHERE l.city LIKE ? ORDER BY l.created_at DESC LIMIT ? OFFSET ?"
        );
        assert_eq!(select.params(), &[json!("%Pune%"), json!(10), json!(10)]);

        assert_eq!(filter.meta(25), PageMeta::new(25, 2, 10));
    }

    #[test]
    fn far_pages_bind_their_offset_without_overflow() {
        let last = i64::MAX / 100 + 1;
        let filters = ListFilters::from_body(&json!({"page": last, "page_size": 100})).unwrap();
        let filter = Filter::new("users", COLUMNS).assign(&filters);
        let select = filter.select_query("SELECT * FROM users");
        assert_eq!(select.params(), &[json!(100), json!((last - 1) * 100)]);
    }

    #[test]
    fn omits_where_without_conditions() {
        let filter = Filter::new("users", COLUMNS).assign(&ListFilters::default());
        assert_eq!(filter.count_query().sql(), "SELECT COUNT(*) AS count FROM users");
        assert_eq!(
            filter.select_query("SELECT * FROM users").sql(),
            "SELECT * FROM users ORDER BY created_at DESC LIMIT ? OFFSET ?"
        );
    }
}
