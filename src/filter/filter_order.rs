use super::types::{SortDirection, DEFAULT_SORT};

pub struct FilterOrder;

impl FilterOrder {
    /// `ORDER BY` clause; a sort column outside the allow-list falls back to
    /// `created_at`.
    pub fn generate(sort: &str, direction: SortDirection, allowed_columns: &[&str], alias: Option<&str>) -> String {
        let column = allowed_columns
            .iter()
            .copied()
            .find(|c| *c == sort)
            .unwrap_or(DEFAULT_SORT);
        let column = match alias {
            Some(alias) => format!("{}.{}", alias, column),
            None => column.to_string(),
        };
        format!("ORDER BY {} {}", column, direction.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_created_at() {
        let allowed = ["id", "name", "created_at"];
        assert_eq!(
            FilterOrder::generate("name", SortDirection::Asc, &allowed, None),
            "ORDER BY name ASC"
        );
        assert_eq!(
            FilterOrder::generate("name; DROP TABLE users", SortDirection::Desc, &allowed, Some("u")),
            "ORDER BY u.created_at DESC"
        );
    }
}
