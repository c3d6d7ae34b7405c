use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::FilterError;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const DEFAULT_SORT: &str = "created_at";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Pagination, sorting and column filters for a `*.list` request.
/// Keys other than the pagination/sort keys are kept in `conditions`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListFilters {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default)]
    pub sort_order: SortDirection,
    #[serde(flatten)]
    pub conditions: Map<String, Value>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn default_sort() -> String {
    DEFAULT_SORT.to_string()
}

impl Default for ListFilters {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            sort: default_sort(),
            sort_order: SortDirection::default(),
            conditions: Map::new(),
        }
    }
}

impl ListFilters {
    pub fn from_body(body: &Value) -> Result<Self, FilterError> {
        if !body.is_object() {
            return Err(FilterError::NotAnObject);
        }
        let filters: ListFilters = serde_json::from_value(body.clone())?;
        if filters.page < 1 {
            return Err(FilterError::InvalidPage(filters.page));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&filters.page_size) {
            return Err(FilterError::InvalidPageSize(filters.page_size));
        }
        if filters.checked_offset().is_none() {
            return Err(FilterError::InvalidPage(filters.page));
        }
        Ok(filters)
    }

    /// Reject a present, non-empty condition whose value is not in `allowed`
    pub fn require_one_of(&self, field: &str, allowed: &'static [&'static str]) -> Result<(), FilterError> {
        match self.conditions.get(field) {
            None | Some(Value::Null) => Ok(()),
            Some(Value::String(s)) if s.is_empty() || allowed.contains(&s.as_str()) => Ok(()),
            Some(_) => Err(FilterError::InvalidValue {
                field: field.to_string(),
                allowed,
            }),
        }
    }

    /// Rows skipped before this page. Saturates for hand-built filters;
    /// `from_body` rejects any page whose offset does not fit in an `i64`.
    pub fn offset(&self) -> i64 {
        self.checked_offset().unwrap_or(i64::MAX)
    }

    fn checked_offset(&self) -> Option<i64> {
        self.page.checked_sub(1)?.checked_mul(self.page_size)
    }
}

/// Pagination block returned next to list results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,
}

impl PageMeta {
    pub fn new(total: i64, page: i64, page_size: i64) -> Self {
        Self {
            total,
            page,
            page_size,
            total_pages: Some((total + page_size - 1) / page_size),
        }
    }

    pub fn without_pages(total: i64, page: i64, page_size: i64) -> Self {
        Self {
            total,
            page,
            page_size,
            total_pages: None,
        }
    }
}
