use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Filters must be a JSON object")]
    NotAnObject,

    #[error("Invalid page: {0} (must be >= 1)")]
    InvalidPage(i64),

    #[error("Invalid page_size: {0} (must be between 1 and {max})", max = super::types::MAX_PAGE_SIZE)]
    InvalidPageSize(i64),

    #[error("Invalid value for '{field}': expected one of {allowed:?}")]
    InvalidValue {
        field: String,
        allowed: &'static [&'static str],
    },

    #[error("Invalid filters: {0}")]
    JsonError(#[from] serde_json::Error),
}
