pub mod manager;
pub mod query_builder;
pub mod schema;

pub use manager::{Database, DatabaseError};
pub use query_builder::{row_to_json, QueryBuilder};
