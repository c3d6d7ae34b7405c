use serde_json::{Map, Number, Value};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqliteRow};
use sqlx::{Column, Row, ValueRef};

use crate::database::manager::DatabaseError;

/// A SQL statement with positional `?` parameters taken from JSON values
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    sql: String,
    params: Vec<Value>,
}

impl QueryBuilder {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: vec![],
        }
    }

    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn bind_all(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.params.extend(values);
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub async fn fetch_all(&self, pool: &SqlitePool) -> Result<Vec<Value>, DatabaseError> {
        let rows = self.query().fetch_all(pool).await?;
        rows.iter().map(row_to_json).collect()
    }

    pub async fn fetch_optional(&self, pool: &SqlitePool) -> Result<Option<Value>, DatabaseError> {
        let row = self.query().fetch_optional(pool).await?;
        row.as_ref().map(row_to_json).transpose()
    }

    /// Runs a `SELECT COUNT(*) AS count ...` statement
    pub async fn fetch_count(&self, pool: &SqlitePool) -> Result<i64, DatabaseError> {
        let row = self.query().fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    /// Returns the number of affected rows
    pub async fn execute(&self, pool: &SqlitePool) -> Result<u64, DatabaseError> {
        let result = self.query().execute(pool).await?;
        Ok(result.rows_affected())
    }

    fn query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        let mut q = sqlx::query(&self.sql);
        for p in self.params.iter() {
            q = bind_value(q, p);
        }
        q
    }
}

/// Bind one JSON value. Arrays and objects are stored as JSON text.
pub fn bind_value<'q>(
    q: Query<'q, Sqlite, SqliteArguments<'q>>,
    v: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.clone()),
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}

/// Convert a row into a JSON object keyed by column name, using the
/// storage class of each value (SQLite is dynamically typed).
pub fn row_to_json(row: &SqliteRow) -> Result<Value, DatabaseError> {
    let mut map = Map::new();
    for (i, column) in row.columns().iter().enumerate() {
        let is_null = row.try_get_raw(i)?.is_null();
        let value = if is_null {
            Value::Null
        } else if let Ok(v) = row.try_get::<i64, _>(i) {
            Value::from(v)
        } else if let Ok(v) = row.try_get::<f64, _>(i) {
            Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
        } else if let Ok(v) = row.try_get::<String, _>(i) {
            Value::String(v)
        } else if let Ok(v) = row.try_get::<Vec<u8>, _>(i) {
            Value::String(hex::encode(v))
        } else {
            return Err(DatabaseError::Query(format!(
                "unsupported value in column '{}'",
                column.name()
            )));
        };
        map.insert(column.name().to_string(), value);
    }
    Ok(Value::Object(map))
}
