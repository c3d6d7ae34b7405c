pub mod documents;
pub mod leads;
pub mod pending_actions;
pub mod users;

use serde_json::{Map, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::QueryBuilder;
use crate::error::ApiError;
use crate::filter::FilterError;

/// A table the `/sql/*` routes write to. Only `writable` columns are ever
/// taken from a request body.
pub(crate) struct Table {
    pub name: &'static str,
    pub label: &'static str,
    pub writable: &'static [&'static str],
}

impl Table {
    /// Insert `id` plus whichever writable columns the body carries;
    /// omitted columns keep their defaults.
    pub async fn insert(&self, pool: &SqlitePool, id: &str, body: &Value) -> Result<(), ApiError> {
        let fields = self.present(body)?;

        let mut columns = vec!["id"];
        columns.extend(fields.iter().map(|(c, _)| *c));
        let placeholders = vec!["?"; columns.len()].join(", ");

        QueryBuilder::new(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            columns.join(", "),
            placeholders
        ))
        .bind(id)
        .bind_all(fields.into_iter().map(|(_, v)| v))
        .execute(pool)
        .await?;

        tracing::debug!("Inserted {} {}", self.name, id);
        Ok(())
    }

    /// Partial update of the writable columns present in `body`
    pub async fn update(&self, pool: &SqlitePool, id: &str, body: &Value) -> Result<(), ApiError> {
        let fields = self.present(body)?;
        if fields.is_empty() {
            return Err(ApiError::validation("No updatable fields provided"));
        }

        let assignments: Vec<String> = fields.iter().map(|(c, _)| format!("{} = ?", c)).collect();
        let affected = QueryBuilder::new(format!(
            "UPDATE {} SET {}, updated_at = datetime('now') WHERE id = ?",
            self.name,
            assignments.join(", ")
        ))
        .bind_all(fields.into_iter().map(|(_, v)| v))
        .bind(id)
        .execute(pool)
        .await?;

        if affected == 0 {
            return Err(self.not_found(id));
        }
        Ok(())
    }

    pub async fn delete(&self, pool: &SqlitePool, id: &str) -> Result<(), ApiError> {
        let affected = QueryBuilder::new(format!("DELETE FROM {} WHERE id = ?", self.name))
            .bind(id)
            .execute(pool)
            .await?;

        if affected == 0 {
            return Err(self.not_found(id));
        }
        tracing::debug!("Deleted {} {}", self.name, id);
        Ok(())
    }

    pub fn not_found(&self, id: &str) -> ApiError {
        ApiError::not_found(format!("{} '{}' not found", self.label, id))
    }

    fn present(&self, body: &Value) -> Result<Vec<(&'static str, Value)>, ApiError> {
        let object = as_object(body)?;
        Ok(self
            .writable
            .iter()
            .filter_map(|column| object.get(*column).map(|v| (*column, v.clone())))
            .collect())
    }
}

pub(crate) fn as_object(body: &Value) -> Result<&Map<String, Value>, ApiError> {
    body.as_object()
        .ok_or_else(|| ApiError::validation("Request body must be a JSON object"))
}

/// A non-empty string field, or `VALIDATION_ERROR`
pub(crate) fn require_str<'a>(body: &'a Value, field: &str) -> Result<&'a str, ApiError> {
    match body.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        _ => Err(ApiError::validation(format!("'{}' is required", field))),
    }
}

/// The client-supplied `id`, or a fresh UUID v4
pub(crate) fn record_id(body: &Value) -> String {
    match body.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => Uuid::new_v4().to_string(),
    }
}

/// Reject a present, non-null body field whose value is not in `allowed`
pub(crate) fn require_one_of(body: &Value, field: &str, allowed: &'static [&'static str]) -> Result<(), ApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(s)) if allowed.contains(&s.as_str()) => Ok(()),
        Some(_) => Err(FilterError::InvalidValue {
            field: field.to_string(),
            allowed,
        }
        .into()),
    }
}
