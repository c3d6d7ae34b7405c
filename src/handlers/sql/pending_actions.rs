// handlers/sql/pending_actions.rs - POST /sql/pending_actions.* handlers
//
// `data` is an arbitrary JSON payload stored as text and decoded on read.

use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::api::AppState;
use crate::database::QueryBuilder;
use crate::error::ApiError;
use crate::filter::{Filter, ListFilters};
use crate::middleware::{ApiResponse, ApiResult, AuthenticatedBody};

use super::{as_object, record_id, require_one_of, require_str, Table};

pub const STATUSES: &[&str] = &["pending", "approved", "rejected"];

const CREATE: Table = Table {
    name: "pending_actions",
    label: "Pending action",
    writable: &[
        "module",
        "type",
        "data",
        "target_id",
        "requested_by",
        "requested_by_name",
        "status",
    ],
};

/// Review fields only; the request itself is immutable once filed
const REVIEW: Table = Table {
    name: "pending_actions",
    label: "Pending action",
    writable: &["status", "admin_notes", "approved_by", "approved_by_name"],
};

const FILTER_COLUMNS: &[&str] = &["id", "module", "type", "target_id", "requested_by", "status", "created_at"];

const JOINED_SELECT: &str = "SELECT pa.*, \
    COALESCE(r.name, pa.requested_by_name) AS requested_by_name, \
    COALESCE(ap.name, pa.approved_by_name) AS approved_by_name \
    FROM pending_actions pa \
    LEFT JOIN users r ON pa.requested_by = r.id \
    LEFT JOIN users ap ON pa.approved_by = ap.id";

/// POST /sql/pending_actions.list
pub async fn list(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    let filters = ListFilters::from_body(&body)?;
    filters.require_one_of("status", STATUSES)?;

    let filter = Filter::new("pending_actions", FILTER_COLUMNS).alias("pa").assign(&filters);
    let total = filter.count_query().fetch_count(state.db.pool()).await?;
    let mut actions = filter.select_query(JOINED_SELECT).fetch_all(state.db.pool()).await?;
    actions.iter_mut().for_each(decode_data);

    Ok(ApiResponse::success(json!({
        "pending_actions": actions,
        "meta": filter.meta(total),
    })))
}

/// POST /sql/pending_actions.get_by_id
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    let id = require_str(&body, "id")?;
    let action = fetch_joined(&state, id).await?;
    Ok(ApiResponse::success(json!({ "pending_action": action })))
}

/// POST /sql/pending_actions.create
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    require_str(&body, "module")?;
    require_str(&body, "type")?;
    require_one_of(&body, "status", STATUSES)?;

    let mut record = as_object(&body)?.clone();
    if let Some(data) = record.get_mut("data") {
        // Always stored as JSON text, strings included
        *data = Value::String(data.to_string());
    }
    let record = Value::Object(record);

    let id = record_id(&record);
    CREATE.insert(state.db.pool(), &id, &record).await?;
    tracing::info!("Created pending action {}", id);

    Ok(ApiResponse::success(json!({
        "message": "Pending action created",
        "id": id,
    })))
}

/// POST /sql/pending_actions.update - approve, reject or annotate
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    let id = require_str(&body, "id")?;
    require_one_of(&body, "status", STATUSES)?;

    REVIEW.update(state.db.pool(), id, &body).await?;
    let action = fetch_joined(&state, id).await?.ok_or_else(|| REVIEW.not_found(id))?;
    tracing::info!("Updated pending action {}", id);

    Ok(ApiResponse::success(json!({ "pending_action": action })))
}

/// POST /sql/pending_actions.delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    let id = require_str(&body, "id")?;
    REVIEW.delete(state.db.pool(), id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

async fn fetch_joined(state: &AppState, id: &str) -> Result<Option<Value>, ApiError> {
    let mut action = QueryBuilder::new(format!("{} WHERE pa.id = ?", JOINED_SELECT))
        .bind(id)
        .fetch_optional(state.db.pool())
        .await?;
    if let Some(row) = action.as_mut() {
        decode_data(row);
    }
    Ok(action)
}

/// Replace the stored JSON text in `data` with its decoded value. Text that
/// does not parse is left as-is.
fn decode_data(row: &mut Value) {
    if let Some(data) = row.get_mut("data") {
        let decoded = match &*data {
            Value::String(text) => serde_json::from_str::<Value>(text).ok(),
            _ => None,
        };
        if let Some(decoded) = decoded {
            *data = decoded;
        }
    }
}
