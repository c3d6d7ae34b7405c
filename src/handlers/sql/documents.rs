// handlers/sql/documents.rs - POST /sql/documents.* handlers
//
// Rows describe files held in object storage; only the metadata lives here.

use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::api::AppState;
use crate::database::QueryBuilder;
use crate::filter::{Filter, ListFilters, PageMeta, SortDirection};
use crate::middleware::{ApiResponse, ApiResult, AuthenticatedBody};

use super::{record_id, require_str, Table};

const TABLE: Table = Table {
    name: "documents",
    label: "Document",
    writable: &[
        "entity",
        "entity_id",
        "label",
        "filename",
        "content_type",
        "file_size",
        "r2_key",
        "public_url",
        "uploaded_by",
        "uploaded_by_name",
    ],
};

const FILTER_COLUMNS: &[&str] = &["id", "entity", "entity_id", "created_at"];

const JOINED_SELECT: &str = "SELECT d.*, COALESCE(u.name, d.uploaded_by_name) AS uploaded_by_name \
    FROM documents d \
    LEFT JOIN users u ON d.uploaded_by = u.id";

/// POST /sql/documents.list - by entity / entity_id / id, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    let mut filters = ListFilters::from_body(&body)?;
    filters.sort = "created_at".to_string();
    filters.sort_order = SortDirection::Desc;

    let filter = Filter::new("documents", FILTER_COLUMNS).alias("d").assign(&filters);
    let total = filter.count_query().fetch_count(state.db.pool()).await?;
    let documents = filter.select_query(JOINED_SELECT).fetch_all(state.db.pool()).await?;

    Ok(ApiResponse::success(json!({
        "documents": documents,
        "meta": PageMeta::without_pages(total, filters.page, filters.page_size),
    })))
}

/// POST /sql/documents.create
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    require_str(&body, "entity")?;
    require_str(&body, "entity_id")?;

    let id = record_id(&body);
    TABLE.insert(state.db.pool(), &id, &body).await?;
    tracing::info!("Created document {}", id);

    let document = QueryBuilder::new(format!("{} WHERE d.id = ?", JOINED_SELECT))
        .bind(id.as_str())
        .fetch_optional(state.db.pool())
        .await?
        .ok_or_else(|| TABLE.not_found(&id))?;
    Ok(ApiResponse::success(json!({ "document": document })))
}

/// POST /sql/documents.delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    let id = require_str(&body, "id")?;
    TABLE.delete(state.db.pool(), id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}
