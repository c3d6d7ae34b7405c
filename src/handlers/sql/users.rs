// handlers/sql/users.rs - POST /sql/users.* handlers

use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::api::AppState;
use crate::database::QueryBuilder;
use crate::filter::{Filter, ListFilters};
use crate::middleware::{ApiResponse, ApiResult, AuthenticatedBody};

use super::{record_id, require_one_of, require_str, Table};

pub const ROLES: &[&str] = &["admin", "employee"];
pub const STATUSES: &[&str] = &["active", "inactive"];

const TABLE: Table = Table {
    name: "users",
    label: "User",
    writable: &["username", "name", "email", "mobile_no", "role", "status", "password"],
};

const FILTER_COLUMNS: &[&str] = &["id", "username", "name", "email", "mobile_no", "role", "status", "created_at"];

/// Every column except `password`
const PUBLIC_SELECT: &str =
    "SELECT id, username, name, email, mobile_no, role, status, created_at, updated_at FROM users";

/// POST /sql/users.get_by_username - full row (including the password hash) for login
pub async fn get_by_username(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    let username = require_str(&body, "username")?;
    let user = QueryBuilder::new("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(state.db.pool())
        .await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// POST /sql/users.get_by_id
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    let id = require_str(&body, "id")?;
    let user = QueryBuilder::new("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(state.db.pool())
        .await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// POST /sql/users.list - filtered, paginated, never returns passwords
pub async fn list(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    let filters = ListFilters::from_body(&body)?;
    filters.require_one_of("role", ROLES)?;
    filters.require_one_of("status", STATUSES)?;

    let filter = Filter::new("users", FILTER_COLUMNS).assign(&filters);
    let total = filter.count_query().fetch_count(state.db.pool()).await?;
    let users = filter.select_query(PUBLIC_SELECT).fetch_all(state.db.pool()).await?;

    Ok(ApiResponse::success(json!({
        "users": users,
        "meta": filter.meta(total),
    })))
}

/// POST /sql/users.create - returns the new row without its password
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    require_str(&body, "username")?;
    require_str(&body, "name")?;
    validate(&body)?;

    let id = record_id(&body);
    TABLE.insert(state.db.pool(), &id, &body).await?;
    tracing::info!("Created user {}", id);

    let user = fetch_public(&state, &id).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// POST /sql/users.update
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    let id = require_str(&body, "id")?;
    validate(&body)?;

    TABLE.update(state.db.pool(), id, &body).await?;
    let user = fetch_public(&state, id).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// POST /sql/users.delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    let id = require_str(&body, "id")?;
    TABLE.delete(state.db.pool(), id).await?;
    tracing::info!("Deleted user {}", id);
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

fn validate(body: &Value) -> Result<(), crate::error::ApiError> {
    require_one_of(body, "role", ROLES)?;
    require_one_of(body, "status", STATUSES)
}

async fn fetch_public(state: &AppState, id: &str) -> Result<Value, crate::error::ApiError> {
    QueryBuilder::new(format!("{} WHERE id = ?", PUBLIC_SELECT))
        .bind(id)
        .fetch_optional(state.db.pool())
        .await?
        .ok_or_else(|| TABLE.not_found(id))
}
