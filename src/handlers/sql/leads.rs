// handlers/sql/leads.rs - POST /sql/leads.* handlers

use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::api::AppState;
use crate::database::QueryBuilder;
use crate::error::ApiError;
use crate::filter::{Filter, ListFilters};
use crate::middleware::{ApiResponse, ApiResult, AuthenticatedBody};

use super::{record_id, require_one_of, require_str, Table};

pub const YES_NO: &[&str] = &["Yes", "No"];

/// Progress flags stored as `Yes` / `No`
const FLAGS: &[&str] = &["site_visit_required", "proposal_submitted", "shortlisted", "deal_closed"];

const TABLE: Table = Table {
    name: "leads",
    label: "Lead",
    writable: &[
        "inquiry_no",
        "inquiry_date",
        "client_company",
        "contact_person",
        "contact_no",
        "email",
        "designation",
        "department",
        "description",
        "type_of_place",
        "space_requirement",
        "transaction_type",
        "budget",
        "city",
        "location_preference",
        "site_visit_required",
        "proposal_submitted",
        "shortlisted",
        "deal_closed",
        "owner_id",
        "assignee_id",
    ],
};

const FILTER_COLUMNS: &[&str] = &[
    "id",
    "inquiry_no",
    "inquiry_date",
    "client_company",
    "contact_person",
    "contact_no",
    "email",
    "type_of_place",
    "transaction_type",
    "budget",
    "city",
    "location_preference",
    "site_visit_required",
    "proposal_submitted",
    "shortlisted",
    "deal_closed",
    "owner_id",
    "assignee_id",
    "created_at",
];

const JOINED_SELECT: &str = "SELECT l.*, o.name AS owner_name, a.name AS assignee_name \
    FROM leads l \
    LEFT JOIN users o ON l.owner_id = o.id \
    LEFT JOIN users a ON l.assignee_id = a.id";

/// POST /sql/leads.list - filtered, paginated, with owner/assignee names
pub async fn list(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    let filters = ListFilters::from_body(&body)?;
    for flag in FLAGS {
        filters.require_one_of(flag, YES_NO)?;
    }

    let filter = Filter::new("leads", FILTER_COLUMNS).alias("l").assign(&filters);
    let total = filter.count_query().fetch_count(state.db.pool()).await?;
    let leads = filter.select_query(JOINED_SELECT).fetch_all(state.db.pool()).await?;

    Ok(ApiResponse::success(json!({
        "leads": leads,
        "meta": filter.meta(total),
    })))
}

/// POST /sql/leads.get_by_id
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    let id = require_str(&body, "id")?;
    let lead = fetch_joined(&state, id).await?;
    Ok(ApiResponse::success(json!({ "lead": lead })))
}

/// POST /sql/leads.create
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    validate(&body)?;

    let id = record_id(&body);
    TABLE.insert(state.db.pool(), &id, &body).await?;
    tracing::info!("Created lead {}", id);

    let lead = fetch_joined(&state, &id).await?.ok_or_else(|| TABLE.not_found(&id))?;
    Ok(ApiResponse::success(json!({ "lead": lead })))
}

/// POST /sql/leads.update
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    let id = require_str(&body, "id")?;
    validate(&body)?;

    TABLE.update(state.db.pool(), id, &body).await?;
    let lead = fetch_joined(&state, id).await?.ok_or_else(|| TABLE.not_found(id))?;
    Ok(ApiResponse::success(json!({ "lead": lead })))
}

/// POST /sql/leads.delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthenticatedBody(body)): Extension<AuthenticatedBody>,
) -> ApiResult<Value> {
    let id = require_str(&body, "id")?;
    TABLE.delete(state.db.pool(), id).await?;
    tracing::info!("Deleted lead {}", id);
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

fn validate(body: &Value) -> Result<(), ApiError> {
    for flag in FLAGS {
        require_one_of(body, flag, YES_NO)?;
    }
    Ok(())
}

async fn fetch_joined(state: &AppState, id: &str) -> Result<Option<Value>, ApiError> {
    let lead = QueryBuilder::new(format!("{} WHERE l.id = ?", JOINED_SELECT))
        .bind(id)
        .fetch_optional(state.db.pool())
        .await?;
    Ok(lead)
}
