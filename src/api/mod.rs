pub mod state;

use std::any::Any;

use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    extract::State,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::error::ApiError;
use crate::handlers::sql;
use crate::middleware::hmac_auth_middleware;

pub use state::AppState;

/// Full application router: `/health` in the open, `/sql/*` behind the HMAC gate
pub fn router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .merge(sql_routes(state.clone()))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer(&state.config.security.allowed_origins))
        .with_state(state.clone());

    if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn sql_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Users
        .route("/sql/users.get_by_username", post(sql::users::get_by_username))
        .route("/sql/users.get_by_id", post(sql::users::get_by_id))
        .route("/sql/users.list", post(sql::users::list))
        .route("/sql/users.create", post(sql::users::create))
        .route("/sql/users.update", post(sql::users::update))
        .route("/sql/users.delete", post(sql::users::delete))
        // Leads
        .route("/sql/leads.list", post(sql::leads::list))
        .route("/sql/leads.get_by_id", post(sql::leads::get_by_id))
        .route("/sql/leads.create", post(sql::leads::create))
        .route("/sql/leads.update", post(sql::leads::update))
        .route("/sql/leads.delete", post(sql::leads::delete))
        // Pending actions
        .route("/sql/pending_actions.list", post(sql::pending_actions::list))
        .route("/sql/pending_actions.get_by_id", post(sql::pending_actions::get_by_id))
        .route("/sql/pending_actions.create", post(sql::pending_actions::create))
        .route("/sql/pending_actions.update", post(sql::pending_actions::update))
        .route("/sql/pending_actions.delete", post(sql::pending_actions::delete))
        // Documents
        .route("/sql/documents.list", post(sql::documents::list))
        .route("/sql/documents.create", post(sql::documents::create))
        .route("/sql/documents.delete", post(sql::documents::delete))
        .route_layer(middleware::from_fn_with_state(state, hmac_auth_middleware))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-ts"),
            HeaderName::from_static("x-sign"),
        ])
        .allow_credentials(true)
}

fn handle_panic(_err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Handler panicked");
    ApiError::InternalServerError.into_response()
}

/// GET /health - liveness plus a database ping
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().timestamp_millis();

    match state.db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "ok": true, "status": "healthy", "timestamp": timestamp })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "ok": false, "status": "degraded", "timestamp": timestamp })),
            )
        }
    }
}
