use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;

/// Wrapper for API responses that adds the `ok: true` envelope.
///
/// Object payloads are flattened into the envelope, so
/// `json!({"user": u})` renders as `{"ok": true, "user": u}`. Every
/// `/sql/*` success is a 200, including inserts.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return ApiError::InternalServerError.into_response();
            }
        };

        let envelope = match data_value {
            Value::Object(mut fields) => {
                fields.insert("ok".to_string(), Value::Bool(true));
                Value::Object(fields)
            }
            other => json!({ "ok": true, "data": other }),
        };

        (StatusCode::OK, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
