use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::api::AppState;
use crate::auth::{AuthDecision, AuthError, SignedRequest, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::error::ApiError;

/// JSON body of a request that passed signature verification
#[derive(Clone, Debug)]
pub struct AuthenticatedBody(pub Value);

/// Verifies `X-Ts` / `X-Sign` against the raw body before any handler runs.
/// Requests without both headers are refused before the body is read.
/// The buffered body is put back on the request so handlers see the same bytes.
pub async fn hmac_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let limit = state.config.api.max_request_size_bytes;

    let timestamp = header(&parts.headers, TIMESTAMP_HEADER);
    let signature = header(&parts.headers, SIGNATURE_HEADER);
    if timestamp.is_none() || signature.is_none() {
        let err = AuthError::MissingAuth;
        tracing::warn!(code = err.code(), path = %parts.uri.path(), "Rejected signed request");
        return Err(err.into());
    }

    let bytes = axum::body::to_bytes(body, limit).await.map_err(|e| {
        tracing::debug!("Failed to buffer request body: {}", e);
        ApiError::PayloadTooLarge(limit)
    })?;

    let decision = state.authenticator.authenticate(&SignedRequest {
        timestamp,
        signature,
        raw_body: &bytes,
    });

    match decision {
        AuthDecision::Authenticated(value) => {
            let mut request = Request::from_parts(parts, Body::from(bytes));
            request.extensions_mut().insert(AuthenticatedBody(value));
            Ok(next.run(request).await)
        }
        AuthDecision::Rejected(err) => {
            tracing::warn!(code = err.code(), path = %parts.uri.path(), "Rejected signed request");
            Err(err.into())
        }
    }
}

/// Header value as text; absent, empty and non-ASCII values are all `None`
fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}
