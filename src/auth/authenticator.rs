use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;

use super::clock::{Clock, SystemClock};
use super::signature::{constant_time_eq, sign};

/// Maximum accepted |now - X-Ts| in seconds, inclusive
pub const DEFAULT_FRESHNESS_WINDOW_SECS: u64 = 120;

/// Why a signed request was refused. Every kind is terminal for the request.
///
/// An unparsable timestamp is reported as `TimestampExpired` on purpose so
/// callers cannot tell format errors from stale requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing authentication headers")]
    MissingAuth,

    #[error("Request timestamp expired")]
    TimestampExpired,

    #[error("Invalid request signature")]
    InvalidSignature,

    #[error("Invalid JSON body")]
    InvalidJson,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuth => "MISSING_AUTH",
            AuthError::TimestampExpired => "TIMESTAMP_EXPIRED",
            AuthError::InvalidSignature => "INVALID_SIGNATURE",
            AuthError::InvalidJson => "INVALID_JSON",
        }
    }

    /// Client-facing text for the error envelope
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingAuth => "Missing authentication headers",
            AuthError::TimestampExpired => "Request timestamp expired",
            AuthError::InvalidSignature => "Invalid request signature",
            AuthError::InvalidJson => "Invalid JSON body",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidJson => StatusCode::BAD_REQUEST,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Inbound request as seen by the authenticator. Lives for one request.
#[derive(Debug, Clone, Copy)]
pub struct SignedRequest<'a> {
    /// Raw `X-Ts` header value
    pub timestamp: Option<&'a str>,
    /// Raw `X-Sign` header value
    pub signature: Option<&'a str>,
    /// Body bytes exactly as received, before any parsing
    pub raw_body: &'a [u8],
}

/// Outcome of one authentication attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AuthDecision {
    Authenticated(Value),
    Rejected(AuthError),
}

impl AuthDecision {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthDecision::Authenticated(_))
    }
}

/// Construction parameters, injected once at startup
pub struct AuthConfig {
    pub shared_secret: SecretString,
    pub clock: Arc<dyn Clock>,
    pub freshness_window_secs: u64,
}

impl AuthConfig {
    pub fn new(shared_secret: SecretString) -> Self {
        Self {
            shared_secret,
            clock: Arc::new(SystemClock),
            freshness_window_secs: DEFAULT_FRESHNESS_WINDOW_SECS,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_freshness_window(mut self, secs: u64) -> Self {
        self.freshness_window_secs = secs;
        self
    }
}

/// Stateless gate in front of every `/sql/*` handler.
///
/// Checks run in a fixed order and stop at the first failure:
/// headers present, timestamp fresh, signature valid, body is JSON.
pub struct RequestAuthenticator {
    shared_secret: SecretString,
    clock: Arc<dyn Clock>,
    freshness_window_secs: u64,
}

impl RequestAuthenticator {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            shared_secret: config.shared_secret,
            clock: config.clock,
            freshness_window_secs: config.freshness_window_secs,
        }
    }

    pub fn freshness_window_secs(&self) -> u64 {
        self.freshness_window_secs
    }

    pub fn authenticate(&self, request: &SignedRequest<'_>) -> AuthDecision {
        match self.verify(request) {
            Ok(body) => AuthDecision::Authenticated(body),
            Err(err) => AuthDecision::Rejected(err),
        }
    }

    fn verify(&self, request: &SignedRequest<'_>) -> Result<Value, AuthError> {
        let timestamp = non_empty(request.timestamp).ok_or(AuthError::MissingAuth)?;
        let signature = non_empty(request.signature).ok_or(AuthError::MissingAuth)?;

        self.check_freshness(timestamp)?;

        let expected = sign(
            self.shared_secret.expose_secret().as_bytes(),
            timestamp,
            request.raw_body,
        );
        if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
            return Err(AuthError::InvalidSignature);
        }

        serde_json::from_slice(request.raw_body).map_err(|_| AuthError::InvalidJson)
    }

    fn check_freshness(&self, timestamp: &str) -> Result<(), AuthError> {
        let claimed: i64 = timestamp.parse().map_err(|_| AuthError::TimestampExpired)?;
        let skew = self.clock.now_unix().abs_diff(claimed);
        if skew > self.freshness_window_secs {
            return Err(AuthError::TimestampExpired);
        }
        Ok(())
    }
}

impl fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestAuthenticator")
            .field("shared_secret", &"[REDACTED]")
            .field("freshness_window_secs", &self.freshness_window_secs)
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
