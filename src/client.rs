//! Signing client for the `/sql/*` endpoints.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::auth::{Clock, SignedHeaders, SystemClock, SIGNATURE_HEADER, TIMESTAMP_HEADER};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a failure envelope or a non-2xx status
    #[error("{code}: {message} (HTTP {status})")]
    Api {
        code: String,
        message: String,
        status: u16,
    },

    #[error("Invalid edge API URL: {0}")]
    InvalidUrl(String),

    #[error("Edge API unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid response from edge API: {0}")]
    InvalidResponse(String),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn code(&self) -> &str {
        match self {
            ClientError::Api { code, .. } => code,
            ClientError::InvalidUrl(_) => "INVALID_URL",
            ClientError::Unavailable(_) => "WORKER_UNAVAILABLE",
            ClientError::InvalidResponse(_) => "WORKER_ERROR",
            ClientError::Encode(_) => "ENCODE_ERROR",
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Unavailable(err.to_string())
    }
}

pub struct EdgeClient {
    base_url: String,
    secret: SecretString,
    clock: Arc<dyn Clock>,
    http: reqwest::Client,
}

impl EdgeClient {
    pub fn new(base_url: impl Into<String>, secret: SecretString) -> Result<Self, ClientError> {
        let base_url = base_url.into();
        match Url::parse(&base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            _ => return Err(ClientError::InvalidUrl(base_url)),
        }

        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            secret,
            clock: Arc::new(SystemClock),
            http,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Signed headers for `body` at the client's current time
    pub fn sign(&self, body: &[u8]) -> SignedHeaders {
        SignedHeaders::new(self.secret.expose_secret().as_bytes(), self.clock.now_unix(), body)
    }

    /// POST `payload` to `endpoint` (`users.list`, `sql/users.list` or
    /// `/sql/users.list`) and return the full success envelope.
    pub async fn call(&self, endpoint: &str, payload: &Value) -> Result<Value, ClientError> {
        let body = serde_json::to_string(payload)?;
        let headers = self.sign(body.as_bytes());
        let url = self.endpoint_url(endpoint);

        tracing::debug!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(TIMESTAMP_HEADER, headers.timestamp)
            .header(SIGNATURE_HEADER, headers.signature)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let reply: Value = serde_json::from_str(&text)
            .map_err(|_| ClientError::InvalidResponse(format!("HTTP {} with non-JSON body", status.as_u16())))?;

        if !status.is_success() || reply.get("ok") != Some(&Value::Bool(true)) {
            let error = reply.get("error");
            let field = |name: &str, default: &str| {
                error
                    .and_then(|e| e.get(name))
                    .and_then(Value::as_str)
                    .unwrap_or(default)
                    .to_string()
            };
            return Err(ClientError::Api {
                code: field("code", "WORKER_ERROR"),
                message: field("message", "Worker request failed"),
                status: if status.as_u16() >= 400 { status.as_u16() } else { 500 },
            });
        }

        Ok(reply)
    }

    /// GET /health. A degraded server is reported as `ClientError::Api`.
    pub async fn health(&self) -> Result<Value, ClientError> {
        let response = self.http.get(format!("{}/health", self.base_url)).send().await?;
        let status = response.status();
        let reply: Value = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            return Err(ClientError::Api {
                code: "SERVICE_UNAVAILABLE".to_string(),
                message: format!(
                    "Server is {}",
                    reply.get("status").and_then(Value::as_str).unwrap_or("unhealthy")
                ),
                status: status.as_u16(),
            });
        }
        Ok(reply)
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        let endpoint = endpoint.trim_start_matches('/');
        if endpoint.starts_with("sql/") {
            format!("{}/{}", self.base_url, endpoint)
        } else {
            format!("{}/sql/{}", self.base_url, endpoint)
        }
    }
}

impl fmt::Debug for EdgeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeClient")
            .field("base_url", &self.base_url)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
