#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crm_edge::api::{self, AppState};
use crm_edge::auth::{sign, Clock, RequestAuthenticator, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crm_edge::config::AppConfig;
use crm_edge::database::Database;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::task::JoinHandle;

pub const SECRET: &str = "integration-test-secret";
pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// In-process server on a free port, backed by a private in-memory database.
/// Aborted when dropped.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub db: Database,
    pub client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(None, &[]).await
    }

    /// Server whose authenticator reads time from `clock`
    pub async fn start_with_clock(clock: Arc<dyn Clock>) -> Result<Self> {
        Self::start_with(Some(clock), &[]).await
    }

    pub async fn start_with(clock: Option<Arc<dyn Clock>>, env: &[(&str, &str)]) -> Result<Self> {
        let mut vars: Vec<(String, String)> = vec![
            ("HMAC_SECRET".into(), SECRET.into()),
            ("DATABASE_URL".into(), "sqlite::memory:".into()),
            ("ALLOWED_ORIGINS".into(), ALLOWED_ORIGIN.into()),
            ("API_ENABLE_REQUEST_LOGGING".into(), "false".into()),
        ];
        vars.extend(env.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let config = AppConfig::from_lookup(|key| {
            vars.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })?;

        let db = Database::connect(&config.database.url, config.database.max_connections).await?;
        db.init_schema().await?;

        let mut state = AppState::new(db.clone(), config);
        if let Some(clock) = clock {
            let auth_config = state.config.auth_config().with_clock(clock);
            state = state.with_authenticator(RequestAuthenticator::new(auth_config));
        }

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;

        let app = api::router(state);
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            port,
            base_url,
            db,
            client: reqwest::Client::new(),
            handle,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST `body` verbatim with the given header values (None omits the header)
    pub async fn post_raw(
        &self,
        path: &str,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &str,
    ) -> Result<(StatusCode, Value)> {
        let mut request = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .body(body.to_string());
        if let Some(ts) = timestamp {
            request = request.header(TIMESTAMP_HEADER, ts);
        }
        if let Some(sig) = signature {
            request = request.header(SIGNATURE_HEADER, sig);
        }

        let response = request.send().await?;
        let status = response.status();
        let json = response.json::<Value>().await?;
        Ok((status, json))
    }

    /// POST `body` signed with the shared secret at `timestamp`
    pub async fn post_signed_at(&self, path: &str, timestamp: i64, body: &str) -> Result<(StatusCode, Value)> {
        let ts = timestamp.to_string();
        let sig = sign(SECRET.as_bytes(), &ts, body.as_bytes());
        self.post_raw(path, Some(&ts), Some(&sig), body).await
    }

    /// Signed call to `/sql/{endpoint}` at the current time
    pub async fn call(&self, endpoint: &str, body: Value) -> Result<(StatusCode, Value)> {
        let body = serde_json::to_string(&body)?;
        self.post_signed_at(&format!("/sql/{}", endpoint), now(), &body).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
