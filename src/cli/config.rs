use std::env;

use secrecy::SecretString;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8787";

/// CLI settings taken from `CRM_EDGE_URL` and `HMAC_SECRET`
#[derive(Debug)]
pub struct CliConfig {
    pub base_url: String,
    pub secret: Option<SecretString>,
}

impl CliConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            base_url: lookup("CRM_EDGE_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            secret: lookup("HMAC_SECRET").filter(|v| !v.is_empty()).map(SecretString::from),
        }
    }

    pub fn require_secret(&self) -> anyhow::Result<&SecretString> {
        self.secret
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("HMAC_SECRET is not set"))
    }
}
