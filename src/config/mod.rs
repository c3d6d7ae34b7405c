use std::env;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{AuthConfig, DEFAULT_FRESHNESS_WINDOW_SECS};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Process-wide configuration, built once in `main` and passed down.
#[derive(Debug)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
    pub enable_request_logging: bool,
}

#[derive(Debug)]
pub struct SecurityConfig {
    pub hmac_secret: SecretString,
    pub allowed_origins: Vec<String>,
    pub freshness_window_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup (the process
    /// environment in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let secret = lookup("HMAC_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("HMAC_SECRET"))?;
        let secret = SecretString::from(secret);

        let config = match environment {
            Environment::Production => Self::production(secret),
            Environment::Staging => Self::staging(secret),
            Environment::Development => Self::development(secret),
        };

        config.with_overrides(&lookup)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse("DATABASE_MAX_CONNECTIONS", &v)?;
        }

        // API overrides
        if let Some(v) = lookup("CRM_EDGE_PORT").or_else(|| lookup("PORT")) {
            self.api.port = parse("PORT", &v)?;
        }
        if let Some(v) = lookup("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = parse("API_MAX_REQUEST_SIZE_BYTES", &v)?;
        }
        if let Some(v) = lookup("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = parse("API_ENABLE_REQUEST_LOGGING", &v)?;
        }

        // Security overrides
        if let Some(v) = lookup("ALLOWED_ORIGINS") {
            self.security.allowed_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("SECURITY_FRESHNESS_WINDOW_SECS") {
            self.security.freshness_window_secs = parse("SECURITY_FRESHNESS_WINDOW_SECS", &v)?;
        }

        Ok(self)
    }

    /// Authenticator parameters derived from the security section
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(SecretString::from(self.security.hmac_secret.expose_secret()))
            .with_freshness_window(self.security.freshness_window_secs)
    }

    fn development(hmac_secret: SecretString) -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: "sqlite://crm.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            api: ApiConfig {
                port: 8787,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                enable_request_logging: true,
            },
            security: SecurityConfig {
                hmac_secret,
                allowed_origins: vec![
                    "http://localhost:5173".to_string(),
                    "http://localhost:3000".to_string(),
                ],
                freshness_window_secs: DEFAULT_FRESHNESS_WINDOW_SECS,
            },
        }
    }

    fn staging(hmac_secret: SecretString) -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: "sqlite://crm-staging.db?mode=rwc".to_string(),
                max_connections: 10,
            },
            api: ApiConfig {
                port: 8787,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
                enable_request_logging: true,
            },
            security: SecurityConfig {
                hmac_secret,
                allowed_origins: vec!["https://staging.example.com".to_string()],
                freshness_window_secs: DEFAULT_FRESHNESS_WINDOW_SECS,
            },
        }
    }

    fn production(hmac_secret: SecretString) -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: "sqlite://crm.db?mode=rwc".to_string(),
                max_connections: 20,
            },
            api: ApiConfig {
                port: 8787,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
                enable_request_logging: false,
            },
            security: SecurityConfig {
                hmac_secret,
                allowed_origins: vec!["https://app.example.com".to_string()],
                freshness_window_secs: DEFAULT_FRESHNESS_WINDOW_SECS,
            },
        }
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}
