use std::sync::Arc;

use crate::auth::RequestAuthenticator;
use crate::config::AppConfig;
use crate::database::Database;

/// Shared handles passed to every handler and to the HMAC gate
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub authenticator: Arc<RequestAuthenticator>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        let authenticator = RequestAuthenticator::new(config.auth_config());
        Self {
            db,
            authenticator: Arc::new(authenticator),
            config: Arc::new(config),
        }
    }

    /// Replace the authenticator, e.g. to inject a fixed clock in tests
    pub fn with_authenticator(mut self, authenticator: RequestAuthenticator) -> Self {
        self.authenticator = Arc::new(authenticator);
        self
    }
}
