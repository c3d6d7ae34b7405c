use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::cli::config::CliConfig;
use crate::cli::utils::output_json;
use crate::client::EdgeClient;

pub async fn handle(config: &CliConfig, endpoint: &str, body: Option<String>) -> anyhow::Result<()> {
    let secret = SecretString::from(config.require_secret()?.expose_secret());
    let payload: Value = match body.as_deref() {
        Some(raw) => serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("Body is not valid JSON: {}", e))?,
        None => Value::Object(Default::default()),
    };

    let client = EdgeClient::new(config.base_url.as_str(), secret)?;
    let reply = client.call(endpoint, &payload).await?;
    output_json(&reply)
}
