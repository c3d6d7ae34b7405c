use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::cli::config::CliConfig;
use crate::cli::utils::output_json;
use crate::cli::OutputFormat;
use crate::client::EdgeClient;

pub async fn handle(config: &CliConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    // /health is not signed, so the secret is optional here
    let secret = match &config.secret {
        Some(secret) => SecretString::from(secret.expose_secret()),
        None => SecretString::from(""),
    };
    let client = EdgeClient::new(config.base_url.as_str(), secret)?;
    let reply = client.health().await?;

    match output_format {
        OutputFormat::Json => output_json(&reply),
        OutputFormat::Text => {
            let status = reply.get("status").and_then(Value::as_str).unwrap_or("unknown");
            println!("✓ {} is {}", client.base_url(), status);
            Ok(())
        }
    }
}
