use std::io::Read;

use secrecy::ExposeSecret;
use serde_json::json;

use crate::auth::{Clock, SignedHeaders, SystemClock, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::cli::config::CliConfig;
use crate::cli::utils::{output_json, strip_line_ending};
use crate::cli::OutputFormat;

pub fn handle(
    config: &CliConfig,
    body: Option<String>,
    timestamp: Option<i64>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let secret = config.require_secret()?;

    let body = match body {
        Some(body) => body,
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            strip_line_ending(&input).to_string()
        }
    };

    let timestamp = timestamp.unwrap_or_else(|| SystemClock.now_unix());
    let headers = SignedHeaders::new(secret.expose_secret().as_bytes(), timestamp, body.as_bytes());

    match output_format {
        OutputFormat::Json => output_json(&json!({
            TIMESTAMP_HEADER: headers.timestamp,
            SIGNATURE_HEADER: headers.signature,
        })),
        OutputFormat::Text => {
            println!("{}: {}", TIMESTAMP_HEADER, headers.timestamp);
            println!("{}: {}", SIGNATURE_HEADER, headers.signature);
            Ok(())
        }
    }
}
