pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "crm")]
#[command(about = "CRM edge CLI - sign and send requests to the /sql/* API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Print X-Ts / X-Sign headers for a request body")]
    Sign {
        #[arg(help = "Raw request body (read from stdin when omitted)")]
        body: Option<String>,

        #[arg(long, help = "Unix timestamp to sign with instead of the current time")]
        timestamp: Option<i64>,
    },

    #[command(about = "Send a signed request to an /sql/* endpoint")]
    Call {
        #[arg(help = "Endpoint name, e.g. users.list")]
        endpoint: String,

        #[arg(help = "JSON request body (defaults to {})")]
        body: Option<String>,
    },

    #[command(about = "Check server health via /health")]
    Health,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = config::CliConfig::from_env();

    match cli.command {
        Commands::Sign { body, timestamp } => commands::sign::handle(&config, body, timestamp, output_format),
        Commands::Call { endpoint, body } => commands::call::handle(&config, &endpoint, body).await,
        Commands::Health => commands::health::handle(&config, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["crm", "--json", "sign", "{}", "--timestamp", "42"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::Sign { body, timestamp } => {
                assert_eq!(body.as_deref(), Some("{}"));
                assert_eq!(timestamp, Some(42));
            }
            _ => panic!("expected sign"),
        }

        let cli = Cli::try_parse_from(["crm", "call", "users.list"]).unwrap();
        assert!(matches!(cli.command, Commands::Call { body: None, .. }));
        assert!(Cli::try_parse_from(["crm", "call"]).is_err());
    }
}
