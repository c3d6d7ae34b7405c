use clap::Parser;
use crm_edge::cli::{utils::output_error, Cli, OutputFormat};
use crm_edge::client::ClientError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_format = OutputFormat::from_cli(&cli);

    if let Err(e) = crm_edge::cli::run(cli).await {
        let code = e.downcast_ref::<ClientError>().map(ClientError::code);
        let message = match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => format!("{e:?}"),
            _ => e.to_string(),
        };
        output_error(&output_format, &message, code)?;
        std::process::exit(1);
    }

    Ok(())
}
