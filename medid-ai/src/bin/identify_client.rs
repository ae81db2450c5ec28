//! medid-identify - command-line upload client
//!
//! Sends one or more medicine images to a running medid-ai service and
//! prints the consolidated JSON it returns.

use anyhow::{bail, Result};
use clap::Parser;
use medid_ai::client::{ClientOutcome, IdentifyClient, DEFAULT_SERVER_URL};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for medid-identify
#[derive(Parser, Debug)]
#[command(name = "medid-identify")]
#[command(about = "Identify a medicine from one or more package images")]
#[command(version)]
struct Args {
    /// Image files (JPEG, PNG or WebP) of the same medicine
    #[arg(required = true, value_name = "IMAGE")]
    files: Vec<PathBuf>,

    /// Base URL of the medid-ai service
    #[arg(short, long, default_value = DEFAULT_SERVER_URL, env = "MEDID_SERVER_URL")]
    server: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "120")]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let client = IdentifyClient::new(args.server, Duration::from_secs(args.timeout_secs))?;
    match client.identify_files(&args.files).await? {
        ClientOutcome::Response(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        ClientOutcome::Failed(status) => {
            bail!("Failed to identify medicine. (HTTP {})", status)
        }
    }
}
