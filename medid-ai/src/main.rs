//! medid-ai - Medicine Identification Service
//!
//! Accepts batches of medicine package images, asks Gemini to identify
//! each one, and returns a single consolidated identification.
//!
//! Default address: 127.0.0.1:8000

use anyhow::{Context, Result};
use clap::Parser;
use medid_common::config::{self, LoggingConfig};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use medid_ai::services::{GeminiClient, IdentificationService};
use medid_ai::AppState;

/// Command-line arguments for medid-ai
#[derive(Parser, Debug)]
#[command(name = "medid-ai")]
#[command(about = "Medicine identification service")]
#[command(version)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "MEDID_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides bind_address from the config file)
    #[arg(short, long, env = "MEDID_BIND_ADDRESS")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = config::resolve_config_path(args.config.as_deref());
    let loaded = config::load_toml_config(config_path.as_deref())?;
    let toml_config = loaded.config;

    init_tracing(&toml_config.logging)?;

    // Build identification logged immediately after tracing init
    info!(
        "Starting medid-ai (Medicine Identification) {}",
        medid_ai::build_info::BUILD_INFO
    );
    loaded.source.log();

    let api_key = config::resolve_gemini_api_key(&toml_config)?;
    let gemini = GeminiClient::from_config(&toml_config, api_key)
        .context("Failed to create Gemini client")?;
    info!("Gemini model: {}", gemini.model());

    let identification = IdentificationService::new(Arc::new(gemini));
    let state = AppState::new(identification, toml_config.max_upload_bytes);
    let app = medid_ai::build_router(state);

    let bind_address = args.bind.unwrap_or(toml_config.bind_address);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;
    info!("Listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing from RUST_LOG, falling back to the configured level
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", logging.level)));

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
