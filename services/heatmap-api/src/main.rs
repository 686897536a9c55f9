//! Substance heatmap API service.
//!
//! Loads the drug-checking records and the gazetteer once at startup, then
//! serves the selection entry points and the current overlay layers.

use anyhow::{Context, Result};
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use heatmap_api::{router, AppState, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "heatmap-api")]
#[command(about = "Substance heatmap API server")]
struct Args {
    /// Listen address (default: 0.0.0.0:$PORT)
    #[arg(short, long)]
    listen: Option<String>,

    /// Configuration file path (default: environment variables)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Initialize Prometheus metrics exporter
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Prometheus metrics exporter initialized");
    info!("Starting substance heatmap API server");

    let config = match &args.config {
        Some(path) => ServiceConfig::from_yaml_file(path)?,
        None => ServiceConfig::from_env()?,
    };

    // No partial state: a failed load stops the service
    let state = match AppState::load(&config).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!(error = %format!("{:#}", e), "Initial load failed");
            return Err(e);
        }
    };

    let app = router(state, prometheus_handle);

    // Parse listen address
    let addr: SocketAddr = args
        .listen
        .unwrap_or_else(|| format!("0.0.0.0:{}", config.port))
        .parse()?;
    info!(address = %addr, "Listening");

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
