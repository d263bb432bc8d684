//! Perpgate execution gateway - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Execution gateway for a perpetual-swap exchange
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via PERPGATE_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    perpgate_telemetry::init_logging()?;

    info!("Starting perpgate v{}", env!("CARGO_PKG_VERSION"));

    // Determine config path: CLI arg > PERPGATE_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("PERPGATE_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = perpgate_bot::AppConfig::load(&config_path)?;
    info!(
        rest_url = %config.exchange.rest_url,
        simulated = config.exchange.simulated,
        "Configuration loaded"
    );

    let app = perpgate_bot::Application::connect(config)?;
    app.run().await?;

    Ok(())
}
