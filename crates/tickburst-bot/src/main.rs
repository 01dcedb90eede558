//! Tickburst burst driver - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Tick-driven order burst driver
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via TICKBURST_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize TLS crypto provider (must be before any WS connections)
    tickburst_feed::init_crypto();

    let args = Args::parse();

    tickburst_telemetry::init_logging("info,tickburst=debug")?;

    info!("Starting tickburst v{}", env!("CARGO_PKG_VERSION"));

    // Determine config path: CLI arg > TICKBURST_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("TICKBURST_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");

    let mut config = tickburst_bot::AppConfig::from_file(&config_path)?;
    config.apply_env_overrides();
    info!(symbol = %config.symbol, ws_url = %config.ws_url, "Configuration loaded");

    let app = tickburst_bot::App::new(config);
    app.run().await?;

    Ok(())
}
