//! Zone options trading bot - entry point.
//!
//! Paper mode runs against the simulated broker, optionally replaying a
//! tick file. Live brokers are wired in through `Application::with_collaborators`.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Zone-based index options trading bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via ZONEBOT_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config path: CLI arg > ZONEBOT_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("ZONEBOT_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    let config = zone_bot::AppConfig::from_file(&config_path)?;

    zone_telemetry::init_logging(&config.telemetry.log_level)?;
    info!("Starting zone-bot v{}", env!("CARGO_PKG_VERSION"));
    info!(config_path = %config_path, mode = ?config.mode, "Configuration loaded");

    let app = zone_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
