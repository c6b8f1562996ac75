//! apar-tracker - Fire extinguisher inspection tracker
//!
//! Loads asset master data and inspection history from the spreadsheet
//! endpoints, derives statuses and dashboard counters, and records new
//! inspections.

use anyhow::Result;
use apar_tracker::cli::{self, Cli};
use apar_tracker::config::{default_config_path, TomlConfig, TrackerConfig};
use clap::Parser;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(default_config_path);
    let toml_config = match &config_path {
        Some(path) => TomlConfig::load_optional(path)?,
        None => None,
    };
    let config_found = toml_config.is_some();
    let toml_config = toml_config.unwrap_or_default();

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&toml_config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting APAR Tracker (apar-tracker) {}", apar_tracker::build_id());

    match (&config_path, config_found) {
        (Some(path), true) => info!("Configuration loaded from {}", path.display()),
        (Some(path), false) => warn!("Config file not found at {}, using defaults", path.display()),
        (None, _) => warn!("No config directory available, using defaults"),
    }

    let config = TrackerConfig::resolve(&cli.overrides(), &toml_config)?;
    cli::run(cli, config).await
}
