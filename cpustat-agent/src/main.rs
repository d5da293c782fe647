//! # cpustat Agent
//!
//! Samples CPU tick counters on a fixed period and writes one JSON event per
//! cycle for the aggregate view, plus one per core, to stdout.
//!
//! ## Usage
//! ```bash
//! cpustat-agent --config /etc/cpustat/agent.yaml
//! cpustat-agent --period 5 --ticks --once
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use cpustat_agent::cli::Args;
use cpustat_agent::config::{Config, DEFAULT_CONFIG_PATH};

/// Where the effective configuration came from.
enum ConfigSource {
    File(String),
    Defaults,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration before logging so the configured format applies
    let (config, source) = match &args.config {
        Some(config_path) => {
            // Explicit config file provided
            let cfg = Config::load(config_path)
                .with_context(|| format!("Failed to load configuration from {}", config_path))?;
            (cfg.with_cli_overrides(&args), ConfigSource::File(config_path.clone()))
        }
        None => {
            // Try default location, fall back to CLI-only config
            match Config::load(DEFAULT_CONFIG_PATH) {
                Ok(cfg) => (
                    cfg.with_cli_overrides(&args),
                    ConfigSource::File(DEFAULT_CONFIG_PATH.to_string()),
                ),
                Err(_) => (Config::default_with_cli(&args), ConfigSource::Defaults),
            }
        }
    };

    // Initialize logging
    cpustat_common::init_logging_with_format(&args.log_level, config.agent.log_format)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting cpustat Agent"
    );

    match &source {
        ConfigSource::File(path) => info!(config_path = %path, "Configuration loaded"),
        ConfigSource::Defaults => info!("No config file found, using CLI arguments and defaults"),
    }

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e);
    }

    info!(
        strategy = ?config.collection.strategy,
        procfs_root = %config.collection.procfs_root.display(),
        hostname = %config.agent.get_hostname(),
        "Agent configured"
    );

    if let Err(e) = cpustat_agent::run(config, args.once).await {
        error!(error = ?e, "Sampler failed");
        return Err(e);
    }

    Ok(())
}
