//! Configuration management for the cpustat Agent.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use cpustat_common::LogFormat;
use cpustat_telemetry::{CollectorOptions, MetricOpts, MAX_PRECISION};

use crate::cli::Args;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/cpustat/agent.yaml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Agent runtime configuration
    pub agent: AgentConfig,
    /// Which metric representations to emit
    pub metrics: MetricOpts,
    /// Counter source selection
    pub collection: CollectorOptions,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Build a configuration from defaults plus CLI arguments.
    pub fn default_with_cli(args: &Args) -> Self {
        Self::default().with_cli_overrides(args)
    }

    /// Apply CLI argument overrides to the configuration.
    pub fn with_cli_overrides(mut self, args: &Args) -> Self {
        if let Some(period) = args.period {
            self.agent.period_secs = period;
        }

        if let Some(format) = args.log_format {
            self.agent.log_format = format;
        }

        if let Some(ref root) = args.procfs_root {
            self.collection.procfs_root = PathBuf::from(root);
        }

        if args.no_per_core {
            self.agent.per_core = false;
        }

        if args.ticks {
            self.metrics.ticks = true;
        }

        self
    }

    /// Reject configurations the sampler cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.agent.period_secs == 0 {
            bail!("agent.period_secs must be greater than zero");
        }
        if !self.metrics.any_enabled() {
            bail!("at least one of metrics.ticks, metrics.percentages or metrics.normalized_percentages must be enabled");
        }
        if self.metrics.precision > MAX_PRECISION {
            bail!(
                "metrics.precision must be at most {}, got {}",
                MAX_PRECISION,
                self.metrics.precision
            );
        }
        Ok(())
    }
}

/// Agent runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Hostname reported in events (auto-detected if not set)
    pub hostname: Option<String>,
    /// Seconds between samples
    pub period_secs: u64,
    /// Emit one event per core in addition to the totals
    pub per_core: bool,
    /// Log format (json, pretty)
    pub log_format: LogFormat,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            hostname: None,
            period_secs: 10,
            per_core: true,
            log_format: LogFormat::Pretty,
        }
    }
}

impl AgentConfig {
    /// Sampling period.
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }

    /// Get the hostname, detecting it if not set.
    pub fn get_hostname(&self) -> String {
        self.hostname.clone().unwrap_or_else(|| {
            hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "unknown".to_string())
        })
    }
}
