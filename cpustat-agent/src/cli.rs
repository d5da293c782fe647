//! Command-line argument parsing.

use clap::Parser;
use cpustat_common::LogFormat;

/// cpustat Agent - CPU utilisation sampler
#[derive(Parser, Debug, Default)]
#[command(name = "cpustat-agent")]
#[command(about = "cpustat Agent - samples CPU tick counters and emits utilisation events")]
#[command(version)]
pub struct Args {
    /// Path to configuration file (optional, defaults used if not found)
    #[arg(short, long, env = "CPUSTAT_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", env = "CPUSTAT_LOG_LEVEL")]
    pub log_level: String,

    /// Log format (pretty, json); overrides the config file
    #[arg(long, value_parser = parse_log_format)]
    pub log_format: Option<LogFormat>,

    /// Sampling period in seconds
    #[arg(short, long)]
    pub period: Option<u64>,

    /// Root of the procfs mount to read counters from
    #[arg(long, env = "CPUSTAT_PROCFS_ROOT")]
    pub procfs_root: Option<String>,

    /// Only report aggregate metrics, not per-core
    #[arg(long)]
    pub no_per_core: bool,

    /// Also emit raw tick counters
    #[arg(long)]
    pub ticks: bool,

    /// Take a baseline, wait one period, emit a single cycle and exit
    #[arg(long)]
    pub once: bool,
}

fn parse_log_format(s: &str) -> Result<LogFormat, String> {
    match s.to_lowercase().as_str() {
        "pretty" | "text" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        other => Err(format!("unknown log format '{}', expected pretty or json", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "cpustat-agent",
            "--period",
            "5",
            "--no-per-core",
            "--ticks",
            "--log-format",
            "json",
            "--procfs-root",
            "/hostfs/proc",
        ])
        .unwrap();

        assert_eq!(args.period, Some(5));
        assert!(args.no_per_core);
        assert!(args.ticks);
        assert!(!args.once);
        assert_eq!(args.log_format, Some(LogFormat::Json));
        assert_eq!(args.procfs_root.as_deref(), Some("/hostfs/proc"));
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        assert!(Args::try_parse_from(["cpustat-agent", "--log-format", "xml"]).is_err());
    }
}
