//! # cpustat Telemetry
//!
//! CPU utilisation from raw tick counters.
//!
//! ## Important: CPU Usage Measurement
//!
//! Tick counters only grow, so usage requires two samples. The [`Monitor`]
//! keeps the previous [`SampleSet`] and pairs it with each new one; the
//! returned [`DeltaMetrics`] renders ticks, window percentages and
//! single-core normalised percentages into a nested [`MetricFields`] map.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────┐     ┌───────────────────┐
//! │  ProcfsCollector  │     │   MockCollector   │
//! │ (/proc/stat etc.) │     │   (scripted)      │
//! └─────────┬─────────┘     └─────────┬─────────┘
//!           └─────────────┬───────────┘
//!                         ▼
//!               ┌───────────────────┐
//!               │  Collector trait  │
//!               └─────────┬─────────┘
//!                         ▼
//!               ┌───────────────────┐
//!               │      Monitor      │  last sample
//!               └─────────┬─────────┘
//!                         ▼
//!               ┌───────────────────┐
//!               │   DeltaMetrics    │  format(MetricOpts)
//!               └───────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cpustat_telemetry::{CollectorOptions, MetricOpts, Monitor};
//!
//! let mut monitor = Monitor::with_options(&CollectorOptions::default());
//! monitor.fetch_totals().unwrap(); // baseline
//! std::thread::sleep(std::time::Duration::from_secs(1));
//!
//! let fields = monitor.fetch_totals().unwrap().format(&MetricOpts::default()).unwrap();
//! println!("{}", serde_json::to_string(&fields).unwrap());
//! ```

pub mod collector;
pub mod error;
pub mod fields;
pub mod metrics;
pub mod monitor;
pub mod procfs;
pub mod sample;

pub use collector::{
    default_collector, CollectionStrategy, Collector, CollectorOptions, MockCollector,
    UnsupportedCollector,
};
pub use error::{CollectorError, Result, TelemetryError};
pub use fields::MetricFields;
pub use metrics::{DeltaMetrics, MetricOpts, DEFAULT_PRECISION, MAX_PRECISION};
pub use monitor::Monitor;
pub use procfs::ProcfsCollector;
pub use sample::{Category, CoreInfo, CpuTicks, SampleSet};
