//! # cpustat Common
//!
//! Shared utilities for the cpustat components.
//!
//! ## Logging
//!
//! ```rust
//! use cpustat_common::{init_logging_with_format, LogFormat};
//!
//! init_logging_with_format("info", LogFormat::Pretty).unwrap();
//! tracing::info!(cores = 4, "Sampler started");
//! ```
//!
//! Logs go to stderr so that stdout stays free for emitted events.

pub mod logging;

pub use logging::{init_logging, init_logging_json, init_logging_with_format, LogFormat};
