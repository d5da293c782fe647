//! Error types for CPU sampling and rendering.

use thiserror::Error;

/// Errors raised by a [`Collector`](crate::Collector) while taking a snapshot.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// Failed to read a counter source file.
    #[error("Failed to read {path}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    /// A counter source had unexpected content.
    #[error("Failed to parse {path}: {detail}")]
    ParseError { path: String, detail: String },

    /// The requested collection strategy is not available on this platform.
    #[error("Collection not supported: {0}")]
    Unsupported(String),

    /// Any other collector failure.
    #[error("Collection failed: {0}")]
    Failed(String),
}

/// Errors surfaced by the [`Monitor`](crate::Monitor) and metric rendering.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The collector could not produce a snapshot. Monitor state is unchanged.
    #[error("Error fetching CPU metrics")]
    Collection(#[source] CollectorError),

    /// The sampling window is empty or negative (counter reset, reordered or
    /// identical samples).
    #[error("Previous sample is newer than current sample (previous total {previous_total}, current total {current_total})")]
    StaleSample {
        previous_total: u64,
        current_total: u64,
    },
}

/// Result type alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;
