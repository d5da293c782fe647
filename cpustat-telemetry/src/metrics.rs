//! Delta computation and rendering of CPU utilisation metrics.
//!
//! A [`DeltaMetrics`] pairs two consecutive samples. Rendering divides the
//! per-category tick delta by the total tick delta of the window:
//!
//! ```text
//! pct(c)      = (cur[c] - prev[c]) / (total(cur) - total(prev)) * n
//! norm.pct(c) = (cur[c] - prev[c]) / (total(cur) - total(prev))
//! ```
//!
//! where `n` is the core count for the aggregate view and `1` per core.
//! Values are not clamped; a counter that moved backwards yields a negative
//! percentage rather than an error.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TelemetryError};
use crate::fields::MetricFields;
use crate::sample::{Category, CoreInfo, CpuTicks};

/// Decimal places used when rounding emitted percentages.
pub const DEFAULT_PRECISION: u32 = 2;

/// Largest number of decimal places values are rounded to.
pub const MAX_PRECISION: u32 = 10;

/// Selects which representations are emitted for each category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricOpts {
    /// Pass the raw counter value through as `<category>.ticks`.
    pub ticks: bool,
    /// Emit `<category>.pct`, scaled by core count in the aggregate view.
    pub percentages: bool,
    /// Emit `<category>.norm.pct`, scaled to a single core.
    pub normalized_percentages: bool,
    /// Decimal places for percentages.
    pub precision: u32,
}

impl Default for MetricOpts {
    fn default() -> Self {
        Self {
            ticks: false,
            percentages: true,
            normalized_percentages: true,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl MetricOpts {
    /// Options with every representation enabled.
    pub fn all() -> Self {
        Self {
            ticks: true,
            ..Self::default()
        }
    }

    /// Returns `true` if at least one representation is enabled.
    pub fn any_enabled(&self) -> bool {
        self.ticks || self.percentages || self.normalized_percentages
    }
}

/// The previous and current sample of one CPU (or of the totals), ready to
/// be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaMetrics {
    previous: CpuTicks,
    current: CpuTicks,
    count: usize,
    core_info: CoreInfo,
    is_totals: bool,
}

impl DeltaMetrics {
    /// Aggregate metrics across `count` cores.
    pub fn totals(previous: CpuTicks, current: CpuTicks, count: usize) -> Self {
        Self {
            previous,
            current,
            count,
            core_info: CoreInfo::default(),
            is_totals: true,
        }
    }

    /// Metrics for a single core, with its descriptive info if known.
    pub fn core(previous: CpuTicks, current: CpuTicks, core_info: Option<CoreInfo>) -> Self {
        Self {
            previous,
            current,
            count: 0,
            core_info: core_info.unwrap_or_default(),
            is_totals: false,
        }
    }

    pub fn previous(&self) -> &CpuTicks {
        &self.previous
    }

    pub fn current(&self) -> &CpuTicks {
        &self.current
    }

    pub fn core_info(&self) -> &CoreInfo {
        &self.core_info
    }

    pub fn is_totals(&self) -> bool {
        self.is_totals
    }

    /// Number of cores seen by the sample that produced these metrics.
    ///
    /// Only the aggregate view carries a count; per-core metrics return 0.
    /// Prefer this over asking the host for its CPU count, since it matches
    /// the data the percentages were normalised against.
    pub fn cpu_count(&self) -> usize {
        self.count
    }

    /// Multiplier applied to `pct` values.
    fn normalization(&self) -> f64 {
        if self.is_totals {
            self.count as f64
        } else {
            1.0
        }
    }

    /// Render the metrics into a nested field map.
    ///
    /// Fails with [`TelemetryError::StaleSample`] if the current sample does
    /// not account for more ticks than the previous one.
    pub fn format(&self, opts: &MetricOpts) -> Result<MetricFields> {
        let previous_total = self.previous.total();
        let current_total = self.current.total();
        let time_delta = i128::from(current_total) - i128::from(previous_total);
        if time_delta <= 0 {
            return Err(TelemetryError::StaleSample {
                previous_total,
                current_total,
            });
        }
        let window = Window {
            time_delta: time_delta as f64,
            precision: opts.precision,
        };
        let norm = self.normalization();

        let mut fields = MetricFields::new();

        if opts.percentages {
            fields.put("total.pct", window.round(self.busy_ratio(&window) * norm));
        }
        if opts.normalized_percentages {
            fields.put("total.norm.pct", window.round(self.busy_ratio(&window)));
        }

        for category in Category::ALL {
            let Some(current) = self.current.get(category) else {
                continue;
            };
            let previous = self.previous.get(category).unwrap_or(0);
            let ratio = window.ratio(previous, current);
            let name = category.name();

            if opts.ticks {
                fields.put(&format!("{name}.ticks"), current);
            }
            if opts.percentages {
                fields.put(&format!("{name}.pct"), window.round(ratio * norm));
            }
            if opts.normalized_percentages {
                fields.put(&format!("{name}.norm.pct"), window.round(ratio));
            }
        }

        if !self.is_totals && !self.core_info.is_empty() {
            let info = &self.core_info;
            fields.put("model_number", info.model_number.clone());
            fields.put("model_name", info.model_name.clone());
            fields.put("mhz", info.mhz);
            fields.put("core_id", info.core_id);
            fields.put("physical_id", info.physical_id);
        }

        Ok(fields)
    }

    /// Busy share of the window for a single core.
    ///
    /// iowait counts as idle: time spent waiting on I/O is not busy time.
    fn busy_ratio(&self, window: &Window) -> f64 {
        let mut idle = window.ratio(
            self.previous.idle.unwrap_or(0),
            self.current.idle.unwrap_or(0),
        );
        if let Some(iowait) = self.current.iowait {
            idle += window.ratio(self.previous.iowait.unwrap_or(0), iowait);
        }
        1.0 - idle
    }
}

/// The tick span between two samples.
struct Window {
    time_delta: f64,
    precision: u32,
}

impl Window {
    /// Share of the window covered by a counter's movement. Unrounded.
    fn ratio(&self, previous: u64, current: u64) -> f64 {
        let delta = i128::from(current) - i128::from(previous);
        delta as f64 / self.time_delta
    }

    fn round(&self, value: f64) -> f64 {
        round(value, self.precision)
    }
}

/// Round to `precision` decimal places, half away from zero.
///
/// Precision is capped at [`MAX_PRECISION`].
pub fn round(value: f64, precision: u32) -> f64 {
    let exponent = i32::try_from(precision.min(MAX_PRECISION)).unwrap_or_default();
    let scale = 10f64.powi(exponent);
    (value * scale).round() / scale
}
