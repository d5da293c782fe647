//! Stateful CPU sampler.
//!
//! The monitor keeps the last snapshot it collected. Each fetch takes a new
//! snapshot, pairs it with the stored one and replaces the stored one.
//! Rendering happens later on the returned [`DeltaMetrics`], so a stale
//! window still advances the stored sample and the next cycle starts fresh.
//!
//! A `Monitor` is a single-writer value: fetches take `&mut self`. Share it
//! behind a mutex if more than one task needs it.

use tracing::{debug, instrument, trace};

use crate::collector::{default_collector, Collector, CollectorOptions};
use crate::error::{Result, TelemetryError};
use crate::metrics::DeltaMetrics;
use crate::sample::{CpuTicks, SampleSet};

/// Retains the previous CPU sample and computes deltas against new ones.
pub struct Monitor<C = Box<dyn Collector>> {
    collector: C,
    last_sample: SampleSet,
}

impl Monitor {
    /// Create a monitor around the platform collector selected by `options`.
    pub fn with_options(options: &CollectorOptions) -> Self {
        Self::new(default_collector(options))
    }
}

impl<C: Collector> Monitor<C> {
    /// Create a monitor with an empty baseline.
    ///
    /// The first fetch is compared against all-absent counters, so its
    /// rendered percentages are not meaningful.
    pub fn new(collector: C) -> Self {
        Self {
            collector,
            last_sample: SampleSet::default(),
        }
    }

    /// The snapshot stored by the last successful fetch.
    pub fn last_sample(&self) -> &SampleSet {
        &self.last_sample
    }

    /// The underlying collector.
    pub fn collector(&self) -> &C {
        &self.collector
    }

    /// Collect a new sample and return aggregate metrics across all cores.
    ///
    /// On collector failure the stored sample is left untouched.
    #[instrument(skip(self), level = "trace")]
    pub fn fetch_totals(&mut self) -> Result<DeltaMetrics> {
        let sample = self.collect()?;

        let previous = self.last_sample.totals;
        let metrics = DeltaMetrics::totals(previous, sample.totals, sample.core_count());
        self.last_sample = sample;

        trace!(cores = metrics.cpu_count(), "Fetched CPU totals");
        Ok(metrics)
    }

    /// Collect a new sample and return one entry per core, in core order.
    ///
    /// A core with no stored history (the core count grew) is paired with an
    /// all-absent baseline. On collector failure the stored sample is left
    /// untouched.
    #[instrument(skip(self), level = "trace")]
    pub fn fetch_per_core(&mut self) -> Result<Vec<DeltaMetrics>> {
        let sample = self.collect()?;

        if core_count_changed(&self.last_sample, &sample) {
            debug!(
                previous = self.last_sample.core_count(),
                current = sample.core_count(),
                "CPU core count changed"
            );
        }

        let metrics = sample
            .per_core
            .iter()
            .enumerate()
            .map(|(index, current)| {
                let previous = self
                    .last_sample
                    .per_core
                    .get(index)
                    .copied()
                    .unwrap_or_else(CpuTicks::default);
                DeltaMetrics::core(previous, *current, sample.info_for(index).cloned())
            })
            .collect();

        self.last_sample = sample;
        Ok(metrics)
    }

    fn collect(&self) -> Result<SampleSet> {
        self.collector.collect().map_err(|e| {
            debug!(error = ?e, "CPU collection failed");
            TelemetryError::Collection(e)
        })
    }
}

/// Whether the core set changed size. The empty initial baseline never counts.
fn core_count_changed(previous: &SampleSet, current: &SampleSet) -> bool {
    !previous.per_core.is_empty() && previous.core_count() != current.core_count()
}
