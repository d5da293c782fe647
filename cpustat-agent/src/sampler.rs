//! Periodic sampling loop.
//!
//! The sampler owns two monitors over one shared collector: one for the
//! aggregate totals and one for the per-core breakdown. Each keeps its own
//! previous sample, so both windows span a full period.

use anyhow::Result;
use chrono::Utc;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use cpustat_telemetry::{default_collector, Collector, MetricOpts, Monitor, TelemetryError};

use crate::config::Config;
use crate::reporter::{CpuEvent, EventReporter};

/// What a single sampling cycle produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Events written
    pub emitted: usize,
    /// Entries skipped because their window was stale
    pub stale: usize,
    /// Fetches that failed in the collector
    pub failed: usize,
}

/// Turns monitor output into reported events.
pub struct Sampler<C: Collector + ?Sized, W: Write> {
    totals: Monitor<Arc<C>>,
    cores: Option<Monitor<Arc<C>>>,
    opts: MetricOpts,
    hostname: String,
    reporter: EventReporter<W>,
}

impl<C: Collector + ?Sized, W: Write> Sampler<C, W> {
    pub fn new(collector: Arc<C>, config: &Config, reporter: EventReporter<W>) -> Self {
        let cores = config
            .agent
            .per_core
            .then(|| Monitor::new(Arc::clone(&collector)));

        Self {
            totals: Monitor::new(collector),
            cores,
            opts: config.metrics,
            hostname: config.agent.get_hostname(),
            reporter,
        }
    }

    /// Take the baseline sample. Nothing is emitted.
    pub fn prime(&mut self) {
        if let Err(e) = self.totals.fetch_totals() {
            warn!(error = ?e, "Failed to take baseline CPU totals");
        }
        if let Some(cores) = self.cores.as_mut() {
            if let Err(e) = cores.fetch_per_core() {
                warn!(error = ?e, "Failed to take baseline per-core sample");
            }
        }
    }

    /// Fetch, render and report one cycle.
    ///
    /// Collection failures and stale windows skip the affected entries; only
    /// a failure to write output is returned as an error.
    pub fn run_cycle(&mut self) -> Result<CycleReport> {
        let mut report = CycleReport::default();
        let timestamp = Utc::now();

        match self.totals.fetch_totals() {
            Ok(metrics) => match metrics.format(&self.opts) {
                Ok(fields) => {
                    self.reporter
                        .report(&CpuEvent::totals(timestamp, &self.hostname, fields))?;
                    report.emitted += 1;
                }
                Err(e) => {
                    warn!(error = %e, "Skipping CPU totals for this cycle");
                    report.stale += 1;
                }
            },
            Err(e) => {
                error!(error = ?e, "Failed to fetch CPU totals");
                report.failed += 1;
            }
        }

        if let Some(cores) = self.cores.as_mut() {
            match cores.fetch_per_core() {
                Ok(per_core) => {
                    for (index, metrics) in per_core.iter().enumerate() {
                        match metrics.format(&self.opts) {
                            Ok(fields) => {
                                self.reporter.report(&CpuEvent::core(
                                    timestamp,
                                    &self.hostname,
                                    index,
                                    fields,
                                ))?;
                                report.emitted += 1;
                            }
                            Err(e @ TelemetryError::StaleSample { .. }) => {
                                debug!(core = index, error = %e, "Skipping core for this cycle");
                                report.stale += 1;
                            }
                            Err(e) => return Err(e.into()),
                        }
                    }
                }
                Err(e) => {
                    error!(error = ?e, "Failed to fetch per-core CPU metrics");
                    report.failed += 1;
                }
            }
        }

        debug!(
            emitted = report.emitted,
            stale = report.stale,
            failed = report.failed,
            "Sampling cycle complete"
        );
        Ok(report)
    }

    /// Events written so far.
    pub fn events_written(&self) -> u64 {
        self.reporter.events_written()
    }
}

/// Drive a sampler until Ctrl-C, or for a single cycle when `once` is set.
pub async fn run_sampler<C, W>(mut sampler: Sampler<C, W>, period: Duration, once: bool) -> Result<()>
where
    C: Collector + ?Sized,
    W: Write,
{
    sampler.prime();

    if once {
        tokio::time::sleep(period).await;
        sampler.run_cycle()?;
        return Ok(());
    }

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; the baseline was just taken.
    interval.tick().await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                sampler.run_cycle()?;
            }
            _ = &mut shutdown => {
                info!(events = sampler.events_written(), "Shutdown signal received, stopping sampler");
                break;
            }
        }
    }

    Ok(())
}

/// Run the agent with the platform collector, writing events to stdout.
pub async fn run(config: Config, once: bool) -> Result<()> {
    let collector: Arc<dyn Collector> = Arc::from(default_collector(&config.collection));
    let sampler = Sampler::new(collector, &config, EventReporter::new(std::io::stdout()));

    info!(
        period_secs = config.agent.period_secs,
        per_core = config.agent.per_core,
        ticks = config.metrics.ticks,
        percentages = config.metrics.percentages,
        normalized_percentages = config.metrics.normalized_percentages,
        "Starting CPU sampler"
    );

    run_sampler(sampler, config.agent.period(), once).await
}
