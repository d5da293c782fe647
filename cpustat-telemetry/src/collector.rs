//! The snapshot source consumed by the [`Monitor`](crate::Monitor).
//!
//! A collector reads platform counters and returns a [`SampleSet`]. The
//! delta engine never looks at how the snapshot was produced, so the
//! platform-specific choice of counter source lives entirely here.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::error::CollectorError;
use crate::sample::SampleSet;

/// Produces point-in-time CPU snapshots.
pub trait Collector: Send + Sync {
    /// Take one snapshot of totals and per-core counters.
    fn collect(&self) -> Result<SampleSet, CollectorError>;
}

impl<C: Collector + ?Sized> Collector for Box<C> {
    fn collect(&self) -> Result<SampleSet, CollectorError> {
        (**self).collect()
    }
}

impl<C: Collector + ?Sized> Collector for Arc<C> {
    fn collect(&self) -> Result<SampleSet, CollectorError> {
        (**self).collect()
    }
}

/// Which native counter source to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStrategy {
    /// Raw kernel tick counters (`/proc/stat` on Linux).
    #[default]
    RawCounters,
    /// OS performance counter API. Only effective on Windows.
    PerformanceCounter,
}

/// Options for selecting and configuring the platform collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorOptions {
    /// Counter source strategy.
    pub strategy: CollectionStrategy,
    /// Root of the procfs mount (e.g. `/hostfs/proc` inside a container).
    pub procfs_root: PathBuf,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            strategy: CollectionStrategy::RawCounters,
            procfs_root: PathBuf::from(crate::procfs::DEFAULT_PROCFS_ROOT),
        }
    }
}

impl CollectorOptions {
    /// Prefer the performance counter API. Ignored outside Windows.
    pub fn with_performance_counter(mut self) -> Self {
        self.strategy = CollectionStrategy::PerformanceCounter;
        self
    }

    /// Read procfs from a different mount point.
    pub fn with_procfs_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.procfs_root = root.into();
        self
    }
}

/// Build the collector for the current platform.
pub fn default_collector(options: &CollectorOptions) -> Box<dyn Collector> {
    #[cfg(target_os = "linux")]
    {
        if options.strategy == CollectionStrategy::PerformanceCounter {
            warn!("Performance counter collection is only available on Windows, reading procfs");
        }
        debug!(root = %options.procfs_root.display(), "Using procfs CPU collector");
        Box::new(crate::procfs::ProcfsCollector::new(&options.procfs_root))
    }

    #[cfg(not(target_os = "linux"))]
    {
        warn!(strategy = ?options.strategy, "No CPU collector available for this platform");
        Box::new(UnsupportedCollector::new(std::env::consts::OS))
    }
}

/// Collector for platforms without a counter source. Every call fails.
#[derive(Debug, Clone)]
pub struct UnsupportedCollector {
    platform: String,
}

impl UnsupportedCollector {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }
}

impl Collector for UnsupportedCollector {
    fn collect(&self) -> Result<SampleSet, CollectorError> {
        Err(CollectorError::Unsupported(format!(
            "CPU tick counters are not available on {}",
            self.platform
        )))
    }
}

/// Scripted collector for testing and development.
///
/// Returns queued results in order. Once the queue is empty every call
/// fails.
#[derive(Debug, Default)]
pub struct MockCollector {
    script: Mutex<VecDeque<Result<SampleSet, CollectorError>>>,
}

impl MockCollector {
    /// Create a mock collector with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock collector that returns the given snapshots in order.
    pub fn with_samples(samples: impl IntoIterator<Item = SampleSet>) -> Self {
        let collector = Self::new();
        for sample in samples {
            collector.push(sample);
        }
        collector
    }

    /// Queue a successful snapshot.
    pub fn push(&self, sample: SampleSet) {
        self.push_result(Ok(sample));
    }

    /// Queue a collection failure.
    pub fn push_error(&self, error: CollectorError) {
        self.push_result(Err(error));
    }

    /// Number of results still queued.
    pub fn remaining(&self) -> usize {
        self.script.lock().map(|s| s.len()).unwrap_or(0)
    }

    fn push_result(&self, result: Result<SampleSet, CollectorError>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(result);
        }
    }
}

impl Collector for MockCollector {
    fn collect(&self) -> Result<SampleSet, CollectorError> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| CollectorError::Failed("Lock poisoned".to_string()))?;

        script
            .pop_front()
            .unwrap_or_else(|| Err(CollectorError::Failed("no scripted sample".to_string())))
    }
}
