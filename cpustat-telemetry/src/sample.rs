//! Point-in-time CPU tick readings.
//!
//! Tick counters grow monotonically from boot. A platform may not expose
//! every category, so each counter is optional: `None` means "not reported
//! here", which is different from a counter that is exactly zero.

use serde::{Deserialize, Serialize};

/// A CPU time category as reported by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    User,
    System,
    Idle,
    Nice,
    Irq,
    IoWait,
    SoftIrq,
    Steal,
}

impl Category {
    /// Every category, in output order.
    pub const ALL: [Category; 8] = [
        Category::User,
        Category::System,
        Category::Idle,
        Category::Nice,
        Category::Irq,
        Category::IoWait,
        Category::SoftIrq,
        Category::Steal,
    ];

    /// Field name used in rendered output.
    pub fn name(self) -> &'static str {
        match self {
            Category::User => "user",
            Category::System => "system",
            Category::Idle => "idle",
            Category::Nice => "nice",
            Category::Irq => "irq",
            Category::IoWait => "iowait",
            Category::SoftIrq => "softirq",
            Category::Steal => "steal",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Tick counters for one CPU, or for all CPUs combined.
///
/// Values are in ticks (`USER_HZ` on Linux, usually 1/100 s).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuTicks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle: Option<u64>,
    /// Linux, Darwin, BSD
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nice: Option<u64>,
    /// Linux and OpenBSD
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irq: Option<u64>,
    /// Linux and AIX
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iowait: Option<u64>,
    /// Linux only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub softirq: Option<u64>,
    /// Linux only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steal: Option<u64>,
}

impl CpuTicks {
    /// Counter value for a category, `None` if the platform does not report it.
    pub fn get(&self, category: Category) -> Option<u64> {
        match category {
            Category::User => self.user,
            Category::System => self.system,
            Category::Idle => self.idle,
            Category::Nice => self.nice,
            Category::Irq => self.irq,
            Category::IoWait => self.iowait,
            Category::SoftIrq => self.softirq,
            Category::Steal => self.steal,
        }
    }

    /// Set (or clear) the counter for a category.
    pub fn set(&mut self, category: Category, value: Option<u64>) {
        let slot = match category {
            Category::User => &mut self.user,
            Category::System => &mut self.system,
            Category::Idle => &mut self.idle,
            Category::Nice => &mut self.nice,
            Category::Irq => &mut self.irq,
            Category::IoWait => &mut self.iowait,
            Category::SoftIrq => &mut self.softirq,
            Category::Steal => &mut self.steal,
        };
        *slot = value;
    }

    /// Builder-style variant of [`CpuTicks::set`] for a present counter.
    pub fn with(mut self, category: Category, value: u64) -> Self {
        self.set(category, Some(value));
        self
    }

    /// Total accounted CPU time: the sum of every present counter.
    pub fn total(&self) -> u64 {
        Category::ALL
            .iter()
            .filter_map(|c| self.get(*c))
            .fold(0u64, |acc, v| acc.saturating_add(v))
    }

    /// Returns `true` if no category is present.
    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).is_none())
    }
}

/// Descriptive attributes of one logical CPU.
///
/// Unknown values are left at their zero value. An all-zero record means
/// the platform provided no information and is never reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreInfo {
    pub model_name: String,
    pub model_number: String,
    pub mhz: f64,
    pub physical_id: i64,
    pub core_id: i64,
}

impl CoreInfo {
    /// Returns `true` if this record carries no information.
    pub fn is_empty(&self) -> bool {
        *self == CoreInfo::default()
    }
}

/// One collection pass: totals plus the per-core breakdown.
///
/// `core_info` is either empty or has exactly one entry per core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    pub totals: CpuTicks,
    pub per_core: Vec<CpuTicks>,
    pub core_info: Vec<CoreInfo>,
}

impl SampleSet {
    /// Number of cores in this snapshot.
    pub fn core_count(&self) -> usize {
        self.per_core.len()
    }

    /// Info record for a core, if the snapshot carries per-core info.
    pub fn info_for(&self, index: usize) -> Option<&CoreInfo> {
        if self.core_info.len() == self.per_core.len() {
            self.core_info.get(index)
        } else {
            None
        }
    }
}
