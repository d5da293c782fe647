//! Linux CPU counters from `/proc/stat` and `/proc/cpuinfo`.
//!
//! `/proc/stat` starts with an aggregate `cpu` line followed by one
//! `cpuN` line per online CPU:
//!
//! ```text
//! cpu  user nice system idle iowait irq softirq steal guest guest_nice
//! cpu0 ...
//! ```
//!
//! Older kernels print fewer columns; columns that are not printed are
//! reported as absent rather than zero. `guest` time is already included in
//! `user`, so the guest columns are ignored.

use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::collector::Collector;
use crate::error::CollectorError;
use crate::sample::{Category, CoreInfo, CpuTicks, SampleSet};

/// Default procfs mount point.
pub const DEFAULT_PROCFS_ROOT: &str = "/proc";

/// Column order of a `/proc/stat` cpu line, after the label.
const STAT_COLUMNS: [Category; 8] = [
    Category::User,
    Category::Nice,
    Category::System,
    Category::Idle,
    Category::IoWait,
    Category::Irq,
    Category::SoftIrq,
    Category::Steal,
];

/// Collector reading the Linux procfs counter files.
#[derive(Debug, Clone)]
pub struct ProcfsCollector {
    root: PathBuf,
}

impl ProcfsCollector {
    /// Create a collector reading from the given procfs root.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn stat_path(&self) -> PathBuf {
        self.root.join("stat")
    }

    fn cpuinfo_path(&self) -> PathBuf {
        self.root.join("cpuinfo")
    }
}

impl Default for ProcfsCollector {
    fn default() -> Self {
        Self::new(DEFAULT_PROCFS_ROOT)
    }
}

impl Collector for ProcfsCollector {
    fn collect(&self) -> Result<SampleSet, CollectorError> {
        let stat_path = self.stat_path();
        let content = std::fs::read_to_string(&stat_path).map_err(|e| CollectorError::ReadError {
            path: stat_path.display().to_string(),
            source: e,
        })?;
        let (totals, per_core) = parse_stat(&content, &stat_path)?;

        // cpuinfo is descriptive only; a missing or mismatched file means
        // "no info", not a failed collection.
        let cpuinfo_path = self.cpuinfo_path();
        let core_info = match std::fs::read_to_string(&cpuinfo_path) {
            Ok(content) => {
                let info = parse_cpuinfo(&content);
                if info.len() == per_core.len() {
                    info
                } else {
                    debug!(
                        cpuinfo = info.len(),
                        stat = per_core.len(),
                        "cpuinfo processor count does not match /proc/stat, skipping core info"
                    );
                    Vec::new()
                }
            }
            Err(e) => {
                debug!(path = %cpuinfo_path.display(), error = %e, "cpuinfo not readable");
                Vec::new()
            }
        };

        trace!(cores = per_core.len(), "Collected procfs CPU sample");

        Ok(SampleSet {
            totals,
            per_core,
            core_info,
        })
    }
}

/// Parse `/proc/stat` content into the aggregate and per-core samples.
///
/// Per-core samples are ordered by CPU number.
pub fn parse_stat(content: &str, source_path: &Path) -> Result<(CpuTicks, Vec<CpuTicks>), CollectorError> {
    let mut totals = None;
    let mut cores: Vec<(u32, CpuTicks)> = Vec::new();

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let Some(label) = parts.next() else {
            continue;
        };
        let Some(suffix) = label.strip_prefix("cpu") else {
            continue;
        };

        if suffix.is_empty() {
            totals = Some(parse_cpu_columns(parts, source_path)?);
        } else if let Ok(index) = suffix.parse::<u32>() {
            cores.push((index, parse_cpu_columns(parts, source_path)?));
        }
    }

    let totals = totals.ok_or_else(|| CollectorError::ParseError {
        path: source_path.display().to_string(),
        detail: "no aggregate cpu line found".to_string(),
    })?;

    cores.sort_by_key(|(index, _)| *index);
    Ok((totals, cores.into_iter().map(|(_, ticks)| ticks).collect()))
}

fn parse_cpu_columns<'a>(
    columns: impl Iterator<Item = &'a str>,
    source_path: &Path,
) -> Result<CpuTicks, CollectorError> {
    let mut ticks = CpuTicks::default();
    for (category, raw) in STAT_COLUMNS.iter().zip(columns) {
        let value = raw.parse::<u64>().map_err(|_| CollectorError::ParseError {
            path: source_path.display().to_string(),
            detail: format!("expected integer tick count for {category}, got '{raw}'"),
        })?;
        ticks.set(*category, Some(value));
    }
    Ok(ticks)
}

/// Parse `/proc/cpuinfo` content into one record per processor block.
///
/// Only blocks opened by a `processor` line count; trailing board blocks
/// (`Hardware`, `Revision`, `Serial` on ARM) are ignored. Unknown or
/// unparsable values keep their zero value.
pub fn parse_cpuinfo(content: &str) -> Vec<CoreInfo> {
    let mut cores = Vec::new();
    let mut current: Option<CoreInfo> = None;

    for line in content.lines() {
        if line.trim().is_empty() {
            if let Some(info) = current.take() {
                cores.push(info);
            }
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if key == "processor" {
            if let Some(info) = current.replace(CoreInfo::default()) {
                cores.push(info);
            }
            continue;
        }

        let Some(info) = current.as_mut() else {
            continue;
        };
        match key {
            "model name" => info.model_name = value.to_string(),
            "model" => info.model_number = value.to_string(),
            "cpu MHz" => info.mhz = value.parse().unwrap_or_default(),
            "physical id" => info.physical_id = value.parse().unwrap_or_default(),
            "core id" => info.core_id = value.parse().unwrap_or_default(),
            _ => {}
        }
    }

    if let Some(info) = current {
        cores.push(info);
    }
    cores
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_STAT: &str = "\
cpu  4705 356 584 3699176 23060 0 127 0 0 0
cpu0 1393 280 290 924743 6043 0 120 0 0 0
cpu1 3312 76 294 2774433 17017 0 7 0 0 0
intr 114930548 113199788 3 0 5 263 0 4 [... lots more numbers ...]
ctxt 1990473
btime 1062191376
processes 2915
";

    const SAMPLE_CPUINFO: &str = "\
processor\t: 0
vendor_id\t: GenuineIntel
cpu family\t: 6
model\t\t: 158
model name\t: Intel(R) Core(TM) i7-8750H CPU @ 2.20GHz
cpu MHz\t\t: 2207.998
physical id\t: 0
core id\t\t: 0

processor\t: 1
vendor_id\t: GenuineIntel
cpu family\t: 6
model\t\t: 158
model name\t: Intel(R) Core(TM) i7-8750H CPU @ 2.20GHz
cpu MHz\t\t: 2208.001
physical id\t: 0
core id\t\t: 1
";

    #[test]
    fn test_parse_stat() {
        let (totals, cores) = parse_stat(SAMPLE_STAT, Path::new("/proc/stat")).unwrap();
        assert_eq!(totals.user, Some(4705));
        assert_eq!(totals.nice, Some(356));
        assert_eq!(totals.system, Some(584));
        assert_eq!(totals.idle, Some(3699176));
        assert_eq!(totals.iowait, Some(23060));
        assert_eq!(totals.softirq, Some(127));
        assert_eq!(totals.steal, Some(0));
        assert_eq!(cores.len(), 2);
        assert_eq!(cores[1].user, Some(3312));
    }

    #[test]
    fn test_parse_stat_short_lines_leave_absent() {
        let content = "cpu 10 20 30 40\ncpu0 10 20 30 40\n";
        let (totals, _) = parse_stat(content, Path::new("/proc/stat")).unwrap();
        assert_eq!(totals.idle, Some(40));
        assert_eq!(totals.iowait, None);
        assert_eq!(totals.steal, None);
    }

    #[test]
    fn test_parse_stat_orders_cores() {
        let content = "cpu 1 1 1 1\ncpu2 3 0 0 0\ncpu0 1 0 0 0\ncpu1 2 0 0 0\n";
        let (_, cores) = parse_stat(content, Path::new("/proc/stat")).unwrap();
        let users: Vec<Option<u64>> = cores.iter().map(|c| c.user).collect();
        assert_eq!(users, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_parse_stat_missing_total() {
        let result = parse_stat("cpu0 1 2 3 4\n", Path::new("/proc/stat"));
        assert!(matches!(result, Err(CollectorError::ParseError { .. })));
    }

    #[test]
    fn test_parse_stat_invalid_number() {
        let result = parse_stat("cpu 1 two 3 4\n", Path::new("/proc/stat"));
        assert!(matches!(result, Err(CollectorError::ParseError { detail, .. }) if detail.contains("nice")));
    }

    #[test]
    fn test_parse_cpuinfo() {
        let cores = parse_cpuinfo(SAMPLE_CPUINFO);
        assert_eq!(cores.len(), 2);
        assert_eq!(cores[0].model_name, "Intel(R) Core(TM) i7-8750H CPU @ 2.20GHz");
        assert_eq!(cores[0].model_number, "158");
        assert!((cores[0].mhz - 2207.998).abs() < 1e-9);
        assert_eq!(cores[1].core_id, 1);
        assert_eq!(cores[1].physical_id, 0);
    }

    #[test]
    fn test_parse_cpuinfo_without_blank_separators() {
        let content = "processor : 0\nmodel name : A\nprocessor : 1\nmodel name : B\n";
        let cores = parse_cpuinfo(content);
        assert_eq!(cores.len(), 2);
        assert_eq!(cores[1].model_name, "B");
    }

    #[test]
    fn test_parse_cpuinfo_ignores_board_trailer() {
        let content = "\
processor\t: 0
model name\t: ARMv7 Processor rev 4 (v7l)
BogoMIPS\t: 38.40

processor\t: 1
model name\t: ARMv7 Processor rev 4 (v7l)
BogoMIPS\t: 38.40

Hardware\t: BCM2835
Revision\t: a02082
Serial\t\t: 00000000b1a2c3d4
Model\t\t: Raspberry Pi 3 Model B Rev 1.2
";
        let cores = parse_cpuinfo(content);
        assert_eq!(cores.len(), 2);
        assert_eq!(cores[1].model_name, "ARMv7 Processor rev 4 (v7l)");

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("stat"),
            "cpu  20 0 20 160\ncpu0 10 0 10 80\ncpu1 10 0 10 80\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("cpuinfo"), content).unwrap();

        let sample = ProcfsCollector::new(dir.path()).collect().unwrap();
        assert_eq!(sample.core_info.len(), 2);
    }

    #[test]
    fn test_collect_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stat"), SAMPLE_STAT).unwrap();
        std::fs::write(dir.path().join("cpuinfo"), SAMPLE_CPUINFO).unwrap();

        let sample = ProcfsCollector::new(dir.path()).collect().unwrap();
        assert_eq!(sample.core_count(), 2);
        assert_eq!(sample.core_info.len(), 2);
        assert_eq!(sample.core_info[1].core_id, 1);
    }

    #[test]
    fn test_collect_mismatched_cpuinfo_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stat"), SAMPLE_STAT).unwrap();
        std::fs::write(dir.path().join("cpuinfo"), "processor : 0\nmodel name : A\n").unwrap();

        let sample = ProcfsCollector::new(dir.path()).collect().unwrap();
        assert_eq!(sample.core_count(), 2);
        assert!(sample.core_info.is_empty());
    }

    #[test]
    fn test_collect_missing_stat() {
        let dir = tempfile::tempdir().unwrap();
        let result = ProcfsCollector::new(dir.path()).collect();
        assert!(matches!(result, Err(CollectorError::ReadError { .. })));
    }
}
