//! Integration tests for the CPU sampling pipeline.
//!
//! These tests drive a `Monitor` through procfs fixture directories and
//! scripted collectors, checking the rendered output.

use cpustat_telemetry::{
    Category, CpuTicks, MetricOpts, MockCollector, Monitor, ProcfsCollector, SampleSet,
    TelemetryError,
};
use serde_json::json;

fn write_stat(dir: &std::path::Path, content: &str) {
    std::fs::write(dir.join("stat"), content).expect("write stat fixture");
}

/// Test the documented single-core example end to end.
#[test]
fn test_single_core_window() {
    let previous = SampleSet {
        totals: CpuTicks::default()
            .with(Category::User, 100)
            .with(Category::System, 50)
            .with(Category::Idle, 800),
        per_core: vec![CpuTicks::default()],
        core_info: Vec::new(),
    };
    let current = SampleSet {
        totals: CpuTicks::default()
            .with(Category::User, 110)
            .with(Category::System, 55)
            .with(Category::Idle, 830),
        per_core: vec![CpuTicks::default()],
        core_info: Vec::new(),
    };
    let mut monitor = Monitor::new(MockCollector::with_samples([previous, current]));
    monitor.fetch_totals().unwrap();

    let opts = MetricOpts {
        ticks: false,
        percentages: true,
        normalized_percentages: false,
        ..MetricOpts::default()
    };
    let fields = monitor.fetch_totals().unwrap().format(&opts).unwrap();

    assert_eq!(
        serde_json::to_value(&fields).unwrap(),
        json!({
            "total": { "pct": 0.33 },
            "user": { "pct": 0.22 },
            "system": { "pct": 0.11 },
            "idle": { "pct": 0.67 },
        })
    );
}

/// Test procfs collection across samples where a core comes online.
#[test]
fn test_procfs_core_hotplug() {
    let dir = tempfile::tempdir().unwrap();
    write_stat(
        dir.path(),
        "cpu  200 0 100 1700 0 0 0 0 0 0\n\
         cpu0 100 0 50 850 0 0 0 0 0 0\n\
         cpu1 100 0 50 850 0 0 0 0 0 0\n",
    );

    let mut monitor = Monitor::new(ProcfsCollector::new(dir.path()));
    assert_eq!(monitor.fetch_per_core().unwrap().len(), 2);

    write_stat(
        dir.path(),
        "cpu  300 0 150 1850 0 0 0 0 0 0\n\
         cpu0 140 0 60 900 0 0 0 0 0 0\n\
         cpu1 130 0 70 900 0 0 0 0 0 0\n\
         cpu2 30 0 20 50 0 0 0 0 0 0\n",
    );

    let cores = monitor.fetch_per_core().unwrap();
    assert_eq!(cores.len(), 3);
    assert!(cores[2].previous().is_empty());

    let opts = MetricOpts::all();
    let fields = cores[2].format(&opts).unwrap();
    assert_eq!(fields.get("user.pct"), Some(&json!(0.3)));
    assert_eq!(fields.get("user.ticks"), Some(&json!(30)));
    assert_eq!(fields.get("total.pct"), Some(&json!(0.5)));

    // cpu0: window = 40 + 10 + 50 = 100
    let fields = cores[0].format(&opts).unwrap();
    assert_eq!(fields.get("user.norm.pct"), Some(&json!(0.4)));
    assert_eq!(fields.get("idle.pct"), Some(&json!(0.5)));
    assert!(!fields.contains("model_name"));
}

/// Test that a counter reset surfaces as a stale sample and then recovers.
#[test]
fn test_counter_reset_recovers() {
    let dir = tempfile::tempdir().unwrap();
    write_stat(dir.path(), "cpu 500 0 500 9000 10 0 0 0\n");

    let mut monitor = Monitor::new(ProcfsCollector::new(dir.path()));
    monitor.fetch_totals().unwrap();

    write_stat(dir.path(), "cpu 5 0 5 90 0 0 0 0\n");
    let after_reset = monitor.fetch_totals().unwrap();
    assert!(matches!(
        after_reset.format(&MetricOpts::default()),
        Err(TelemetryError::StaleSample { .. })
    ));

    write_stat(dir.path(), "cpu 15 0 5 170 10 0 0 0\n");
    let fields = monitor.fetch_totals().unwrap().format(&MetricOpts::default()).unwrap();
    // window = 10 + 80 + 10; idle and iowait both count as idle
    assert_eq!(fields.get("total.pct"), Some(&json!(0.1)));
    assert_eq!(fields.get("iowait.pct"), Some(&json!(0.1)));
}

/// Test that a platform without some counters never reports them.
#[test]
fn test_partial_platform_omits_categories() {
    let dir = tempfile::tempdir().unwrap();
    write_stat(dir.path(), "cpu 10 0 10 80\ncpu0 10 0 10 80\n");

    let mut monitor = Monitor::new(ProcfsCollector::new(dir.path()));
    monitor.fetch_totals().unwrap();

    write_stat(dir.path(), "cpu 20 0 20 160\ncpu0 20 0 20 160\n");
    let fields = monitor.fetch_totals().unwrap().format(&MetricOpts::all()).unwrap();

    assert!(fields.contains("nice.ticks"));
    for absent in ["iowait", "irq", "softirq", "steal"] {
        assert!(!fields.contains(absent));
    }
}
