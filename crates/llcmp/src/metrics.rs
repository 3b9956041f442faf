//! Metrics collection and reporting using metrics-rs.
//!
//! Each toolchain run records its duration and the statistics extracted
//! from it, labelled by toolchain (`t1`/`t2`). With `--metrics` the
//! in-memory [`CliRecorder`] is installed and summarised on stderr.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use llcmp_stats::Stats;
use metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit, counter,
    describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use parking_lot::RwLock;

// ============================================================================
// Metric descriptions
// ============================================================================

/// Initialize metric descriptions.
///
/// Call this once at startup to register metric descriptions.
pub fn init() {
    describe_counter!(
        "llcmp_runs_total",
        Unit::Count,
        "Tool runs, including warm-up runs"
    );
    describe_histogram!(
        "llcmp_run_duration_seconds",
        Unit::Seconds,
        "Host-measured duration of a tool run"
    );
    describe_gauge!(
        "llcmp_asm_instrs",
        Unit::Count,
        "Machine instructions printed in the last run"
    );
    describe_gauge!(
        "llcmp_stack_bytes",
        Unit::Bytes,
        "Stack bytes used across all functions in the last run"
    );
    describe_gauge!(
        "llcmp_exec_seconds",
        Unit::Seconds,
        "Total execution time reported by the tool"
    );
    describe_gauge!(
        "llcmp_wall_seconds",
        Unit::Seconds,
        "Wall-clock time reported by the tool"
    );
}

// ============================================================================
// Metric recording functions
// ============================================================================

/// Record one completed tool run.
pub fn record_run(toolchain: &str, elapsed: Duration) {
    let labels = [("toolchain", toolchain.to_string())];
    counter!("llcmp_runs_total", &labels).increment(1);
    histogram!("llcmp_run_duration_seconds", &labels).record(elapsed.as_secs_f64());
}

/// Record the statistics extracted from a run.
#[allow(clippy::cast_precision_loss)]
pub fn record_stats(toolchain: &str, stats: &Stats) {
    let labels = [("toolchain", toolchain.to_string())];
    gauge!("llcmp_asm_instrs", &labels).set(stats.asm_instrs as f64);
    gauge!("llcmp_stack_bytes", &labels).set(stats.stack_space as f64);
    gauge!("llcmp_exec_seconds", &labels).set(stats.seconds);
    gauge!("llcmp_wall_seconds", &labels).set(stats.wall_seconds);
}

// ============================================================================
// CLI Recorder for terminal output
// ============================================================================

#[derive(Default)]
struct CounterStorage {
    values: RwLock<HashMap<String, u64>>,
}

#[derive(Default)]
struct GaugeStorage {
    values: RwLock<HashMap<String, f64>>,
}

#[derive(Default)]
struct HistogramStorage {
    values: RwLock<HashMap<String, Vec<f64>>>,
}

struct CliCounter {
    key: String,
    storage: Arc<CounterStorage>,
}

impl metrics::CounterFn for CliCounter {
    fn increment(&self, value: u64) {
        let mut values = self.storage.values.write();
        *values.entry(self.key.clone()).or_insert(0) += value;
    }

    fn absolute(&self, value: u64) {
        self.storage.values.write().insert(self.key.clone(), value);
    }
}

struct CliGauge {
    key: String,
    storage: Arc<GaugeStorage>,
}

impl metrics::GaugeFn for CliGauge {
    fn increment(&self, value: f64) {
        let mut values = self.storage.values.write();
        *values.entry(self.key.clone()).or_insert(0.0) += value;
    }

    fn decrement(&self, value: f64) {
        let mut values = self.storage.values.write();
        *values.entry(self.key.clone()).or_insert(0.0) -= value;
    }

    fn set(&self, value: f64) {
        self.storage.values.write().insert(self.key.clone(), value);
    }
}

struct CliHistogram {
    key: String,
    storage: Arc<HistogramStorage>,
}

impl metrics::HistogramFn for CliHistogram {
    fn record(&self, value: f64) {
        let mut values = self.storage.values.write();
        values.entry(self.key.clone()).or_default().push(value);
    }
}

/// Recorder that keeps metrics in memory for a summary at exit.
#[derive(Default)]
pub struct CliRecorder {
    counters: Arc<CounterStorage>,
    gauges: Arc<GaugeStorage>,
    histograms: Arc<HistogramStorage>,
}

impl CliRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install this recorder as the global metrics recorder.
    ///
    /// Returns `None` if a global recorder is already installed.
    #[must_use]
    pub fn install(self) -> Option<CliRecorderHandle> {
        let handle = self.handle();
        metrics::set_global_recorder(self).ok()?;
        Some(handle)
    }

    fn handle(&self) -> CliRecorderHandle {
        CliRecorderHandle {
            counters: Arc::clone(&self.counters),
            gauges: Arc::clone(&self.gauges),
            histograms: Arc::clone(&self.histograms),
        }
    }
}

fn key_to_string(key: &Key) -> String {
    let labels: Vec<String> = key
        .labels()
        .map(|l| format!("{}={}", l.key(), l.value()))
        .collect();
    if labels.is_empty() {
        key.name().to_string()
    } else {
        format!("{}{{{}}}", key.name(), labels.join(","))
    }
}

impl Recorder for CliRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(CliCounter {
            key: key_to_string(key),
            storage: Arc::clone(&self.counters),
        }))
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(Arc::new(CliGauge {
            key: key_to_string(key),
            storage: Arc::clone(&self.gauges),
        }))
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(CliHistogram {
            key: key_to_string(key),
            storage: Arc::clone(&self.histograms),
        }))
    }
}

/// Handle for reading metrics after the recorder is installed.
pub struct CliRecorderHandle {
    counters: Arc<CounterStorage>,
    gauges: Arc<GaugeStorage>,
    histograms: Arc<HistogramStorage>,
}

impl CliRecorderHandle {
    #[must_use]
    pub fn get_counter(&self, key: &str) -> Option<u64> {
        self.counters.values.read().get(key).copied()
    }

    #[must_use]
    pub fn get_gauge(&self, key: &str) -> Option<f64> {
        self.gauges.values.read().get(key).copied()
    }

    #[must_use]
    pub fn get_histogram(&self, key: &str) -> Option<Vec<f64>> {
        self.histograms.values.read().get(key).cloned()
    }

    /// Render all collected metrics as a human-readable summary.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn summary(&self) -> String {
        use std::fmt::Write;

        let counters = self.counters.values.read();
        let gauges = self.gauges.values.read();
        let histograms = self.histograms.values.read();

        if counters.is_empty() && gauges.is_empty() && histograms.is_empty() {
            return "No metrics collected.\n".to_string();
        }

        let mut out = String::from("\n## Metrics Summary\n\n");

        if !counters.is_empty() {
            out.push_str("### Counters\n");
            for (key, value) in sorted(&counters) {
                let _ = writeln!(out, "  {key}: {value}");
            }
            out.push('\n');
        }

        if !gauges.is_empty() {
            out.push_str("### Gauges\n");
            for (key, value) in sorted(&gauges) {
                let _ = writeln!(out, "  {key}: {value:.6}");
            }
            out.push('\n');
        }

        if !histograms.is_empty() {
            out.push_str("### Histograms\n");
            for (key, values) in sorted(&histograms) {
                if values.is_empty() {
                    continue;
                }
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let avg = values.iter().sum::<f64>() / values.len() as f64;
                let _ = writeln!(
                    out,
                    "  {key}: count={}, min={min:.6}, max={max:.6}, avg={avg:.6}",
                    values.len()
                );
            }
            out.push('\n');
        }

        out
    }

    /// Print the summary to stderr, keeping stdout for the comparison row.
    pub fn print_summary(&self) {
        eprint!("{}", self.summary());
    }
}

fn sorted<V>(map: &HashMap<String, V>) -> Vec<(&String, &V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}
