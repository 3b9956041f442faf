//! Comparison of two toolchains on one test file.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use llcmp_stats::Stats;
use tracing::debug;

use crate::error::CompareError;
use crate::metrics;
use crate::runner::{RunConfig, run_tool};

/// Options for [`compare`].
#[derive(Clone, Debug, Default)]
pub struct CompareOptions {
    /// Tool and flags to run in each toolchain.
    pub run: RunConfig,
    /// Full passes over both toolchains whose results are discarded.
    pub warmup_runs: usize,
    /// Run the two toolchains concurrently.
    pub parallel: bool,
}

impl CompareOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_run_config(mut self, run: RunConfig) -> Self {
        self.run = run;
        self
    }

    #[must_use]
    pub const fn with_warmup_runs(mut self, warmup_runs: usize) -> Self {
        self.warmup_runs = warmup_runs;
        self
    }

    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Statistics of both toolchains for one test file.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Base name of the test file.
    pub test_name: String,
    /// Statistics for the first and second toolchain.
    pub stats: [Stats; 2],
}

/// Tab-separated row: test name, then four fields per toolchain.
impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.test_name)?;
        for stats in &self.stats {
            write!(
                f,
                "\t{}\t{}\t{}\t{}",
                stats.asm_instrs, stats.stack_space, stats.seconds, stats.wall_seconds
            )?;
        }
        Ok(())
    }
}

/// Run both toolchains on `test` and collect their statistics.
///
/// # Errors
///
/// The first tool failure from either toolchain, tagged with which one.
pub fn compare(
    t1: &Path,
    t2: &Path,
    test: &Path,
    options: &CompareOptions,
) -> Result<Comparison, CompareError> {
    for pass in 0..options.warmup_runs {
        debug!(pass, "warm-up run");
        run_pass(t1, t2, test, options)?;
    }
    let stats = run_pass(t1, t2, test, options)?;

    Ok(Comparison {
        test_name: base_name(test),
        stats,
    })
}

fn run_pass(
    t1: &Path,
    t2: &Path,
    test: &Path,
    options: &CompareOptions,
) -> Result<[Stats; 2], CompareError> {
    if options.parallel {
        let (first, second) = rayon::join(
            || run_and_parse("t1", t1, test, &options.run),
            || run_and_parse("t2", t2, test, &options.run),
        );
        Ok([first?, second?])
    } else {
        let first = run_and_parse("t1", t1, test, &options.run)?;
        let second = run_and_parse("t2", t2, test, &options.run)?;
        Ok([first, second])
    }
}

/// Run one toolchain and parse its diagnostics.
///
/// `which` labels the toolchain in errors, logs and metrics.
///
/// # Errors
///
/// Any [`crate::RunError`] from the tool, wrapped with its context.
pub fn run_and_parse(
    which: &'static str,
    toolchain: &Path,
    test: &Path,
    config: &RunConfig,
) -> Result<Stats, CompareError> {
    let start = Instant::now();
    let stderr = run_tool(config, toolchain, test).map_err(|source| CompareError::Toolchain {
        which,
        toolchain: toolchain.to_path_buf(),
        test: test.to_path_buf(),
        source,
    })?;
    metrics::record_run(which, start.elapsed());

    let stats = Stats::parse(&stderr);
    metrics::record_stats(which, &stats);
    debug!(
        toolchain = which,
        asm_instrs = stats.asm_instrs,
        stack_space = stats.stack_space,
        seconds = stats.seconds,
        wall_seconds = stats.wall_seconds,
        "parsed statistics"
    );
    Ok(stats)
}

fn base_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
