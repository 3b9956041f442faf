//! CLI definitions and argument handling.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser};
use llcmp::DEFAULT_TOOL;

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "llcmp")]
#[command(about = "Compare llc instruction count, stack usage and timing between two toolchains")]
#[command(version)]
pub struct Cli {
    /// Path to the first toolchain
    #[arg(long, value_name = "PATH")]
    pub t1: Option<PathBuf>,

    /// Path to the second toolchain
    #[arg(long, value_name = "PATH")]
    pub t2: Option<PathBuf>,

    /// Path to the test bitcode file
    #[arg(long, value_name = "FILE")]
    pub test: Option<PathBuf>,

    /// Code generator to run from <toolchain>/bin
    #[arg(long, default_value = DEFAULT_TOOL)]
    pub tool: String,

    /// Comparison passes to run and discard before the measured one
    #[arg(long, default_value = "0")]
    pub warmup_runs: usize,

    /// Run both toolchains concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Show metrics summary after execution
    #[arg(long)]
    pub metrics: bool,

    /// Enable verbose output (debug logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, conflicts_with = "verbose")]
    pub silent: bool,
}

/// Toolchains and test file, all present.
#[derive(Debug)]
pub struct Inputs<'a> {
    pub t1: &'a Path,
    pub t2: &'a Path,
    pub test: &'a Path,
}

impl Cli {
    /// Check the required flags in the order `-test`, `-t1`, `-t2`.
    ///
    /// Returns the first missing flag on failure. Empty values count as missing.
    pub fn inputs(&self) -> Result<Inputs<'_>, &'static str> {
        let test = require("-test", self.test.as_deref())?;
        let t1 = require("-t1", self.t1.as_deref())?;
        let t2 = require("-t2", self.t2.as_deref())?;
        Ok(Inputs { t1, t2, test })
    }

    /// Help text listing every flag and its default.
    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }
}

fn require<'a>(flag: &'static str, value: Option<&'a Path>) -> Result<&'a Path, &'static str> {
    value.filter(|p| !p.as_os_str().is_empty()).ok_or(flag)
}

/// Rewrite single-dash long flags (`-t1`, `-test=x`) to their `--` form.
///
/// Only names of known long flags longer than one character are rewritten,
/// so short flags and their clusters (`-v`, `-vs`) pass through untouched.
/// Nothing after a bare `--` is rewritten.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let command = Cli::command();
    let mut longs: Vec<&str> = command.get_arguments().filter_map(|a| a.get_long()).collect();
    longs.extend(["help", "version"]);

    let mut rest_is_positional = false;
    args.into_iter()
        .map(|arg| {
            if rest_is_positional {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                rest_is_positional = true;
                return arg;
            }
            let Some(flag) = text.strip_prefix('-').filter(|f| !f.starts_with('-')) else {
                return arg;
            };
            let name = flag.split_once('=').map_or(flag, |(name, _)| name);
            if name.len() > 1 && longs.contains(&name) {
                OsString::from(format!("-{text}"))
            } else {
                arg
            }
        })
        .collect()
}
