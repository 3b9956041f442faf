//! llcmp - compare `llc` statistics across two toolchain builds.
//!
//! Runs `<toolchain>/bin/llc -stats --time-passes` from each toolchain on the
//! same bitcode file, extracts instruction count, stack usage and timing from
//! the diagnostics, and renders a tab-separated comparison row.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use llcmp::{CompareOptions, compare};
//!
//! let row = compare(
//!     Path::new("/opt/llvm-a"),
//!     Path::new("/opt/llvm-b"),
//!     Path::new("test.bc"),
//!     &CompareOptions::default(),
//! )?;
//! println!("{row}");
//! ```

pub use llcmp_stats::{Stats, parse_stats};

mod compare;
mod error;
pub mod metrics;
mod runner;

#[cfg(all(test, unix))]
mod test_support;

pub use compare::{CompareOptions, Comparison, compare, run_and_parse};
pub use error::{CompareError, Result, RunError};
pub use runner::{DEFAULT_TOOL, DEFAULT_TOOL_ARGS, RunConfig, run_tool};
