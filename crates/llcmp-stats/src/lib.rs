//! Statistics extraction for `llc` diagnostic output.
//!
//! When `llc` runs with `-stats --time-passes` it writes a free-form report
//! to stderr. This crate pulls three measurements out of that report:
//!
//! - `<N> asm-printer ... - Number of machine instrs printed`
//! - `<N> pei... - Number of bytes used for stack in all functions`
//! - `Total Execution Time: <S> seconds (<W> wall clock)`
//!
//! Extraction never fails. Lines that do not match are ignored, and a
//! statistic that is never reported stays at zero.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::{Match, Regex};
use tracing::warn;

/// Measurements from a single tool run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    /// Machine instructions emitted by the asm printer.
    pub asm_instrs: u64,
    /// Stack bytes used across all functions.
    pub stack_space: u64,
    /// Total execution time reported by `--time-passes`.
    pub seconds: f64,
    /// Wall-clock time reported by `--time-passes`.
    pub wall_seconds: f64,
}

impl Stats {
    /// Parse diagnostic text into a `Stats` record.
    ///
    /// Each line is tested against every pattern independently. If a line
    /// matches but its number does not parse, a warning is logged and the
    /// field keeps its previous value. Later matches overwrite earlier ones.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut stats = Self::default();

        for line in text.lines() {
            let line = line.trim();

            if let Some(caps) = asm_instrs_pattern().captures(line)
                && let Some(value) = parse_field("AsmInstrs", line, caps.get(1))
            {
                stats.asm_instrs = value;
            }

            if let Some(caps) = stack_space_pattern().captures(line)
                && let Some(value) = parse_field("StackSpace", line, caps.get(1))
            {
                stats.stack_space = value;
            }

            if let Some(caps) = exec_time_pattern().captures(line) {
                // A bad first number skips the wall clock value too.
                let Some(seconds) = parse_field("Seconds", line, caps.get(1)) else {
                    continue;
                };
                stats.seconds = seconds;
                if let Some(wall) = parse_field("WallSeconds", line, caps.get(2)) {
                    stats.wall_seconds = wall;
                }
            }
        }

        stats
    }
}

/// Parse diagnostic text into a `Stats` record.
#[must_use]
pub fn parse_stats(text: &str) -> Stats {
    Stats::parse(text)
}

fn parse_field<T>(stat: &str, line: &str, matched: Option<Match<'_>>) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(matched) = matched else {
        warn!(stat, line, "could not locate statistic value");
        return None;
    };
    match matched.as_str().parse() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                stat,
                line,
                matched = matched.as_str(),
                error = %err,
                "could not parse statistic value"
            );
            None
        }
    }
}

fn asm_instrs_pattern() -> &'static Regex {
    ASM_INSTRS_PATTERN.get_or_init(|| {
        Regex::new(r"([0-9]+) asm-printer[^N]+Number of machine instrs printed").unwrap()
    })
}

fn stack_space_pattern() -> &'static Regex {
    STACK_SPACE_PATTERN.get_or_init(|| {
        Regex::new(r"([0-9]+) pei[^N]+Number of bytes used for stack in all functions").unwrap()
    })
}

fn exec_time_pattern() -> &'static Regex {
    EXEC_TIME_PATTERN.get_or_init(|| {
        Regex::new(r"Total Execution Time: ([0-9.]+) seconds \(([0-9.]+) wall clock\)").unwrap()
    })
}

static ASM_INSTRS_PATTERN: OnceLock<Regex> = OnceLock::new();
static STACK_SPACE_PATTERN: OnceLock<Regex> = OnceLock::new();
static EXEC_TIME_PATTERN: OnceLock<Regex> = OnceLock::new();
