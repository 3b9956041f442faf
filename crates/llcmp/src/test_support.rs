//! Fake toolchains for unit tests.

use std::os::unix::fs::PermissionsExt;

use tempfile::TempDir;

/// A report in the shape `llc -stats --time-passes` prints.
pub const REPORT: &str = "\
===-------------------------------------------------------------------------===
                          ... Statistics Collected ...
===-------------------------------------------------------------------------===

1234 asm-printer               - Number of machine instrs printed
  56 pei-prologue-epilogue     - Number of bytes used for stack in all functions
===-------------------------------------------------------------------------===
  Total Execution Time: 0.0421 seconds (0.0450 wall clock)
";

/// Create a toolchain directory whose `bin/llc` runs `body` under `/bin/sh`.
pub fn fake_toolchain(body: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("bin");
    std::fs::create_dir(&bin).unwrap();
    let tool = bin.join("llc");
    std::fs::write(&tool, format!("#!/bin/sh\n{body}")).unwrap();
    std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
    dir
}
