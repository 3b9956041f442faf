//! Shared helpers for CLI integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Create a toolchain whose `bin/llc` logs each run and prints `report` on stderr.
pub fn fake_toolchain(report: &str) -> TempDir {
    let dir = tempfile::tempdir().expect("create toolchain dir");
    let bin = dir.path().join("bin");
    std::fs::create_dir(&bin).expect("create bin dir");
    let tool = bin.join("llc");
    let script = format!(
        "#!/bin/sh\n\
         cat > /dev/null\n\
         echo run >> \"$(dirname \"$0\")/runs.log\"\n\
         echo 'stdout is ignored'\n\
         cat >&2 <<'EOF'\n{report}EOF\n"
    );
    std::fs::write(&tool, script).expect("write fake llc");
    std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755))
        .expect("chmod fake llc");
    dir
}

/// Number of times the fake tool in `toolchain` has run.
pub fn run_count(toolchain: &Path) -> usize {
    std::fs::read_to_string(toolchain.join("bin/runs.log"))
        .map(|log| log.lines().count())
        .unwrap_or(0)
}

/// Run the `llcmp` binary with `args`.
pub fn llcmp(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_llcmp"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run llcmp")
}

pub fn report(asm_instrs: u64, stack: u64, seconds: &str, wall: &str) -> String {
    format!(
        "{asm_instrs} asm-printer               - Number of machine instrs printed\n\
         {stack} pei-prologue-epilogue       - Number of bytes used for stack in all functions\n\
         Total Execution Time: {seconds} seconds ({wall} wall clock)\n"
    )
}
