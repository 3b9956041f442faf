//! Running the code generator of a toolchain on a test file.
//!
//! The tool reads bitcode on stdin and writes its statistics report to
//! stderr. Stdin is fed and stdout drained on scoped threads while stderr is
//! captured on the calling thread, so a child that fills one pipe never
//! blocks the others. All three finish before the child is waited on.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::Instant;

use tracing::debug;

use crate::error::{Result, RunError};

/// Default code generator, looked up as `<toolchain>/bin/llc`.
pub const DEFAULT_TOOL: &str = "llc";

/// Flags passed to the code generator.
pub const DEFAULT_TOOL_ARGS: &[&str] = &[
    "-O0",
    "-stats",
    "--time-passes",
    "-relocation-model=pic",
    "-O0",
    "-asm-verbose=false",
];

/// Which executable to run inside a toolchain and with what flags.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Executable name under `<toolchain>/bin`.
    pub tool: String,
    /// Arguments passed to the executable.
    pub args: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
            args: DEFAULT_TOOL_ARGS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl RunConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Path of the executable inside `toolchain`.
    #[must_use]
    pub fn tool_path(&self, toolchain: &Path) -> PathBuf {
        toolchain.join("bin").join(&self.tool)
    }
}

/// Run the configured tool from `toolchain` with `test` on stdin.
///
/// Returns everything the tool wrote to stderr. Stdout is discarded.
///
/// # Errors
///
/// Fails if the test file cannot be read, the tool cannot be started,
/// a pipe cannot be serviced, or the tool exits unsuccessfully.
pub fn run_tool(config: &RunConfig, toolchain: &Path, test: &Path) -> Result<String> {
    let input = std::fs::read(test).map_err(|source| RunError::Read {
        path: test.to_path_buf(),
        source,
    })?;

    let tool = config.tool_path(toolchain);
    let start = Instant::now();

    let mut child = Command::new(&tool)
        .args(&config.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| RunError::ProcessStart {
            tool: tool.clone(),
            source,
        })?;

    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let streams = thread::scope(|scope| {
        let input = &input;
        let writer = scope.spawn(move || feed_stdin(stdin, input));
        let drainer = scope.spawn(move || drain_stdout(stdout));
        let captured = capture_stderr(stderr);

        let written = writer.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
        let drained = drainer.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
        written.and(drained).and(captured)
    });

    let stderr = match streams {
        Ok(bytes) => bytes,
        Err(err) => {
            reap(&mut child);
            return Err(err);
        }
    };

    let status = child.wait().map_err(|source| RunError::Wait {
        tool: tool.clone(),
        source,
    })?;
    debug!(
        tool = %tool.display(),
        test = %test.display(),
        elapsed_ms = start.elapsed().as_millis(),
        %status,
        "tool finished"
    );
    if !status.success() {
        return Err(RunError::ProcessExit { tool, status });
    }

    Ok(String::from_utf8_lossy(&stderr).into_owned())
}

fn feed_stdin(stdin: Option<ChildStdin>, input: &[u8]) -> Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(input) {
        // The tool may exit before consuming all input; its exit status decides.
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(source) => Err(RunError::StreamWrite { source }),
        Ok(()) => Ok(()),
    }
}

fn drain_stdout(stdout: Option<ChildStdout>) -> Result<()> {
    let Some(mut stdout) = stdout else {
        return Ok(());
    };
    io::copy(&mut stdout, &mut io::sink())
        .map(|_| ())
        .map_err(|source| RunError::StreamRead {
            stream: "stdout",
            source,
        })
}

fn capture_stderr(stderr: Option<ChildStderr>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut stderr) = stderr {
        stderr
            .read_to_end(&mut buf)
            .map_err(|source| RunError::StreamRead {
                stream: "stderr",
                source,
            })?;
    }
    Ok(buf)
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_support::{REPORT, fake_toolchain};

    #[test]
    fn test_tool_path() {
        let config = RunConfig::default();
        assert_eq!(
            config.tool_path(Path::new("/opt/llvm")),
            PathBuf::from("/opt/llvm/bin/llc")
        );
        let config = config.with_tool("llc-18");
        assert_eq!(
            config.tool_path(Path::new("/opt/llvm")),
            PathBuf::from("/opt/llvm/bin/llc-18")
        );
    }

    #[test]
    fn test_default_args() {
        let config = RunConfig::new();
        assert_eq!(
            config.args,
            [
                "-O0",
                "-stats",
                "--time-passes",
                "-relocation-model=pic",
                "-O0",
                "-asm-verbose=false"
            ]
        );
    }

    #[test]
    fn test_returns_stderr_only() {
        let toolchain = fake_toolchain(&format!(
            "cat > /dev/null\necho 'not a statistic'\ncat >&2 <<'EOF'\n{REPORT}EOF\n"
        ));
        let test = toolchain.path().join("input.bc");
        std::fs::write(&test, b"BC\xC0\xDE").unwrap();

        let stderr = run_tool(&RunConfig::default(), toolchain.path(), &test).unwrap();
        assert_eq!(stderr, REPORT);
    }

    #[test]
    fn test_feeds_input_and_flags() {
        let toolchain = fake_toolchain(
            "dir=$(dirname \"$0\")\ncat > \"$dir/stdin.bin\"\nprintf '%s ' \"$@\" > \"$dir/args.txt\"\n",
        );
        let test = toolchain.path().join("input.bc");
        let payload: Vec<u8> = (0..=255u8).cycle().take(100_000).collect();
        std::fs::write(&test, &payload).unwrap();

        run_tool(&RunConfig::default(), toolchain.path(), &test).unwrap();

        let seen = std::fs::read(toolchain.path().join("bin/stdin.bin")).unwrap();
        assert_eq!(seen, payload);
        let args = std::fs::read_to_string(toolchain.path().join("bin/args.txt")).unwrap();
        assert_eq!(
            args.trim(),
            "-O0 -stats --time-passes -relocation-model=pic -O0 -asm-verbose=false"
        );
    }

    #[test]
    fn test_full_pipes_do_not_deadlock() {
        // Fill stderr and stdout well past the pipe buffer before reading stdin.
        let toolchain = fake_toolchain(
            "seq 200000 >&2\n\
             seq 200000\n\
             cat > /dev/null\n\
             echo '7 asm-printer - Number of machine instrs printed' >&2\n",
        );
        let test = toolchain.path().join("input.bc");
        std::fs::write(&test, vec![0u8; 1 << 20]).unwrap();

        let stderr = run_tool(&RunConfig::default(), toolchain.path(), &test).unwrap();
        assert!(stderr.ends_with("7 asm-printer - Number of machine instrs printed\n"));
        assert_eq!(stderr.lines().count(), 200_001);
    }

    #[test]
    fn test_unread_stdin_is_not_an_error() {
        let toolchain = fake_toolchain("echo done >&2\n");
        let test = toolchain.path().join("input.bc");
        std::fs::write(&test, vec![1u8; 1 << 20]).unwrap();

        let stderr = run_tool(&RunConfig::default(), toolchain.path(), &test).unwrap();
        assert_eq!(stderr, "done\n");
    }

    #[test]
    fn test_missing_test_file() {
        let toolchain = fake_toolchain("cat > /dev/null\n");
        let test = toolchain.path().join("missing.bc");

        let err = run_tool(&RunConfig::default(), toolchain.path(), &test).unwrap_err();
        assert!(matches!(err, RunError::Read { ref path, .. } if *path == test));
    }

    #[test]
    fn test_missing_tool() {
        let toolchain = fake_toolchain("cat > /dev/null\n");
        let test = toolchain.path().join("input.bc");
        std::fs::write(&test, b"BC").unwrap();

        let config = RunConfig::default().with_tool("no-such-tool");
        let err = run_tool(&config, toolchain.path(), &test).unwrap_err();
        assert!(matches!(err, RunError::ProcessStart { .. }));
    }

    #[test]
    fn test_nonzero_exit() {
        let toolchain = fake_toolchain("cat > /dev/null\necho 'error: bad bitcode' >&2\nexit 3\n");
        let test = toolchain.path().join("input.bc");
        std::fs::write(&test, b"BC").unwrap();

        let err = run_tool(&RunConfig::default(), toolchain.path(), &test).unwrap_err();
        match err {
            RunError::ProcessExit { tool, status } => {
                assert!(tool.ends_with("bin/llc"));
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
