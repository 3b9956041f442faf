use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors from running the code generator on a test file.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to read test file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start {}", .tool.display())]
    ProcessStart {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {stream} of child process")]
    StreamRead {
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write stdin of child process")]
    StreamWrite {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for {}", .tool.display())]
    Wait {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with {status}", .tool.display())]
    ProcessExit { tool: PathBuf, status: ExitStatus },
}

/// Errors from comparing two toolchains.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("run failed ({which}={}, test={})", .toolchain.display(), .test.display())]
    Toolchain {
        which: &'static str,
        toolchain: PathBuf,
        test: PathBuf,
        #[source]
        source: RunError,
    },
}

pub type Result<T> = std::result::Result<T, RunError>;
