//! Backend driver errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from driving the external toolchain.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The tool could not be spawned at all (missing binary, permissions).
    #[error("failed to invoke {tool}: {source}")]
    Spawn {
        /// The tool name.
        tool: String,
        /// The underlying spawn error.
        source: std::io::Error,
    },

    /// The tool ran but exited non-zero.
    #[error("{tool} exited with code {code}: {stderr}")]
    ToolFailed {
        /// The tool name.
        tool: String,
        /// The exit code (or -1 if killed by a signal).
        code: i32,
        /// Captured stderr text.
        stderr: String,
    },

    /// The full pipeline found no C sources to compile.
    #[error("no C sources found in {}", dir.display())]
    NoSources {
        /// The source directory that was scanned.
        dir: PathBuf,
    },

    /// I/O error staging files for the toolchain.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
