//! Error types for board configuration loading.

use std::path::PathBuf;

/// Errors that can occur while loading or validating a board description.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The board file could not be read.
    #[error("cannot read board file {}: {source}", path.display())]
    Read {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// TOML deserialization error.
    #[error("invalid board document: {0}")]
    Toml(#[from] toml::de::Error),

    /// Schema-level validation failure.
    #[error("invalid board document: {detail}")]
    Validation {
        /// Description of the validation failure.
        detail: String,
    },
}
