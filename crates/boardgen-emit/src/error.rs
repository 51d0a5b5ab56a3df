//! Emission errors.

use thiserror::Error;

/// Errors that can occur during template rendering or file emission.
#[derive(Debug, Error)]
pub enum EmitError {
    /// No template is registered under the requested identifier.
    #[error("unknown template: {name}")]
    UnknownTemplate {
        /// The identifier that failed to resolve.
        name: String,
    },

    /// Reading an override template failed.
    #[error("cannot read template override {name}: {source}")]
    OverrideRead {
        /// The template identifier.
        name: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// I/O error while preparing the output tree or writing an artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
