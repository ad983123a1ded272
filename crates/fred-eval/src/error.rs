//! Error types for the evaluation harness

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    /// Fixture or report file could not be read or written
    #[error("Failed to access {path}: {source}")]
    FixtureIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A relative date spec other than `<N>y`, `<N>m` or `today`
    #[error("Invalid relative date '{0}'")]
    InvalidRelative(String),
}

/// Result type alias for evaluation operations
pub type Result<T> = std::result::Result<T, EvalError>;
