//! Error types for data retrieval

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while fetching observations or loading metadata
#[derive(Debug, Error)]
pub enum DataError {
    /// FRED answered with a non-success status
    #[error("status {status}, body {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Network or HTTP error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Metadata file could not be read
    #[error("failed to read metadata file {path}: {source}")]
    MetadataIo {
        /// File that failed to load
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DataError {
    /// Whether this is a transport-level failure as opposed to local I/O
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Network(_))
    }
}

/// Result type alias for data operations
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = DataError::Status {
            status: 400,
            body: "Bad Request. The series does not exist.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "status 400, body Bad Request. The series does not exist."
        );
        assert!(err.is_transport());
        assert!(!DataError::Config("x".to_string()).is_transport());
    }
}
