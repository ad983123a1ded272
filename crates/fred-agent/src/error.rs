//! Error types for question orchestration

use fred_utils::ConfigError;
use thiserror::Error;

/// Errors that abort a question
///
/// Per-series failures never show up here; they are carried inside
/// [`SeriesResult`](crate::SeriesResult) instead.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model replied with something the plan step cannot use
    #[error("Model protocol error: {0}")]
    ModelProtocol(String),

    /// The chat backend failed
    #[error("LLM error: {0}")]
    Llm(#[from] fred_llm::LLMError),

    /// Data access failed outside a single-series fetch
    #[error("Data error: {0}")]
    Data(#[from] fred_data::DataError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Prompt template failed to render
    #[error("Prompt error: {0}")]
    Prompt(#[from] minijinja::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ConfigError> for AgentError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;
