//! Concrete chat provider implementations

#[cfg(feature = "ollama")]
pub mod ollama;
#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};
#[cfg(feature = "openai")]
pub use openai::{OpenAIConfig, OpenAIProvider};

/// Decode tool arguments that arrive as a JSON string
///
/// A malformed payload decodes to `Null`, so the call keeps its place in the
/// reply without any arguments.
#[cfg(any(feature = "ollama", feature = "openai"))]
pub(crate) fn decode_arguments(tool: &str, raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(tool, error = %e, "Tool arguments are not valid JSON");
        serde_json::Value::Null
    })
}
