//! Chat provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for chat model providers
///
/// Implementations translate a [`CompletionRequest`] into one backend's wire
/// format and normalise the reply. Tool invocations always come back as
/// [`ContentBlock::ToolUse`](crate::ContentBlock::ToolUse) blocks with a
/// non-empty id, whatever the backend emitted.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion from the model
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "ollama", "openai")
    fn name(&self) -> &str;
}
