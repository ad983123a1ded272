//! Chat model abstraction for the FRED agent
//!
//! This crate provides the provider-agnostic pieces the agent needs to talk
//! to a tool-calling chat model:
//!
//! - Message types with tool-use and tool-result blocks
//! - Completion request/response types
//! - Tool definitions for function calling
//! - The [`LLMProvider`] trait
//! - Ollama and OpenAI-compatible providers (behind feature flags)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod tools;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role, ToolUse};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;

#[cfg(any(feature = "ollama", feature = "openai"))]
pub mod providers;
