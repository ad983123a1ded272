//! Message types for chat model communication
//!
//! Messages carry either plain text or structured blocks. Structured blocks
//! are how tool use flows through a conversation: the assistant emits
//! [`ContentBlock::ToolUse`] and the caller answers each one with a
//! [`ContentBlock::ToolResult`] carrying the same id.

use serde::{Deserialize, Serialize};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Assistant message
    Assistant,
    /// System message (handled separately in some providers)
    System,
}

/// Content block in a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text content
    Text {
        /// Text content
        text: String,
    },

    /// Tool use request from assistant
    ToolUse {
        /// Unique ID for this tool use
        id: String,
        /// Tool name
        name: String,
        /// Tool input parameters (JSON)
        input: serde_json::Value,
    },

    /// Tool result sent back to the model
    ToolResult {
        /// ID of the tool use this is responding to
        tool_use_id: String,
        /// Result content
        content: String,
        /// Whether this is an error result
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// Message content: either simple text or structured blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Structured content blocks
    Blocks(Vec<ContentBlock>),
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Message content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
}

/// Borrowed view of a tool invocation inside an assistant message
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolUse<'a> {
    /// Call id assigned by the model or provider
    pub id: &'a str,
    /// Tool name
    pub name: &'a str,
    /// Raw arguments
    pub input: &'a serde_json::Value,
}

impl Message {
    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Create an assistant message with text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Create a system message with text
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Create a message from structured blocks
    pub fn from_blocks(role: Role, blocks: Vec<ContentBlock>) -> Self {
        Self {
            role,
            content: Some(MessageContent::Blocks(blocks)),
        }
    }

    /// Create a user message with tool result
    pub fn tool_result(tool_use_id: String, result: String) -> Self {
        Self::from_blocks(
            Role::User,
            vec![ContentBlock::ToolResult {
                tool_use_id,
                content: result,
                is_error: None,
            }],
        )
    }

    /// Create a user message with error tool result
    pub fn tool_error(tool_use_id: String, error: String) -> Self {
        Self::from_blocks(
            Role::User,
            vec![ContentBlock::ToolResult {
                tool_use_id,
                content: error,
                is_error: Some(true),
            }],
        )
    }

    /// Extract text content from the message (convenience method)
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(MessageContent::Text(s)) => Some(s),
            Some(MessageContent::Blocks(blocks)) => blocks.iter().find_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            }),
            None => None,
        }
    }

    /// Extract tool use requests from assistant messages, in emission order
    pub fn tool_uses(&self) -> Vec<ToolUse<'_>> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::ToolUse { id, name, input } => Some(ToolUse { id, name, input }),
                    _ => None,
                })
                .collect(),
            _ => vec![],
        }
    }

    /// Check if this message contains any tool uses
    pub fn has_tool_uses(&self) -> bool {
        !self.tool_uses().is_empty()
    }

    /// Tool result payloads carried by this message
    pub fn tool_results(&self) -> Vec<(&str, &str)> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::ToolResult {
                        tool_use_id,
                        content,
                        ..
                    } => Some((tool_use_id.as_str(), content.as_str())),
                    _ => None,
                })
                .collect(),
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_message() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), Some("Hello"));
    }

    #[test]
    fn test_tool_result() {
        let msg = Message::tool_result("call_0".to_string(), "{}".to_string());
        assert_eq!(msg.role, Role::User);
        assert!(!msg.has_tool_uses());
        assert_eq!(msg.tool_results(), vec![("call_0", "{}")]);
    }

    #[test]
    fn test_tool_uses_keep_order() {
        let msg = Message::from_blocks(
            Role::Assistant,
            vec![
                ContentBlock::Text {
                    text: "fetching".to_string(),
                },
                ContentBlock::ToolUse {
                    id: "a".to_string(),
                    name: "get_fred_data".to_string(),
                    input: json!({"series_id": "GDP"}),
                },
                ContentBlock::ToolUse {
                    id: "b".to_string(),
                    name: "get_fred_data".to_string(),
                    input: json!({"series_id": "UNRATE"}),
                },
            ],
        );

        let uses = msg.tool_uses();
        assert_eq!(uses.len(), 2);
        assert_eq!(uses[0].id, "a");
        assert_eq!(uses[1].input["series_id"], "UNRATE");
        assert_eq!(msg.text(), Some("fetching"));
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::user("Test");
        let json = serde_json::to_string(&msg).unwrap();
        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.text(), Some("Test"));
    }
}
