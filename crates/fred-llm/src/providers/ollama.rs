//! Ollama chat provider
//!
//! Talks to the native `/api/chat` endpoint with `stream: false`. Ollama
//! returns tool arguments as JSON objects and usually omits call ids, so ids
//! are synthesized as `call_<index>` when missing.

use super::decode_arguments;
use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    MessageContent, Result, Role, StopReason, TokenUsage, ToolDefinition,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration for the Ollama provider
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Server root, without the `/api/chat` suffix
    pub base_url: String,

    /// Request timeout in seconds (default: 300)
    pub timeout_secs: u64,
}

impl OllamaConfig {
    /// Create a config pointing at the given server
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read `OLLAMA_HOST`, falling back to the local default
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        Self::new(base_url)
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_URL)
    }
}

/// Ollama chat provider
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

impl OllamaProvider {
    /// Create a provider with custom configuration
    pub fn with_config(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Create a provider for the local default server
    pub fn new() -> Result<Self> {
        Self::with_config(OllamaConfig::default())
    }

    /// Get the current configuration
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    #[instrument(skip(self, request), fields(model = %request.model, url = %self.config.base_url))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!(
            messages = request.messages.len(),
            tools = request.has_tools(),
            "Sending Ollama chat request"
        );

        let body = OllamaRequest {
            model: request.model.clone(),
            messages: build_ollama_messages(request.system, request.messages),
            tools: (!request.tools.is_empty()).then(|| convert_tools(&request.tools)),
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(self.config.chat_url())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await?;
            return Err(LLMError::from_status(status, text, &request.model));
        }

        let raw: Value = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse Ollama response: {e}"))
        })?;

        parse_chat_response(raw)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OllamaTool>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    num_predict: usize,
}

#[derive(Debug, Serialize)]
struct OllamaMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OllamaToolCall>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaToolCall {
    function: OllamaFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaFunctionCall {
    name: String,
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct OllamaTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: OllamaFunction,
}

#[derive(Debug, Serialize)]
struct OllamaFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<usize>,
    #[serde(default)]
    eval_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<OllamaResponseToolCall>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseToolCall {
    #[serde(default)]
    id: Option<String>,
    function: OllamaFunctionCall,
}

// ============================================================================
// Conversion functions
// ============================================================================

fn build_ollama_messages(system: Option<String>, messages: Vec<Message>) -> Vec<OllamaMessage> {
    let mut result = Vec::with_capacity(messages.len() + 1);
    if let Some(system) = system {
        result.push(OllamaMessage {
            role: "system",
            content: system,
            tool_calls: Vec::new(),
        });
    }
    for msg in messages {
        result.extend(convert_message(msg));
    }
    result
}

fn convert_message(msg: Message) -> Vec<OllamaMessage> {
    let role = match msg.role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
    };

    let blocks = match msg.content {
        Some(MessageContent::Text(content)) => {
            return vec![OllamaMessage {
                role,
                content,
                tool_calls: Vec::new(),
            }];
        }
        Some(MessageContent::Blocks(blocks)) => blocks,
        None => Vec::new(),
    };

    let mut head = OllamaMessage {
        role,
        content: String::new(),
        tool_calls: Vec::new(),
    };
    let mut results = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text } => head.content.push_str(&text),
            ContentBlock::ToolUse { name, input, .. } => head.tool_calls.push(OllamaToolCall {
                function: OllamaFunctionCall {
                    name,
                    arguments: input,
                },
            }),
            ContentBlock::ToolResult { content, .. } => results.push(OllamaMessage {
                role: "tool",
                content,
                tool_calls: Vec::new(),
            }),
        }
    }

    if results.is_empty() || !head.content.is_empty() || !head.tool_calls.is_empty() {
        results.insert(0, head);
    }
    results
}

fn convert_tools(tools: &[ToolDefinition]) -> Vec<OllamaTool> {
    tools
        .iter()
        .map(|tool| OllamaTool {
            tool_type: "function",
            function: OllamaFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        })
        .collect()
}

/// Normalise a raw `/api/chat` body into a completion response
fn parse_chat_response(raw: Value) -> Result<CompletionResponse> {
    if raw.get("message").is_none() {
        let detail = raw
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("response has no message");
        return Err(LLMError::UnexpectedResponse(detail.to_string()));
    }

    let parsed: OllamaChatResponse = serde_json::from_value(raw)
        .map_err(|e| LLMError::UnexpectedResponse(format!("Malformed chat message: {e}")))?;

    let mut blocks = Vec::new();
    if !parsed.message.content.is_empty() {
        blocks.push(ContentBlock::Text {
            text: parsed.message.content,
        });
    }

    for (index, call) in parsed.message.tool_calls.into_iter().enumerate() {
        let input = match call.function.arguments {
            Value::String(s) => decode_arguments(&call.function.name, &s),
            other => other,
        };
        blocks.push(ContentBlock::ToolUse {
            id: call
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("call_{index}")),
            name: call.function.name,
            input,
        });
    }

    let has_tools = blocks
        .iter()
        .any(|b| matches!(b, ContentBlock::ToolUse { .. }));
    let stop_reason = match (has_tools, parsed.done_reason.as_deref()) {
        (true, _) => StopReason::ToolUse,
        (false, Some("length")) => StopReason::MaxTokens,
        _ => StopReason::EndTurn,
    };

    if blocks.is_empty() {
        blocks.push(ContentBlock::Text {
            text: String::new(),
        });
    }

    let usage = TokenUsage {
        input_tokens: parsed.prompt_eval_count.unwrap_or_default(),
        output_tokens: parsed.eval_count.unwrap_or_default(),
    };
    debug!(?stop_reason, total_tokens = usage.total(), "Received Ollama reply");

    Ok(CompletionResponse {
        message: Message::from_blocks(Role::Assistant, blocks),
        stop_reason,
        usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_url() {
        let config = OllamaConfig::new("http://gpu-box:11434/");
        assert_eq!(config.chat_url(), "http://gpu-box:11434/api/chat");
    }

    #[test]
    fn test_parse_tool_calls_without_ids() {
        let raw = json!({
            "model": "llama3.2",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [
                    {"function": {"name": "get_fred_data",
                                  "arguments": {"series_id": "UNRATE", "start_date": "2024-01-01", "end_date": "2024-12-31"}}},
                    {"function": {"name": "get_fred_data",
                                  "arguments": "{\"series_id\": \"CPIAUCSL\"}"}}
                ]
            },
            "done": true,
            "prompt_eval_count": 812,
            "eval_count": 40
        });

        let response = parse_chat_response(raw).unwrap();
        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(response.usage.total(), 852);

        let uses = response.message.tool_uses();
        assert_eq!(uses.len(), 2);
        assert_eq!(uses[0].id, "call_0");
        assert_eq!(uses[0].input["series_id"], "UNRATE");
        assert_eq!(uses[1].id, "call_1");
        assert_eq!(uses[1].input["series_id"], "CPIAUCSL");
    }

    #[test]
    fn test_unparseable_string_arguments_keep_the_call() {
        let raw = json!({
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [
                    {"function": {"name": "get_fred_data", "arguments": "{\"series_id\": "}},
                    {"function": {"name": "get_fred_data", "arguments": {"series_id": "GDP"}}}
                ]
            },
            "done": true
        });

        let response = parse_chat_response(raw).unwrap();
        let uses = response.message.tool_uses();
        assert_eq!(uses.len(), 2);
        assert!(uses[0].input.is_null());
        assert_eq!(uses[1].input["series_id"], "GDP");
    }

    #[test]
    fn test_parse_plain_answer() {
        let raw = json!({
            "message": {"role": "assistant", "content": "GDP measures output."},
            "done": true,
            "done_reason": "stop"
        });
        let response = parse_chat_response(raw).unwrap();
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(response.message.text(), Some("GDP measures output."));
        assert!(!response.message.has_tool_uses());
    }

    #[test]
    fn test_missing_message_is_unexpected() {
        let err = parse_chat_response(json!({"error": "model 'x' not found"})).unwrap_err();
        assert!(matches!(err, LLMError::UnexpectedResponse(ref m) if m.contains("not found")));
    }

    #[test]
    fn test_tool_results_become_tool_messages() {
        let messages = build_ollama_messages(
            Some("sys".to_string()),
            vec![
                Message::user("question"),
                Message::tool_result("call_0".to_string(), "{\"a\":1}".to_string()),
            ],
        );
        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["system", "user", "tool"]);
        assert_eq!(messages[2].content, "{\"a\":1}");
    }

    #[test]
    fn test_assistant_tool_use_round_trips_as_object() {
        let msg = Message::from_blocks(
            Role::Assistant,
            vec![ContentBlock::ToolUse {
                id: "call_0".to_string(),
                name: "get_fred_data".to_string(),
                input: json!({"series_id": "GDP"}),
            }],
        );
        let converted = convert_message(msg);
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].tool_calls[0].function.arguments["series_id"], "GDP");
    }
}
