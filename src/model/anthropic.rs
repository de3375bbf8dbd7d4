//! Anthropic Messages API backend.

use super::{ChatMessage, ChatModel, ModelCompletion, ToolInvocation};
use crate::config::{ModelProvider, ModelSettings};
use crate::error::{Result, ScoutError};
use crate::tools::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Chat model served by the Anthropic Messages API.
pub struct AnthropicChatModel {
    http: reqwest::Client,
    model: String,
    api_key: String,
    endpoint: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicChatModel {
    /// Create a model from settings. Requires `ANTHROPIC_API_KEY`.
    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        let key_var = ModelProvider::Anthropic.api_key_var();
        let api_key = std::env::var(key_var)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ScoutError::Config(format!("{} not set", key_var)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ScoutError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            model: settings.model_name(),
            api_key,
            endpoint: settings
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })
    }

    fn build_request(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> MessagesRequest {
        let (system, messages) = to_messages(messages);
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system,
            messages,
            tools: tools
                .iter()
                .map(|tool| AnthropicTool {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    input_schema: tool.parameters.clone(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl ChatModel for AnthropicChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelCompletion> {
        let payload = self.build_request(messages, tools);

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ScoutError::Provider(format!("Anthropic request error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(coalesce_error(status, &body));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::Provider(format!("Anthropic response parse error: {}", e)))?;

        debug!(
            "Anthropic completion: {} block(s), stop reason {:?}",
            parsed.content.len(),
            parsed.stop_reason
        );

        Ok(into_completion(parsed))
    }
}

fn coalesce_error(status: reqwest::StatusCode, body: &str) -> ScoutError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return ScoutError::Provider(format!("Anthropic rate limit exceeded: {}", body));
    }
    ScoutError::Provider(format!("Anthropic request failed with {}: {}", status, body))
}

/// Split out the system prompt and map the conversation onto Anthropic messages.
///
/// Consecutive tool results are merged into a single `user` message, as the
/// API requires all results for one assistant turn to arrive together.
fn to_messages(messages: &[ChatMessage]) -> (Option<String>, Vec<AnthropicMessage>) {
    let mut system: Vec<&str> = Vec::new();
    let mut converted: Vec<AnthropicMessage> = Vec::new();

    for message in messages {
        match message {
            ChatMessage::System(content) => system.push(content),
            ChatMessage::User(content) => converted.push(AnthropicMessage {
                role: "user".to_string(),
                content: vec![ContentBlock::Text {
                    text: content.clone(),
                }],
            }),
            ChatMessage::Assistant {
                content,
                tool_calls,
            } => {
                let mut blocks = Vec::new();
                if let Some(text) = content.as_ref().filter(|t| !t.is_empty()) {
                    blocks.push(ContentBlock::Text { text: text.clone() });
                }
                for call in tool_calls {
                    blocks.push(ContentBlock::ToolUse {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        input: serde_json::from_str(&call.arguments)
                            .unwrap_or_else(|_| Value::Object(Default::default())),
                    });
                }
                converted.push(AnthropicMessage {
                    role: "assistant".to_string(),
                    content: blocks,
                });
            }
            ChatMessage::Tool {
                call_id, content, ..
            } => {
                let block = ContentBlock::ToolResult {
                    tool_use_id: call_id.clone(),
                    content: content.clone(),
                };
                match converted.last_mut().filter(|last| last.is_tool_results()) {
                    Some(last) => last.content.push(block),
                    None => converted.push(AnthropicMessage {
                        role: "user".to_string(),
                        content: vec![block],
                    }),
                }
            }
        }
    }

    let system = (!system.is_empty()).then(|| system.join("\n\n"));
    (system, converted)
}

fn into_completion(response: MessagesResponse) -> ModelCompletion {
    let mut text = String::new();
    let mut tool_calls = Vec::new();

    for block in response.content {
        match block {
            ContentBlock::Text { text: t } => text.push_str(&t),
            ContentBlock::ToolUse { id, name, input } => tool_calls.push(ToolInvocation {
                id,
                name,
                arguments: input.to_string(),
            }),
            ContentBlock::ToolResult { .. } | ContentBlock::Unknown => {}
        }
    }

    ModelCompletion {
        content: (!text.is_empty()).then_some(text),
        tool_calls,
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<AnthropicTool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: Vec<ContentBlock>,
}

impl AnthropicMessage {
    fn is_tool_results(&self) -> bool {
        self.role == "user"
            && !self.content.is_empty()
            && self
                .content
                .iter()
                .all(|b| matches!(b, ContentBlock::ToolResult { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Serialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> AnthropicChatModel {
        AnthropicChatModel {
            http: reqwest::Client::new(),
            model: "claude-3-5-sonnet-20240620".to_string(),
            api_key: "test".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_tokens: 1024,
            temperature: 0.0,
        }
    }

    fn call(id: &str, name: &str) -> ToolInvocation {
        ToolInvocation {
            id: id.to_string(),
            name: name.to_string(),
            arguments: r#"{"query": "tides"}"#.to_string(),
        }
    }

    #[test]
    fn test_to_messages_merges_tool_results() {
        let messages = vec![
            ChatMessage::System("be helpful".to_string()),
            ChatMessage::User("tides".to_string()),
            ChatMessage::Assistant {
                content: Some("Let me check.".to_string()),
                tool_calls: vec![call("toolu_1", "search"), call("toolu_2", "wikipedia")],
            },
            ChatMessage::Tool {
                call_id: "toolu_1".to_string(),
                name: "search".to_string(),
                content: "web results".to_string(),
            },
            ChatMessage::Tool {
                call_id: "toolu_2".to_string(),
                name: "wikipedia".to_string(),
                content: "Page: Tide".to_string(),
            },
        ];

        let (system, converted) = to_messages(&messages);
        assert_eq!(system.as_deref(), Some("be helpful"));
        assert_eq!(converted.len(), 3);
        assert_eq!(converted[1].role, "assistant");
        assert_eq!(converted[1].content.len(), 3);
        assert_eq!(
            converted[1].content[1],
            ContentBlock::ToolUse {
                id: "toolu_1".to_string(),
                name: "search".to_string(),
                input: json!({"query": "tides"}),
            }
        );
        assert_eq!(converted[2].role, "user");
        assert_eq!(converted[2].content.len(), 2);
        assert!(converted[2].is_tool_results());
    }

    #[test]
    fn test_request_serialization() {
        let tools = vec![ToolDefinition {
            name: "search".to_string(),
            description: "Search the web".to_string(),
            parameters: json!({"type": "object", "properties": {"query": {"type": "string"}}}),
        }];
        let request = model().build_request(
            &[
                ChatMessage::System("sys".to_string()),
                ChatMessage::User("hi".to_string()),
            ],
            &tools,
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["system"], "sys");
        assert_eq!(value["max_tokens"], 1024);
        assert_eq!(value["messages"][0]["content"][0]["type"], "text");
        assert_eq!(value["tools"][0]["input_schema"]["type"], "object");
    }

    #[test]
    fn test_request_omits_empty_tools_and_system() {
        let request = model().build_request(&[ChatMessage::User("hi".to_string())], &[]);
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("tools").is_none());
        assert!(value.get("system").is_none());
    }

    #[test]
    fn test_into_completion_with_tool_use() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "I'll search for that."},
                {"type": "tool_use", "id": "toolu_01", "name": "search", "input": {"query": "tides"}},
                {"type": "thinking", "thinking": "ignored"}
            ],
            "stop_reason": "tool_use"
        }))
        .unwrap();

        let completion = into_completion(response);
        assert_eq!(completion.content.as_deref(), Some("I'll search for that."));
        assert_eq!(completion.tool_calls.len(), 1);
        assert_eq!(completion.tool_calls[0].id, "toolu_01");
        let args: Value = serde_json::from_str(&completion.tool_calls[0].arguments).unwrap();
        assert_eq!(args, json!({"query": "tides"}));
    }

    #[test]
    fn test_into_completion_text_only() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "{\"topic\": \"t\"}"}],
            "stop_reason": "end_turn"
        }))
        .unwrap();

        let completion = into_completion(response);
        assert_eq!(completion.content.as_deref(), Some("{\"topic\": \"t\"}"));
        assert!(completion.tool_calls.is_empty());
    }

    #[test]
    fn test_rate_limit_error_message() {
        let err = coalesce_error(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(err.to_string().contains("rate limit"));
    }
}
