//! OpenAI chat completions backend.

use super::{ChatMessage, ChatModel, ModelCompletion, ToolInvocation};
use crate::config::{ModelProvider, ModelSettings};
use crate::error::{Result, ScoutError};
use crate::openai::create_client_with_timeout;
use crate::tools::ToolDefinition;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall,
    FunctionObject,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Chat model served by the OpenAI API.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIChatModel {
    /// Create a model from settings. Requires `OPENAI_API_KEY`.
    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        let key_var = ModelProvider::OpenAI.api_key_var();
        if std::env::var(key_var).map(|k| k.is_empty()).unwrap_or(true) {
            return Err(ScoutError::Config(format!("{} not set", key_var)));
        }

        Ok(Self {
            client: create_client_with_timeout(Duration::from_secs(settings.timeout_secs))?,
            model: settings.model_name(),
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelCompletion> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(to_request_messages(messages)?)
            .temperature(self.temperature);
        if !tools.is_empty() {
            args.tools(to_tools(tools));
        }
        let request = args.build().map_err(|e| ScoutError::Agent(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ScoutError::OpenAI(format!("Chat completion failed: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ScoutError::Provider("No response from model".to_string()))?;

        let tool_calls: Vec<ToolInvocation> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolInvocation {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        debug!(
            "OpenAI completion: {} tool call(s), finish reason {:?}",
            tool_calls.len(),
            choice.finish_reason
        );

        Ok(ModelCompletion {
            content: choice.message.content,
            tool_calls,
        })
    }
}

fn to_request_messages(messages: &[ChatMessage]) -> Result<Vec<ChatCompletionRequestMessage>> {
    messages
        .iter()
        .map(|message| {
            let converted: ChatCompletionRequestMessage = match message {
                ChatMessage::System(content) => ChatCompletionRequestSystemMessageArgs::default()
                    .content(content.clone())
                    .build()
                    .map_err(|e| ScoutError::Agent(e.to_string()))?
                    .into(),
                ChatMessage::User(content) => ChatCompletionRequestUserMessageArgs::default()
                    .content(content.clone())
                    .build()
                    .map_err(|e| ScoutError::Agent(e.to_string()))?
                    .into(),
                ChatMessage::Assistant {
                    content,
                    tool_calls,
                } => {
                    let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                    if let Some(content) = content {
                        args.content(content.clone());
                    }
                    if !tool_calls.is_empty() {
                        args.tool_calls(
                            tool_calls
                                .iter()
                                .map(|call| ChatCompletionMessageToolCall {
                                    id: call.id.clone(),
                                    r#type: ChatCompletionToolType::Function,
                                    function: FunctionCall {
                                        name: call.name.clone(),
                                        arguments: call.arguments.clone(),
                                    },
                                })
                                .collect::<Vec<_>>(),
                        );
                    }
                    args.build()
                        .map_err(|e| ScoutError::Agent(e.to_string()))?
                        .into()
                }
                ChatMessage::Tool {
                    call_id, content, ..
                } => ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(call_id.clone())
                    .content(content.clone())
                    .build()
                    .map_err(|e| ScoutError::Agent(e.to_string()))?
                    .into(),
            };
            Ok(converted)
        })
        .collect()
}

fn to_tools(tools: &[ToolDefinition]) -> Vec<ChatCompletionTool> {
    tools
        .iter()
        .map(|tool| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: tool.name.clone(),
                description: Some(tool.description.clone()),
                parameters: Some(tool.parameters.clone()),
                strict: None,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_request_messages() {
        let messages = vec![
            ChatMessage::System("system".to_string()),
            ChatMessage::User("query".to_string()),
            ChatMessage::Assistant {
                content: None,
                tool_calls: vec![ToolInvocation {
                    id: "call_1".to_string(),
                    name: "search".to_string(),
                    arguments: r#"{"query": "rust"}"#.to_string(),
                }],
            },
            ChatMessage::Tool {
                call_id: "call_1".to_string(),
                name: "search".to_string(),
                content: "results".to_string(),
            },
        ];

        let converted = to_request_messages(&messages).unwrap();
        assert_eq!(converted.len(), 4);
        assert!(matches!(converted[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(converted[1], ChatCompletionRequestMessage::User(_)));
        match &converted[2] {
            ChatCompletionRequestMessage::Assistant(msg) => {
                let calls = msg.tool_calls.as_ref().unwrap();
                assert_eq!(calls[0].function.name, "search");
            }
            other => panic!("Expected assistant message, got {:?}", other),
        }
        match &converted[3] {
            ChatCompletionRequestMessage::Tool(msg) => assert_eq!(msg.tool_call_id, "call_1"),
            other => panic!("Expected tool message, got {:?}", other),
        }
    }

    #[test]
    fn test_to_tools() {
        let tools = to_tools(&[ToolDefinition {
            name: "wikipedia".to_string(),
            description: "Look things up".to_string(),
            parameters: json!({"type": "object"}),
        }]);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].function.name, "wikipedia");
        assert_eq!(tools[0].function.parameters, Some(json!({"type": "object"})));
    }
}
