//! Hosted chat models with tool calling.
//!
//! The agent talks to models through the provider-neutral [`ChatModel`] trait;
//! each provider module maps these types onto its own wire format.

mod anthropic;
mod openai;

pub use anthropic::AnthropicChatModel;
pub use openai::OpenAIChatModel;

use crate::config::{ModelProvider, ModelSettings};
use crate::error::Result;
use crate::tools::ToolDefinition;
use async_trait::async_trait;
use std::sync::Arc;

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    /// Provider-assigned call id, echoed back with the result.
    pub id: String,
    pub name: String,
    /// Raw JSON arguments.
    pub arguments: String,
}

/// One message in a conversation with the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    System(String),
    User(String),
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolInvocation>,
    },
    /// Result of a tool call, sent back to the model.
    Tool {
        call_id: String,
        name: String,
        content: String,
    },
}

/// The model's reply to one request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelCompletion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolInvocation>,
}

/// A chat completion provider that supports tool calling.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, for logging.
    fn name(&self) -> &str;

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelCompletion>;
}

/// Build the configured chat model.
pub fn from_settings(settings: &ModelSettings) -> Result<Arc<dyn ChatModel>> {
    Ok(match settings.provider {
        ModelProvider::Anthropic => Arc::new(AnthropicChatModel::from_settings(settings)?),
        ModelProvider::OpenAI => Arc::new(OpenAIChatModel::from_settings(settings)?),
    })
}
