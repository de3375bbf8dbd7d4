//! Agent runner with tool calling loop.

use crate::error::{Result, ScoutError};
use crate::model::{ChatMessage, ChatModel, ToolInvocation};
use crate::tools::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default maximum number of model calls per run.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Agent that lets a model call registered tools until it produces a final answer.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: Arc<ToolRegistry>,
    max_iterations: usize,
    system_prompt: Option<String>,
}

impl Agent {
    /// Create a new agent over a model and a tool registry.
    pub fn new(model: Arc<dyn ChatModel>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            model,
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            system_prompt: None,
        }
    }

    /// Set the system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = Some(prompt.to_string());
        self
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Run the agent with a user task.
    pub async fn run(&self, task: &str) -> Result<AgentResponse> {
        let mut messages = Vec::new();
        if let Some(prompt) = &self.system_prompt {
            messages.push(ChatMessage::System(prompt.clone()));
        }
        messages.push(ChatMessage::User(task.to_string()));

        let definitions = self.tools.definitions();
        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(ScoutError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {} with {}", iterations, self.model.name());

            let completion = self.model.complete(&messages, &definitions).await?;

            if completion.tool_calls.is_empty() {
                return Ok(AgentResponse {
                    content: completion.content.unwrap_or_default(),
                    tool_calls: tool_calls_made,
                    iterations,
                });
            }

            messages.push(ChatMessage::Assistant {
                content: completion.content.clone(),
                tool_calls: completion.tool_calls.clone(),
            });

            for tool_call in &completion.tool_calls {
                let record = self.execute_tool_call(tool_call).await?;

                messages.push(ChatMessage::Tool {
                    call_id: tool_call.id.clone(),
                    name: tool_call.name.clone(),
                    content: record.result.clone(),
                });

                tool_calls_made.push(record);
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    ///
    /// Unknown tools and bad arguments are reported to the model as text so it
    /// can correct the call. Provider and I/O failures abort the run.
    async fn execute_tool_call(&self, tool_call: &ToolInvocation) -> Result<ToolCallRecord> {
        info!(
            "Agent calling tool: {} with args: {}",
            tool_call.name, tool_call.arguments
        );

        let (result, failed) = match self.tools.invoke(&tool_call.name, &tool_call.arguments).await
        {
            Ok(output) => (output, false),
            Err(ScoutError::Tool(msg)) => {
                warn!("Tool {} rejected call: {}", tool_call.name, msg);
                (format!("Tool error: {}", msg), true)
            }
            Err(e) => {
                warn!("Tool {} failed: {}", tool_call.name, e);
                return Err(e);
            }
        };

        Ok(ToolCallRecord {
            name: tool_call.name.clone(),
            arguments: tool_call.arguments.clone(),
            result,
            failed,
        })
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool, or the rejection text sent to the model.
    pub result: String,
    /// Whether the call was rejected.
    pub failed: bool,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
