//! Research orchestrator for Scout.
//!
//! Composes the hosted model, prompt templates, the output parser and the
//! tool registry into a single request/response cycle.

use crate::agent::{Agent, ToolCallRecord};
use crate::config::{Prompts, Settings};
use crate::error::{Result, ScoutError};
use crate::model::{self, ChatModel};
use crate::research::{ResearchParser, ResearchResponse};
use crate::tools::{save_to_file, ToolRegistry};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// Outcome of one research run.
#[derive(Debug)]
pub struct ResearchOutcome {
    /// The validated structured answer.
    pub response: ResearchResponse,
    /// The model's final text, before parsing.
    pub raw: String,
    /// Every tool call made during the run.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of model calls used.
    pub iterations: usize,
}

/// The research assistant.
pub struct ResearchAssistant {
    settings: Settings,
    prompts: Prompts,
    model: Arc<dyn ChatModel>,
    tools: Arc<ToolRegistry>,
    parser: ResearchParser,
}

impl ResearchAssistant {
    /// Build the assistant from settings: configured model, prompts and the standard tools.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let model = model::from_settings(&settings.model)?;
        info!(
            "Using {} model {}",
            settings.model.provider,
            settings.model.model_name()
        );

        let tools = Arc::new(ToolRegistry::research_defaults(
            &settings.tools,
            settings.output_file(),
        )?);

        Ok(Self::with_components(settings, prompts, model, tools))
    }

    /// Create an assistant with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        model: Arc<dyn ChatModel>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            settings,
            prompts,
            model,
            tools,
            parser: ResearchParser::new(),
        }
    }

    /// Get a reference to the tool registry.
    pub fn tools(&self) -> Arc<ToolRegistry> {
        self.tools.clone()
    }

    /// Get a reference to the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run one research cycle: prompt, tool calls, final answer, parse.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn research(&self, query: &str) -> Result<ResearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ScoutError::InvalidInput(
                "Research query must not be empty".to_string(),
            ));
        }

        info!("Researching: {}", query);

        let mut vars = HashMap::new();
        vars.insert(
            "format_instructions".to_string(),
            self.parser.format_instructions(),
        );
        vars.insert("query".to_string(), query.to_string());

        let system_prompt = self
            .prompts
            .render_with_custom(&self.prompts.research.system, &vars);
        let user_prompt = self
            .prompts
            .render_with_custom(&self.prompts.research.user, &vars);

        let agent = Agent::new(self.model.clone(), self.tools.clone())
            .with_system_prompt(&system_prompt)
            .with_max_iterations(self.settings.model.max_iterations);

        let run = agent.run(&user_prompt).await?;
        let response = self.parser.parse(&run.content)?;

        info!(
            "Research complete: {} source(s), {} tool call(s), {} iteration(s)",
            response.sources.len(),
            run.tool_calls.len(),
            run.iterations
        );

        Ok(ResearchOutcome {
            response,
            raw: run.content,
            tool_calls: run.tool_calls,
            iterations: run.iterations,
        })
    }

    /// Append a rendered report to `path`, or the configured output file.
    pub fn save(&self, response: &ResearchResponse, path: Option<&Path>) -> Result<String> {
        let default_path = self.settings.output_file();
        save_to_file(&response.to_report(), Some(path.unwrap_or(&default_path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::{final_text, tool_call, FixedTool, ScriptedModel};
    use crate::model::{ChatMessage, ModelCompletion};

    const ANSWER: &str = r#"```json
{
  "topic": "Tides",
  "summary": "Tides are driven mainly by the Moon's gravity.",
  "sources": ["https://en.wikipedia.org/wiki/Tide"],
  "tools_used": ["wikipedia"]
}
```"#;

    fn assistant(model: Arc<ScriptedModel>) -> ResearchAssistant {
        let mut registry = ToolRegistry::new();
        registry.register(FixedTool {
            name: "wikipedia",
            output: "Page: Tide",
        });
        ResearchAssistant::with_components(
            Settings::default(),
            Prompts::default(),
            model,
            Arc::new(registry),
        )
    }

    #[tokio::test]
    async fn test_research_parses_final_answer() {
        let model = Arc::new(ScriptedModel::new(vec![
            tool_call("toolu_1", "wikipedia", r#"{"query": "tides"}"#),
            final_text(ANSWER),
        ]));
        let outcome = assistant(model.clone()).research("  why are there tides? ").await.unwrap();

        assert_eq!(outcome.response.topic, "Tides");
        assert_eq!(outcome.response.tools_used, vec!["wikipedia"]);
        assert_eq!(outcome.tool_calls.len(), 1);
        assert_eq!(outcome.tool_calls[0].result, "Page: Tide: tides");
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.raw, ANSWER);

        let requests = model.requests.lock().unwrap();
        match &requests[0][0] {
            ChatMessage::System(prompt) => {
                assert!(prompt.contains("\"tools_used\""));
                assert!(!prompt.contains("{{format_instructions}}"));
            }
            other => panic!("Expected system prompt, got {:?}", other),
        }
        assert_eq!(requests[0][1], ChatMessage::User("why are there tides?".to_string()));
    }

    #[tokio::test]
    async fn test_unparseable_answer_is_validation_error() {
        let model = Arc::new(ScriptedModel::new(vec![final_text(
            r#"{"topic": "Tides", "summary": "No sources field"}"#,
        )]));
        assert!(matches!(
            assistant(model).research("tides").await,
            Err(ScoutError::SchemaValidation { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_answer_is_validation_error() {
        let model = Arc::new(ScriptedModel::new(vec![ModelCompletion::default()]));
        assert!(matches!(
            assistant(model).research("tides").await,
            Err(ScoutError::SchemaValidation { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let model = Arc::new(ScriptedModel::new(Vec::new()));
        assert!(matches!(
            assistant(model.clone()).research("   ").await,
            Err(ScoutError::InvalidInput(_))
        ));
        assert!(model.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_save_appends_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.txt");
        let assistant = assistant(Arc::new(ScriptedModel::new(Vec::new())));

        let response = ResearchResponse {
            topic: "Tides".to_string(),
            summary: "Moon.".to_string(),
            sources: vec!["https://en.wikipedia.org/wiki/Tide".to_string()],
            tools_used: vec!["wikipedia".to_string()],
        };
        let message = assistant.save(&response, Some(&path)).unwrap();
        assert!(message.starts_with("Research output saved to"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Research Output - "));
        assert!(content.contains("Topic: Tides"));
        assert!(content.contains("1. https://en.wikipedia.org/wiki/Tide"));
    }
}
