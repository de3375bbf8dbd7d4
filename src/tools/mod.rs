//! Tools the model may call during a research run.
//!
//! Each tool binds a name, a description for the model, a JSON schema for its
//! input, and an async callable. The registry performs no reasoning, caching,
//! deduplication or rate limiting; the model decides when to call what.

mod save;
mod search;
mod wikipedia;

pub use save::{format_block, save_to_file, SaveToFile, DEFAULT_OUTPUT_FILE, TIMESTAMP_FORMAT};
pub use search::{SearchHit, WebSearch};
pub use wikipedia::WikipediaLookup;

use crate::config::ToolSettings;
use crate::error::{Result, ScoutError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Provider-neutral description of a tool, handed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema for the tool input.
    pub parameters: Value,
}

/// A named capability the model can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema for the input object.
    fn parameters(&self) -> Value;

    /// Run the tool. `input` is either an object matching `parameters()` or a
    /// bare string holding the tool's primary input.
    async fn call(&self, input: &Value) -> Result<String>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Ordered collection of tools available to the model.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// The standard research registry: `search`, `wikipedia`, `save_to_file`.
    pub fn research_defaults(settings: &ToolSettings, output_file: PathBuf) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(WebSearch::new(&settings.search)?);
        registry.register(WikipediaLookup::new(&settings.wikipedia)?);
        registry.register(SaveToFile::new(output_file));
        Ok(registry)
    }

    /// Register a tool, replacing any existing tool with the same name.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let tool: Arc<dyn Tool> = Arc::new(tool);
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(index) => self.tools[index] = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Call a tool with an already-parsed input.
    pub async fn call(&self, name: &str, input: &Value) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| ScoutError::Tool(format!("Unknown tool: {}", name)))?;
        tool.call(input).await
    }

    /// Call a tool with the raw JSON argument string a model produced.
    pub async fn invoke(&self, name: &str, arguments: &str) -> Result<String> {
        let input: Value = if arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(arguments)
                .map_err(|e| ScoutError::Tool(format!("Invalid tool arguments: {}", e)))?
        };
        self.call(name, &input).await
    }
}

/// Read a required string argument, accepting a bare string as the primary input.
pub(crate) fn string_arg(input: &Value, key: &str, tool: &str) -> Result<String> {
    match input {
        Value::String(s) => Ok(s.clone()),
        Value::Object(map) => map
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ScoutError::Tool(format!("Missing '{}' argument for {}", key, tool))),
        _ => Err(ScoutError::Tool(format!(
            "Expected an object or string input for {}",
            tool
        ))),
    }
}

/// Read an optional string argument from an object input.
pub(crate) fn optional_string_arg(input: &Value, key: &str) -> Option<String> {
    input
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input"
        }

        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}, "required": ["text"]})
        }

        async fn call(&self, input: &Value) -> Result<String> {
            string_arg(input, "text", self.name())
        }
    }

    struct Shout;

    #[async_trait]
    impl Tool for Shout {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input loudly"
        }

        fn parameters(&self) -> Value {
            json!({"type": "object"})
        }

        async fn call(&self, input: &Value) -> Result<String> {
            Ok(string_arg(input, "text", self.name())?.to_uppercase())
        }
    }

    #[tokio::test]
    async fn test_invoke_with_object_and_bare_string() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo);

        assert_eq!(registry.invoke("echo", r#"{"text": "hi"}"#).await.unwrap(), "hi");
        assert_eq!(registry.invoke("echo", r#""plain""#).await.unwrap(), "plain");
    }

    #[tokio::test]
    async fn test_invoke_errors() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo);

        assert!(matches!(
            registry.invoke("missing", "{}").await,
            Err(ScoutError::Tool(_))
        ));
        assert!(matches!(
            registry.invoke("echo", "{not json").await,
            Err(ScoutError::Tool(_))
        ));
        assert!(matches!(
            registry.invoke("echo", "").await,
            Err(ScoutError::Tool(_))
        ));
        assert!(matches!(
            registry.invoke("echo", "[1, 2]").await,
            Err(ScoutError::Tool(_))
        ));
    }

    #[tokio::test]
    async fn test_register_replaces_same_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo);
        registry.register(Shout);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.call("echo", &json!("hey")).await.unwrap(), "HEY");
    }

    #[test]
    fn test_research_defaults_order() {
        let registry =
            ToolRegistry::research_defaults(&ToolSettings::default(), PathBuf::from("out.txt"))
                .unwrap();
        assert_eq!(registry.names(), vec!["search", "wikipedia", "save_to_file"]);

        let definitions = registry.definitions();
        assert_eq!(definitions.len(), 3);
        assert_eq!(
            definitions[0].description,
            "Use this tool to search the web for information"
        );
        for definition in &definitions {
            assert_eq!(definition.parameters["type"], "object");
        }
    }

    #[test]
    fn test_optional_string_arg() {
        let input = json!({"filename": "notes.txt", "blank": "  "});
        assert_eq!(optional_string_arg(&input, "filename"), Some("notes.txt".to_string()));
        assert_eq!(optional_string_arg(&input, "blank"), None);
        assert_eq!(optional_string_arg(&json!("bare"), "filename"), None);
    }
}
