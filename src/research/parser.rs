//! Schema-directed parsing of model output into a `ResearchResponse`.

use super::ResearchResponse;
use crate::error::{Result, ScoutError};
use regex::Regex;
use serde_json::json;

/// Maximum characters of raw output kept in a validation error.
const MAX_OUTPUT_IN_ERROR: usize = 500;

/// Parses free-text model output into a validated `ResearchResponse`.
pub struct ResearchParser {
    fence_regex: Regex,
}

impl ResearchParser {
    pub fn new() -> Self {
        let fence_regex =
            Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\r?\n?(.*?)```").expect("Invalid regex");

        Self { fence_regex }
    }

    /// JSON schema of the expected output.
    pub fn schema() -> serde_json::Value {
        json!({
            "title": "ResearchResponse",
            "type": "object",
            "properties": {
                "topic": {"title": "Topic", "type": "string"},
                "summary": {"title": "Summary", "type": "string"},
                "sources": {"title": "Sources", "type": "array", "items": {"type": "string"}},
                "tools_used": {"title": "Tools Used", "type": "array", "items": {"type": "string"}}
            },
            "required": ["topic", "summary", "sources", "tools_used"]
        })
    }

    /// Instructions embedded in the system prompt so the model answers in the expected shape.
    pub fn format_instructions(&self) -> String {
        let schema = serde_json::to_string(&Self::schema()).unwrap_or_default();

        format!(
            r#"The output should be formatted as a JSON instance that conforms to the JSON schema below.

As an example, for the schema {{"properties": {{"foo": {{"title": "Foo", "description": "a list of strings", "type": "array", "items": {{"type": "string"}}}}}}, "required": ["foo"]}}
the object {{"foo": ["bar", "baz"]}} is a well-formatted instance of the schema. The object {{"properties": {{"foo": ["bar", "baz"]}}}} is not well-formatted.

Here is the output schema:
```
{}
```"#,
            schema
        )
    }

    /// Parse model output into a `ResearchResponse`.
    ///
    /// Accepts bare JSON, JSON inside a fenced code block, or JSON surrounded by prose.
    pub fn parse(&self, text: &str) -> Result<ResearchResponse> {
        let json_str = self.extract_json(text).ok_or_else(|| {
            Self::validation_error("no JSON object found in model output", text)
        })?;

        serde_json::from_str::<ResearchResponse>(json_str)
            .map_err(|e| Self::validation_error(&e.to_string(), text))
    }

    fn extract_json<'a>(&self, text: &'a str) -> Option<&'a str> {
        let candidate = match self.fence_regex.captures(text).and_then(|c| c.get(1)) {
            Some(body) => body.as_str(),
            None => text,
        };

        let start = candidate.find('{')?;
        let end = candidate.rfind('}')?;
        (end > start).then(|| &candidate[start..=end])
    }

    fn validation_error(message: &str, output: &str) -> ScoutError {
        ScoutError::SchemaValidation {
            message: message.to_string(),
            output: output.chars().take(MAX_OUTPUT_IN_ERROR).collect(),
        }
    }
}

impl Default for ResearchParser {
    fn default() -> Self {
        Self::new()
    }
}
