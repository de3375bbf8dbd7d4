//! Append research output to a local text file.

use super::{optional_string_arg, string_arg, Tool};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// File written when no filename is given.
pub const DEFAULT_OUTPUT_FILE: &str = "research_output.txt";

/// Local-time format used in block headers.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Build one output block.
pub fn format_block(data: &str, timestamp: &str) -> String {
    format!("# Research Output - {}\n\n{}", timestamp, data)
}

/// Append `data` to `filename` (default `research_output.txt`) under a timestamp header.
///
/// Blocks are appended verbatim with no separator; callers supply trailing
/// newlines if they want them.
pub fn save_to_file(data: &str, filename: Option<&Path>) -> Result<String> {
    save_in(Path::new(""), data, filename)
}

/// Resolve the target file against `base`. Absolute filenames ignore `base`.
fn target_path(base: &Path, filename: Option<&Path>) -> PathBuf {
    base.join(filename.unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_FILE)))
}

fn save_in(base: &Path, data: &str, filename: Option<&Path>) -> Result<String> {
    let path = target_path(base, filename);
    let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    file.write_all(format_block(data, &timestamp).as_bytes())?;

    info!("Appended {} bytes to {}", data.len(), path.display());
    Ok(format!("Research output saved to {}", path.display()))
}

/// The `save_to_file` tool.
pub struct SaveToFile {
    default_file: PathBuf,
}

impl SaveToFile {
    pub fn new(default_file: PathBuf) -> Self {
        Self { default_file }
    }
}

impl Default for SaveToFile {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_OUTPUT_FILE))
    }
}

#[async_trait]
impl Tool for SaveToFile {
    fn name(&self) -> &str {
        "save_to_file"
    }

    fn description(&self) -> &str {
        "Use this tool to save the research output to a file"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "data": {
                    "type": "string",
                    "description": "The text to save"
                },
                "filename": {
                    "type": "string",
                    "description": format!("Target file (default: {})", self.default_file.display())
                }
            },
            "required": ["data"]
        })
    }

    async fn call(&self, input: &Value) -> Result<String> {
        let data = string_arg(input, "data", self.name())?;
        let path = optional_string_arg(input, "filename")
            .map(PathBuf::from)
            .unwrap_or_else(|| self.default_file.clone());
        save_to_file(&data, Some(&path))
    }
}
