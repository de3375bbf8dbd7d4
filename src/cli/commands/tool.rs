//! Direct tool invocation and tool listing.

use crate::cli::{Output, ToolAction};
use crate::config::Settings;
use crate::tools::ToolRegistry;
use anyhow::Result;
use serde_json::json;

/// Invoke one research tool without involving a model.
pub async fn run_tool(action: &ToolAction, settings: &Settings) -> Result<()> {
    let registry = ToolRegistry::research_defaults(&settings.tools, settings.output_file())?;

    let (name, input) = match action {
        ToolAction::Search { query } => ("search", json!({ "query": query })),
        ToolAction::Wikipedia { query } => ("wikipedia", json!({ "query": query })),
        ToolAction::Save { data, filename } => (
            "save_to_file",
            json!({ "data": data, "filename": filename }),
        ),
    };

    let spinner = Output::spinner(&format!("Running {}...", name));
    let result = registry.call(name, &input).await;
    spinner.finish_and_clear();

    match result {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("{} failed: {}", name, e));
            Err(e.into())
        }
    }
}

/// List the tools exposed to the model.
pub fn run_list_tools(settings: &Settings) -> Result<()> {
    let registry = ToolRegistry::research_defaults(&settings.tools, settings.output_file())?;

    Output::header(&format!("Tools ({})", registry.len()));
    for definition in registry.definitions() {
        Output::list_item(&definition.name);
        println!("    {}", definition.description);
    }

    Ok(())
}
