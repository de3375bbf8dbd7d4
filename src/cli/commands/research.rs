//! Research command implementation.

use crate::cli::output::truncate;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{ModelProvider, Settings};
use crate::error::ScoutError;
use crate::orchestrator::ResearchAssistant;
use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Options for a research run.
#[derive(Debug, Default)]
pub struct ResearchOptions {
    pub query: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub save: bool,
    pub output: Option<String>,
    pub json: bool,
}

/// Run the research command.
pub async fn run_research(options: ResearchOptions, mut settings: Settings) -> Result<()> {
    apply_overrides(&mut settings, options.provider.as_deref(), options.model)?;

    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Research(settings.model.provider)) {
        Output::error(&format!("{}", e));
        Output::info("Run 'scout doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let query = match options.query {
        Some(q) => q,
        None => prompt_for_query()?,
    };

    let assistant = ResearchAssistant::new(settings)?;

    let spinner = Output::spinner("Researching...");

    let outcome = match assistant.research(&query).await {
        Ok(outcome) => {
            spinner.finish_and_clear();
            outcome
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Research failed: {}", e));
            if matches!(e, ScoutError::SchemaValidation { .. }) {
                Output::info("The model did not answer in the expected format.");
            }
            return Err(e.into());
        }
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcome.response)?);
    } else {
        Output::research_response(&outcome.response);

        if !outcome.tool_calls.is_empty() {
            Output::header(&format!("Tool calls ({})", outcome.tool_calls.len()));
            for call in &outcome.tool_calls {
                Output::info(&format!("  {} {}", call.name, truncate(&call.arguments, 60)));
            }
            println!();
        }

        Output::info(&format!("Completed in {} iteration(s)", outcome.iterations));
    }

    if options.save {
        let path = options.output.map(|p| Settings::expand_path(&p));
        let message = assistant.save(&outcome.response, path.as_deref())?;
        // Keep stdout clean for --json.
        if options.json {
            eprintln!("{}", message);
        } else {
            Output::success(&message);
        }
    }

    Ok(())
}

/// Apply command-line provider and model overrides.
///
/// Switching provider without naming a model resets to that provider's default model.
fn apply_overrides(
    settings: &mut Settings,
    provider: Option<&str>,
    model: Option<String>,
) -> Result<()> {
    if let Some(provider) = provider {
        let provider: ModelProvider = provider.parse().map_err(anyhow::Error::msg)?;
        if provider != settings.model.provider {
            settings.model.model.clear();
        }
        settings.model.provider = provider;
    }

    if let Some(model) = model {
        settings.model.model = model;
    }

    Ok(())
}

/// Ask for a query on stdin.
fn prompt_for_query() -> Result<String> {
    print!("What can I help you research? ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read query from stdin")?;
    Ok(line.trim().to_string())
}
