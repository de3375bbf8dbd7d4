//! Scout CLI entry point.

use anyhow::Result;
use clap::Parser;
use scout::cli::{commands, Cli, Commands};
use scout::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("scout={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute command
    match &cli.command {
        Commands::Research {
            query,
            provider,
            model,
            save,
            output,
            json,
        } => {
            let options = commands::ResearchOptions {
                query: query.clone(),
                provider: provider.clone(),
                model: model.clone(),
                save: *save,
                output: output.clone(),
                json: *json,
            };
            commands::run_research(options, settings).await?;
        }

        Commands::Tool { action } => {
            commands::run_tool(action, &settings).await?;
        }

        Commands::Tools => {
            commands::run_list_tools(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, config_path)?;
        }
    }

    Ok(())
}
