//! CLI module for Scout.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Scout - a minimal research assistant
///
/// Asks a hosted language model a research question, lets it search the web and
/// Wikipedia, and returns a structured summary with cited sources.
#[derive(Parser, Debug)]
#[command(name = "scout")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a question and print a structured, cited summary
    Research {
        /// The research query (prompted for if omitted)
        query: Option<String>,

        /// Model provider to use (anthropic, openai)
        #[arg(short, long, env = "SCOUT_PROVIDER")]
        provider: Option<String>,

        /// Model to use
        #[arg(short, long, env = "SCOUT_MODEL")]
        model: Option<String>,

        /// Append the result to the output file
        #[arg(short, long)]
        save: bool,

        /// Output file for --save (default from config)
        #[arg(short, long)]
        output: Option<String>,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Invoke a single research tool directly
    Tool {
        #[command(subcommand)]
        action: ToolAction,
    },

    /// List the tools available to the model
    Tools,

    /// Check credentials and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ToolAction {
    /// Search the web
    Search {
        /// Search query
        query: String,
    },

    /// Look up a topic on Wikipedia
    Wikipedia {
        /// Topic to look up
        query: String,
    },

    /// Append text to the output file
    Save {
        /// Text to save
        data: String,

        /// Target file (default from config)
        #[arg(short, long)]
        filename: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_research_command() {
        let cli = Cli::parse_from(["scout", "-vv", "research", "why is the sky blue", "--save"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Research { query, save, json, .. } => {
                assert_eq!(query.as_deref(), Some("why is the sky blue"));
                assert!(save);
                assert!(!json);
            }
            other => panic!("Expected Research command, got {:?}", other),
        }
    }

    #[test]
    fn test_research_overrides_from_env() {
        std::env::set_var("SCOUT_PROVIDER", "openai");
        std::env::set_var("SCOUT_MODEL", "gpt-4o");
        let from_env = Cli::parse_from(["scout", "research", "tides"]);
        let from_flag = Cli::parse_from(["scout", "research", "tides", "-p", "anthropic"]);
        std::env::remove_var("SCOUT_PROVIDER");
        std::env::remove_var("SCOUT_MODEL");

        match from_env.command {
            Commands::Research { provider, model, .. } => {
                assert_eq!(provider.as_deref(), Some("openai"));
                assert_eq!(model.as_deref(), Some("gpt-4o"));
            }
            other => panic!("Expected Research command, got {:?}", other),
        }
        match from_flag.command {
            Commands::Research { provider, .. } => {
                assert_eq!(provider.as_deref(), Some("anthropic"));
            }
            other => panic!("Expected Research command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_tool_save() {
        let cli = Cli::parse_from(["scout", "tool", "save", "notes", "-f", "out.txt"]);
        match cli.command {
            Commands::Tool {
                action: ToolAction::Save { data, filename },
            } => {
                assert_eq!(data, "notes");
                assert_eq!(filename.as_deref(), Some("out.txt"));
            }
            other => panic!("Expected tool save command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
