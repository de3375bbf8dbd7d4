//! Scout - a minimal research assistant
//!
//! Sends a research query to a hosted language model that can call tools
//! (web search, Wikipedia lookup, save to file) and coerces its final answer
//! into a structured [`research::ResearchResponse`] with cited sources.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `research` - The response schema and its parser
//! - `tools` - Tool trait, registry and the three research tools
//! - `model` - Hosted chat models (Anthropic, OpenAI) behind one trait
//! - `agent` - Tool-calling loop
//! - `orchestrator` - One research request/response cycle
//!
//! # Example
//!
//! ```rust,no_run
//! use scout::config::Settings;
//! use scout::orchestrator::ResearchAssistant;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let assistant = ResearchAssistant::new(settings)?;
//!
//!     let outcome = assistant.research("How do tides work?").await?;
//!     println!("{}: {}", outcome.response.topic, outcome.response.summary);
//!     assistant.save(&outcome.response, None)?;
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod openai;
pub mod orchestrator;
pub mod research;
pub mod tools;

pub use error::{Result, ScoutError};
