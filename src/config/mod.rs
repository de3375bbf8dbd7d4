//! Configuration module for Scout.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, ResearchPrompts};
pub use settings::{
    GeneralSettings, ModelProvider, ModelSettings, PromptSettings, SearchSettings, Settings,
    ToolSettings, WikipediaSettings,
};
