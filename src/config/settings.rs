//! Configuration settings for Scout.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub tools: ToolSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// File that research output is appended to.
    pub output_file: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            output_file: crate::tools::DEFAULT_OUTPUT_FILE.to_string(),
        }
    }
}

/// Hosted model provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// Anthropic Messages API (default).
    #[default]
    Anthropic,
    /// OpenAI chat completions.
    OpenAI,
}

impl ModelProvider {
    /// Environment variable holding the provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            ModelProvider::Anthropic => "ANTHROPIC_API_KEY",
            ModelProvider::OpenAI => "OPENAI_API_KEY",
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            ModelProvider::Anthropic => "claude-3-5-sonnet-20240620",
            ModelProvider::OpenAI => "gpt-4o-mini",
        }
    }
}

impl std::str::FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ModelProvider::Anthropic),
            "openai" | "gpt" => Ok(ModelProvider::OpenAI),
            _ => Err(format!("Unknown model provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelProvider::Anthropic => write!(f, "anthropic"),
            ModelProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Hosted model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Model provider (anthropic, openai).
    pub provider: ModelProvider,
    /// Model name. Empty means the provider's default.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens per completion (required by Anthropic).
    pub max_tokens: u32,
    /// Maximum model calls in one research run.
    pub max_iterations: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Override for the provider endpoint (Anthropic only).
    pub endpoint: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: ModelProvider::Anthropic,
            model: String::new(),
            temperature: 0.0,
            max_tokens: 4096,
            max_iterations: 10,
            timeout_secs: 120,
            endpoint: None,
        }
    }
}

impl ModelSettings {
    /// The configured model name, falling back to the provider default.
    pub fn model_name(&self) -> String {
        if self.model.trim().is_empty() {
            self.provider.default_model().to_string()
        } else {
            self.model.clone()
        }
    }
}

/// Settings for the tool registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ToolSettings {
    pub search: SearchSettings,
    pub wikipedia: WikipediaSettings,
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Maximum number of results returned to the model.
    pub max_results: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// DuckDuckGo region code (e.g. "wt-wt", "us-en").
    pub region: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 5,
            timeout_secs: 10,
            region: "wt-wt".to_string(),
        }
    }
}

/// Wikipedia lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WikipediaSettings {
    /// Number of pages to summarize.
    pub top_k_results: usize,
    /// Maximum characters returned to the model.
    pub doc_content_chars_max: usize,
    /// Wikipedia language edition.
    pub lang: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WikipediaSettings {
    fn default() -> Self {
        Self {
            top_k_results: 1,
            doc_content_chars_max: 100,
            lang: "en".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ScoutError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scout")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output file path.
    pub fn output_file(&self) -> PathBuf {
        Self::expand_path(&self.general.output_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.model.provider, ModelProvider::Anthropic);
        assert_eq!(settings.model.model_name(), "claude-3-5-sonnet-20240620");
        assert_eq!(settings.tools.wikipedia.top_k_results, 1);
        assert_eq!(settings.tools.wikipedia.doc_content_chars_max, 100);
        assert_eq!(settings.general.output_file, "research_output.txt");
    }

    #[test]
    fn test_partial_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [model]
            provider = "openai"
            max_iterations = 4

            [tools.search]
            max_results = 3
            "#,
        )
        .unwrap();

        assert_eq!(settings.model.provider, ModelProvider::OpenAI);
        assert_eq!(settings.model.model_name(), "gpt-4o-mini");
        assert_eq!(settings.model.max_iterations, 4);
        assert_eq!(settings.tools.search.max_results, 3);
        assert_eq!(settings.tools.search.timeout_secs, 10);
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Claude".parse::<ModelProvider>(), Ok(ModelProvider::Anthropic));
        assert_eq!("openai".parse::<ModelProvider>(), Ok(ModelProvider::OpenAI));
        assert!("mistral".parse::<ModelProvider>().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.model.model = "claude-3-haiku-20240307".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.model.model_name(), "claude-3-haiku-20240307");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.model.max_iterations, 10);
    }
}
