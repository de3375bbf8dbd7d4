//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings, path: Option<PathBuf>) -> Result<()> {
    let config_path = path.unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                Output::warning(&format!(
                    "Config already exists at {}",
                    config_path.display()
                ));
                Output::info("Use --force to overwrite it with defaults.");
                return Ok(());
            }

            Settings::default().save_to(&config_path)?;
            Output::success(&format!("Wrote default config to {}", config_path.display()));
            Output::info("API keys are read from the environment, not this file.");
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_and_respects_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        run_config(&ConfigAction::Init { force: false }, Settings::default(), Some(path.clone()))
            .unwrap();
        assert!(path.exists());

        std::fs::write(&path, "[model]\nmax_iterations = 3\n").unwrap();
        run_config(&ConfigAction::Init { force: false }, Settings::default(), Some(path.clone()))
            .unwrap();
        let kept = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(kept.model.max_iterations, 3);

        run_config(&ConfigAction::Init { force: true }, Settings::default(), Some(path.clone()))
            .unwrap();
        let reset = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(reset.model.max_iterations, 10);
    }
}
