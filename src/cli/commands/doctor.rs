//! Doctor command - verify credentials and configuration.

use crate::cli::Output;
use crate::config::{ModelProvider, Settings};
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Scout Doctor");
    println!();
    println!("Checking credentials and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Configuration").bold());
    for provider in [ModelProvider::Anthropic, ModelProvider::OpenAI] {
        let check = check_api_key(provider, std::env::var(provider.api_key_var()).ok(), settings);
        check.print();
        checks.push(check);
    }

    println!();

    println!("{}", style("Files").bold());
    let file_checks = vec![
        check_config_file(&Settings::default_config_path()),
        check_output_file(&settings.output_file()),
    ];
    for check in &file_checks {
        check.print();
    }
    checks.extend(file_checks);

    if let Some(dir) = &settings.prompts.custom_dir {
        let check = check_prompts_dir(&Settings::expand_path(dir));
        check.print();
        checks.push(check);
    }

    println!();

    println!("{}", style("Model").bold());
    Output::kv("Provider", &settings.model.provider.to_string());
    Output::kv("Model", &settings.model.model_name());
    Output::kv("Max iterations", &settings.model.max_iterations.to_string());

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Scout.",
            errors
        ));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Scout is ready to use.");
    }

    Ok(())
}

/// Check a provider's API key. Missing keys are only errors for the configured provider.
fn check_api_key(provider: ModelProvider, key: Option<String>, settings: &Settings) -> CheckResult {
    let var = provider.api_key_var();
    let required = settings.model.provider == provider;
    let hint = format!("Set {} in your environment or a .env file", var);

    match key {
        Some(key) if !key.is_empty() => {
            CheckResult::ok(var, &format!("configured ({})", mask_key(&key)))
        }
        Some(_) if required => CheckResult::error(var, "empty", &hint),
        None if required => CheckResult::error(var, "not set", &hint),
        _ => CheckResult::warning(
            var,
            "not set",
            &format!("Only needed with --provider {}", provider),
        ),
    }
}

/// Show only the start and end of a secret.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "***".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: scout config init",
        )
    }
}

/// Check that the output file can be created or appended to.
fn check_output_file(path: &Path) -> CheckResult {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    if path.exists() {
        let readonly = std::fs::metadata(path)
            .map(|m| m.permissions().readonly())
            .unwrap_or(true);
        if readonly {
            CheckResult::error(
                "Output file",
                &format!("{} is not writable", path.display()),
                "Fix permissions or set general.output_file",
            )
        } else {
            CheckResult::ok("Output file", &format!("{}", path.display()))
        }
    } else if parent.is_dir() {
        CheckResult::ok(
            "Output file",
            &format!("{} (will be created)", path.display()),
        )
    } else {
        CheckResult::error(
            "Output file",
            &format!("directory {} does not exist", parent.display()),
            "Create the directory or set general.output_file",
        )
    }
}

/// Check the custom prompts directory.
fn check_prompts_dir(dir: &Path) -> CheckResult {
    if !dir.is_dir() {
        return CheckResult::warning(
            "Custom prompts",
            &format!("{} not found", dir.display()),
            "Default prompts will be used",
        );
    }

    if dir.join("research.toml").exists() {
        CheckResult::ok("Custom prompts", &format!("{}", dir.display()))
    } else {
        CheckResult::warning(
            "Custom prompts",
            &format!("no research.toml in {}", dir.display()),
            "Default prompts will be used",
        )
    }
}
