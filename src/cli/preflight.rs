//! Pre-flight checks before calling hosted services.
//!
//! Validates that credentials are available before starting operations that
//! would otherwise fail midway.

use crate::config::ModelProvider;
use crate::error::{Result, ScoutError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Research requires the model provider's API key.
    Research(ModelProvider),
    /// Direct tool calls need no credentials.
    Tool,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Research(provider) => check_api_key(provider),
        Operation::Tool => Ok(()),
    }
}

/// Check if the provider's API key is configured.
pub fn check_api_key(provider: ModelProvider) -> Result<()> {
    let var = provider.api_key_var();
    match std::env::var(var) {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(ScoutError::Config(format!(
            "{} is empty. Set it in your environment or a .env file.",
            var
        ))),
        Err(_) => Err(ScoutError::Config(format!(
            "{} not set. Set it in your environment or a .env file.",
            var
        ))),
    }
}
