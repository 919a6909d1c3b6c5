//! Pre-flight checks before expensive operations.
//!
//! Validates that required credentials and data are available before
//! starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::datasets::Dataset;
use crate::error::{LegeError, Result};
use crate::openai::MODEL_KEY_ENV;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Agent operations require the model credential.
    Agent,
    /// Database setup requires the source CSVs.
    Setup,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
/// The search credential is never required here; its absence only degrades
/// web search to the static fallback.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Agent => {
            check_model_token()?;
        }
        Operation::Setup => {
            check_datasets_dir(settings)?;
        }
    }
    Ok(())
}

/// Check if the model credential is configured.
fn check_model_token() -> Result<()> {
    match std::env::var(MODEL_KEY_ENV) {
        Ok(token) if !token.is_empty() => Ok(()),
        _ => Err(LegeError::Config(format!(
            "{} not set. Set it with: export {}='your_token'",
            MODEL_KEY_ENV, MODEL_KEY_ENV
        ))),
    }
}

/// Check that the datasets directory exists.
fn check_datasets_dir(settings: &Settings) -> Result<()> {
    let dir = settings.datasets_dir();
    if dir.is_dir() {
        Ok(())
    } else {
        Err(LegeError::Config(format!(
            "Datasets directory {} does not exist. Create it and place the {} CSV files there.",
            dir.display(),
            Dataset::all().len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_check_requires_datasets_dir() {
        let mut settings = Settings::default();
        settings.general.datasets_dir = "/nonexistent/lege-datasets".to_string();
        let err = check(Operation::Setup, &settings).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
