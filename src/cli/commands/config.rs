//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let updated = apply_set(&settings, key, value)?;
            updated.save()?;
            Output::success(&format!("Set {} = {}", key, value));
            Output::info(&format!(
                "Saved to {}",
                Settings::default_config_path().display()
            ));
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();

            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save()?;
                Output::info(&format!(
                    "Created default config at {}",
                    config_path.display()
                ));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {}", config_path.display()));
                }
            }
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Apply one `section.key = value` update, returning the new settings.
///
/// The value string is coerced to the type the key already has; unknown
/// keys and whole sections are rejected.
fn apply_set(settings: &Settings, key: &str, value: &str) -> Result<Settings> {
    let mut root = toml::Value::try_from(settings)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    let (path, last) = key.rsplit_once('.').ok_or_else(|| {
        anyhow::anyhow!("Key must be of the form section.key (e.g. 'llm.model'), got '{}'", key)
    })?;

    let mut node = &mut root;
    for part in path.split('.') {
        node = node
            .get_mut(part)
            .ok_or_else(|| anyhow::anyhow!("Unknown config section '{}'", part))?;
    }

    let table = node
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("'{}' is not a config section", path))?;

    let new_value = match table.get(last) {
        Some(toml::Value::String(_)) => toml::Value::String(value.to_string()),
        Some(toml::Value::Integer(_)) => toml::Value::Integer(value.parse().map_err(|_| {
            anyhow::anyhow!("'{}' expects an integer, got '{}'", key, value)
        })?),
        Some(toml::Value::Float(_)) => toml::Value::Float(value.parse().map_err(|_| {
            anyhow::anyhow!("'{}' expects a number, got '{}'", key, value)
        })?),
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(value.parse().map_err(|_| {
            anyhow::anyhow!("'{}' expects true or false, got '{}'", key, value)
        })?),
        Some(_) => return Err(anyhow::anyhow!("'{}' is not a settable value", key)),
        None => return Err(anyhow::anyhow!("Unknown config key '{}'", key)),
    };

    table.insert(last.to_string(), new_value);

    root.try_into()
        .map_err(|e| anyhow::anyhow!("Invalid value for '{}': {}", key, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_string_value() {
        let settings = Settings::default();
        let updated = apply_set(&settings, "llm.model", "gpt-4o-mini").unwrap();
        assert_eq!(updated.llm.model, "gpt-4o-mini");
        // Untouched keys keep their values
        assert_eq!(updated.llm.max_tokens, settings.llm.max_tokens);
    }

    #[test]
    fn test_set_coerces_to_existing_type() {
        let settings = Settings::default();
        let updated = apply_set(&settings, "datasets.max_rows", "100").unwrap();
        assert_eq!(updated.datasets.max_rows, 100);

        let updated = apply_set(&settings, "llm.temperature", "0.7").unwrap();
        assert!((updated.llm.temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_set_nested_table_key() {
        let settings = Settings::default();
        let updated = apply_set(&settings, "datasets.cancer.table_name", "tumors").unwrap();
        assert_eq!(updated.datasets.cancer.table_name, "tumors");
    }

    #[test]
    fn test_set_unknown_key_rejected() {
        let settings = Settings::default();
        assert!(apply_set(&settings, "llm.nope", "x").is_err());
        assert!(apply_set(&settings, "nope.model", "x").is_err());
    }

    #[test]
    fn test_set_type_mismatch_rejected() {
        let settings = Settings::default();
        let err = apply_set(&settings, "datasets.max_rows", "many").unwrap_err();
        assert!(err.to_string().contains("integer"));
    }

    #[test]
    fn test_set_whole_section_rejected() {
        let settings = Settings::default();
        assert!(apply_set(&settings, "llm", "x").is_err());
    }
}
