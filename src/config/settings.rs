//! Configuration settings for Lege.

use crate::datasets::Dataset;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub datasets: DatasetSettings,
    pub web_search: WebSearchSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for the generated SQLite databases.
    pub data_dir: String,
    /// Directory containing the source CSV datasets.
    pub datasets_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.lege/data".to_string(),
            datasets_dir: "~/.lege/datasets".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Hosted chat-completion model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Model name to use for the agent.
    pub model: String,
    /// OpenAI-compatible API base URL (defaults to GitHub Models).
    pub api_base: String,
    /// Sampling temperature (0.0-1.0).
    pub temperature: f32,
    /// Maximum tokens per completion.
    pub max_tokens: u32,
    /// Maximum tool-call rounds before the agent gives up.
    pub max_tool_rounds: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            api_base: "https://models.inference.ai.azure.com".to_string(),
            temperature: 0.2,
            max_tokens: 1000,
            max_tool_rounds: 5,
        }
    }
}

/// Per-dataset table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSettings {
    /// SQLite table name for this dataset.
    pub table_name: String,
    /// CSV file name within the datasets directory.
    pub csv_file: String,
}

impl TableSettings {
    /// Default table settings for a dataset.
    pub fn for_dataset(dataset: Dataset) -> Self {
        Self {
            table_name: dataset.key().to_string(),
            csv_file: dataset.default_csv_file().to_string(),
        }
    }
}

fn default_heart_disease() -> TableSettings {
    TableSettings::for_dataset(Dataset::HeartDisease)
}

fn default_cancer() -> TableSettings {
    TableSettings::for_dataset(Dataset::Cancer)
}

fn default_diabetes() -> TableSettings {
    TableSettings::for_dataset(Dataset::Diabetes)
}

fn default_max_rows() -> usize {
    50
}

/// Dataset and query execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSettings {
    #[serde(default = "default_heart_disease")]
    pub heart_disease: TableSettings,
    #[serde(default = "default_cancer")]
    pub cancer: TableSettings,
    #[serde(default = "default_diabetes")]
    pub diabetes: TableSettings,
    /// Maximum rows returned from a single query.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            heart_disease: default_heart_disease(),
            cancer: default_cancer(),
            diabetes: default_diabetes(),
            max_rows: default_max_rows(),
        }
    }
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchSettings {
    /// Maximum number of search results to include.
    pub max_results: usize,
    /// Tavily topic filter.
    pub topic: String,
}

impl Default for WebSearchSettings {
    fn default() -> Self {
        Self {
            max_results: 3,
            topic: "health".to_string(),
        }
    }
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

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::LegeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lege")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded datasets directory path.
    pub fn datasets_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.datasets_dir)
    }

    /// Table settings for a dataset.
    pub fn table(&self, dataset: Dataset) -> &TableSettings {
        match dataset {
            Dataset::HeartDisease => &self.datasets.heart_disease,
            Dataset::Cancer => &self.datasets.cancer,
            Dataset::Diabetes => &self.datasets.diabetes,
        }
    }

    /// Path to the SQLite file for a dataset.
    pub fn db_path(&self, dataset: Dataset) -> PathBuf {
        self.data_dir().join(format!("{}.db", dataset.key()))
    }

    /// Path to the source CSV for a dataset.
    pub fn csv_path(&self, dataset: Dataset) -> PathBuf {
        self.datasets_dir().join(&self.table(dataset).csv_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.llm.model, "gpt-4o");
        assert_eq!(settings.llm.max_tool_rounds, 5);
        assert_eq!(settings.datasets.heart_disease.table_name, "heart_disease");
        assert_eq!(settings.datasets.max_rows, 50);
        assert_eq!(settings.web_search.topic, "health");
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let toml_str = r#"
            [llm]
            model = "gpt-4o-mini"
            temperature = 0.5

            [datasets.cancer]
            table_name = "tumors"
            csv_file = "tumors.csv"
        "#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.llm.model, "gpt-4o-mini");
        assert_eq!(settings.llm.temperature, 0.5);
        // Unspecified keys keep their defaults
        assert_eq!(settings.llm.max_tokens, 1000);
        assert_eq!(settings.datasets.cancer.table_name, "tumors");
        assert_eq!(settings.datasets.diabetes.table_name, "diabetes");
        assert_eq!(settings.web_search.max_results, 3);
    }

    #[test]
    fn test_dataset_paths() {
        let settings = Settings::default();
        assert!(settings
            .db_path(Dataset::Cancer)
            .to_string_lossy()
            .ends_with("cancer.db"));
        assert!(settings
            .csv_path(Dataset::Diabetes)
            .to_string_lossy()
            .ends_with("diabetes.csv"));
    }
}
