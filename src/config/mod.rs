//! Configuration module for Lege.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    DatasetSettings, GeneralSettings, LlmSettings, Settings, TableSettings, WebSearchSettings,
};
