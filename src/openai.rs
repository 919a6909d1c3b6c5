//! OpenAI-compatible client configuration.
//!
//! The agent talks to the GitHub Models endpoint (OpenAI wire format) by
//! default; the base URL is configurable for other compatible hosts.

use crate::error::{LegeError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Environment variable holding the model credential.
pub const MODEL_KEY_ENV: &str = "GITHUB_TOKEN";

/// Default timeout for model API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create a chat-completion client against the given API base.
///
/// Fails if the model credential is missing. Uses a 5-minute request
/// timeout to prevent hung API calls.
pub fn create_client(api_base: &str) -> Result<Client<OpenAIConfig>> {
    let token = std::env::var(MODEL_KEY_ENV)
        .ok()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            LegeError::Config(format!(
                "{} not set. Set it with: export {}='your_token'",
                MODEL_KEY_ENV, MODEL_KEY_ENV
            ))
        })?;

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()?;

    let config = OpenAIConfig::new()
        .with_api_base(api_base)
        .with_api_key(token);

    Ok(Client::with_config(config).with_http_client(http_client))
}
