//! Web search tool backed by the Tavily API.
//!
//! Searches are restricted to the configured health topic. When no API key
//! is configured or the call fails, the tool degrades to a static
//! informational answer instead of failing the conversation turn.

use crate::config::Settings;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const DISCLAIMER: &str = "Disclaimer: this information is for educational purposes only. \
    Always consult healthcare professionals for medical advice.";

/// Environment variable holding the Tavily credential.
pub const TAVILY_KEY_ENV: &str = "TAVILY_API_KEY";

/// Hosted web search with a local fallback.
pub struct WebSearch {
    client: reqwest::Client,
    api_key: Option<String>,
    max_results: usize,
    topic: String,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    url: String,
}

impl WebSearch {
    /// Create a web search tool, reading the credential from the environment.
    pub fn from_settings(settings: &Settings) -> Self {
        let api_key = std::env::var(TAVILY_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty());

        Self {
            client: reqwest::Client::new(),
            api_key,
            max_results: settings.web_search.max_results,
            topic: settings.web_search.topic.clone(),
        }
    }

    /// Create a tool with no credential (always uses the fallback).
    pub fn without_credentials(settings: &Settings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: None,
            max_results: settings.web_search.max_results,
            topic: settings.web_search.topic.clone(),
        }
    }

    /// Whether a search credential is configured.
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search the web for general medical information.
    ///
    /// Never fails: API errors and missing credentials fall back to a
    /// static informational answer.
    pub async fn search(&self, query: &str) -> String {
        let Some(api_key) = &self.api_key else {
            debug!("No search credential configured, using fallback");
            return fallback_answer(query);
        };

        match self.search_tavily(api_key, query).await {
            Ok(Some(formatted)) => formatted,
            Ok(None) => format!("No web search results found for: {}", query),
            Err(e) => {
                warn!("Web search failed, using fallback: {}", e);
                fallback_answer(query)
            }
        }
    }

    async fn search_tavily(
        &self,
        api_key: &str,
        query: &str,
    ) -> reqwest::Result<Option<String>> {
        let body = serde_json::json!({
            "api_key": api_key,
            "query": format!("medical health {}", query),
            "topic": self.topic,
            "max_results": self.max_results,
            "search_depth": "advanced",
        });

        let response: TavilyResponse = self
            .client
            .post(TAVILY_ENDPOINT)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.results.is_empty() {
            return Ok(None);
        }

        let mut formatted = String::from("Web search results:\n\n");
        for (i, result) in response.results.iter().take(self.max_results).enumerate() {
            formatted.push_str(&format!("{}. {}\n{}\n", i + 1, result.title, result.content));
            if !result.url.is_empty() {
                formatted.push_str(&format!("Source: {}\n", result.url));
            }
            formatted.push('\n');
        }
        formatted.push_str(DISCLAIMER);

        Ok(Some(formatted))
    }
}

/// Static informational answer for when the search API is unavailable.
fn fallback_answer(query: &str) -> String {
    let canned: &[(&str, &str)] = &[
        (
            "heart disease",
            "Heart disease covers several conditions including coronary artery disease, \
             arrhythmias, and heart defects. Common symptoms include chest pain, \
             shortness of breath, and fatigue.",
        ),
        (
            "diabetes",
            "Diabetes is a group of metabolic disorders characterized by high blood sugar. \
             Type 1 and Type 2 are the most common forms. Symptoms include increased \
             thirst, frequent urination, and fatigue.",
        ),
        (
            "cancer",
            "Cancer is a group of diseases involving abnormal cell growth with potential \
             to invade other parts of the body. Early detection and treatment are crucial \
             for better outcomes.",
        ),
        (
            "symptoms",
            "Medical symptoms are subjective experiences that indicate the presence of \
             disease or injury. Always consult healthcare professionals for proper diagnosis.",
        ),
        (
            "treatment",
            "Medical treatments vary depending on the condition and should always be \
             prescribed and supervised by qualified healthcare professionals.",
        ),
    ];

    let query_lower = query.to_lowercase();
    for (keyword, answer) in canned {
        if query_lower.contains(keyword) {
            return format!("{}\n\n{}", answer, DISCLAIMER);
        }
    }

    format!(
        "Web search is unavailable. For detailed information about '{}', please consult \
         medical literature or healthcare professionals.\n\n{}",
        query, DISCLAIMER
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_without_credentials_returns_fallback() {
        let settings = Settings::default();
        let search = WebSearch::without_credentials(&settings);
        assert!(!search.has_credentials());

        let result = search.search("what are the symptoms of diabetes").await;
        assert!(result.contains("blood sugar"));
        assert!(result.contains("Disclaimer"));
    }

    #[test]
    fn test_fallback_keyword_match() {
        let answer = fallback_answer("How is heart disease treated?");
        assert!(answer.contains("coronary artery disease"));
    }

    #[test]
    fn test_fallback_unknown_topic() {
        let answer = fallback_answer("what is an MRI");
        assert!(answer.contains("unavailable"));
        assert!(answer.contains("Disclaimer"));
    }
}
