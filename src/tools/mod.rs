//! Tool definitions and implementations for the agent.
//!
//! Four tools are exposed to the hosted model: one read-only SQL executor
//! per medical dataset, and a health-topic web search. Which tool runs, and
//! with what arguments, is entirely the model's decision.

mod web_search;

pub use web_search::{WebSearch, TAVILY_KEY_ENV};

use crate::config::Settings;
use crate::datasets::{Dataset, DatasetStore};
use crate::error::{LegeError, Result};
use serde::{Deserialize, Serialize};

/// Available tools for the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Run a SELECT against the heart disease table.
    QueryHeartDisease { sql: String },

    /// Run a SELECT against the cancer table.
    QueryCancer { sql: String },

    /// Run a SELECT against the diabetes table.
    QueryDiabetes { sql: String },

    /// Search the web for general medical information.
    WebSearch { query: String },
}

impl ToolCall {
    /// Tool name as exposed to the model.
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::QueryHeartDisease { .. } => "query_heart_disease",
            ToolCall::QueryCancer { .. } => "query_cancer",
            ToolCall::QueryDiabetes { .. } => "query_diabetes",
            ToolCall::WebSearch { .. } => "web_search",
        }
    }
}

/// Tool execution context holding the three dataset stores and web search.
pub struct ToolContext {
    heart_disease: DatasetStore,
    cancer: DatasetStore,
    diabetes: DatasetStore,
    web_search: WebSearch,
}

impl ToolContext {
    /// Create a tool context from configuration.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            heart_disease: DatasetStore::from_settings(settings, Dataset::HeartDisease),
            cancer: DatasetStore::from_settings(settings, Dataset::Cancer),
            diabetes: DatasetStore::from_settings(settings, Dataset::Diabetes),
            web_search: WebSearch::from_settings(settings),
        }
    }

    /// Create a tool context from explicit components.
    pub fn new(
        heart_disease: DatasetStore,
        cancer: DatasetStore,
        diabetes: DatasetStore,
        web_search: WebSearch,
    ) -> Self {
        Self {
            heart_disease,
            cancer,
            diabetes,
            web_search,
        }
    }

    /// Execute a tool call and return the result as a string.
    ///
    /// Dataset query failures come back as `Ok` with an explanatory message
    /// (the model should see them); only unexpected conditions are errors.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::QueryHeartDisease { sql } => self.heart_disease.query(sql),
            ToolCall::QueryCancer { sql } => self.cancer.query(sql),
            ToolCall::QueryDiabetes { sql } => self.diabetes.query(sql),
            ToolCall::WebSearch { query } => Ok(self.web_search.search(query).await),
        }
    }
}

/// Description for one database tool, including the fixed schema so the
/// model can write SQL without a discovery round.
fn database_tool_description(settings: &Settings, dataset: Dataset) -> String {
    format!(
        "Run a read-only SQL SELECT against the {} dataset for statistics, counts, \
         averages, and other numerical analysis. The data lives in a single SQLite \
         table named '{}'. {}. Do not use this for general medical knowledge.",
        dataset.title().to_lowercase(),
        settings.table(dataset).table_name,
        dataset.schema_notes()
    )
}

/// Get OpenAI function/tool definitions for the agent.
pub fn tool_definitions(settings: &Settings) -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    let sql_parameters = serde_json::json!({
        "type": "object",
        "properties": {
            "sql": {
                "type": "string",
                "description": "A single SQLite SELECT statement"
            }
        },
        "required": ["sql"]
    });

    let database_tools = [
        ("query_heart_disease", Dataset::HeartDisease),
        ("query_cancer", Dataset::Cancer),
        ("query_diabetes", Dataset::Diabetes),
    ];

    let mut tools: Vec<ChatCompletionTool> = database_tools
        .into_iter()
        .map(|(name, dataset)| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: name.to_string(),
                description: Some(database_tool_description(settings, dataset)),
                parameters: Some(sql_parameters.clone()),
                strict: None,
            },
        })
        .collect();

    tools.push(ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: "web_search".to_string(),
            description: Some(
                "Search the web for general medical information: definitions, symptoms, \
                 treatments, causes, and prevention. Do not use this for statistics or \
                 numerical analysis of the datasets."
                    .to_string(),
            ),
            parameters: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Natural language medical question"
                    }
                },
                "required": ["query"]
            })),
            strict: None,
        },
    });

    tools
}

/// Parse a tool call from the OpenAI response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| LegeError::Agent(format!("Invalid tool arguments: {}", e)))?;

    let sql_arg = || -> Result<String> {
        args["sql"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| LegeError::Agent("Missing 'sql' argument".to_string()))
    };

    match name {
        "query_heart_disease" => Ok(ToolCall::QueryHeartDisease { sql: sql_arg()? }),
        "query_cancer" => Ok(ToolCall::QueryCancer { sql: sql_arg()? }),
        "query_diabetes" => Ok(ToolCall::QueryDiabetes { sql: sql_arg()? }),
        "web_search" => {
            let query = args["query"]
                .as_str()
                .ok_or_else(|| LegeError::Agent("Missing 'query' argument".to_string()))?
                .to_string();
            Ok(ToolCall::WebSearch { query })
        }
        _ => Err(LegeError::Agent(format!("Unknown tool: {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_database_tool() {
        let tool = parse_tool_call(
            "query_heart_disease",
            r#"{"sql": "SELECT COUNT(*) FROM heart_disease WHERE age > 60"}"#,
        )
        .unwrap();
        match tool {
            ToolCall::QueryHeartDisease { sql } => {
                assert!(sql.contains("age > 60"));
            }
            _ => panic!("Expected QueryHeartDisease tool"),
        }
    }

    #[test]
    fn test_parse_web_search_tool() {
        let tool =
            parse_tool_call("web_search", r#"{"query": "symptoms of diabetes"}"#).unwrap();
        match tool {
            ToolCall::WebSearch { query } => assert_eq!(query, "symptoms of diabetes"),
            _ => panic!("Expected WebSearch tool"),
        }
    }

    #[test]
    fn test_parse_unknown_tool() {
        let err = parse_tool_call("drop_tables", "{}").unwrap_err();
        assert!(err.to_string().contains("Unknown tool"));
    }

    #[test]
    fn test_parse_missing_argument() {
        let err = parse_tool_call("query_cancer", "{}").unwrap_err();
        assert!(err.to_string().contains("Missing 'sql'"));
    }

    #[test]
    fn test_definitions_carry_schema() {
        let settings = Settings::default();
        let tools = tool_definitions(&settings);
        assert_eq!(tools.len(), 4);

        let heart = &tools[0].function;
        assert_eq!(heart.name, "query_heart_disease");
        let description = heart.description.as_deref().unwrap_or_default();
        assert!(description.contains("heart_disease"));
        assert!(description.contains("trestbps"));
    }
}
