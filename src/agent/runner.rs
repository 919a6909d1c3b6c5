//! Agent runner with tool calling loop.
//!
//! The loop is a dispatcher: the hosted model decides which tool to call and
//! with what arguments, the loop executes it and feeds the result back as a
//! tool turn, until the model emits a final answer or the round bound hits.

use super::{ChatModel, OpenAiChatModel, ToolCallRequest, Turn};
use crate::config::Settings;
use crate::error::{LegeError, Result};
use crate::tools::{parse_tool_call, tool_definitions, ToolContext};
use async_openai::types::ChatCompletionTool;
use std::sync::Arc;
use tracing::{debug, info};

/// System prompt establishing the tool-routing rules.
const SYSTEM_PROMPT: &str = r#"You are a medical AI assistant with access to three medical datasets and a web search tool.

Routing rules:
- Use the database tools (query_heart_disease, query_cancer, query_diabetes) for questions about statistics, data, or numbers: averages, counts, percentages, and any other numerical analysis of patient data. Write a single SQLite SELECT statement against the table described in the tool.
- Use web_search for general medical knowledge: definitions, symptoms, treatments, causes, prevention.

Analyze the question type first, then route accordingly. When a query returns data, include the actual numbers in your answer. Always remind users to consult healthcare professionals for personal medical advice."#;

/// Agent that alternates between model inference and tool execution.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: ToolContext,
    tool_specs: Vec<ChatCompletionTool>,
    max_rounds: usize,
}

impl Agent {
    /// Create an agent from explicit components.
    pub fn new(
        model: Arc<dyn ChatModel>,
        tools: ToolContext,
        tool_specs: Vec<ChatCompletionTool>,
        max_rounds: usize,
    ) -> Self {
        Self {
            model,
            tools,
            tool_specs,
            max_rounds,
        }
    }

    /// Create an agent wired to the configured hosted model and tools.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let model = Arc::new(OpenAiChatModel::from_settings(settings)?);
        let tools = ToolContext::from_settings(settings);
        Ok(Self::new(
            model,
            tools,
            tool_definitions(settings),
            settings.llm.max_tool_rounds,
        ))
    }

    /// Seed a fresh conversation history.
    pub fn new_conversation(&self) -> Vec<Turn> {
        vec![Turn::System {
            content: SYSTEM_PROMPT.to_string(),
        }]
    }

    /// Process one user message, appending all produced turns to `history`.
    ///
    /// Tool failures become error-content tool turns and the loop continues;
    /// a failing model call propagates and ends the turn.
    pub async fn respond(
        &self,
        history: &mut Vec<Turn>,
        user_input: &str,
    ) -> Result<AgentResponse> {
        history.push(Turn::User {
            content: user_input.to_string(),
        });

        let mut rounds = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            rounds += 1;
            if rounds > self.max_rounds {
                return Err(LegeError::Agent(format!(
                    "Agent exceeded maximum tool rounds ({})",
                    self.max_rounds
                )));
            }

            debug!("Agent round {}, {} turns", rounds, history.len());

            let reply = self.model.complete(history, &self.tool_specs).await?;

            if reply.tool_calls.is_empty() {
                let content = reply.content.unwrap_or_default();
                history.push(Turn::Assistant {
                    content: Some(content.clone()),
                    tool_calls: Vec::new(),
                });
                return Ok(AgentResponse {
                    content,
                    tool_calls: tool_calls_made,
                    rounds,
                });
            }

            // Record the assistant turn with its tool calls, then insert one
            // tool turn per call, preserving order.
            history.push(Turn::Assistant {
                content: reply.content.clone(),
                tool_calls: reply.tool_calls.clone(),
            });

            for call in &reply.tool_calls {
                let record = self.execute_tool_call(call).await;
                history.push(Turn::Tool {
                    call_id: call.id.clone(),
                    content: record.result.clone(),
                });
                tool_calls_made.push(record);
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, call: &ToolCallRequest) -> ToolCallRecord {
        info!("Agent calling tool: {} with args: {}", call.name, call.arguments);

        let result = match parse_tool_call(&call.name, &call.arguments) {
            Ok(tool) => match self.tools.execute(&tool).await {
                Ok(output) => output,
                Err(e) => format!("Tool error: {}", e),
            },
            Err(e) => format!("Failed to parse tool call: {}", e),
        };

        ToolCallRecord {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            result,
        }
    }
}

/// Response from one agent turn.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final assistant message.
    pub content: String,
    /// Record of all tool calls made during this turn.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of model rounds used.
    pub rounds: usize,
}

/// Record of a tool call made by the agent, kept for UI transparency.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    pub name: String,
    /// JSON arguments as supplied by the model.
    pub arguments: String,
    /// Raw result or error string fed back to the model.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

/// Trim a conversation history to keep it manageable, preserving the
/// system turn.
pub fn trim_history(history: &mut Vec<Turn>, max_turns: usize) {
    if history.len() > max_turns {
        let start = history.len() - (max_turns - 1);
        let mut trimmed = vec![history[0].clone()];
        trimmed.extend(history[start..].iter().cloned());
        *history = trimmed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ModelReply;
    use crate::datasets::{Dataset, DatasetStore};
    use crate::tools::WebSearch;
    use async_trait::async_trait;
    use rusqlite::Connection;
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Chat model stub that plays back scripted replies.
    struct StubModel {
        replies: Mutex<VecDeque<ModelReply>>,
    }

    impl StubModel {
        fn new(replies: Vec<ModelReply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
            })
        }
    }

    #[async_trait]
    impl ChatModel for StubModel {
        async fn complete(
            &self,
            _turns: &[Turn],
            _tools: &[ChatCompletionTool],
        ) -> Result<ModelReply> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LegeError::Agent("Stub script exhausted".to_string()))
        }
    }

    fn final_reply(content: &str) -> ModelReply {
        ModelReply {
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
        }
    }

    fn tool_reply(id: &str, name: &str, arguments: &str) -> ModelReply {
        ModelReply {
            content: None,
            tool_calls: vec![ToolCallRequest {
                id: id.to_string(),
                name: name.to_string(),
                arguments: arguments.to_string(),
            }],
        }
    }

    /// Tool context over a small heart disease fixture; the other two
    /// datasets point at nothing, web search runs without credentials.
    fn fixture_tools(dir: &std::path::Path) -> ToolContext {
        let db_path = dir.join("heart_disease.db");
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE heart_disease (age INTEGER, target INTEGER);
            INSERT INTO heart_disease VALUES (63, 1);
            INSERT INTO heart_disease VALUES (67, 1);
            INSERT INTO heart_disease VALUES (41, 0);
            INSERT INTO heart_disease VALUES (71, 1);
            "#,
        )
        .unwrap();
        drop(conn);

        let settings = Settings::default();
        ToolContext::new(
            DatasetStore::new(Dataset::HeartDisease, db_path, 50),
            DatasetStore::new(Dataset::Cancer, PathBuf::from("/nonexistent/cancer.db"), 50),
            DatasetStore::new(Dataset::Diabetes, PathBuf::from("/nonexistent/diabetes.db"), 50),
            WebSearch::without_credentials(&settings),
        )
    }

    fn test_agent(model: Arc<dyn ChatModel>, tools: ToolContext, max_rounds: usize) -> Agent {
        Agent::new(model, tools, tool_definitions(&Settings::default()), max_rounds)
    }

    #[tokio::test]
    async fn test_web_only_query_touches_no_database() {
        let dir = tempfile::tempdir().unwrap();
        let model = StubModel::new(vec![
            tool_reply("call_1", "web_search", r#"{"query": "symptoms of diabetes"}"#),
            final_reply("Common symptoms include increased thirst and fatigue."),
        ]);
        let agent = test_agent(model, fixture_tools(dir.path()), 5);

        let mut history = agent.new_conversation();
        let response = agent
            .respond(&mut history, "What are the symptoms of diabetes?")
            .await
            .unwrap();

        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "web_search");
        assert!(response
            .tool_calls
            .iter()
            .all(|c| !c.name.starts_with("query_")));
    }

    #[tokio::test]
    async fn test_turn_order_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let model = StubModel::new(vec![
            tool_reply("call_1", "web_search", r#"{"query": "heart disease"}"#),
            final_reply("done"),
        ]);
        let agent = test_agent(model, fixture_tools(dir.path()), 5);

        let mut history = agent.new_conversation();
        agent.respond(&mut history, "hello").await.unwrap();

        let roles: Vec<_> = history.iter().map(|t| t.role()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "tool", "assistant"]);

        // The tool turn echoes the call id from the triggering assistant turn
        match (&history[2], &history[3]) {
            (Turn::Assistant { tool_calls, .. }, Turn::Tool { call_id, .. }) => {
                assert_eq!(&tool_calls[0].id, call_id);
            }
            _ => panic!("Unexpected turn types"),
        }
    }

    #[tokio::test]
    async fn test_count_scenario_flows_to_answer() {
        let dir = tempfile::tempdir().unwrap();
        let model = StubModel::new(vec![
            tool_reply(
                "call_1",
                "query_heart_disease",
                r#"{"sql": "SELECT COUNT(*) AS n FROM heart_disease WHERE age > 60 AND target = 1"}"#,
            ),
            final_reply("There are 3 heart disease patients over 60."),
        ]);
        let agent = test_agent(model, fixture_tools(dir.path()), 5);

        let mut history = agent.new_conversation();
        let response = agent
            .respond(&mut history, "How many heart disease patients are over 60?")
            .await
            .unwrap();

        // The fixture count reached the tool turn and the final answer
        assert!(response.tool_calls[0].result.contains("3"));
        assert!(response.content.contains("3"));
        assert_eq!(response.rounds, 2);
    }

    #[tokio::test]
    async fn test_tool_failure_does_not_end_turn() {
        let dir = tempfile::tempdir().unwrap();
        let model = StubModel::new(vec![
            tool_reply(
                "call_1",
                "query_heart_disease",
                r#"{"sql": "SELECT frm heart_disease"}"#,
            ),
            final_reply("The query failed, let me rephrase."),
        ]);
        let agent = test_agent(model, fixture_tools(dir.path()), 5);

        let mut history = agent.new_conversation();
        let response = agent.respond(&mut history, "count rows").await.unwrap();

        assert!(response.tool_calls[0].result.starts_with("Query failed:"));
        assert_eq!(response.content, "The query failed, let me rephrase.");
    }

    #[tokio::test]
    async fn test_unparseable_tool_call_becomes_error_turn() {
        let dir = tempfile::tempdir().unwrap();
        let model = StubModel::new(vec![
            tool_reply("call_1", "query_cancer", "{}"),
            final_reply("ok"),
        ]);
        let agent = test_agent(model, fixture_tools(dir.path()), 5);

        let mut history = agent.new_conversation();
        let response = agent.respond(&mut history, "count").await.unwrap();

        assert!(response.tool_calls[0]
            .result
            .contains("Failed to parse tool call"));
    }

    #[tokio::test]
    async fn test_max_rounds_bound() {
        let dir = tempfile::tempdir().unwrap();
        let looping = (0..3)
            .map(|i| {
                tool_reply(
                    &format!("call_{}", i),
                    "web_search",
                    r#"{"query": "again"}"#,
                )
            })
            .collect();
        let agent = StubModel::new(looping);
        let agent = test_agent(agent, fixture_tools(dir.path()), 3);

        let mut history = agent.new_conversation();
        let err = agent.respond(&mut history, "loop").await.unwrap_err();
        assert!(err.to_string().contains("maximum tool rounds"));
    }

    #[test]
    fn test_trim_history_keeps_system_turn() {
        let mut history = vec![Turn::System {
            content: "sys".to_string(),
        }];
        for i in 0..20 {
            history.push(Turn::User {
                content: format!("msg {}", i),
            });
        }

        trim_history(&mut history, 5);

        assert_eq!(history.len(), 5);
        assert_eq!(history[0].role(), "system");
        match &history[4] {
            Turn::User { content } => assert_eq!(content, "msg 19"),
            _ => panic!("Expected user turn"),
        }
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "web_search".to_string(),
            arguments: r#"{"query": "test"}"#.to_string(),
            result: "Found results".to_string(),
        };
        assert_eq!(format!("{}", record), r#"web_search({"query": "test"})"#);
    }
}
