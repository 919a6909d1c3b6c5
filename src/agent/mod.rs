//! Agent module: conversation model, chat-model seam, and the tool loop.

mod model;
mod runner;

pub use model::{ChatModel, ModelReply, OpenAiChatModel};
pub use runner::{trim_history, Agent, AgentResponse, ToolCallRecord};

use serde::{Deserialize, Serialize};

/// A tool call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Call id assigned by the model, echoed back in the tool turn.
    pub id: String,
    pub name: String,
    /// Raw JSON arguments as supplied by the model.
    pub arguments: String,
}

/// One message unit in a conversation. Histories are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Turn {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(default)]
        tool_calls: Vec<ToolCallRequest>,
    },
    Tool {
        call_id: String,
        content: String,
    },
}

impl Turn {
    /// Role name for logging and display.
    pub fn role(&self) -> &'static str {
        match self {
            Turn::System { .. } => "system",
            Turn::User { .. } => "user",
            Turn::Assistant { .. } => "assistant",
            Turn::Tool { .. } => "tool",
        }
    }
}
