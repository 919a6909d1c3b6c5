//! Chat-completion model abstraction.
//!
//! The agent loop talks to a `ChatModel` rather than the OpenAI client
//! directly, so tests can drive it with a scripted stub.

use super::{ToolCallRequest, Turn};
use crate::config::Settings;
use crate::error::{LegeError, Result};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall,
};
use async_openai::Client;
use async_trait::async_trait;

/// One model reply: either a final message, tool calls, or both.
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

/// A hosted chat-completion model configured for tool use.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion over the conversation so far.
    async fn complete(&self, turns: &[Turn], tools: &[ChatCompletionTool]) -> Result<ModelReply>;
}

/// OpenAI-compatible implementation (GitHub Models endpoint by default).
pub struct OpenAiChatModel {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiChatModel {
    /// Create a model client from configuration.
    ///
    /// Fails if the model credential is not configured; the agent cannot
    /// operate without it.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            client: create_client(&settings.llm.api_base)?,
            model: settings.llm.model.clone(),
            temperature: settings.llm.temperature,
            max_tokens: settings.llm.max_tokens,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, turns: &[Turn], tools: &[ChatCompletionTool]) -> Result<ModelReply> {
        let messages = turns
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .tools(tools.to_vec())
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| LegeError::Agent(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LegeError::OpenAI(format!("Chat API error: {}", e)))?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| LegeError::Agent("No response from model".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCallRequest {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        Ok(ModelReply {
            content: choice.message.content.clone(),
            tool_calls,
        })
    }
}

/// Convert an owned turn into the OpenAI request message type.
fn to_request_message(turn: &Turn) -> Result<ChatCompletionRequestMessage> {
    let agent_err = |e: async_openai::error::OpenAIError| LegeError::Agent(e.to_string());

    match turn {
        Turn::System { content } => Ok(ChatCompletionRequestSystemMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(agent_err)?
            .into()),

        Turn::User { content } => Ok(ChatCompletionRequestUserMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(agent_err)?
            .into()),

        Turn::Assistant {
            content,
            tool_calls,
        } => {
            let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(content) = content {
                builder.content(content.clone());
            }
            if !tool_calls.is_empty() {
                let calls: Vec<ChatCompletionMessageToolCall> = tool_calls
                    .iter()
                    .map(|call| ChatCompletionMessageToolCall {
                        id: call.id.clone(),
                        r#type: ChatCompletionToolType::Function,
                        function: FunctionCall {
                            name: call.name.clone(),
                            arguments: call.arguments.clone(),
                        },
                    })
                    .collect();
                builder.tool_calls(calls);
            }
            Ok(builder.build().map_err(agent_err)?.into())
        }

        Turn::Tool { call_id, content } => Ok(ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(call_id.clone())
            .content(content.clone())
            .build()
            .map_err(agent_err)?
            .into()),
    }
}
