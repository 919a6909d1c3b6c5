//! Web chat UI and JSON API.
//!
//! Serves an embedded chat page at `/` and a session-based chat endpoint at
//! `/api/chat`. Sessions live in memory for the lifetime of the process.

use crate::agent::{Agent, Turn};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Shared application state.
struct AppState {
    agent: Agent,
    sessions: Mutex<HashMap<Uuid, Vec<Turn>>>,
}

/// Run the web chat server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Agent, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'lege doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let agent = Agent::from_settings(&settings)?;

    let state = Arc::new(AppState {
        agent,
        sessions: Mutex::new(HashMap::new()),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(chat_page))
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Lege Web Chat");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Chat UI", "GET  /");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat API", "POST /api/chat");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ChatRequest {
    /// Existing session to continue; omit to start a new one.
    #[serde(default)]
    session_id: Option<Uuid>,
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    session_id: Uuid,
    answer: String,
    tool_calls: Vec<ToolCallInfo>,
}

#[derive(Serialize)]
struct ToolCallInfo {
    name: String,
    arguments: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat_page() -> impl IntoResponse {
    Html(CHAT_PAGE)
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    if req.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Message must not be empty".to_string(),
            }),
        )
            .into_response();
    }

    let session_id = req.session_id.unwrap_or_else(Uuid::new_v4);

    // Take a copy of the history so the lock is not held across the
    // model/tool round trips; the updated history is written back after.
    let mut history = {
        let sessions = state.sessions.lock().await;
        sessions
            .get(&session_id)
            .cloned()
            .unwrap_or_else(|| state.agent.new_conversation())
    };

    match state.agent.respond(&mut history, &req.message).await {
        Ok(response) => {
            state.sessions.lock().await.insert(session_id, history);

            Json(ChatResponse {
                session_id,
                answer: response.content,
                tool_calls: response
                    .tool_calls
                    .into_iter()
                    .map(|call| ToolCallInfo {
                        name: call.name,
                        arguments: call.arguments,
                    })
                    .collect(),
            })
            .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// Minimal single-file chat page talking to /api/chat.
const CHAT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Lege - Medical Chat Agent</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 760px; margin: 0 auto; padding: 1rem; background: #f7f7f8; }
  h1 { font-size: 1.2rem; }
  #log { background: #fff; border: 1px solid #ddd; border-radius: 8px; padding: 1rem; min-height: 320px; }
  .msg { margin: 0.5rem 0; white-space: pre-wrap; }
  .user { color: #0a5c36; font-weight: 600; }
  .agent { color: #1a1a2e; }
  .tools { color: #888; font-size: 0.8rem; }
  .error { color: #b00020; }
  form { display: flex; gap: 0.5rem; margin-top: 1rem; }
  input { flex: 1; padding: 0.6rem; border: 1px solid #ccc; border-radius: 6px; }
  button { padding: 0.6rem 1.2rem; border: 0; border-radius: 6px; background: #0a5c36; color: #fff; cursor: pointer; }
  button:disabled { background: #999; }
</style>
</head>
<body>
<h1>Lege - Medical Chat Agent</h1>
<p>Ask about the medical datasets (statistics) or general medical topics. Not medical advice.</p>
<div id="log"></div>
<form id="form">
  <input id="input" placeholder="e.g. How many heart disease patients are over 60?" autocomplete="off">
  <button id="send" type="submit">Send</button>
</form>
<script>
let sessionId = null;
const log = document.getElementById('log');
const form = document.getElementById('form');
const input = document.getElementById('input');
const send = document.getElementById('send');

function add(cls, text) {
  const div = document.createElement('div');
  div.className = 'msg ' + cls;
  div.textContent = text;
  log.appendChild(div);
  log.scrollTop = log.scrollHeight;
}

form.addEventListener('submit', async (e) => {
  e.preventDefault();
  const message = input.value.trim();
  if (!message) return;
  add('user', 'You: ' + message);
  input.value = '';
  send.disabled = true;
  try {
    const res = await fetch('/api/chat', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ session_id: sessionId, message })
    });
    const data = await res.json();
    if (!res.ok) {
      add('error', 'Error: ' + (data.error || res.statusText));
    } else {
      sessionId = data.session_id;
      if (data.tool_calls.length > 0) {
        add('tools', 'tools: ' + data.tool_calls.map(t => t.name).join(', '));
      }
      add('agent', 'Lege: ' + data.answer);
    }
  } catch (err) {
    add('error', 'Error: ' + err);
  } finally {
    send.disabled = false;
    input.focus();
  }
});
</script>
</body>
</html>
"#;
