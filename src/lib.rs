//! Lege - Medical Multi-Tool Chat Agent
//!
//! A thin orchestration layer wiring an LLM chat agent to three static
//! SQLite medical datasets and a hosted web-search API.
//!
//! The name "Lege" comes from the Norwegian word for "physician."
//!
//! # Overview
//!
//! Lege allows you to:
//! - Ask statistical questions over the heart disease, cancer, and diabetes
//!   datasets (the model writes the SQL, Lege executes it read-only)
//! - Ask general medical questions answered via web search
//! - Chat from the terminal or through a small web UI
//!
//! Tool routing is delegated entirely to the hosted model's tool-calling
//! mechanism; Lege dispatches, it does not classify intent.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `datasets` - Dataset descriptors, read-only SQL execution, CSV loader
//! - `tools` - Tool definitions exposed to the model, web search
//! - `agent` - Conversation model and the bounded tool-calling loop
//! - `cli` - Command implementations (setup, ask, chat, serve, doctor)
//!
//! # Example
//!
//! ```rust,no_run
//! use lege::agent::Agent;
//! use lege::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let agent = Agent::from_settings(&settings)?;
//!
//!     let mut history = agent.new_conversation();
//!     let response = agent
//!         .respond(&mut history, "How many diabetes cases are in the dataset?")
//!         .await?;
//!     println!("{}", response.content);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod datasets;
pub mod error;
pub mod openai;
pub mod tools;

pub use error::{LegeError, Result};
