//! Interactive chat command.

use crate::agent::{trim_history, Agent};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, BufRead, Write};

/// Maximum turns kept in the session history.
const MAX_HISTORY_TURNS: usize = 30;

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Agent, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'lege doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let mut settings = settings;
    if let Some(model) = model {
        settings.llm.model = model;
    }

    let agent = Agent::from_settings(&settings)?;
    let mut history = agent.new_conversation();

    println!("\n{}", style("Lege Chat").bold().cyan());
    println!(
        "{}\n",
        style("Ask about the medical datasets or general medical topics. Type 'exit' to quit, 'clear' to reset.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        stdin.lock().read_line(&mut input)?;

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            history.truncate(1); // Keep system turn
            Output::info("Conversation history cleared.");
            continue;
        }

        match agent.respond(&mut history, input).await {
            Ok(response) => {
                for call in &response.tool_calls {
                    let mark = if is_tool_failure(&call.result) {
                        style("x").red()
                    } else {
                        style("ok").green()
                    };
                    println!("{} {}", style(format!("  [{}]", call.name)).dim(), mark);
                }
                println!("\n{} {}\n", style("Lege:").cyan().bold(), response.content);
                trim_history(&mut history, MAX_HISTORY_TURNS);
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}

/// Whether a tool result string records a failure.
fn is_tool_failure(result: &str) -> bool {
    result.starts_with("Query failed:")
        || result.starts_with("Tool error:")
        || result.starts_with("Failed to parse tool call")
}
