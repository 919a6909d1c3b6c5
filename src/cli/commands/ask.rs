//! Ask command - one-shot question through the agent.

use crate::agent::Agent;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(question: &str, model: Option<String>, settings: Settings) -> Result<()> {
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

    let spinner = Output::spinner("Thinking...");

    match agent.respond(&mut history, question).await {
        Ok(response) => {
            spinner.finish_and_clear();

            println!("\n{}\n", response.content);

            if !response.tool_calls.is_empty() {
                Output::header(&format!("Tool calls ({})", response.tool_calls.len()));
                for call in &response.tool_calls {
                    Output::info(&format!("  {} {}", call.name, truncate(&call.arguments, 60)));
                }
                println!();
            }

            Output::info(&format!("Completed in {} round(s)", response.rounds));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Agent failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

/// Shorten a string to at most `max_len` bytes, cutting on a char boundary.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_input_unchanged() {
        assert_eq!(truncate("SELECT 1", 60), "SELECT 1");
    }

    #[test]
    fn test_truncate_cuts_on_char_boundary() {
        // A multibyte character straddling the cut point must not panic
        let arguments = format!("{}é…", "x".repeat(56));
        let shown = truncate(&arguments, 60);
        assert!(shown.ends_with("..."));
        assert!(shown.len() <= 60);
    }

    #[test]
    fn test_truncate_multibyte_sql() {
        let sql = "SELECT * FROM cancer WHERE note = 'blodtrykk målt på nytt igjen'";
        let shown = truncate(sql, 40);
        assert!(shown.ends_with("..."));
        assert!(shown.is_char_boundary(shown.len() - 3));
    }
}
