//! Doctor command - verify credentials, configuration, and data files.

use crate::cli::Output;
use crate::config::Settings;
use crate::datasets::Dataset;
use crate::openai::MODEL_KEY_ENV;
use crate::tools::TAVILY_KEY_ENV;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Lege Doctor");
    println!();
    println!("Checking credentials, configuration, and data files...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Configuration").bold());
    let model_check = check_model_token();
    model_check.print();
    checks.push(model_check);

    let search_check = check_search_key();
    search_check.print();
    checks.push(search_check);

    println!();

    println!("{}", style("Databases").bold());
    let db_checks = check_databases(settings);
    for check in &db_checks {
        check.print();
    }
    checks.extend(db_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Lege.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Lege is ready to use.");
    }

    Ok(())
}

/// Check the model credential. Fatal if missing.
fn check_model_token() -> CheckResult {
    match std::env::var(MODEL_KEY_ENV) {
        Ok(token) if !token.is_empty() => {
            let masked = if token.len() > 8 {
                format!("{}...{}", &token[..4], &token[token.len() - 4..])
            } else {
                "configured".to_string()
            };
            CheckResult::ok(MODEL_KEY_ENV, &format!("configured ({})", masked))
        }
        _ => CheckResult::error(
            MODEL_KEY_ENV,
            "not set",
            &format!("Set with: export {}='your_token'", MODEL_KEY_ENV),
        ),
    }
}

/// Check the search credential. Missing key is only a warning; web search
/// degrades to the static fallback.
fn check_search_key() -> CheckResult {
    match std::env::var(TAVILY_KEY_ENV) {
        Ok(key) if !key.is_empty() => CheckResult::ok(TAVILY_KEY_ENV, "configured"),
        _ => CheckResult::warning(
            TAVILY_KEY_ENV,
            "not set (web search limited to static answers)",
            &format!("Set with: export {}='your_key'", TAVILY_KEY_ENV),
        ),
    }
}

/// Check each dataset's database file and source CSV.
fn check_databases(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    for dataset in Dataset::all() {
        let db_path = settings.db_path(dataset);
        if db_path.exists() {
            results.push(CheckResult::ok(
                dataset.title(),
                &format!("{}", db_path.display()),
            ));
        } else if settings.csv_path(dataset).exists() {
            results.push(CheckResult::warning(
                dataset.title(),
                "database not built yet",
                "Run 'lege setup' to build it from the CSV",
            ));
        } else {
            results.push(CheckResult::warning(
                dataset.title(),
                "database and source CSV missing",
                &format!(
                    "Place {} in {} and run 'lege setup'",
                    settings.table(dataset).csv_file,
                    settings.datasets_dir().display()
                ),
            ));
        }
    }

    results
}

/// Check the configuration file.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "not found (using defaults)",
            "Run 'lege init' or 'lege config edit' to create one",
        )
    }
}
