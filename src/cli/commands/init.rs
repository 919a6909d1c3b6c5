//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use crate::datasets::Dataset;
use crate::openai::MODEL_KEY_ENV;
use crate::tools::TAVILY_KEY_ENV;
use console::style;
use std::io::{self, Write};

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Lege Setup");
    println!();
    println!("Welcome to Lege! Let's make sure everything is configured correctly.\n");

    // Step 1: Model credential
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    if std::env::var(MODEL_KEY_ENV).map(|t| t.is_empty()).unwrap_or(true) {
        Output::warning(&format!("{} environment variable is not set.", MODEL_KEY_ENV));
        println!();
        println!("  Lege requires a GitHub token for the hosted model API.");
        println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        println!("  {}", style(format!("export {}='your_token'", MODEL_KEY_ENV)).green());
        println!();

        if !prompt_continue("Continue without the model credential?")? {
            println!();
            Output::info("Setup cancelled. Set your token and run 'lege init' again.");
            return Ok(());
        }
    } else {
        Output::success("Model credential is configured!");
    }

    if std::env::var(TAVILY_KEY_ENV).map(|k| k.is_empty()).unwrap_or(true) {
        Output::warning(&format!(
            "{} is not set; web search will use static fallback answers.",
            TAVILY_KEY_ENV
        ));
    } else {
        Output::success("Search credential is configured!");
    }

    println!();

    // Step 2: Directories
    println!("{}", style("Step 2: Setting up directories").bold().cyan());
    println!();

    let data_dir = settings.data_dir();
    let datasets_dir = settings.datasets_dir();

    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    } else {
        Output::info(&format!("Data directory exists: {}", data_dir.display()));
    }

    if !datasets_dir.exists() {
        std::fs::create_dir_all(&datasets_dir)?;
        Output::success(&format!(
            "Created datasets directory: {}",
            datasets_dir.display()
        ));
    } else {
        Output::info(&format!(
            "Datasets directory exists: {}",
            datasets_dir.display()
        ));
    }

    println!();

    // Step 3: Config file
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if !config_path.exists() {
        settings.save()?;
        Output::success(&format!("Created default config at {}", config_path.display()));
    } else {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    }

    println!();
    Output::header("Next steps");
    println!();
    println!("  1. Place the dataset CSVs in {}:", datasets_dir.display());
    for dataset in Dataset::all() {
        Output::list_item(&format!(
            "{} ({})",
            settings.table(dataset).csv_file,
            dataset.title()
        ));
    }
    println!("  2. Run {} to build the databases.", style("lege setup").green());
    println!("  3. Run {} or {} to start asking questions.",
        style("lege chat").green(),
        style("lege serve").green()
    );
    println!();

    Ok(())
}

/// Prompt the user with a yes/no question.
fn prompt_continue(question: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
