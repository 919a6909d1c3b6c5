//! Setup command - build the SQLite databases from the dataset CSVs.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::datasets::DatasetLoader;
use anyhow::Result;

/// Run the setup command. Re-running replaces the tables.
pub fn run_setup(settings: &Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Setup, settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    Output::header("Lege Database Setup");
    println!();

    let loader = DatasetLoader::new(settings);
    let results = loader.load_all();

    let mut succeeded = 0;
    for (dataset, result) in &results {
        match result {
            Ok(report) => {
                succeeded += 1;
                Output::success(&format!(
                    "{} database ready ({} rows, {} columns) at {}",
                    dataset.title(),
                    report.rows,
                    report.columns,
                    settings.db_path(*dataset).display()
                ));
            }
            Err(e) => {
                Output::error(&format!("{} database failed: {}", dataset.title(), e));
            }
        }
    }

    println!();
    let total = results.len();
    if succeeded == total {
        Output::success(&format!("Database setup complete: {}/{} successful", succeeded, total));
    } else {
        Output::warning(&format!(
            "Database setup complete: {}/{} successful. Fix the errors above and re-run 'lege setup'.",
            succeeded, total
        ));
    }

    Ok(())
}
