//! One-shot CSV-to-SQLite loader for the medical datasets.
//!
//! Each dataset CSV becomes one table in its own SQLite file. Re-running
//! setup replaces the table; there is no incremental update or migration.

use super::Dataset;
use crate::config::Settings;
use crate::error::{LegeError, Result};
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use tracing::info;

/// Result of loading one dataset.
#[derive(Debug)]
pub struct LoadReport {
    pub dataset: Dataset,
    pub rows: usize,
    pub columns: usize,
}

/// Loads the configured CSVs into their SQLite files.
pub struct DatasetLoader<'a> {
    settings: &'a Settings,
}

/// SQLite column affinity inferred from CSV values.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Affinity {
    Integer,
    Real,
    Text,
}

impl Affinity {
    fn sql_type(self) -> &'static str {
        match self {
            Affinity::Integer => "INTEGER",
            Affinity::Real => "REAL",
            Affinity::Text => "TEXT",
        }
    }
}

impl<'a> DatasetLoader<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Load all three datasets, reporting per-dataset outcome.
    pub fn load_all(&self) -> Vec<(Dataset, Result<LoadReport>)> {
        Dataset::all()
            .into_iter()
            .map(|dataset| (dataset, self.load(dataset)))
            .collect()
    }

    /// Load one dataset from its CSV into its SQLite file.
    pub fn load(&self, dataset: Dataset) -> Result<LoadReport> {
        let csv_path = self.settings.csv_path(dataset);
        if !csv_path.exists() {
            return Err(LegeError::Dataset(format!(
                "{} not found. Place the {} dataset CSV in {}",
                csv_path.display(),
                dataset.title(),
                self.settings.datasets_dir().display()
            )));
        }

        std::fs::create_dir_all(self.settings.data_dir())?;

        let db_path = self.settings.db_path(dataset);
        let table = &self.settings.table(dataset).table_name;
        let (rows, columns) = load_csv_into(&csv_path, &db_path, table)?;

        info!(
            "Loaded {} ({} rows, {} columns) into {}",
            dataset,
            rows,
            columns,
            db_path.display()
        );

        Ok(LoadReport {
            dataset,
            rows,
            columns,
        })
    }
}

/// Read a CSV and (re)create the target table from it.
///
/// Column affinity is inferred from the values: INTEGER if every non-empty
/// value parses as i64, REAL if every non-empty value parses as f64,
/// otherwise TEXT. Inserts are parameterized and run in one transaction.
pub fn load_csv_into(csv_path: &Path, db_path: &Path, table: &str) -> Result<(usize, usize)> {
    let mut reader = csv::Reader::from_path(csv_path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() {
        return Err(LegeError::Dataset(format!(
            "{} has no header row",
            csv_path.display()
        )));
    }

    let mut records: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(|v| v.trim().to_string()).collect());
    }

    let affinities = infer_affinities(&headers, &records);

    let mut conn = Connection::open(db_path)?;
    let tx = conn.transaction()?;

    tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))?;

    let column_defs = headers
        .iter()
        .zip(&affinities)
        .map(|(name, affinity)| format!("{} {}", quote_ident(name), affinity.sql_type()))
        .collect::<Vec<_>>()
        .join(", ");
    tx.execute_batch(&format!(
        "CREATE TABLE {} ({})",
        quote_ident(table),
        column_defs
    ))?;

    let placeholders = vec!["?"; headers.len()].join(", ");
    let insert_sql = format!(
        "INSERT INTO {} VALUES ({})",
        quote_ident(table),
        placeholders
    );

    {
        let mut stmt = tx.prepare(&insert_sql)?;
        for record in &records {
            let values: Vec<rusqlite::types::Value> = record
                .iter()
                .zip(&affinities)
                .map(|(value, affinity)| to_sql_value(value, *affinity))
                .collect();
            stmt.execute(params_from_iter(values))?;
        }
    }

    tx.commit()?;

    Ok((records.len(), headers.len()))
}

/// Infer per-column affinity from all non-empty values.
fn infer_affinities(headers: &[String], records: &[Vec<String>]) -> Vec<Affinity> {
    (0..headers.len())
        .map(|col| {
            let mut affinity = Affinity::Integer;
            let mut saw_value = false;

            for record in records {
                let value = match record.get(col) {
                    Some(v) if !v.is_empty() => v,
                    _ => continue,
                };
                saw_value = true;

                match affinity {
                    Affinity::Integer if value.parse::<i64>().is_ok() => {}
                    Affinity::Integer | Affinity::Real if value.parse::<f64>().is_ok() => {
                        affinity = Affinity::Real;
                    }
                    _ => return Affinity::Text,
                }
            }

            if saw_value {
                affinity
            } else {
                Affinity::Text
            }
        })
        .collect()
}

/// Convert a CSV cell to a typed SQLite value. Empty cells become NULL.
fn to_sql_value(value: &str, affinity: Affinity) -> rusqlite::types::Value {
    use rusqlite::types::Value;

    if value.is_empty() {
        return Value::Null;
    }

    match affinity {
        Affinity::Integer => value
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(value.to_string())),
        Affinity::Real => value
            .parse::<f64>()
            .map(Value::Real)
            .unwrap_or_else(|_| Value::Text(value.to_string())),
        Affinity::Text => Value::Text(value.to_string()),
    }
}

/// Quote an SQL identifier.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_infers_types_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_csv(
            dir.path(),
            "diabetes.csv",
            "Glucose,BMI,Outcome\n148,33.6,1\n85,26.6,0\n183,23.3,1\n",
        );
        let db_path = dir.path().join("diabetes.db");

        let (rows, columns) = load_csv_into(&csv_path, &db_path, "diabetes").unwrap();
        assert_eq!(rows, 3);
        assert_eq!(columns, 3);

        let conn = Connection::open(&db_path).unwrap();
        let (glucose_type, bmi_type): (String, String) = conn
            .query_row(
                "SELECT typeof(Glucose), typeof(BMI) FROM diabetes LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(glucose_type, "integer");
        assert_eq!(bmi_type, "real");

        let positive: i64 = conn
            .query_row("SELECT COUNT(*) FROM diabetes WHERE Outcome = 1", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(positive, 2);
    }

    #[test]
    fn test_reload_replaces_table() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("cancer.db");

        let first = write_csv(dir.path(), "a.csv", "Age,Diagnosis\n50,1\n60,0\n");
        load_csv_into(&first, &db_path, "cancer").unwrap();

        let second = write_csv(dir.path(), "b.csv", "Age,Diagnosis\n70,1\n");
        let (rows, _) = load_csv_into(&second, &db_path, "cancer").unwrap();
        assert_eq!(rows, 1);

        let conn = Connection::open(&db_path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM cancer", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_text_column_and_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_csv(dir.path(), "t.csv", "name,score\nanna,\nbo,7\n");
        let db_path = dir.path().join("t.db");

        load_csv_into(&csv_path, &db_path, "t").unwrap();

        let conn = Connection::open(&db_path).unwrap();
        let nulls: i64 = conn
            .query_row("SELECT COUNT(*) FROM t WHERE score IS NULL", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn test_missing_csv_reports_dataset_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = crate::config::Settings::default();
        settings.general.datasets_dir = dir.path().to_string_lossy().to_string();
        settings.general.data_dir = dir.path().join("data").to_string_lossy().to_string();

        let loader = DatasetLoader::new(&settings);
        let err = loader.load(Dataset::HeartDisease).unwrap_err();
        assert!(err.to_string().contains("heart.csv"));
    }
}
