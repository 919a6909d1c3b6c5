//! Read-only SQL execution against a dataset's SQLite file.
//!
//! The hosted model writes the SQL; execution is restricted to a single
//! SELECT statement on a read-only connection, with a configured row cap.

use super::Dataset;
use crate::config::Settings;
use crate::error::Result;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use tracing::debug;

/// Query executor for one dataset. Opens a fresh read-only connection per
/// call; all access is single-statement, so no pooling or transactions.
pub struct DatasetStore {
    dataset: Dataset,
    db_path: PathBuf,
    max_rows: usize,
}

impl DatasetStore {
    /// Create a store for a dataset using configured paths.
    pub fn from_settings(settings: &Settings, dataset: Dataset) -> Self {
        Self {
            dataset,
            db_path: settings.db_path(dataset),
            max_rows: settings.datasets.max_rows,
        }
    }

    /// Create a store with an explicit database path.
    pub fn new(dataset: Dataset, db_path: PathBuf, max_rows: usize) -> Self {
        Self {
            dataset,
            db_path,
            max_rows,
        }
    }

    /// Execute a SELECT query and return the result set as text.
    ///
    /// Execution failures (malformed SQL, rejected statements, missing
    /// database) come back as `Ok` with an explanatory message so the model
    /// can surface them to the user instead of ending the turn.
    pub fn query(&self, sql: &str) -> Result<String> {
        if !self.db_path.exists() {
            return Ok(format!(
                "{} database not found. Run 'lege setup' to build it first.",
                self.dataset.title()
            ));
        }

        let sql = match validate_select(sql) {
            Ok(sql) => sql,
            Err(msg) => return Ok(msg),
        };

        debug!("Executing against {}: {}", self.dataset, sql);

        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        match self.run_select(&conn, sql) {
            Ok(text) => Ok(text),
            Err(e) => Ok(format!("Query failed: {}", e)),
        }
    }

    fn run_select(&self, conn: &Connection, sql: &str) -> rusqlite::Result<String> {
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|c| c.to_string())
            .collect();

        let mut rows = stmt.query([])?;
        let mut lines = vec![columns.join(" | ")];
        let mut count = 0usize;
        let mut truncated = false;

        while let Some(row) = rows.next()? {
            if count >= self.max_rows {
                truncated = true;
                break;
            }
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(format_value(row.get_ref(i)?));
            }
            lines.push(values.join(" | "));
            count += 1;
        }

        if count == 0 {
            return Ok("Query returned no rows.".to_string());
        }

        let footer = if truncated {
            format!("({} rows shown, result truncated at {})", count, self.max_rows)
        } else {
            format!("({} rows)", count)
        };

        Ok(format!("{}\n{}", lines.join("\n"), footer))
    }
}

/// Check that the input is a single read-only SELECT statement.
///
/// Returns the trimmed SQL, or a rejection message meant for the model.
fn validate_select(sql: &str) -> std::result::Result<&str, String> {
    let trimmed = sql.trim().trim_end_matches(';').trim_end();

    if trimmed.is_empty() {
        return Err("Empty SQL query.".to_string());
    }

    if trimmed.contains(';') {
        return Err(
            "Only a single SQL statement is allowed per query.".to_string(),
        );
    }

    let first_word = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    if first_word != "select" && first_word != "with" {
        return Err(format!(
            "Only read-only SELECT queries are supported (got '{}').",
            first_word
        ));
    }

    Ok(trimmed)
}

/// Render a single SQLite value as text.
fn format_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(r) => format!("{}", r),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(_) => "<blob>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_store(max_rows: usize) -> (tempfile::TempDir, DatasetStore) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("heart_disease.db");

        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE heart_disease (age INTEGER, chol INTEGER, target INTEGER);
            INSERT INTO heart_disease VALUES (63, 233, 1);
            INSERT INTO heart_disease VALUES (67, 286, 1);
            INSERT INTO heart_disease VALUES (41, 204, 0);
            INSERT INTO heart_disease VALUES (71, 302, 1);
            "#,
        )
        .unwrap();
        drop(conn);

        let store = DatasetStore::new(Dataset::HeartDisease, db_path, max_rows);
        (dir, store)
    }

    #[test]
    fn test_count_query_reflects_fixture() {
        let (_dir, store) = fixture_store(50);
        let result = store
            .query("SELECT COUNT(*) AS n FROM heart_disease WHERE age > 60")
            .unwrap();
        assert!(result.contains("n"));
        assert!(result.contains("3"));
        assert!(result.contains("(1 rows)"));
    }

    #[test]
    fn test_malformed_sql_returns_error_string() {
        let (_dir, store) = fixture_store(50);
        let result = store.query("SELECT frm heart_disease").unwrap();
        assert!(result.starts_with("Query failed:"));
    }

    #[test]
    fn test_write_statement_rejected() {
        let (_dir, store) = fixture_store(50);
        let result = store.query("DELETE FROM heart_disease").unwrap();
        assert!(result.contains("Only read-only SELECT"));
    }

    #[test]
    fn test_stacked_statements_rejected() {
        let (_dir, store) = fixture_store(50);
        let result = store
            .query("SELECT 1; DROP TABLE heart_disease")
            .unwrap();
        assert!(result.contains("single SQL statement"));
    }

    #[test]
    fn test_trailing_semicolon_allowed() {
        let (_dir, store) = fixture_store(50);
        let result = store.query("SELECT COUNT(*) FROM heart_disease;").unwrap();
        assert!(result.contains("4"));
    }

    #[test]
    fn test_row_cap() {
        let (_dir, store) = fixture_store(2);
        let result = store.query("SELECT age FROM heart_disease").unwrap();
        assert!(result.contains("truncated at 2"));
    }

    #[test]
    fn test_missing_database_message() {
        let store = DatasetStore::new(
            Dataset::Cancer,
            PathBuf::from("/nonexistent/cancer.db"),
            50,
        );
        let result = store.query("SELECT 1").unwrap();
        assert!(result.contains("Run 'lege setup'"));
    }
}
