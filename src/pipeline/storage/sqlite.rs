use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection};
use std::path::Path;
use tracing::{debug, info};

use super::MovieStore;
use crate::constants::{MERGED_DATASET, RATINGS_DATASET};
use crate::error::Result;
use crate::pipeline::processing::ratings::Rating;
use crate::types::{Dataset, Value};

/// SQLite-backed store holding the `movies` and `ratings` tables
pub struct SqliteStore {
    conn: Connection,
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// SQL column type for a dataset column, taken from its first present value.
fn column_type(dataset: &Dataset, column: &str) -> &'static str {
    let first = dataset
        .rows()
        .iter()
        .map(|row| row.value(column))
        .find(|value| !value.is_missing());
    match first {
        Some(Value::Int(_)) | Some(Value::Bool(_)) => "INTEGER",
        Some(Value::Float(_)) => "REAL",
        _ => "TEXT",
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Missing => SqlValue::Null,
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Int(v) => SqlValue::Integer(*v),
        Value::Float(v) if v.is_nan() => SqlValue::Null,
        Value::Float(v) => SqlValue::Real(*v),
        Value::Bool(v) => SqlValue::Integer(i64::from(*v)),
        Value::Date(d) => SqlValue::Text(d.format("%Y-%m-%d").to_string()),
        Value::List(_) | Value::Map(_) => SqlValue::Text(value.to_json().to_string()),
    }
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!("SQLite journal mode: {}", mode);
        let store = Self { conn };
        store.create_ratings_table()?;
        info!("Opened movie database at {}", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.create_ratings_table()?;
        Ok(store)
    }

    fn create_ratings_table(&self) -> Result<()> {
        self.conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                user_id    INTEGER NOT NULL,
                movie_id   INTEGER NOT NULL,
                rating     REAL NOT NULL,
                timestamp  TEXT
            );
            "#,
            RATINGS_DATASET
        ))?;
        Ok(())
    }

    fn create_movies_table(&self, movies: &Dataset) -> Result<()> {
        let columns: Vec<String> = movies
            .columns()
            .iter()
            .map(|c| format!("{} {}", quote_ident(c), column_type(movies, c)))
            .collect();
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            MERGED_DATASET,
            columns.join(", ")
        ))?;
        Ok(())
    }

    pub fn movie_count(&self) -> Result<i64> {
        self.count(MERGED_DATASET)
    }

    pub fn rating_count(&self) -> Result<i64> {
        self.count(RATINGS_DATASET)
    }

    fn count(&self, table: &str) -> Result<i64> {
        let n = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(n)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl MovieStore for SqliteStore {
    fn write_movies(&mut self, movies: &Dataset) -> Result<()> {
        self.create_movies_table(movies)?;
        let columns: Vec<String> = movies.columns().iter().map(|c| quote_ident(c)).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            MERGED_DATASET,
            columns.join(", "),
            placeholders.join(", ")
        );

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in movies.rows() {
                let values = movies.columns().iter().map(|c| to_sql(row.value(c)));
                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;
        debug!("Wrote {} rows to {}", movies.len(), MERGED_DATASET);
        Ok(())
    }

    fn append_ratings(&mut self, chunk: &[Rating]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (user_id, movie_id, rating, timestamp) VALUES (?1, ?2, ?3, ?4)",
                RATINGS_DATASET
            ))?;
            for rating in chunk {
                let rated_at = rating
                    .rated_at()
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string());
                stmt.execute(params![rating.user_id, rating.movie_id, rating.rating, rated_at])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
