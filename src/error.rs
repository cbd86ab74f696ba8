use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A column the pipeline depends on is absent from an entire dataset.
    #[error("No column named '{column}' in dataset '{dataset}'")]
    MissingColumn { column: String, dataset: String },

    /// A contractually clean field held a value of the wrong type.
    #[error("Cannot convert '{value}' in column '{column}' (row {row}) of dataset '{dataset}' to {expected}")]
    TypeCoercion {
        dataset: String,
        column: String,
        row: usize,
        value: String,
        expected: &'static str,
    },
}

impl EtlError {
    pub fn missing_column(column: &str, dataset: &str) -> Self {
        EtlError::MissingColumn {
            column: column.to_string(),
            dataset: dataset.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
