use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_NULL_COLUMN_THRESHOLD, DEFAULT_RATINGS_CHUNK_SIZE};
use crate::error::{EtlError, Result};
use crate::pipeline::processing::normalize::ReconcileRules;

pub const DATABASE_PATH_ENV: &str = "MOVIE_ETL_DATABASE_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub sources: SourcesConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub load: LoadConfig,
    /// Replaces the built-in alternate-title keys and rename table when set
    #[serde(default)]
    pub reconcile: Option<ReconcileRules>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub wiki_json: PathBuf,
    pub catalog_csv: PathBuf,
    pub ratings_csv: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadConfig {
    #[serde(default = "default_chunk_size")]
    pub ratings_chunk_size: usize,
    /// Encyclopedia columns missing in at least this share of rows are dropped
    #[serde(default = "default_null_threshold")]
    pub null_column_threshold: f64,
}

fn default_chunk_size() -> usize {
    DEFAULT_RATINGS_CHUNK_SIZE
}

fn default_null_threshold() -> f64 {
    DEFAULT_NULL_COLUMN_THRESHOLD
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            ratings_chunk_size: default_chunk_size(),
            null_column_threshold: default_null_threshold(),
        }
    }
}

impl Config {
    /// Reads a TOML config; relative paths resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let mut config: Config = toml::from_str(&content)?;

        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Default file layout inside one data directory.
    pub fn from_data_dir(dir: &Path) -> Result<Self> {
        let mut config = Config {
            sources: SourcesConfig {
                wiki_json: dir.join("wikipedia-movies.json"),
                catalog_csv: dir.join("movies_metadata.csv"),
                ratings_csv: dir.join("ratings.csv"),
            },
            database: DatabaseConfig {
                path: dir.join("movie_data.db"),
            },
            load: LoadConfig::default(),
            reconcile: None,
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn reconcile_rules(&self) -> ReconcileRules {
        self.reconcile.clone().unwrap_or_default()
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for path in [
            &mut self.sources.wiki_json,
            &mut self.sources.catalog_csv,
            &mut self.sources.ratings_csv,
            &mut self.database.path,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(db) = std::env::var(DATABASE_PATH_ENV) {
            if !db.trim().is_empty() {
                self.database.path = PathBuf::from(db);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.load.ratings_chunk_size == 0 {
            return Err(EtlError::Config(
                "load.ratings_chunk_size must be greater than zero".to_string(),
            ));
        }
        let threshold = self.load.null_column_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(EtlError::Config(format!(
                "load.null_column_threshold must be in (0, 1], got {}",
                threshold
            )));
        }
        Ok(())
    }
}
