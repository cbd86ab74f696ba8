// Source-specific normalizers
pub mod catalog;
pub mod wiki;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::types::Dataset;

pub use catalog::CatalogNormalizer;
pub use wiki::WikiNormalizer;

/// Trait for turning one raw source dataset into its normalized form
pub trait SourceNormalizer {
    /// Identifier used in logs and metric labels
    fn source_id(&self) -> &str;

    fn normalize(&self, raw: Dataset) -> Result<NormalizeOutcome>;
}

/// Counters gathered while normalizing one source
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizeStats {
    pub input_rows: usize,
    pub output_rows: usize,
    /// Rows removed by the source's eligibility predicate
    pub filtered_rows: usize,
    pub duplicate_rows: usize,
    pub dropped_columns: Vec<String>,
    /// Parsed column -> number of cells that came out as "no data"
    pub sentinel_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct NormalizeOutcome {
    pub dataset: Dataset,
    pub stats: NormalizeStats,
}
