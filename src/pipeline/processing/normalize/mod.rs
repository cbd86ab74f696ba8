// Normalization: per-source cleanup into analysis-ready datasets

pub mod extract;
pub mod normalizers;
pub mod reconcile;

pub use extract::{extract_and_join_column, ExtractedCell};
pub use normalizers::{
    CatalogNormalizer, NormalizeOutcome, NormalizeStats, SourceNormalizer, WikiNormalizer,
};
pub use reconcile::{FieldReconciler, ReconcileRules, RenameRule};
