// Data processing pipeline: ingestion, processing, and storage

pub mod ingestion;
pub mod orchestrator;
pub mod processing;
pub mod storage;

// Re-export key types from each stage
pub use orchestrator::{LoadProgress, PipelineOrchestrator, PipelineReport, TransformOutcome};
pub use processing::parser;
pub use storage::{InMemoryStore, MovieStore, SqliteStore};
