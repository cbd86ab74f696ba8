pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod types;

pub use config::Config;
pub use error::{EtlError, Result};
pub use pipeline::{PipelineOrchestrator, PipelineReport};
pub use types::{Dataset, Record, Value};
