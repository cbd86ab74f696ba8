// Observability: metrics catalog (logging setup lives in crate::logging)

pub mod metrics;

pub use metrics::MetricName;
