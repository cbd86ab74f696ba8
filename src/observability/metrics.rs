//! Metrics for the movie reconciliation pipeline
//!
//! Recording goes through the `metrics` facade. Nothing is exported unless
//! the embedding process installs a recorder.

use std::fmt;

/// Enum representing all metric names used in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Normalize metrics
    NormalizeRecordsEligible,
    NormalizeRecordsFiltered,
    NormalizeDuplicatesDropped,
    NormalizeColumnsDropped,
    NormalizeSentinelValues,

    // Merge metrics
    MergeRowsMatched,
    MergeLeftUnmatched,
    MergeRightUnmatched,
    MergeGapsFilled,

    // Ratings metrics
    RatingsEventsAggregated,
    RatingsChunksLoaded,
    RatingsRowsLoaded,

    // Load metrics
    LoadMovieRowsWritten,
    PipelineDuration,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::NormalizeRecordsEligible => "movie_etl_normalize_records_eligible_total",
            MetricName::NormalizeRecordsFiltered => "movie_etl_normalize_records_filtered_total",
            MetricName::NormalizeDuplicatesDropped => "movie_etl_normalize_duplicates_dropped_total",
            MetricName::NormalizeColumnsDropped => "movie_etl_normalize_columns_dropped_total",
            MetricName::NormalizeSentinelValues => "movie_etl_normalize_sentinel_values_total",

            MetricName::MergeRowsMatched => "movie_etl_merge_rows_matched_total",
            MetricName::MergeLeftUnmatched => "movie_etl_merge_left_unmatched_total",
            MetricName::MergeRightUnmatched => "movie_etl_merge_right_unmatched_total",
            MetricName::MergeGapsFilled => "movie_etl_merge_gaps_filled_total",

            MetricName::RatingsEventsAggregated => "movie_etl_ratings_events_aggregated_total",
            MetricName::RatingsChunksLoaded => "movie_etl_ratings_chunks_loaded_total",
            MetricName::RatingsRowsLoaded => "movie_etl_ratings_rows_loaded_total",

            MetricName::LoadMovieRowsWritten => "movie_etl_load_movie_rows_written_total",
            MetricName::PipelineDuration => "movie_etl_pipeline_duration_seconds",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            NormalizeRecordsEligible,
            NormalizeRecordsFiltered,
            NormalizeDuplicatesDropped,
            NormalizeColumnsDropped,
            NormalizeSentinelValues,
            MergeRowsMatched,
            MergeLeftUnmatched,
            MergeRightUnmatched,
            MergeGapsFilled,
            RatingsEventsAggregated,
            RatingsChunksLoaded,
            RatingsRowsLoaded,
            LoadMovieRowsWritten,
            PipelineDuration,
        ]
        .into_iter()
    }
}

// ============================================================================
// Normalize Metrics
// ============================================================================

pub mod normalize {
    use super::MetricName;

    pub fn records_eligible(source: &str, count: usize) {
        ::metrics::counter!(MetricName::NormalizeRecordsEligible.as_str(), "source" => source.to_string())
            .increment(count as u64);
    }

    pub fn records_filtered(source: &str, count: usize) {
        ::metrics::counter!(MetricName::NormalizeRecordsFiltered.as_str(), "source" => source.to_string())
            .increment(count as u64);
    }

    pub fn duplicates_dropped(source: &str, count: usize) {
        ::metrics::counter!(MetricName::NormalizeDuplicatesDropped.as_str(), "source" => source.to_string())
            .increment(count as u64);
    }

    pub fn columns_dropped(source: &str, count: usize) {
        ::metrics::counter!(MetricName::NormalizeColumnsDropped.as_str(), "source" => source.to_string())
            .increment(count as u64);
    }

    /// Cells a value parser could not read, per output column
    pub fn sentinel_values(column: &str, count: usize) {
        ::metrics::counter!(MetricName::NormalizeSentinelValues.as_str(), "column" => column.to_string())
            .increment(count as u64);
    }
}

// ============================================================================
// Merge Metrics
// ============================================================================

pub mod merge {
    use super::MetricName;

    pub fn rows_matched(count: usize) {
        ::metrics::counter!(MetricName::MergeRowsMatched.as_str()).increment(count as u64);
    }

    pub fn unmatched(left: usize, right: usize) {
        ::metrics::counter!(MetricName::MergeLeftUnmatched.as_str()).increment(left as u64);
        ::metrics::counter!(MetricName::MergeRightUnmatched.as_str()).increment(right as u64);
    }

    pub fn gaps_filled(column: &str, count: usize) {
        ::metrics::counter!(MetricName::MergeGapsFilled.as_str(), "column" => column.to_string())
            .increment(count as u64);
    }
}

// ============================================================================
// Ratings Metrics
// ============================================================================

pub mod ratings {
    use super::MetricName;

    pub fn events_aggregated(count: usize) {
        ::metrics::counter!(MetricName::RatingsEventsAggregated.as_str()).increment(count as u64);
    }

    pub fn chunk_loaded(rows: usize) {
        ::metrics::counter!(MetricName::RatingsChunksLoaded.as_str()).increment(1);
        ::metrics::counter!(MetricName::RatingsRowsLoaded.as_str()).increment(rows as u64);
    }
}

// ============================================================================
// Load Metrics
// ============================================================================

pub mod load {
    use super::MetricName;

    pub fn movie_rows_written(count: usize) {
        ::metrics::counter!(MetricName::LoadMovieRowsWritten.as_str()).increment(count as u64);
    }

    pub fn pipeline_duration(secs: f64) {
        ::metrics::histogram!(MetricName::PipelineDuration.as_str()).record(secs);
    }
}
