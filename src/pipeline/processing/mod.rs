// Pipeline processing: value parsing, normalization, merging and rating aggregation

pub mod conflation;
pub mod normalize;
pub mod parser;
pub mod ratings;

pub use conflation::{FillPair, MergeOutcome, MergePlan, RecordMerger};
pub use ratings::{Rating, RatingHistogram, RatingsAggregator};
