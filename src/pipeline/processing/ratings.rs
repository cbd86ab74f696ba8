use chrono::{DateTime, NaiveDateTime};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, instrument};

use crate::constants::RATING_COLUMN_PREFIX;
use crate::error::Result;
use crate::observability::metrics;
use crate::types::{Dataset, Value};

/// One row of the ratings event log
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    pub user_id: i64,
    pub movie_id: i64,
    pub rating: f64,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
}

impl Rating {
    /// Event time as a UTC date-time; `None` when out of chrono's range.
    pub fn rated_at(&self) -> Option<NaiveDateTime> {
        DateTime::from_timestamp(self.timestamp, 0).map(|dt| dt.naive_utc())
    }
}

/// A rating score with a total order, usable as a map key.
#[derive(Debug, Clone, Copy)]
pub struct Score(pub f64);

impl Score {
    /// Histogram column name, e.g. `rating_5` or `rating_4.5`.
    pub fn column_name(&self) -> String {
        format!("{}{}", RATING_COLUMN_PREFIX, self.0)
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Counts (movie, score) occurrences across any number of chunks.
#[derive(Debug, Default)]
pub struct RatingsAggregator {
    counts: HashMap<i64, BTreeMap<Score, i64>>,
    scores: BTreeSet<Score>,
    events: usize,
}

impl RatingsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, chunk: &[Rating]) {
        for rating in chunk {
            let score = Score(rating.rating);
            self.scores.insert(score);
            *self
                .counts
                .entry(rating.movie_id)
                .or_default()
                .entry(score)
                .or_insert(0) += 1;
        }
        self.events += chunk.len();
        metrics::ratings::events_aggregated(chunk.len());
    }

    pub fn events(&self) -> usize {
        self.events
    }

    pub fn finish(self) -> RatingHistogram {
        debug!(
            "Aggregated {} rating events over {} movies and {} distinct scores",
            self.events,
            self.counts.len(),
            self.scores.len()
        );
        RatingHistogram {
            counts: self.counts,
            scores: self.scores.into_iter().collect(),
        }
    }
}

/// Wide per-movie histogram: one column per distinct score, ascending.
#[derive(Debug, Clone, Default)]
pub struct RatingHistogram {
    counts: HashMap<i64, BTreeMap<Score, i64>>,
    scores: Vec<Score>,
}

impl RatingHistogram {
    pub fn columns(&self) -> Vec<String> {
        self.scores.iter().map(Score::column_name).collect()
    }

    pub fn movie_count(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, movie_id: i64, score: f64) -> i64 {
        self.counts
            .get(&movie_id)
            .and_then(|per_score| per_score.get(&Score(score)))
            .copied()
            .unwrap_or(0)
    }

    /// Left-joins the histogram by `key_column`; unrated rows get zero counts.
    #[instrument(skip(self, dataset), fields(rows = dataset.len()))]
    pub fn join_onto(&self, dataset: Dataset, key_column: &str) -> Result<Dataset> {
        dataset.require_column(key_column)?;
        let keys: Vec<Option<i64>> = dataset
            .rows()
            .iter()
            .map(|row| row.value(key_column).as_i64())
            .collect();

        let mut dataset = dataset;
        for score in &self.scores {
            let values = keys
                .iter()
                .map(|key| {
                    let count = key.map(|id| self.count(id, score.0)).unwrap_or(0);
                    Value::Int(count)
                })
                .collect();
            dataset = dataset.with_column(&score.column_name(), values);
        }
        Ok(dataset)
    }
}
