use std::collections::{HashMap, HashSet};
use tracing::{info, instrument, warn};

use crate::constants::*;
use crate::error::Result;
use crate::observability::metrics;
use crate::types::{Dataset, Record, Value};

/// One fill-gap rule: `authoritative` keeps its value unless it is the zero
/// sentinel, in which case `secondary` is substituted. `secondary` is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct FillPair {
    pub authoritative: String,
    pub secondary: String,
}

/// How two normalized datasets of the same entities are combined.
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub key: String,
    pub left_suffix: String,
    pub right_suffix: String,
    pub fill_pairs: Vec<FillPair>,
    /// (merged column, output column) in output order
    pub projection: Vec<(String, String)>,
}

impl MergePlan {
    /// Encyclopedia (left) joined with catalog (right) into the `movies` schema.
    pub fn movies() -> Self {
        Self {
            key: IMDB_ID.to_string(),
            left_suffix: WIKI_SUFFIX.to_string(),
            right_suffix: CATALOG_SUFFIX.to_string(),
            fill_pairs: MOVIE_FILL_PAIRS
                .iter()
                .map(|(a, s)| FillPair {
                    authoritative: a.to_string(),
                    secondary: s.to_string(),
                })
                .collect(),
            projection: MOVIE_PROJECTION
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }

    pub fn output_columns(&self) -> Vec<String> {
        self.projection.iter().map(|(_, to)| to.clone()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub dataset: Dataset,
    /// Left rows with no partner on the right
    pub left_unmatched: usize,
    /// Right rows with no partner on the left
    pub right_unmatched: usize,
    /// Authoritative column -> rows filled from the secondary column
    pub gaps_filled: Vec<(String, usize)>,
}

pub struct RecordMerger {
    plan: MergePlan,
}

impl RecordMerger {
    pub fn new(plan: MergePlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &MergePlan {
        &self.plan
    }

    fn key_of<'a>(&self, row: &'a Record) -> Option<&'a str> {
        row.value(&self.plan.key).as_text()
    }

    fn merged_name(&self, column: &str, shared: &HashSet<&str>, suffix: &str) -> String {
        if shared.contains(column) {
            format!("{}{}", column, suffix)
        } else {
            column.to_string()
        }
    }

    /// Inner join on the plan's key. Shared non-key columns are suffixed per side.
    fn join(&self, left: &Dataset, right: &Dataset) -> (Dataset, usize, usize) {
        let key = self.plan.key.as_str();
        let left_columns: HashSet<&str> = left.columns().iter().map(String::as_str).collect();
        let shared: HashSet<&str> = right
            .columns()
            .iter()
            .map(String::as_str)
            .filter(|c| *c != key && left_columns.contains(c))
            .collect();

        let mut columns: Vec<String> = left
            .columns()
            .iter()
            .map(|c| {
                if c == key {
                    c.clone()
                } else {
                    self.merged_name(c, &shared, &self.plan.left_suffix)
                }
            })
            .collect();
        columns.extend(
            right
                .columns()
                .iter()
                .filter(|c| c.as_str() != key)
                .map(|c| self.merged_name(c, &shared, &self.plan.right_suffix)),
        );

        let mut index: HashMap<&str, Vec<&Record>> = HashMap::new();
        for row in right.rows() {
            if let Some(k) = self.key_of(row) {
                index.entry(k).or_default().push(row);
            }
        }

        let mut rows = Vec::new();
        let mut left_unmatched = 0;
        let mut left_keys = HashSet::new();
        for left_row in left.rows() {
            let partners = match self.key_of(left_row) {
                Some(k) => {
                    left_keys.insert(k);
                    index.get(k)
                }
                None => None,
            };
            let Some(partners) = partners else {
                left_unmatched += 1;
                continue;
            };
            for right_row in partners {
                let mut merged = Record::new();
                for (column, value) in left_row.iter() {
                    let name = if column == key {
                        column.to_string()
                    } else {
                        self.merged_name(column, &shared, &self.plan.left_suffix)
                    };
                    merged.insert(name, value.clone());
                }
                for (column, value) in right_row.iter().filter(|(c, _)| *c != key) {
                    merged.insert(
                        self.merged_name(column, &shared, &self.plan.right_suffix),
                        value.clone(),
                    );
                }
                rows.push(merged);
            }
        }

        let right_unmatched = right
            .rows()
            .iter()
            .filter(|row| !self.key_of(row).is_some_and(|k| left_keys.contains(k)))
            .count();

        (
            Dataset::with_columns(MERGED_DATASET, columns, rows),
            left_unmatched,
            right_unmatched,
        )
    }

    /// Applies one fill-gap pair and drops the secondary column.
    fn fill_gap(dataset: Dataset, pair: &FillPair) -> Result<(Dataset, usize)> {
        dataset.require_column(&pair.authoritative)?;
        dataset.require_column(&pair.secondary)?;
        let fallback: Vec<Value> = dataset
            .rows()
            .iter()
            .map(|row| row.value(&pair.secondary).clone())
            .collect();
        let mut filled = 0;
        let dataset = dataset.map_column(&pair.authoritative, |row, value| {
            if value.is_zero() {
                filled += 1;
                Ok(fallback[row].clone())
            } else {
                Ok(value.clone())
            }
        })?;
        Ok((dataset.drop_column(&pair.secondary), filled))
    }

    /// Keeps exactly the projected columns, renamed and in order.
    fn project(&self, dataset: Dataset) -> Dataset {
        for (from, _) in &self.plan.projection {
            if !dataset.has_column(from) {
                warn!("Merged dataset has no column '{}'; it will be empty", from);
            }
        }
        let rows = dataset
            .into_rows()
            .into_iter()
            .map(|mut row| {
                self.plan
                    .projection
                    .iter()
                    .map(|(from, to)| (to.clone(), row.remove(from).unwrap_or_default()))
                    .collect()
            })
            .collect();
        Dataset::with_columns(MERGED_DATASET, self.plan.output_columns(), rows)
    }

    #[instrument(skip(self, left, right), fields(left = left.name(), right = right.name()))]
    pub fn merge(&self, left: &Dataset, right: &Dataset) -> Result<MergeOutcome> {
        left.require_column(&self.plan.key)?;
        right.require_column(&self.plan.key)?;

        let (mut dataset, left_unmatched, right_unmatched) = self.join(left, right);
        info!(
            "Joined {} rows ({} left and {} right rows without a partner)",
            dataset.len(),
            left_unmatched,
            right_unmatched
        );
        metrics::merge::rows_matched(dataset.len());
        metrics::merge::unmatched(left_unmatched, right_unmatched);

        let mut gaps_filled = Vec::with_capacity(self.plan.fill_pairs.len());
        for pair in &self.plan.fill_pairs {
            let (next, filled) = Self::fill_gap(dataset, pair)?;
            metrics::merge::gaps_filled(&pair.authoritative, filled);
            gaps_filled.push((pair.authoritative.clone(), filled));
            dataset = next;
        }

        Ok(MergeOutcome {
            dataset: self.project(dataset),
            left_unmatched,
            right_unmatched,
            gaps_filled,
        })
    }
}

impl Default for RecordMerger {
    fn default() -> Self {
        Self::new(MergePlan::movies())
    }
}
