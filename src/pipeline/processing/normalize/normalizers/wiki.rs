use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

use super::{NormalizeOutcome, NormalizeStats, SourceNormalizer};
use crate::constants::*;
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::processing::normalize::extract::extract_and_join_column;
use crate::pipeline::processing::normalize::reconcile::FieldReconciler;
use crate::pipeline::processing::parser::{extract_money, parse_release_date, parse_running_time};
use crate::types::{Dataset, Record, Value};

static IMDB_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"tt\d{7,}").expect("imdb id pattern compiles"));

/// Normalizer for the encyclopedia dump (one semi-structured record per film)
pub struct WikiNormalizer {
    reconciler: FieldReconciler,
    null_column_threshold: f64,
}

impl WikiNormalizer {
    pub fn new(reconciler: FieldReconciler, null_column_threshold: f64) -> Self {
        Self {
            reconciler,
            null_column_threshold,
        }
    }

    /// A film page: names a director, links to IMDb, and is not a series.
    pub fn is_eligible(record: &Record) -> bool {
        (record.contains_key(DIRECTOR) || record.contains_key(DIRECTED_BY))
            && record.contains_key(IMDB_LINK)
            && !record.contains_key(EPISODE_COUNT)
    }

    pub fn imdb_id_from_link(link: &str) -> Option<String> {
        IMDB_ID_PATTERN.find(link).map(|m| m.as_str().to_string())
    }

    fn with_imdb_ids(dataset: Dataset) -> Result<Dataset> {
        dataset.require_column(IMDB_LINK)?;
        let ids = dataset
            .rows()
            .iter()
            .map(|row| {
                let link = match row.value(IMDB_LINK) {
                    Value::Text(s) => Some(s.as_str()),
                    Value::List(items) => items.first().map(String::as_str),
                    _ => None,
                };
                Value::from(link.and_then(Self::imdb_id_from_link))
            })
            .collect();
        Ok(dataset.with_column(IMDB_ID, ids))
    }

    /// Keeps the first row per IMDb id; rows without an id are left alone.
    fn drop_duplicate_ids(dataset: Dataset) -> (Dataset, usize) {
        let before = dataset.len();
        let mut seen = HashSet::new();
        let deduped = dataset.filter_rows(|row| match row.value(IMDB_ID).as_text() {
            Some(id) => seen.insert(id.to_string()),
            None => true,
        });
        let dropped = before - deduped.len();
        (deduped, dropped)
    }

    fn drop_sparse_columns(&self, dataset: Dataset) -> (Dataset, Vec<String>) {
        let limit = dataset.len() as f64 * self.null_column_threshold;
        let mut dropped = Vec::new();
        let kept = dataset.retain_columns(|ds, column| {
            let keep = (ds.null_count(column) as f64) < limit;
            if !keep {
                dropped.push(column.to_string());
            }
            keep
        });
        (kept, dropped)
    }

    /// Replaces free-text `source` with parsed `target`, returning the sentinel count.
    fn parse_column<P, S>(
        dataset: Dataset,
        source: &str,
        target: &str,
        parse: P,
        is_sentinel: S,
    ) -> Result<(Dataset, usize)>
    where
        P: Fn(&str) -> Value,
        S: Fn(&Value) -> bool,
    {
        let cells = extract_and_join_column(&dataset, source)?;
        let mut values = vec![Value::Missing; dataset.len()];
        let mut sentinels = 0;
        for cell in cells {
            let value = parse(&cell.text);
            if is_sentinel(&value) {
                sentinels += 1;
            }
            values[cell.row] = value;
        }
        Ok((dataset.with_column(target, values).drop_column(source), sentinels))
    }
}

impl SourceNormalizer for WikiNormalizer {
    fn source_id(&self) -> &str {
        WIKI_DATASET
    }

    #[instrument(skip(self, raw), fields(rows = raw.len()))]
    fn normalize(&self, raw: Dataset) -> Result<NormalizeOutcome> {
        let mut stats = NormalizeStats {
            input_rows: raw.len(),
            ..Default::default()
        };

        let eligible: Vec<Record> = raw
            .into_rows()
            .into_iter()
            .filter(Self::is_eligible)
            .map(|record| self.reconciler.reconcile(record))
            .collect();
        stats.filtered_rows = stats.input_rows - eligible.len();
        metrics::normalize::records_eligible(self.source_id(), eligible.len());
        metrics::normalize::records_filtered(self.source_id(), stats.filtered_rows);
        info!(
            "Eligible encyclopedia records: {} of {}",
            eligible.len(),
            stats.input_rows
        );

        let dataset = Self::with_imdb_ids(Dataset::from_records(WIKI_DATASET, eligible))?;
        let (dataset, duplicates) = Self::drop_duplicate_ids(dataset);
        stats.duplicate_rows = duplicates;
        metrics::normalize::duplicates_dropped(self.source_id(), duplicates);

        let (dataset, dropped) = self.drop_sparse_columns(dataset);
        debug!("Dropped sparse columns: {:?}", dropped);
        metrics::normalize::columns_dropped(self.source_id(), dropped.len());
        stats.dropped_columns = dropped;

        let (dataset, unknown_box_office) = Self::parse_column(
            dataset,
            WIKI_BOX_OFFICE,
            BOX_OFFICE,
            |text| Value::from(extract_money(text)),
            Value::is_missing,
        )?;
        let (dataset, unknown_budget) = Self::parse_column(
            dataset,
            WIKI_BUDGET,
            BUDGET,
            |text| Value::from(extract_money(text)),
            Value::is_missing,
        )?;
        let (dataset, unparseable_dates) = Self::parse_column(
            dataset,
            WIKI_RELEASE_DATE,
            RELEASE_DATE,
            |text| parse_release_date(text).map(Value::Date).unwrap_or_default(),
            Value::is_missing,
        )?;
        let (dataset, zero_durations) = Self::parse_column(
            dataset,
            WIKI_RUNNING_TIME,
            RUNNING_TIME,
            |text| Value::Int(i64::from(parse_running_time(text))),
            Value::is_zero,
        )?;

        for (column, count) in [
            (BOX_OFFICE, unknown_box_office),
            (BUDGET, unknown_budget),
            (RELEASE_DATE, unparseable_dates),
            (RUNNING_TIME, zero_durations),
        ] {
            metrics::normalize::sentinel_values(column, count);
            stats.sentinel_counts.insert(column.to_string(), count);
        }
        info!("Unparsed encyclopedia values per column: {:?}", stats.sentinel_counts);

        stats.output_rows = dataset.len();
        Ok(NormalizeOutcome { dataset, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use chrono::NaiveDate;

    fn movie(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    fn film(title: &str, imdb: &str, extra: &[(&str, &str)]) -> Record {
        let mut r = movie(&[
            ("title", title),
            ("Directed by", "Someone"),
            ("imdb_link", &format!("https://www.imdb.com/title/{}/", imdb)),
            ("Box office", "$1.25 million"),
            ("Budget", "$1,000,000[2]"),
            ("Release date", "January 5, 2003"),
            ("Running time", "1h 30m"),
        ]);
        for (k, v) in extra {
            r.insert(*k, *v);
        }
        r
    }

    fn normalizer() -> WikiNormalizer {
        WikiNormalizer::new(FieldReconciler::default(), DEFAULT_NULL_COLUMN_THRESHOLD)
    }

    #[test]
    fn test_eligibility() {
        assert!(WikiNormalizer::is_eligible(&movie(&[("Director", "a"), ("imdb_link", "x")])));
        assert!(!WikiNormalizer::is_eligible(&movie(&[("Director", "a")])));
        assert!(!WikiNormalizer::is_eligible(&movie(&[
            ("Directed by", "a"),
            ("imdb_link", "x"),
            ("No. of episodes", "10"),
        ])));
    }

    #[test]
    fn test_imdb_id_extraction() {
        assert_eq!(
            WikiNormalizer::imdb_id_from_link("https://www.imdb.com/title/tt0468569/"),
            Some("tt0468569".to_string())
        );
        assert_eq!(
            WikiNormalizer::imdb_id_from_link("https://www.imdb.com/title/tt10872600/"),
            Some("tt10872600".to_string())
        );
        assert_eq!(WikiNormalizer::imdb_id_from_link("https://example.com"), None);
    }

    #[test]
    fn test_normalize_parses_free_text_columns() {
        let raw = Dataset::from_records(
            WIKI_DATASET,
            vec![
                film("A", "tt0000001", &[]),
                film("B", "tt0000002", &[("Running time", "unknown"), ("Budget", "n/a")]),
                movie(&[("title", "Series"), ("Director", "x"), ("imdb_link", "tt0000003"), ("No. of episodes", "8")]),
            ],
        );
        let outcome = normalizer().normalize(raw).unwrap();
        let ds = &outcome.dataset;

        assert_eq!(outcome.stats.filtered_rows, 1);
        assert_eq!(ds.len(), 2);
        assert!(!ds.has_column("Budget"));
        assert!(!ds.has_column("Directed by"));
        assert!(ds.has_column("Director"));
        assert_eq!(ds.cell(0, IMDB_ID), &Value::from("tt0000001"));
        assert_eq!(ds.cell(0, BOX_OFFICE), &Value::Float(1_250_000.0));
        assert_eq!(ds.cell(0, BUDGET), &Value::Float(1_000_000.0));
        assert_eq!(
            ds.cell(0, RELEASE_DATE),
            &Value::Date(NaiveDate::from_ymd_opt(2003, 1, 5).unwrap())
        );
        assert_eq!(ds.cell(0, RUNNING_TIME), &Value::Int(90));
        assert_eq!(ds.cell(1, RUNNING_TIME), &Value::Int(0));
        assert!(ds.cell(1, BUDGET).is_missing());
        assert_eq!(outcome.stats.sentinel_counts[RUNNING_TIME], 1);
        assert_eq!(outcome.stats.sentinel_counts[BUDGET], 1);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let raw = Dataset::from_records(
            WIKI_DATASET,
            vec![film("First", "tt0000001", &[]), film("Second", "tt0000001", &[])],
        );
        let outcome = normalizer().normalize(raw).unwrap();
        assert_eq!(outcome.dataset.len(), 1);
        assert_eq!(outcome.stats.duplicate_rows, 1);
        assert_eq!(outcome.dataset.cell(0, "title"), &Value::from("First"));
    }

    #[test]
    fn test_sparse_columns_dropped() {
        let mut rows: Vec<Record> = (0..10)
            .map(|i| film(&format!("M{}", i), &format!("tt{:07}", i), &[]))
            .collect();
        rows[0].insert("Narrated by", "Someone");
        let outcome = normalizer().normalize(Dataset::from_records(WIKI_DATASET, rows)).unwrap();
        assert!(!outcome.dataset.has_column("Narrated by"));
        assert_eq!(outcome.stats.dropped_columns, vec!["Narrated by".to_string()]);
    }

    #[test]
    fn test_missing_source_column_is_fatal() {
        let raw = Dataset::from_records(
            WIKI_DATASET,
            vec![movie(&[("Director", "x"), ("imdb_link", "tt0000001"), ("Budget", "$5 million")])],
        );
        let err = normalizer().normalize(raw).unwrap_err();
        assert!(matches!(err, EtlError::MissingColumn { ref column, .. } if column == "Box office"));
    }
}
