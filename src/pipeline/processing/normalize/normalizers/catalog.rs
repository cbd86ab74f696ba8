use chrono::NaiveDate;
use tracing::{info, instrument};

use super::{NormalizeOutcome, NormalizeStats, SourceNormalizer};
use crate::constants::*;
use crate::error::{EtlError, Result};
use crate::observability::metrics;
use crate::types::{Dataset, Value};

/// Columns the catalog export is contractually expected to carry
const REQUIRED_COLUMNS: &[&str] = &[ADULT, VIDEO, BUDGET, CATALOG_ID, POPULARITY, RELEASE_DATE, IMDB_ID];

/// Numeric columns that may legitimately be blank or malformed
const LENIENT_FLOAT_COLUMNS: &[&str] = &[REVENUE, RUNTIME, VOTE_AVERAGE, VOTE_COUNT];

/// Normalizer for the structured catalog export
#[derive(Debug, Default)]
pub struct CatalogNormalizer;

impl CatalogNormalizer {
    pub fn new() -> Self {
        Self
    }

    fn coercion_error(column: &str, row: usize, value: &str, expected: &'static str) -> EtlError {
        EtlError::TypeCoercion {
            dataset: CATALOG_DATASET.to_string(),
            column: column.to_string(),
            row,
            value: value.to_string(),
            expected,
        }
    }

    fn strict<T, P, W>(
        dataset: Dataset,
        column: &'static str,
        expected: &'static str,
        parse: P,
        wrap: W,
    ) -> Result<Dataset>
    where
        P: Fn(&str) -> Option<T>,
        W: Fn(T) -> Value,
    {
        dataset.map_column(column, |row, value| match value {
            Value::Missing => Ok(Value::Missing),
            Value::Text(s) => parse(s.trim())
                .map(&wrap)
                .ok_or_else(|| Self::coercion_error(column, row, s, expected)),
            other => Ok(other.clone()),
        })
    }

    fn lenient_float(dataset: Dataset, column: &str) -> Result<Dataset> {
        if !dataset.has_column(column) {
            return Ok(dataset);
        }
        dataset.map_column(column, |_, value| {
            Ok(match value {
                Value::Text(s) => Value::from(s.trim().parse::<f64>().ok()),
                other => other.clone(),
            })
        })
    }
}

impl SourceNormalizer for CatalogNormalizer {
    fn source_id(&self) -> &str {
        CATALOG_DATASET
    }

    #[instrument(skip(self, raw), fields(rows = raw.len()))]
    fn normalize(&self, raw: Dataset) -> Result<NormalizeOutcome> {
        for column in REQUIRED_COLUMNS {
            raw.require_column(column)?;
        }
        let mut stats = NormalizeStats {
            input_rows: raw.len(),
            ..Default::default()
        };

        let dataset = raw
            .filter_rows(|row| row.value(ADULT).as_text() == Some("False"))
            .drop_column(ADULT);
        stats.filtered_rows = stats.input_rows - dataset.len();
        metrics::normalize::records_eligible(self.source_id(), dataset.len());
        metrics::normalize::records_filtered(self.source_id(), stats.filtered_rows);

        let dataset = dataset.map_column(VIDEO, |_, value| {
            Ok(Value::Bool(value.as_text() == Some("True")))
        })?;
        let dataset = Self::strict(dataset, BUDGET, "an integer", |s| s.parse::<i64>().ok(), Value::Int)?;
        let dataset = Self::strict(dataset, CATALOG_ID, "an integer", |s| s.parse::<i64>().ok(), Value::Int)?;
        let dataset = Self::strict(dataset, POPULARITY, "a number", |s| s.parse::<f64>().ok(), Value::Float)?;
        let dataset = Self::strict(
            dataset,
            RELEASE_DATE,
            "a date",
            |s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
            Value::Date,
        )?;

        let mut dataset = dataset;
        for column in LENIENT_FLOAT_COLUMNS {
            dataset = Self::lenient_float(dataset, column)?;
        }

        info!(
            "Catalog rows kept: {} of {} ({} adult rows excluded)",
            dataset.len(),
            stats.input_rows,
            stats.filtered_rows
        );
        stats.output_rows = dataset.len();
        Ok(NormalizeOutcome { dataset, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;

    const HEADER: &[&str] = &[
        "adult", "budget", "id", "imdb_id", "popularity", "release_date", "revenue", "runtime", "title", "video",
    ];

    fn row(cells: &[&str]) -> Record {
        HEADER
            .iter()
            .zip(cells)
            .map(|(k, v)| {
                let value = if v.is_empty() { Value::Missing } else { Value::from(*v) };
                (k.to_string(), value)
            })
            .collect()
    }

    fn catalog(rows: Vec<Record>) -> Dataset {
        Dataset::with_columns(
            CATALOG_DATASET,
            HEADER.iter().map(|h| h.to_string()).collect(),
            rows,
        )
    }

    #[test]
    fn test_adult_rows_excluded_and_types_coerced() {
        let outcome = CatalogNormalizer::new()
            .normalize(catalog(vec![
                row(&["False", "30000000", "862", "tt0114709", "21.946943", "1995-10-30", "373554033", "81.0", "Toy Story", "False"]),
                row(&["True", "0", "9", "tt0000009", "1.0", "1990-01-01", "0", "", "Adult", "False"]),
                row(&["False", "0", "11", "tt0000011", "2.5", "", "", "n/a", "Blank", "True"]),
            ]))
            .unwrap();
        let ds = &outcome.dataset;

        assert_eq!(ds.len(), 2);
        assert_eq!(outcome.stats.filtered_rows, 1);
        assert!(!ds.has_column(ADULT));
        assert_eq!(ds.cell(0, BUDGET), &Value::Int(30_000_000));
        assert_eq!(ds.cell(0, CATALOG_ID), &Value::Int(862));
        assert_eq!(ds.cell(0, POPULARITY), &Value::Float(21.946943));
        assert_eq!(ds.cell(0, RUNTIME), &Value::Float(81.0));
        assert_eq!(ds.cell(0, VIDEO), &Value::Bool(false));
        assert_eq!(ds.cell(1, VIDEO), &Value::Bool(true));
        assert!(ds.cell(1, RELEASE_DATE).is_missing());
        assert!(ds.cell(1, RUNTIME).is_missing());
        assert!(ds.cell(1, REVENUE).is_missing());
    }

    #[test]
    fn test_non_numeric_id_is_fatal() {
        let err = CatalogNormalizer::new()
            .normalize(catalog(vec![row(&[
                "False", "0", "1997-08-20", "tt0000001", "1.0", "1995-10-30", "0", "90", "Bad", "False",
            ])]))
            .unwrap_err();
        match err {
            EtlError::TypeCoercion { column, row, value, .. } => {
                assert_eq!(column, CATALOG_ID);
                assert_eq!(row, 0);
                assert_eq!(value, "1997-08-20");
            }
            other => panic!("expected TypeCoercion, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let ds = Dataset::from_records(CATALOG_DATASET, vec![row(&["False"])]);
        assert!(matches!(
            CatalogNormalizer::new().normalize(ds),
            Err(EtlError::MissingColumn { .. })
        ));
    }
}
