use crate::error::Result;
use crate::types::{Dataset, Value};

/// One non-missing cell of a column, flattened to text, with its row index.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedCell {
    pub row: usize,
    pub text: String,
}

/// Pulls `column` out of `dataset` as one string per present cell.
///
/// List cells are joined with single spaces. Missing cells are skipped, not
/// emptied. A column absent from the whole dataset is a schema mismatch.
pub fn extract_and_join_column(dataset: &Dataset, column: &str) -> Result<Vec<ExtractedCell>> {
    dataset.require_column(column)?;

    let cells = dataset
        .rows()
        .iter()
        .enumerate()
        .filter_map(|(row, record)| {
            let text = match record.value(column) {
                Value::Missing => return None,
                Value::Text(s) => s.clone(),
                Value::List(items) => items.join(" "),
                other => other.to_json().to_string(),
            };
            Some(ExtractedCell { row, text })
        })
        .collect();
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use crate::types::Record;

    fn dataset() -> Dataset {
        let mut a = Record::new();
        a.insert("Budget", vec!["$5 million".to_string(), "[1]".to_string()]);
        let b = Record::new();
        let mut c = Record::new();
        c.insert("Budget", "$300,000");
        Dataset::from_records("wiki", vec![a, b, c])
    }

    #[test]
    fn test_lists_joined_and_missing_skipped() {
        let cells = extract_and_join_column(&dataset(), "Budget").unwrap();
        assert_eq!(
            cells,
            vec![
                ExtractedCell { row: 0, text: "$5 million [1]".to_string() },
                ExtractedCell { row: 2, text: "$300,000".to_string() },
            ]
        );
    }

    #[test]
    fn test_absent_column_is_fatal() {
        match extract_and_join_column(&dataset(), "Box office") {
            Err(EtlError::MissingColumn { column, dataset }) => {
                assert_eq!(column, "Box office");
                assert_eq!(dataset, "wiki");
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }
}
