use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::constants::CATALOG_DATASET;
use crate::error::Result;
use crate::types::{Dataset, Record, Value};

/// Reads the catalog export; every cell stays text and empty cells are missing.
pub fn read_catalog_csv(path: &Path) -> Result<Dataset> {
    let dataset = parse_catalog_csv(File::open(path)?)?;
    info!("Read {} catalog rows from {}", dataset.len(), path.display());
    Ok(dataset)
}

pub fn parse_catalog_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let row: Record = headers
            .iter()
            .zip(record.iter())
            .map(|(column, cell)| {
                let value = if cell.is_empty() {
                    Value::Missing
                } else {
                    Value::from(cell)
                };
                (column.clone(), value)
            })
            .collect();
        rows.push(row);
    }
    Ok(Dataset::with_columns(CATALOG_DATASET, headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cells_are_missing() {
        let csv = "adult,budget,id,imdb_id,title\nFalse,30000000,862,tt0114709,Toy Story\nFalse,,863,,\"Jumanji, Part 1\"\n";
        let ds = parse_catalog_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.columns().len(), 5);
        assert_eq!(ds.cell(0, "budget"), &Value::from("30000000"));
        assert!(ds.cell(1, "budget").is_missing());
        assert!(ds.cell(1, "imdb_id").is_missing());
        assert_eq!(ds.cell(1, "title"), &Value::from("Jumanji, Part 1"));
    }

    #[test]
    fn test_ragged_row_is_an_error() {
        let csv = "a,b\n1,2\n3\n";
        assert!(parse_catalog_csv(csv.as_bytes()).is_err());
    }
}
