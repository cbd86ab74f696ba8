use serde_json::Map;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

use crate::constants::WIKI_DATASET;
use crate::error::Result;
use crate::types::{Dataset, Record, Value};

/// Reads the encyclopedia dump: a JSON array of objects, one per page.
pub fn read_wiki_json(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path)?;
    let records = parse_wiki_json(BufReader::new(file))?;
    info!("Read {} encyclopedia records from {}", records.len(), path.display());
    Ok(records)
}

/// Key order of each object is kept; `null` fields stay present as missing.
pub fn parse_wiki_json<R: Read>(reader: R) -> Result<Vec<Record>> {
    let objects: Vec<Map<String, serde_json::Value>> = serde_json::from_reader(reader)?;
    Ok(objects
        .into_iter()
        .map(|object| {
            object
                .into_iter()
                .map(|(key, value)| (key, Value::from_json(value)))
                .collect()
        })
        .collect())
}

/// Convenience for callers that want the raw dump as a dataset.
pub fn wiki_dataset(records: Vec<Record>) -> Dataset {
    Dataset::from_records(WIKI_DATASET, records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_key_order_and_shapes() {
        let json = r#"[
            {"url": "https://en.wikipedia.org/wiki/Heat", "Starring": ["Al Pacino", "Robert De Niro"], "Budget": "$60 million", "Language": null}
        ]"#;
        let records = parse_wiki_json(json.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.keys().collect::<Vec<_>>(), vec!["url", "Starring", "Budget", "Language"]);
        assert_eq!(
            r.value("Starring"),
            &Value::List(vec!["Al Pacino".to_string(), "Robert De Niro".to_string()])
        );
        assert!(r.contains_key("Language"));
        assert!(r.value("Language").is_missing());
    }

    #[test]
    fn test_non_array_document_is_rejected() {
        assert!(parse_wiki_json(r#"{"title": "x"}"#.as_bytes()).is_err());
    }
}
