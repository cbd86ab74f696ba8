// Pipeline ingestion: reading the three movie sources from disk

pub mod catalog_csv;
pub mod ratings_csv;
pub mod wiki_json;

pub use catalog_csv::{parse_catalog_csv, read_catalog_csv};
pub use ratings_csv::RatingsReader;
pub use wiki_json::{parse_wiki_json, read_wiki_json, wiki_dataset};
