use csv::{Reader, ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::constants::RATINGS_DATASET;
use crate::error::{EtlError, Result};
use crate::pipeline::processing::ratings::Rating;

const USER_ID: &str = "userId";
const MOVIE_ID: &str = "movieId";
const RATING: &str = "rating";
const TIMESTAMP: &str = "timestamp";

/// Streams the ratings log in bounded chunks instead of loading it whole.
pub struct RatingsReader<R: Read> {
    reader: Reader<R>,
    chunk_size: usize,
    /// Header positions of userId, movieId, rating, timestamp
    positions: [usize; 4],
    rows_read: usize,
    done: bool,
}

impl RatingsReader<File> {
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self> {
        Self::new(File::open(path)?, chunk_size)
    }
}

impl<R: Read> RatingsReader<R> {
    pub fn new(source: R, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(EtlError::Config("ratings chunk size must be positive".to_string()));
        }
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(source);
        let headers = reader.headers()?.clone();
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| EtlError::missing_column(name, RATINGS_DATASET))
        };
        let positions = [
            position(USER_ID)?,
            position(MOVIE_ID)?,
            position(RATING)?,
            position(TIMESTAMP)?,
        ];
        Ok(Self {
            reader,
            chunk_size,
            positions,
            rows_read: 0,
            done: false,
        })
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    fn field<T: FromStr>(
        &self,
        record: &StringRecord,
        slot: usize,
        column: &str,
        expected: &'static str,
    ) -> Result<T> {
        let raw = record.get(self.positions[slot]).unwrap_or("");
        raw.trim().parse().map_err(|_| EtlError::TypeCoercion {
            dataset: RATINGS_DATASET.to_string(),
            column: column.to_string(),
            row: self.rows_read,
            value: raw.to_string(),
            expected,
        })
    }

    fn parse(&self, record: &StringRecord) -> Result<Rating> {
        Ok(Rating {
            user_id: self.field(record, 0, USER_ID, "an integer")?,
            movie_id: self.field(record, 1, MOVIE_ID, "an integer")?,
            rating: self.field(record, 2, RATING, "a number")?,
            timestamp: self.field(record, 3, TIMESTAMP, "an integer")?,
        })
    }

    /// Next chunk of at most `chunk_size` ratings, or `None` at end of input.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<Rating>>> {
        if self.done {
            return Ok(None);
        }
        let mut chunk = Vec::with_capacity(self.chunk_size.min(64 * 1024));
        let mut record = StringRecord::new();
        while chunk.len() < self.chunk_size {
            if !self.reader.read_record(&mut record)? {
                self.done = true;
                break;
            }
            chunk.push(self.parse(&record)?);
            self.rows_read += 1;
        }
        Ok(if chunk.is_empty() { None } else { Some(chunk) })
    }
}

impl<R: Read> Iterator for RatingsReader<R> {
    type Item = Result<Vec<Rating>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
