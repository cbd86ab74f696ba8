// Persistence for the merged movies dataset and the raw ratings log

pub mod in_memory;
pub mod sqlite;

use crate::error::Result;
use crate::pipeline::processing::ratings::Rating;
use crate::types::Dataset;

pub use in_memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Storage trait for the two output tables
pub trait MovieStore {
    /// Writes the complete movies dataset in one transaction.
    fn write_movies(&mut self, movies: &Dataset) -> Result<()>;

    /// Appends one bounded chunk of rating events in one transaction.
    fn append_ratings(&mut self, chunk: &[Rating]) -> Result<()>;
}

impl<S: MovieStore + ?Sized> MovieStore for Box<S> {
    fn write_movies(&mut self, movies: &Dataset) -> Result<()> {
        (**self).write_movies(movies)
    }

    fn append_ratings(&mut self, chunk: &[Rating]) -> Result<()> {
        (**self).append_ratings(chunk)
    }
}
