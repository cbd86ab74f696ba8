use tracing::debug;

use super::MovieStore;
use crate::error::Result;
use crate::pipeline::processing::ratings::Rating;
use crate::types::Dataset;

/// In-memory store for development/testing
#[derive(Debug, Default)]
pub struct InMemoryStore {
    movies: Vec<Dataset>,
    ratings: Vec<Rating>,
    rating_chunks: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every movies dataset written so far, oldest first.
    pub fn movie_writes(&self) -> &[Dataset] {
        &self.movies
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn rating_chunks(&self) -> usize {
        self.rating_chunks
    }
}

impl MovieStore for InMemoryStore {
    fn write_movies(&mut self, movies: &Dataset) -> Result<()> {
        debug!("Storing {} movie rows in memory", movies.len());
        self.movies.push(movies.clone());
        Ok(())
    }

    fn append_ratings(&mut self, chunk: &[Rating]) -> Result<()> {
        self.ratings.extend_from_slice(chunk);
        self.rating_chunks += 1;
        Ok(())
    }
}
