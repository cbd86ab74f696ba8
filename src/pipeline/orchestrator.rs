use serde::Serialize;
use std::time::Instant;
use tracing::{info, instrument};

use crate::config::Config;
use crate::constants::KAGGLE_ID;
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::ingestion::{read_catalog_csv, read_wiki_json, wiki_dataset, RatingsReader};
use crate::pipeline::processing::normalize::{
    CatalogNormalizer, FieldReconciler, NormalizeStats, SourceNormalizer, WikiNormalizer,
};
use crate::pipeline::processing::ratings::{RatingHistogram, RatingsAggregator};
use crate::pipeline::processing::{MergeOutcome, RecordMerger};
use crate::pipeline::storage::MovieStore;
use crate::types::Dataset;

/// Running totals for the chunked ratings load
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadProgress {
    pub rows_loaded: usize,
    pub chunks_loaded: usize,
}

impl LoadProgress {
    /// Records one chunk and returns the (first, last) row numbers it covered.
    pub fn advance(&mut self, rows: usize) -> (usize, usize) {
        let first = self.rows_loaded;
        self.rows_loaded += rows;
        self.chunks_loaded += 1;
        (first, self.rows_loaded)
    }
}

/// Diagnostics for one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub wiki: NormalizeStats,
    pub catalog: NormalizeStats,
    pub merged_rows: usize,
    /// Encyclopedia rows with no catalog partner
    pub wiki_unmatched: usize,
    /// Catalog rows with no encyclopedia partner
    pub catalog_unmatched: usize,
    pub gaps_filled: Vec<(String, usize)>,
    pub ratings: LoadProgress,
    pub rated_movies: usize,
    pub rating_columns: Vec<String>,
    pub movie_rows_written: usize,
    pub elapsed_secs: f64,
}

/// Final dataset plus diagnostics, produced without touching the store
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    pub movies: Dataset,
    pub report: PipelineReport,
}

struct MetadataStage {
    wiki: NormalizeStats,
    catalog: NormalizeStats,
    merged: MergeOutcome,
}

pub struct PipelineOrchestrator<S: MovieStore> {
    config: Config,
    store: S,
}

impl<S: MovieStore> PipelineOrchestrator<S> {
    pub fn new(config: Config, store: S) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Normalizes both metadata sources and merges them.
    fn metadata_stage(&self) -> Result<MetadataStage> {
        // Step 1: Encyclopedia dump
        let wiki_raw = wiki_dataset(read_wiki_json(&self.config.sources.wiki_json)?);
        let wiki_normalizer = WikiNormalizer::new(
            FieldReconciler::new(self.config.reconcile_rules()),
            self.config.load.null_column_threshold,
        );
        let wiki = wiki_normalizer.normalize(wiki_raw)?;

        // Step 2: Catalog export
        let catalog_raw = read_catalog_csv(&self.config.sources.catalog_csv)?;
        let catalog = CatalogNormalizer::new().normalize(catalog_raw)?;

        // Step 3: Join the two on imdb_id
        let merged = RecordMerger::default().merge(&wiki.dataset, &catalog.dataset)?;
        info!(
            "🔗 Merged {} movies ({} encyclopedia and {} catalog rows unmatched)",
            merged.dataset.len(),
            merged.left_unmatched,
            merged.right_unmatched
        );

        Ok(MetadataStage {
            wiki: wiki.stats,
            catalog: catalog.stats,
            merged,
        })
    }

    /// Streams the ratings log; each chunk is aggregated and, with a store, appended.
    fn ratings_stage(&mut self, persist: bool) -> Result<(RatingHistogram, LoadProgress)> {
        let mut reader = RatingsReader::open(
            &self.config.sources.ratings_csv,
            self.config.load.ratings_chunk_size,
        )?;
        let mut aggregator = RatingsAggregator::new();
        let mut progress = LoadProgress::default();
        let started = Instant::now();

        while let Some(chunk) = reader.next_chunk()? {
            let (first, last) = progress.advance(chunk.len());
            aggregator.ingest(&chunk);
            if persist {
                self.store.append_ratings(&chunk)?;
                metrics::ratings::chunk_loaded(chunk.len());
                info!(
                    "importing rows {} to {}...done. {:.2} total seconds elapsed",
                    first,
                    last,
                    started.elapsed().as_secs_f64()
                );
            }
        }

        Ok((aggregator.finish(), progress))
    }

    fn assemble(
        &mut self,
        persist: bool,
        started: Instant,
    ) -> Result<(Dataset, PipelineReport)> {
        let metadata = self.metadata_stage()?;

        // Step 4: Ratings histogram
        let (histogram, ratings) = self.ratings_stage(persist)?;
        let movies = histogram.join_onto(metadata.merged.dataset, KAGGLE_ID)?;

        // Step 5: One-shot movies write
        let movie_rows_written = if persist {
            self.store.write_movies(&movies)?;
            metrics::load::movie_rows_written(movies.len());
            info!("💾 Wrote {} movies", movies.len());
            movies.len()
        } else {
            0
        };

        let elapsed_secs = started.elapsed().as_secs_f64();
        let report = PipelineReport {
            wiki: metadata.wiki,
            catalog: metadata.catalog,
            merged_rows: movies.len(),
            wiki_unmatched: metadata.merged.left_unmatched,
            catalog_unmatched: metadata.merged.right_unmatched,
            gaps_filled: metadata.merged.gaps_filled,
            ratings,
            rated_movies: histogram.movie_count(),
            rating_columns: histogram.columns(),
            movie_rows_written,
            elapsed_secs,
        };
        Ok((movies, report))
    }

    /// Full run: transform, append ratings chunk by chunk, then write movies.
    ///
    /// Metadata errors surface before the first store write.
    #[instrument(skip(self))]
    pub fn run(&mut self) -> Result<PipelineReport> {
        info!("🚀 Starting movie pipeline");
        let started = Instant::now();
        let (_, report) = self.assemble(true, started)?;
        metrics::load::pipeline_duration(report.elapsed_secs);
        info!("✅ Pipeline finished in {:.2}s", report.elapsed_secs);
        Ok(report)
    }

    /// Runs every transform stage but writes nothing.
    #[instrument(skip(self))]
    pub fn transform(&mut self) -> Result<TransformOutcome> {
        let (movies, report) = self.assemble(false, Instant::now())?;
        Ok(TransformOutcome { movies, report })
    }
}
