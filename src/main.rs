use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use movie_etl::config::Config;
use movie_etl::logging;
use movie_etl::pipeline::{InMemoryStore, PipelineOrchestrator, PipelineReport, SqliteStore};

#[derive(Parser)]
#[command(name = "movie_etl")]
#[command(about = "Movie metadata reconciliation pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    /// Directory for the rotating JSON log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize, merge and load everything into the database
    Run(SourceArgs),
    /// Run the transform stages only and print diagnostics
    Inspect(SourceArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// TOML config file
    #[arg(long, conflicts_with = "data_dir")]
    config: Option<PathBuf>,
    /// Directory holding the default source files
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Database file (overrides config)
    #[arg(long)]
    database: Option<PathBuf>,
    /// Ratings rows per chunk (overrides config)
    #[arg(long)]
    chunk_size: Option<usize>,
}

impl SourceArgs {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match (&self.config, &self.data_dir) {
            (Some(path), _) => Config::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            (None, Some(dir)) => Config::from_data_dir(dir)?,
            (None, None) => Config::from_data_dir(Path::new("."))?,
        };
        if let Some(database) = self.database {
            config.database.path = database;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.load.ratings_chunk_size = chunk_size;
        }
        config.validate()?;
        Ok(config)
    }
}

fn print_report(report: &PipelineReport) {
    println!("\n📊 Pipeline Results:");
    println!(
        "   Encyclopedia: {} in, {} kept ({} filtered, {} duplicates)",
        report.wiki.input_rows,
        report.wiki.output_rows,
        report.wiki.filtered_rows,
        report.wiki.duplicate_rows
    );
    println!(
        "   Catalog: {} in, {} kept ({} filtered)",
        report.catalog.input_rows, report.catalog.output_rows, report.catalog.filtered_rows
    );
    println!(
        "   Merged movies: {} (unmatched: {} encyclopedia, {} catalog)",
        report.merged_rows, report.wiki_unmatched, report.catalog_unmatched
    );
    for (column, count) in &report.wiki.sentinel_counts {
        println!("   Unparsed {}: {}", column, count);
    }
    for (column, count) in &report.gaps_filled {
        println!("   Gaps filled in {}: {}", column, count);
    }
    println!(
        "   Ratings: {} rows in {} chunks, {} movies rated",
        report.ratings.rows_loaded, report.ratings.chunks_loaded, report.rated_movies
    );
    println!("   Movies written: {}", report.movie_rows_written);
    println!("   Elapsed: {:.2}s", report.elapsed_secs);
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(&cli.log_dir);

    match cli.command {
        Commands::Run(args) => {
            let config = args.into_config()?;
            println!("🔄 Running movie pipeline...");
            let store = SqliteStore::open(&config.database.path).with_context(|| {
                format!("opening database {}", config.database.path.display())
            })?;
            let mut orchestrator = PipelineOrchestrator::new(config, store);
            match orchestrator.run() {
                Ok(report) => {
                    info!("Pipeline finished");
                    print_report(&report);
                }
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Inspect(args) => {
            let config = args.into_config()?;
            let mut orchestrator = PipelineOrchestrator::new(config, InMemoryStore::new());
            let outcome = orchestrator.transform()?;
            print_report(&outcome.report);
            println!("\n   Columns: {}", outcome.movies.columns().join(", "));
            println!(
                "\n{}",
                serde_json::to_string_pretty(&outcome.report).context("serializing report")?
            );
        }
    }

    Ok(())
}
