use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use movie_etl::config::Config;
use movie_etl::pipeline::{InMemoryStore, MovieStore, PipelineOrchestrator, SqliteStore};
use movie_etl::{EtlError, Value};

const CATALOG_HEADER: &str =
    "adult,budget,genres,id,imdb_id,original_title,popularity,release_date,revenue,runtime,title,video,vote_average,vote_count";

fn write_wiki(dir: &Path) -> Result<()> {
    let film = |title: &str, imdb: &str, budget: &str, box_office: &str, released: serde_json::Value, running: &str| {
        json!({
            "url": format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
            "title": title,
            "Directed by": "Someone",
            "Starring": ["Lead One", "Lead Two"],
            "Box office": box_office,
            "Budget": budget,
            "Release date": released,
            "Running time": running,
            "imdb_link": format!("https://www.imdb.com/title/{}/", imdb),
        })
    };
    let pages = json!([
        film("Toy Story", "tt0114709", "$30 million[1]", "$373.6 million",
             json!(["November 22, 1995", "(United States)"]), "81 minutes"),
        {
            "url": "https://en.wikipedia.org/wiki/Some_Series",
            "title": "Some Series",
            "Director": "Someone",
            "imdb_link": "https://www.imdb.com/title/tt0000042/",
            "No. of episodes": "12"
        },
        film("Heat", "tt0113277", "$60 million", "$187.4 million",
             json!("December 15, 1995"), "170 minutes"),
        film("Lost Film", "tt9999999", "$1 million", "$2 million",
             json!("1999"), "1h 30m"),
    ]);
    fs::write(dir.join("wikipedia-movies.json"), serde_json::to_string(&pages)?)?;
    Ok(())
}

fn write_catalog(dir: &Path, heat_id: &str) -> Result<()> {
    let rows = [
        CATALOG_HEADER.to_string(),
        "False,30000000,\"[{'id': 16, 'name': 'Animation'}]\",862,tt0114709,Toy Story,21.946943,1995-10-30,373554033,81.0,Toy Story,False,7.7,5415".to_string(),
        format!("False,0,,{},tt0113277,Heat,17.924927,1995-12-15,187436818,0,Heat,False,7.7,1886", heat_id),
        "True,0,,9,tt0000009,Adult,1.0,1990-01-01,0,,Adult,False,0,0".to_string(),
    ];
    fs::write(dir.join("movies_metadata.csv"), rows.join("\n") + "\n")?;
    Ok(())
}

fn write_ratings(dir: &Path) -> Result<()> {
    let csv = "userId,movieId,rating,timestamp\n\
               1,862,5.0,1260759144\n\
               2,862,5.0,1260759179\n\
               3,862,3.5,1260759182\n\
               1,949,4.0,1260759185\n\
               4,31337,2.0,1260759190\n";
    fs::write(dir.join("ratings.csv"), csv)?;
    Ok(())
}

fn fixture_config(dir: &Path, heat_id: &str) -> Result<Config> {
    write_wiki(dir)?;
    write_catalog(dir, heat_id)?;
    write_ratings(dir)?;
    let mut config = Config::from_data_dir(dir)?;
    config.database.path = dir.join("movie_data.db");
    config.load.ratings_chunk_size = 2;
    Ok(config)
}

#[test]
fn test_full_run_loads_movies_and_ratings() -> Result<()> {
    let temp_dir = tempdir()?;
    let config = fixture_config(temp_dir.path(), "949")?;
    let store = SqliteStore::open(&config.database.path)?;

    let mut orchestrator = PipelineOrchestrator::new(config, store);
    let report = orchestrator.run()?;

    assert_eq!(report.wiki.input_rows, 4);
    assert_eq!(report.wiki.filtered_rows, 1);
    assert_eq!(report.catalog.filtered_rows, 1);
    assert_eq!(report.merged_rows, 2);
    assert_eq!(report.wiki_unmatched, 1);
    assert_eq!(report.catalog_unmatched, 0);
    assert_eq!(report.ratings.rows_loaded, 5);
    assert_eq!(report.ratings.chunks_loaded, 3);
    assert_eq!(report.rating_columns, vec!["rating_2", "rating_3.5", "rating_4", "rating_5"]);
    assert_eq!(report.movie_rows_written, 2);

    let store = orchestrator.into_store();
    assert_eq!(store.movie_count()?, 2);
    assert_eq!(store.rating_count()?, 5);

    let (title, budget, runtime, five_stars): (String, f64, f64, i64) = store.connection().query_row(
        "SELECT title, budget, runtime, rating_5 FROM movies WHERE imdb_id = 'tt0114709'",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
    )?;
    assert_eq!(title, "Toy Story");
    assert_eq!(budget, 30_000_000.0);
    assert_eq!(runtime, 81.0);
    assert_eq!(five_stars, 2);

    // Heat's catalog budget and runtime are zero, so the encyclopedia values win.
    let (budget, runtime, four_stars): (f64, f64, i64) = store.connection().query_row(
        "SELECT budget, runtime, rating_4 FROM movies WHERE kaggle_id = 949",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;
    assert_eq!(budget, 60_000_000.0);
    assert_eq!(runtime, 170.0);
    assert_eq!(four_stars, 1);

    Ok(())
}

#[test]
fn test_transform_writes_nothing() -> Result<()> {
    let temp_dir = tempdir()?;
    let config = fixture_config(temp_dir.path(), "949")?;

    let mut orchestrator = PipelineOrchestrator::new(config, InMemoryStore::new());
    let outcome = orchestrator.transform()?;

    let movies = &outcome.movies;
    assert_eq!(movies.len(), 2);
    assert_eq!(movies.columns().len(), 35);
    assert_eq!(movies.columns()[0], "imdb_id");
    assert_eq!(movies.columns()[30], "based_on");
    assert_eq!(movies.columns()[31..], ["rating_2", "rating_3.5", "rating_4", "rating_5"]);
    assert!(!movies.has_column("running_time"));
    assert!(!movies.has_column("budget_wiki"));
    assert_eq!(movies.cell(0, "wikipedia_url"), &Value::from("https://en.wikipedia.org/wiki/Toy_Story"));
    assert_eq!(movies.cell(1, "rating_5"), &Value::Int(0));
    assert_eq!(outcome.report.movie_rows_written, 0);

    let store = orchestrator.into_store();
    assert!(store.movie_writes().is_empty());
    assert!(store.ratings().is_empty());
    Ok(())
}

#[test]
fn test_bad_catalog_id_aborts_before_any_write() -> Result<()> {
    let temp_dir = tempdir()?;
    let config = fixture_config(temp_dir.path(), "1997-08-20")?;
    let db_path = config.database.path.clone();

    let mut orchestrator = PipelineOrchestrator::new(config, SqliteStore::open(&db_path)?);
    let err = orchestrator.run().unwrap_err();
    assert!(matches!(err, EtlError::TypeCoercion { ref column, .. } if column == "id"));

    let store = orchestrator.into_store();
    assert_eq!(store.rating_count()?, 0);
    let movies_tables: i64 = store.connection().query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'movies'",
        [],
        |row| row.get(0),
    )?;
    assert_eq!(movies_tables, 0);
    Ok(())
}

#[test]
fn test_in_memory_store_records_chunks() -> Result<()> {
    let temp_dir = tempdir()?;
    let config = fixture_config(temp_dir.path(), "949")?;

    let mut orchestrator = PipelineOrchestrator::new(config, InMemoryStore::new());
    orchestrator.run()?;
    let store = orchestrator.into_store();
    assert_eq!(store.rating_chunks(), 3);
    assert_eq!(store.ratings().len(), 5);
    assert_eq!(store.movie_writes().len(), 1);

    // A second append lands after the first run's rows.
    let mut store = store;
    let replay = store.ratings()[..1].to_vec();
    store.append_ratings(&replay)?;
    assert_eq!(store.ratings().len(), 6);
    Ok(())
}
