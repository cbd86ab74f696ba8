//! Dataset and column name constants shared across the pipeline stages.

// Dataset names (used in error messages and logs)
pub const WIKI_DATASET: &str = "wiki_movies";
pub const CATALOG_DATASET: &str = "catalog_movies";
pub const MERGED_DATASET: &str = "movies";
pub const RATINGS_DATASET: &str = "ratings";

// Encyclopedia eligibility
pub const DIRECTOR: &str = "Director";
pub const DIRECTED_BY: &str = "Directed by";
pub const IMDB_LINK: &str = "imdb_link";
pub const EPISODE_COUNT: &str = "No. of episodes";

// Encyclopedia free-text columns and their parsed replacements
pub const WIKI_BOX_OFFICE: &str = "Box office";
pub const WIKI_BUDGET: &str = "Budget";
pub const WIKI_RELEASE_DATE: &str = "Release date";
pub const WIKI_RUNNING_TIME: &str = "Running time";
pub const BOX_OFFICE: &str = "box_office";
pub const BUDGET: &str = "budget";
pub const RELEASE_DATE: &str = "release_date";
pub const RUNNING_TIME: &str = "running_time";

pub const ALT_TITLES: &str = "alt_titles";
pub const IMDB_ID: &str = "imdb_id";

// Catalog columns
pub const ADULT: &str = "adult";
pub const VIDEO: &str = "video";
pub const CATALOG_ID: &str = "id";
pub const POPULARITY: &str = "popularity";
pub const REVENUE: &str = "revenue";
pub const RUNTIME: &str = "runtime";
pub const VOTE_AVERAGE: &str = "vote_average";
pub const VOTE_COUNT: &str = "vote_count";

// Merge
pub const WIKI_SUFFIX: &str = "_wiki";
pub const CATALOG_SUFFIX: &str = "_kaggle";
pub const KAGGLE_ID: &str = "kaggle_id";

// Ratings
pub const RATING_COLUMN_PREFIX: &str = "rating_";
pub const DEFAULT_RATINGS_CHUNK_SIZE: usize = 1_000_000;
pub const DEFAULT_NULL_COLUMN_THRESHOLD: f64 = 0.9;

/// Keys holding alternate or foreign-language titles in the encyclopedia dump.
pub const ALT_TITLE_KEYS: &[&str] = &[
    "Also known as",
    "Arabic",
    "Cantonese",
    "Chinese",
    "French",
    "Hangul",
    "Hebrew",
    "Hepburn",
    "Japanese",
    "Literally",
    "Mandarin",
    "McCune–Reischauer",
    "Original title",
    "Polish",
    "Revised Romanization",
    "Romanized",
    "Russian",
    "Simplified",
    "Traditional",
    "Yiddish",
];

/// Synonym keys collapsed into one canonical key, applied top to bottom.
/// Order matters: `Released` chains through `Release Date` into `Release date`.
pub const RENAME_RULES: &[(&str, &str)] = &[
    ("Adaptation by", "Writer(s)"),
    ("Country of origin", "Country"),
    ("Directed by", "Director"),
    ("Distributed by", "Distributor"),
    ("Edited by", "Editor(s)"),
    ("Length", "Running time"),
    ("Original release", "Release date"),
    ("Music by", "Composer(s)"),
    ("Produced by", "Producer(s)"),
    ("Producer", "Producer(s)"),
    ("Productioncompanies ", "Production company(s)"),
    ("Productioncompany ", "Production company(s)"),
    ("Released", "Release Date"),
    ("Release Date", "Release date"),
    ("Screen story by", "Writer(s)"),
    ("Screenplay by", "Writer(s)"),
    ("Story by", "Writer(s)"),
    ("Theme music composer", "Composer(s)"),
    ("Written by", "Writer(s)"),
];

/// Final `movies` schema: (merged column, output column), in output order.
pub const MOVIE_PROJECTION: &[(&str, &str)] = &[
    ("imdb_id", "imdb_id"),
    ("id", "kaggle_id"),
    ("title_kaggle", "title"),
    ("original_title", "original_title"),
    ("tagline", "tagline"),
    ("belongs_to_collection", "belongs_to_collection"),
    ("url", "wikipedia_url"),
    ("imdb_link", "imdb_link"),
    ("runtime", "runtime"),
    ("budget_kaggle", "budget"),
    ("revenue", "revenue"),
    ("release_date_kaggle", "release_date"),
    ("popularity", "popularity"),
    ("vote_average", "vote_average"),
    ("vote_count", "vote_count"),
    ("genres", "genres"),
    ("original_language", "original_language"),
    ("overview", "overview"),
    ("spoken_languages", "spoken_languages"),
    ("Country", "country"),
    ("production_companies", "production_companies"),
    ("production_countries", "production_countries"),
    ("Distributor", "distributor"),
    ("Producer(s)", "producers"),
    ("Director", "director"),
    ("Starring", "starring"),
    ("Cinematography", "cinematography"),
    ("Editor(s)", "editors"),
    ("Writer(s)", "writers"),
    ("Composer(s)", "composers"),
    ("Based on", "based_on"),
];

/// Fill-gap pairs: (authoritative catalog column, secondary encyclopedia column).
pub const MOVIE_FILL_PAIRS: &[(&str, &str)] = &[
    ("runtime", "running_time"),
    ("budget_kaggle", "budget_wiki"),
    ("revenue", "box_office"),
];
