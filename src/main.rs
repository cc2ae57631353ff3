//! CLI entry point for the venue workability rater.
//!
//! Provides subcommands for scraping cafés from Google Places and Yelp,
//! re-scoring captured candidates offline, querying stored venues, and
//! inspecting how a single review is read.

mod config;
mod infra;
mod services;

use crate::config::ScraperConfig;
use crate::infra::google::GooglePlacesSource;
use crate::infra::yelp::YelpSource;
use crate::services::place_source::PlaceSource;
use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use venue_workability_rater::analyzers::analyzer::score_candidates;
use venue_workability_rater::analyzers::lexicon::LexiconScorer;
use venue_workability_rater::analyzers::sentiment::analyze_review;
use venue_workability_rater::analyzers::types::{VenueIndex, VenueIndexEntry};
use venue_workability_rater::candidate::Candidate;
use venue_workability_rater::merge::merge_candidates;
use venue_workability_rater::output::{
    UpsertOutcome, append_index_record, load_venue_docs, print_json, upsert_venue_doc,
};
use venue_workability_rater::publish::publish_venues;
use venue_workability_rater::query::{
    DEFAULT_LIMIT, DEFAULT_RADIUS_M, NearPoint, SortOrder, VenueQuery, run_query,
};

#[derive(Parser)]
#[command(name = "venue_workability_rater")]
#[command(about = "Scores cafés by how good they are for working", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search Google Places and Yelp for cafés in a city and score them
    Scrape {
        /// City to search, e.g. "San Francisco"
        #[arg(long)]
        city: String,

        /// Maximum number of venues to keep after merging
        #[arg(short, long, default_value_t = 30)]
        max_results: usize,

        /// Directory for venue documents and the CSV index
        #[arg(short, long, default_value = "venues")]
        output_dir: PathBuf,

        /// Maximum number of concurrent detail requests per provider
        #[arg(short, long, default_value_t = 5)]
        concurrency: usize,

        /// Optional: S3 bucket to publish documents to (e.g., "my-bucket")
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Optional: Gzip compress JSON before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Score candidates captured as JSON, one file per provider
    Score {
        /// JSON files each holding an array of candidates
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Maximum number of venues to keep after merging
        #[arg(short, long, default_value_t = 30)]
        max_results: usize,

        /// Directory for venue documents and the CSV index
        #[arg(short, long, default_value = "venues")]
        output_dir: PathBuf,

        /// Optional: S3 bucket to publish documents to (e.g., "my-bucket")
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Optional: Gzip compress JSON before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Print the factor breakdown for a single review
    AnalyzeReview {
        #[arg(value_name = "TEXT")]
        text: String,
    },
    /// Filter and rank venue documents already written by `scrape` or `score`
    Query {
        /// Directory holding venue documents
        #[arg(short, long, default_value = "venues")]
        output_dir: PathBuf,

        /// City, matched case-insensitively
        #[arg(long)]
        city: Option<String>,

        /// Neighborhood, matched case-insensitively
        #[arg(long)]
        neighborhood: Option<String>,

        /// Free text matched against name, address and tags
        #[arg(short, long)]
        q: Option<String>,

        /// Wi-Fi label (excellent, good, spotty, poor)
        #[arg(long)]
        wifi: Option<String>,

        /// Only venues with outlets available
        #[arg(long, default_value_t = false)]
        outlets: bool,

        /// Noise label (quiet, moderate, loud)
        #[arg(long)]
        noise: Option<String>,

        /// Latitude of the search center
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude of the search center
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,

        /// Search radius in meters around --lat/--lng
        #[arg(long, default_value_t = DEFAULT_RADIUS_M)]
        radius: f64,

        #[arg(long, value_enum, default_value_t = SortArg::WorkabilityScore)]
        sort: SortArg,

        /// Maximum number of venues to print (0 = all)
        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    WorkabilityScore,
    Name,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::WorkabilityScore => SortOrder::Workability,
            SortArg::Name => SortOrder::Name,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/venue_workability_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("venue_workability_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            city,
            max_results,
            output_dir,
            concurrency,
            s3_bucket,
            gzip,
        } => {
            let candidate_lists =
                scrape_city(&ScraperConfig::from_env(), &city, max_results, concurrency).await?;
            run_pipeline(candidate_lists, max_results, &output_dir, s3_bucket, gzip).await?;
        }
        Commands::Score {
            input,
            max_results,
            output_dir,
            s3_bucket,
            gzip,
        } => {
            let candidate_lists = input
                .iter()
                .map(|path| load_candidates(path))
                .collect::<Result<Vec<_>>>()?;
            run_pipeline(candidate_lists, max_results, &output_dir, s3_bucket, gzip).await?;
        }
        Commands::AnalyzeReview { text } => {
            let record = analyze_review(&LexiconScorer::new(), &text);
            print_json(&record)?;
        }
        Commands::Query {
            output_dir,
            city,
            neighborhood,
            q,
            wifi,
            outlets,
            noise,
            lat,
            lng,
            radius,
            sort,
            limit,
        } => {
            let near = match (lat, lng) {
                (Some(lat), Some(lng)) => Some(NearPoint {
                    lat,
                    lng,
                    radius_m: radius,
                }),
                _ => None,
            };
            let query = VenueQuery {
                city,
                neighborhood,
                text: q,
                wifi,
                outlets,
                noise,
                near,
                sort: sort.into(),
                limit,
            };

            let hits = run_query(load_venue_docs(&output_dir)?, &query);
            info!(count = hits.len(), "Query matched venues");
            let rows: Vec<VenueIndexEntry> = hits.iter().map(VenueIndexEntry::from).collect();
            print_json(&rows)?;
        }
    }

    Ok(())
}

/// Reads a JSON array of candidates captured from one provider.
fn load_candidates(path: &Path) -> Result<Vec<Candidate>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Queries every configured provider for `city` concurrently.
///
/// A provider without an API key is skipped with a warning; at least one must
/// be configured.
#[tracing::instrument(skip(config))]
async fn scrape_city(
    config: &ScraperConfig,
    city: &str,
    max_results: usize,
    concurrency: usize,
) -> Result<Vec<Vec<Candidate>>> {
    let google: Option<Box<dyn PlaceSource>> = match &config.google_places_api_key {
        Some(key) => Some(Box::new(GooglePlacesSource::new(key.clone(), concurrency)?)),
        None => {
            warn!("GOOGLE_PLACES_API_KEY not set, skipping Google Places");
            None
        }
    };
    let yelp: Option<Box<dyn PlaceSource>> = match &config.yelp_api_key {
        Some(key) => Some(Box::new(YelpSource::new(key, concurrency)?)),
        None => {
            warn!("YELP_API_KEY not set, skipping Yelp");
            None
        }
    };
    if google.is_none() && yelp.is_none() {
        bail!("no place source configured: set GOOGLE_PLACES_API_KEY or YELP_API_KEY");
    }

    let (google_places, yelp_places) = tokio::join!(
        search_source(google.as_deref(), city, max_results),
        search_source(yelp.as_deref(), city, max_results),
    );

    Ok(vec![google_places, yelp_places])
}

/// Runs one provider's search. A failed search is logged and contributes no
/// candidates.
async fn search_source(
    source: Option<&dyn PlaceSource>,
    city: &str,
    max_results: usize,
) -> Vec<Candidate> {
    let Some(source) = source else {
        return Vec::new();
    };
    match source.search(city, max_results).await {
        Ok(places) => places,
        Err(e) => {
            warn!(source = %source.source(), error = %e, "Place search failed");
            Vec::new()
        }
    }
}

/// Merges provider results, scores every venue, writes documents and the
/// CSV index under `output_dir`, then optionally publishes to S3.
#[tracing::instrument(skip(candidate_lists, s3_bucket), fields(output_dir = %output_dir.display()))]
async fn run_pipeline(
    candidate_lists: Vec<Vec<Candidate>>,
    max_results: usize,
    output_dir: &Path,
    s3_bucket: Option<String>,
    gzip: bool,
) -> Result<()> {
    let merged = merge_candidates(candidate_lists, max_results);
    info!(count = merged.len(), "Candidates merged");

    let mut docs = score_candidates(&LexiconScorer::new(), merged);

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    let index_path = output_dir.join("index.csv");

    let mut added = 0;
    let mut updated = 0;
    let mut entries = Vec::with_capacity(docs.len());
    for doc in &mut docs {
        match upsert_venue_doc(output_dir, doc)? {
            UpsertOutcome::Added => added += 1,
            UpsertOutcome::Updated => updated += 1,
        }
        let entry = VenueIndexEntry::from(&*doc);
        append_index_record(&index_path, &entry)?;
        info!(
            venue = %doc.name,
            score = doc.workability_score,
            tags = %entry.tags,
            "Venue saved"
        );
        entries.push(entry);
    }
    info!(added, updated, "Venue documents written");

    match s3_bucket {
        Some(bucket) => {
            info!(bucket = %bucket, gzip, "S3 upload enabled");
            let config = aws_config::load_from_env().await;
            let client = aws_sdk_s3::Client::new(&config);
            let index = VenueIndex {
                generated_at: Utc::now(),
                venues: entries,
            };
            publish_venues(&client, &bucket, &docs, &index, gzip).await?;
        }
        None => info!("S3 bucket not specified, skipping upload"),
    }

    Ok(())
}
