//! cinefeed - movie feed CLI with franchise spotlights.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use cinefeed_api::tmdb::{LocalCatalogApi, Movie, MoviePage, TmdbClient};
use cinefeed_feed::{
    BrowseMode, DisplayRow, Feed, FranchiseCollection, LoadStatus, SlotStatus,
};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::{AppConfig, TmdbSettings, resolve_config_path};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List one page of popular movies.
    Discover(DiscoverArgs),
    /// Search movies by title.
    Search(SearchArgs),
    /// Show details of a single movie.
    Details(DetailsArgs),
    /// Page through the catalog with franchise spotlights spliced in.
    Feed(FeedArgs),
    /// Load the franchise collection, newest first.
    Franchise(FranchiseArgs),
    /// Write a config file with default settings.
    InitConfig(InitConfigArgs),
}

/// Arguments for the `discover` subcommand.
#[derive(clap::Args)]
struct DiscoverArgs {
    /// Page number (1-based).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search query (e.g. "iron man").
    #[arg(long, required = true)]
    query: String,
    /// Page number (1-based).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
}

/// Arguments for the `details` subcommand.
#[derive(clap::Args)]
struct DetailsArgs {
    /// TMDB movie ID.
    #[arg(long, required = true)]
    id: u64,
}

/// Arguments for the `feed` subcommand.
#[derive(clap::Args)]
struct FeedArgs {
    /// Search query. Browses popular movies when omitted or blank.
    #[arg(long)]
    query: Option<String>,
    /// Number of pages to load.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    pages: u32,
}

/// Arguments for the `franchise` subcommand.
#[derive(clap::Args)]
struct FranchiseArgs {
    /// Number of batches to load. Loads everything when omitted.
    #[arg(long)]
    batches: Option<usize>,
}

/// Arguments for the `init-config` subcommand.
#[derive(clap::Args)]
struct InitConfigArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    force: bool,
}

/// Loads the config file for `dir`.
///
/// # Errors
///
/// Returns an error if the path cannot be resolved or the file is invalid.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let path = resolve_config_path(dir)?;
    tracing::debug!(path = %path.display(), "Loading config");
    AppConfig::load(&path)
}

/// Builds a `TmdbClient` from the `TMDB_API_TOKEN` environment variable
/// and the `[tmdb]` config section.
///
/// # Errors
///
/// Returns an error if `TMDB_API_TOKEN` is not set, the base URL is invalid,
/// or the client fails to build. Configuration errors are reported as such
/// and never retried.
#[instrument(skip_all)]
fn build_tmdb_client(settings: &TmdbSettings) -> Result<TmdbClient> {
    let api_token = std::env::var("TMDB_API_TOKEN")
        .context("TMDB_API_TOKEN environment variable is required")?;

    let mut builder = TmdbClient::builder()
        .api_token(api_token)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .language(settings.language.as_str());
    if let Some(base_url) = settings.base_url.as_deref() {
        let url = Url::parse(base_url).with_context(|| format!("invalid base_url {base_url}"))?;
        builder = builder.base_url(url);
    }
    if let Some(interval) = settings.min_interval() {
        builder = builder.min_interval(interval);
    }

    builder.build().map_err(|err| {
        let hint = if err.is_fatal() {
            "TMDB client configuration is invalid; check TMDB_API_TOKEN and the [tmdb] section"
        } else {
            "failed to build TMDB client"
        };
        anyhow::Error::new(err).context(hint)
    })
}

/// Formats one movie as a tab-separated listing line.
fn movie_line(movie: &Movie) -> String {
    let year = movie
        .release_year()
        .map_or_else(|| String::from("-"), |y| y.to_string());
    let marker = if movie.is_highly_rated() { " *" } else { "" };
    format!(
        "{}\t{}\t{}\t{:.1}{}",
        movie.id, year, movie.title, movie.vote_average, marker
    )
}

/// Logs a catalog page.
fn log_page(page: &MoviePage) {
    tracing::info!(
        "Page {}/{} ({} results)",
        page.page,
        page.total_pages,
        page.total_results
    );
    tracing::info!("ID\tYear\tTitle\tRating");
    for movie in &page.results {
        tracing::info!("{}", movie_line(movie));
    }
}

/// Runs the `discover` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_discover(args: &DiscoverArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_tmdb_client(&config.tmdb)?;

    let page = client
        .discover_movies(args.page)
        .await
        .context("TMDB discover/movie request failed")?;

    log_page(&page);
    Ok(())
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_tmdb_client(&config.tmdb)?;

    let page = client
        .search_movies(&args.query, args.page)
        .await
        .context("TMDB search/movie request failed")?;

    log_page(&page);
    Ok(())
}

/// Runs the `details` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_details(args: &DetailsArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_tmdb_client(&config.tmdb)?;

    let movie = client
        .movie_details(args.id)
        .await
        .context("TMDB movie request failed")?;

    tracing::info!("ID: {}", movie.id);
    tracing::info!("Title: {}", movie.title);
    tracing::info!(
        "Year: {}",
        movie
            .release_year()
            .map_or_else(|| String::from("-"), |y| y.to_string())
    );
    tracing::info!(
        "Rating: {:.1}/10 ({}%){}",
        movie.vote_average,
        movie.rating_percent(),
        if movie.is_highly_rated() {
            " highly rated"
        } else {
            ""
        }
    );
    tracing::info!("Votes: {}", movie.vote_count);
    tracing::info!("Poster: {}", movie.poster_url().as_deref().unwrap_or("-"));
    tracing::info!(
        "Backdrop: {}",
        movie.backdrop_url().as_deref().unwrap_or("-")
    );
    if !movie.overview.is_empty() {
        tracing::info!("Overview: {}", movie.overview);
    }

    Ok(())
}

/// Runs the `feed` subcommand.
///
/// Loads up to `--pages` pages, resolves the spotlights they reach, and logs
/// the display sequence.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or a page fails to load.
#[instrument(skip_all)]
async fn run_feed(args: &FeedArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_tmdb_client(&config.tmdb)?;
    let mut feed = Feed::new(config.feed.to_feed_config());

    match args.query.as_deref() {
        Some(query) => {
            feed.pager_mut().set_query(query);
            feed.pager_mut().submit_search(&client).await;
        }
        None => {
            feed.pager_mut()
                .load_first_page(&client, BrowseMode::Browse, "")
                .await;
        }
    }
    for _ in 1..args.pages {
        if feed.pager().state().status() == LoadStatus::Error
            || !feed.pager_mut().load_next_page(&client).await
        {
            break;
        }
    }

    let state = feed.pager().state();
    if state.status() == LoadStatus::Error && state.movies().is_empty() {
        bail!("{}", state.error_message().unwrap_or("Failed to load movies"));
    }
    if let Some(message) = state.error_message() {
        tracing::warn!("{message}");
    }

    let resolved = feed.resolve_spotlights(&client).await;
    tracing::debug!(resolved, "Spotlights resolved");

    let state = feed.pager().state();
    tracing::info!(
        "{:?} \"{}\": page {}/{}, {} movies",
        state.mode(),
        state.query(),
        state.page(),
        state.total_pages(),
        state.movies().len()
    );
    for row in feed.display_rows() {
        match row {
            DisplayRow::Movie(movie) => tracing::info!("{}", movie_line(movie)),
            DisplayRow::Spotlight {
                slot,
                status: SlotStatus::Resolved,
                movies,
            } => {
                let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
                tracing::info!("[spotlight {slot}] {}", titles.join(" | "));
            }
            DisplayRow::Spotlight { slot, .. } => {
                tracing::info!("[spotlight {slot}] loading");
            }
        }
    }

    Ok(())
}

/// Runs the `franchise` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or a batch fails
/// before anything was loaded.
#[instrument(skip_all)]
async fn run_franchise(args: &FranchiseArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_tmdb_client(&config.tmdb)?;
    let mut collection = FranchiseCollection::default();

    let mut loaded_batches = 0usize;
    while args.batches.is_none_or(|limit| loaded_batches < limit) {
        if !collection.load_more(&client).await || collection.status() == LoadStatus::Error {
            break;
        }
        loaded_batches = loaded_batches.saturating_add(1);
    }

    if let Some(message) = collection.error_message() {
        if collection.movies().is_empty() {
            bail!("{message}");
        }
        tracing::warn!("{message}");
    }

    tracing::info!(
        "Loaded {}/{} franchise movies",
        collection.movies().len(),
        collection.total()
    );
    tracing::info!("ID\tYear\tTitle\tRating");
    for movie in collection.sorted_by_release() {
        tracing::info!("{}", movie_line(movie));
    }

    Ok(())
}

/// Runs the `init-config` subcommand.
///
/// # Errors
///
/// Returns an error if the config file already exists (without `--force`)
/// or cannot be written.
fn run_init_config(args: &InitConfigArgs, dir: Option<&PathBuf>) -> Result<()> {
    let path = resolve_config_path(dir)?;
    if path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    AppConfig::default().save(&path)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    match cli.command {
        Commands::Discover(args) => run_discover(&args, cli.dir.as_ref()).await,
        Commands::Search(args) => run_search(&args, cli.dir.as_ref()).await,
        Commands::Details(args) => run_details(&args, cli.dir.as_ref()).await,
        Commands::Feed(args) => run_feed(&args, cli.dir.as_ref()).await,
        Commands::Franchise(args) => run_franchise(&args, cli.dir.as_ref()).await,
        Commands::InitConfig(args) => run_init_config(&args, cli.dir.as_ref()),
    }
}
