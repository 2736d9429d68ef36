//! # Origin News
//!
//! A batch headline collector. Each run walks a catalog of news front pages
//! and RSS/Atom feeds, pulls out headline-shaped text, and appends one line
//! per headline to a flat log together with a search-engine lookup link.
//!
//! ## Usage
//!
//! ```sh
//! origin_news --catalog ./catalog.yaml --log-file ./headlines.log
//! ```
//!
//! ## Architecture
//!
//! 1. **Catalog**: ordered categories of sources; `https://` entries are feeds,
//!    everything else is a domain to scrape
//! 2. **Fetching**: front pages go through an on-disk cache, feeds are always
//!    fetched fresh
//! 3. **Extraction**: heading markup filtered by word count, or feed titles
//! 4. **Logging**: run-wide sequence id, quote normalization, search link,
//!    durable append

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod annotate;
mod cache;
mod cli;
mod config;
mod error;
mod fetch;
mod ledger;
mod models;
mod pipeline;
mod scrapers;
mod utils;

use annotate::{Annotator, GazetteerAnnotator};
use cache::{FsCache, MemoryCache, PageCache};
use cli::Cli;
use config::Catalog;
use fetch::{Fetcher, ReqwestTransport};
use ledger::EntryLog;
use models::RunSummary;
use pipeline::Harvester;
use scrapers::html::{HeadingStrategy, HtmlExtractor};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("origin_news starting up");

    let args = Cli::parse();
    info!(
        log_file = %args.log_file.display(),
        cache_dir = %args.cache_dir.display(),
        min_words = args.min_words,
        "Parsed CLI arguments"
    );

    // Early check: the headline log is the only output, so its directory must be writable
    let log_dir = match args.log_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if let Err(e) = ensure_writable_dir(log_dir).await {
        error!(
            path = %log_dir.display(),
            error = %e,
            "Headline log directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path).await?,
        None => {
            info!("No catalog given; using built-in catalog");
            Catalog::builtin()
        }
    };
    info!(
        categories = catalog.categories.len(),
        sources = catalog.source_count(),
        "Catalog ready"
    );

    let annotator: Option<Box<dyn Annotator>> = match GazetteerAnnotator::load(&args.model_dir).await {
        Ok(found) => found.map(|a| Box::new(a) as Box<dyn Annotator>),
        Err(e) => {
            warn!(error = %e, "Failed to load annotator; continuing without it");
            None
        }
    };

    let summary = if args.memory_cache {
        harvest(MemoryCache::new(), &args, &catalog, annotator).await?
    } else {
        harvest(FsCache::new(&args.cache_dir), &args, &catalog, annotator).await?
    };

    let elapsed = start_time.elapsed();
    info!(
        categories = summary.categories,
        sources_visited = summary.sources_visited,
        sources_skipped = summary.sources_skipped,
        headlines_logged = summary.headlines_logged,
        last_sequence_id = summary.last_sequence_id,
        ?elapsed,
        "Execution complete"
    );

    Ok(())
}

/// Build the pipeline around `cache` and run it over `catalog`.
async fn harvest<C: PageCache>(
    cache: C,
    args: &Cli,
    catalog: &Catalog,
    annotator: Option<Box<dyn Annotator>>,
) -> Result<RunSummary, Box<dyn Error>> {
    let transport = ReqwestTransport::new(&args.user_agent)?;
    let fetcher = Fetcher::new(cache, transport);
    let extractor = HtmlExtractor::new(HeadingStrategy::new(), args.min_words);
    let ledger = EntryLog::new(&args.log_file, args.search_url.clone());

    let mut harvester = Harvester::new(fetcher, extractor, ledger).with_annotator(annotator);
    match harvester.run(catalog).await {
        Ok(summary) => Ok(summary),
        Err(e) => {
            error!(
                error = %e,
                last_sequence_id = harvester.last_sequence_id(),
                "Run aborted"
            );
            Err(e.into())
        }
    }
}
