//! The harvest run: catalog in, headline log out.
//!
//! Categories and their sources are visited strictly in catalog order, one
//! source at a time. Per source:
//!
//! 1. **Feed URL**: fetch and parse the feed, record every entry title
//! 2. **Domain**: fetch through the cache, extract headings, record the ones
//!    that pass the word filter
//!
//! A failing source is logged and skipped. Only a failed log append stops
//! the run.

use crate::annotate::Annotator;
use crate::cache::PageCache;
use crate::config::{Catalog, Category};
use crate::error::HarvestError;
use crate::fetch::{Fetcher, Transport, domain_host};
use crate::ledger::{EntryLog, SequenceCounter};
use crate::models::{Headline, LogEntry, RunSummary, SourceRef};
use crate::scrapers::feed::read_feed;
use crate::scrapers::html::{CandidateStrategy, HtmlExtractor};
use crate::utils::truncate_for_log;
use tracing::{debug, info, instrument, warn};

/// Drives one pass over a [`Catalog`].
#[derive(Debug)]
pub struct Harvester<C, T, S> {
    fetcher: Fetcher<C, T>,
    extractor: HtmlExtractor<S>,
    ledger: EntryLog,
    counter: SequenceCounter,
    annotator: Option<Box<dyn Annotator>>,
}

impl<C, T, S> Harvester<C, T, S>
where
    C: PageCache,
    T: Transport,
    S: CandidateStrategy,
{
    pub fn new(fetcher: Fetcher<C, T>, extractor: HtmlExtractor<S>, ledger: EntryLog) -> Self {
        Self {
            fetcher,
            extractor,
            ledger,
            counter: SequenceCounter::new(),
            annotator: None,
        }
    }

    /// Attach an entity annotator. It is held for callers but not consulted
    /// during extraction.
    pub fn with_annotator(mut self, annotator: Option<Box<dyn Annotator>>) -> Self {
        self.annotator = annotator;
        self
    }

    #[cfg(test)]
    pub fn annotator(&self) -> Option<&dyn Annotator> {
        self.annotator.as_deref()
    }

    #[cfg(test)]
    pub fn fetcher(&self) -> &Fetcher<C, T> {
        &self.fetcher
    }

    /// Last sequence id handed out.
    pub fn last_sequence_id(&self) -> u64 {
        self.counter.current()
    }

    /// Visit every source of `catalog` in order.
    ///
    /// # Errors
    ///
    /// Only [`HarvestError::LogWriteFailed`]; every other failure skips the
    /// source it happened on.
    #[instrument(level = "info", skip_all, fields(categories = catalog.categories.len()))]
    pub async fn run(&mut self, catalog: &Catalog) -> Result<RunSummary, HarvestError> {
        let mut summary = RunSummary::default();
        for category in &catalog.categories {
            self.run_category(category, &mut summary).await?;
            summary.categories += 1;
        }
        summary.last_sequence_id = self.counter.current();
        Ok(summary)
    }

    #[instrument(level = "info", skip_all, fields(category = %category.name))]
    async fn run_category(
        &mut self,
        category: &Category,
        summary: &mut RunSummary,
    ) -> Result<(), HarvestError> {
        for source in category.source_refs() {
            summary.sources_visited += 1;
            match self.harvest_source(&source).await {
                Ok(logged) => summary.headlines_logged += logged,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(%source, error = %e, "Skipping news source");
                    summary.sources_skipped += 1;
                }
            }
        }
        Ok(())
    }

    /// Extract and record the headlines of one source. Returns how many were logged.
    async fn harvest_source(&mut self, source: &SourceRef) -> Result<usize, HarvestError> {
        let (headlines, label) = match source {
            SourceRef::FeedUrl(url) => (read_feed(self.fetcher.transport(), url).await, url.clone()),
            SourceRef::Domain(domain) => {
                let html = self.fetcher.fetch(domain).await?;
                let label = domain_host(domain);
                (self.extractor.extract(&html, &label), label)
            }
        };

        if headlines.is_empty() {
            info!(%label, "No headlines found");
        }
        for headline in &headlines {
            let entry = self.record(headline, &label).await?;
            debug!(
                sequence_id = entry.sequence_id,
                headline = %truncate_for_log(&entry.headline, 80),
                "Logged headline"
            );
        }
        Ok(headlines.len())
    }

    async fn record(&mut self, headline: &Headline, label: &str) -> Result<LogEntry, HarvestError> {
        self.ledger.record(&mut self.counter, headline, label).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::GazetteerAnnotator;
    use crate::cache::MemoryCache;
    use crate::fetch::tests::MockTransport;
    use crate::ledger::DEFAULT_SEARCH_URL;
    use crate::models::LOG_DELIMITER;
    use crate::scrapers::html::{DEFAULT_MIN_WORDS, HeadingStrategy};
    use std::collections::BTreeMap;
    use std::path::Path;
    use tempfile::TempDir;

    const FEED: &str = r#"<rss version="2.0"><channel>
        <item><title>A</title></item>
        <item><title>Global Markets Slip As Rates Rise Sharply</title></item>
    </channel></rss>"#;

    fn harvester(
        transport: MockTransport,
        log_path: &Path,
    ) -> Harvester<MemoryCache, MockTransport, HeadingStrategy> {
        Harvester::new(
            Fetcher::new(MemoryCache::new(), transport),
            HtmlExtractor::new(HeadingStrategy::new(), DEFAULT_MIN_WORDS),
            EntryLog::new(log_path, DEFAULT_SEARCH_URL),
        )
    }

    fn catalog(groups: &[&[&str]]) -> Catalog {
        Catalog {
            categories: groups
                .iter()
                .enumerate()
                .map(|(i, sources)| Category {
                    name: format!("group-{i}"),
                    sources: sources.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        }
    }

    /// (source, sequence id, quoted headline) of every log line.
    fn read_log(path: &Path) -> Vec<(String, u64, String)> {
        std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(|line| {
                let fields: Vec<&str> = line.split(LOG_DELIMITER).collect();
                assert_eq!(fields.len(), 5, "malformed line: {line}");
                (
                    fields[1].to_string(),
                    fields[2].parse().unwrap(),
                    fields[3].trim_matches('"').to_string(),
                )
            })
            .collect()
    }

    fn log_dir() -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("headlines.log");
        (dir, path)
    }

    #[tokio::test]
    async fn test_single_domain_drops_short_headings() {
        let (_dir, log) = log_dir();
        let transport = MockTransport::new().with(
            "https://example.test",
            200,
            "<h2>Local Markets Rally On Strong Earnings Report</h2><h3>Nav</h3>",
        );
        let mut h = harvester(transport, &log);

        let summary = h.run(&catalog(&[&["example.test"]])).await.unwrap();

        assert_eq!(
            read_log(&log),
            vec![(
                "example.test".to_string(),
                1,
                "Local Markets Rally On Strong Earnings Report".to_string()
            )]
        );
        assert_eq!(summary.headlines_logged, 1);
        assert_eq!(summary.last_sequence_id, 1);
    }

    #[tokio::test]
    async fn test_feed_titles_are_not_filtered() {
        let (_dir, log) = log_dir();
        let feed_url = "https://wire.example/feed/?taxonomy=best";
        let transport = MockTransport::new().with(feed_url, 200, FEED);
        let mut h = harvester(transport, &log);

        h.run(&catalog(&[&[feed_url]])).await.unwrap();

        assert_eq!(
            read_log(&log),
            vec![
                (feed_url.to_string(), 1, "A".to_string()),
                (
                    feed_url.to_string(),
                    2,
                    "Global Markets Slip As Rates Rise Sharply".to_string()
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_sequence_is_gap_free_across_sources() {
        let (_dir, log) = log_dir();
        let transport = MockTransport::new()
            .with(
                "https://one.test",
                200,
                "<h1>First Site Headline Number One</h1><h2>First Site Headline Number Two</h2>",
            )
            .with("https://wire.test/rss", 200, FEED)
            .with("https://two.test/world", 200, "<h4>Second Site Has One Headline</h4>")
            .with("https://down.test", 500, "");
        let mut h = harvester(transport, &log);

        let cat = catalog(&[
            &["one.test", "down.test", "https://wire.test/rss"],
            &[],
            &["missing.test", "two.test/world"],
        ]);
        let summary = h.run(&cat).await.unwrap();

        let entries = read_log(&log);
        let ids: Vec<u64> = entries.iter().map(|e| e.1).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let sources: Vec<&str> = entries.iter().map(|e| e.0.as_str()).collect();
        assert_eq!(
            sources,
            vec![
                "one.test",
                "one.test",
                "https://wire.test/rss",
                "https://wire.test/rss",
                "two.test",
            ]
        );

        assert_eq!(
            summary,
            RunSummary {
                categories: 3,
                sources_visited: 5,
                sources_skipped: 2,
                headlines_logged: 5,
                last_sequence_id: 5,
            }
        );
        assert_eq!(h.last_sequence_id(), 5);
    }

    #[tokio::test]
    async fn test_repeated_domain_uses_cache() {
        let (_dir, log) = log_dir();
        let transport = MockTransport::new().with(
            "https://www.cnbc.com",
            200,
            "<h2>Oil Prices Climb For Third Day</h2>",
        );
        let mut h = harvester(transport, &log);

        h.run(&catalog(&[&["www.cnbc.com"], &["www.cnbc.com"]]))
            .await
            .unwrap();

        assert_eq!(h.fetcher().transport().requests(), 1);
        // no dedup across sources
        assert_eq!(read_log(&log).len(), 2);
    }

    #[tokio::test]
    async fn test_log_failure_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new()
            .with("https://a.test", 200, "<h1>Headline That Cannot Be Logged</h1>")
            .with("https://b.test", 200, "<h1>Never Reached By The Run</h1>");
        // the log path is a directory, so every append fails
        let mut h = harvester(transport, dir.path());

        let err = h
            .run(&catalog(&[&["a.test", "b.test"]]))
            .await
            .unwrap_err();

        assert!(matches!(err, HarvestError::LogWriteFailed { .. }));
        assert_eq!(h.fetcher().transport().seen(), vec!["https://a.test"]);
    }

    #[tokio::test]
    async fn test_annotator_does_not_change_output() {
        let (_dir, log) = log_dir();
        let transport = MockTransport::new().with(
            "https://example.test",
            200,
            "<h1>Jerome Powell Signals Rate Pause</h1>",
        );

        let mut entries = BTreeMap::new();
        entries.insert(
            crate::annotate::EntityLabel::Person,
            vec!["Jerome Powell".to_string()],
        );
        let annotator = GazetteerAnnotator::from_entries(entries).unwrap();

        let mut h = harvester(transport, &log).with_annotator(Some(Box::new(annotator)));
        assert_eq!(h.annotator().map(|a| a.name()), Some("gazetteer"));

        h.run(&catalog(&[&["example.test"]])).await.unwrap();
        assert_eq!(
            read_log(&log),
            vec![(
                "example.test".to_string(),
                1,
                "Jerome Powell Signals Rate Pause".to_string()
            )]
        );
    }
}
