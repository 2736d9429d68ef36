//! Data models shared across the harvesting pipeline.
//!
//! This module defines the core values that flow from the catalog to the log:
//! - [`SourceRef`]: A classified catalog entry (scraped domain or feed URL)
//! - [`Headline`]: A non-empty headline string
//! - [`LogEntry`]: One formatted record of the headline log
//! - [`RunSummary`]: Counters reported when a run finishes

use std::fmt;

/// Scheme prefix that marks a catalog entry as a feed URL.
pub const FEED_SCHEME: &str = "https://";

/// Column delimiter between the fields of a log line.
pub const LOG_DELIMITER: &str = "   ";

/// A classified catalog entry.
///
/// Entries starting with [`FEED_SCHEME`] are feeds; everything else is a
/// domain (optionally with a path) that gets scraped over `https://`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// A bare domain, fetched as `https://{name}`.
    Domain(String),
    /// A fully-qualified feed URL.
    FeedUrl(String),
}

impl SourceRef {
    /// Classify a raw catalog string. No well-formedness check happens here;
    /// malformed entries surface later as fetch failures.
    pub fn classify(raw: &str) -> Self {
        if raw.starts_with(FEED_SCHEME) {
            SourceRef::FeedUrl(raw.to_string())
        } else {
            SourceRef::Domain(raw.to_string())
        }
    }

    /// The string this source was classified from.
    pub fn as_str(&self) -> &str {
        match self {
            SourceRef::Domain(name) => name,
            SourceRef::FeedUrl(url) => url,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A headline extracted from markup or a feed entry title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline(String);

impl Headline {
    /// Wrap `text`, rejecting empty or whitespace-only strings.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Headline(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of whitespace-separated tokens.
    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }
}

impl fmt::Display for Headline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One record of the headline log.
///
/// Records are append-only: once [`LogEntry::to_line`] has been written to
/// the log it is never touched again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Compact `%m%d%H%M%S` local timestamp.
    pub timestamp: String,
    /// Domain label or feed URL the headline came from.
    pub source: String,
    /// Run-wide sequence id, starting at 1.
    pub sequence_id: u64,
    /// Headline after quote normalization.
    pub headline: String,
    /// Search-engine lookup link for the headline.
    pub search_link: String,
}

impl LogEntry {
    /// Render the record as a single log line (without the trailing newline).
    ///
    /// ```text
    /// 0506143000   www.cnn.com   12   "Some headline here"   "https://yandex.com/search/?text=Some+headline+here"
    /// ```
    pub fn to_line(&self) -> String {
        format!(
            "{ts}{d}{src}{d}{id}{d}\"{headline}\"{d}\"{link}\"",
            ts = self.timestamp,
            src = self.source,
            id = self.sequence_id,
            headline = self.headline,
            link = self.search_link,
            d = LOG_DELIMITER,
        )
    }
}

/// Counters collected over one pass of the catalog.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub categories: usize,
    pub sources_visited: usize,
    pub sources_skipped: usize,
    pub headlines_logged: usize,
    /// Sequence id of the last record written, 0 if none.
    pub last_sequence_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_feed_url() {
        let src = SourceRef::classify("https://www.reutersagency.com/feed/?taxonomy=best-sectors");
        assert!(matches!(src, SourceRef::FeedUrl(_)));
    }

    #[test]
    fn test_classify_domain_with_path() {
        let src = SourceRef::classify("www.whitehouse.gov/briefing-room/statements-releases");
        assert_eq!(
            src,
            SourceRef::Domain("www.whitehouse.gov/briefing-room/statements-releases".to_string())
        );
    }

    #[test]
    fn test_classify_plain_http_is_domain() {
        // only the secure scheme marks a feed
        let src = SourceRef::classify("http://insecure.example/feed");
        assert!(matches!(src, SourceRef::Domain(_)));
    }

    #[test]
    fn test_headline_rejects_blank() {
        assert!(Headline::new("").is_none());
        assert!(Headline::new("   \n\t").is_none());
        assert_eq!(Headline::new("A").map(|h| h.word_count()), Some(1));
    }

    #[test]
    fn test_log_entry_line_format() {
        let entry = LogEntry {
            timestamp: "0506143000".to_string(),
            source: "www.cnn.com".to_string(),
            sequence_id: 12,
            headline: "Senate passes the bill".to_string(),
            search_link: "https://yandex.com/search/?text=Senate+passes+the+bill".to_string(),
        };

        assert_eq!(
            entry.to_line(),
            "0506143000   www.cnn.com   12   \"Senate passes the bill\"   \"https://yandex.com/search/?text=Senate+passes+the+bill\""
        );
    }
}
