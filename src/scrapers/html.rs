//! Heuristic headline extraction from raw HTML.
//!
//! A [`CandidateStrategy`] picks candidate strings out of a parsed document;
//! [`HtmlExtractor`] trims them, drops empties and applies the minimum word
//! count that separates headlines from navigation labels and bylines.

use crate::models::Headline;
use crate::utils::collapse_whitespace;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

/// Minimum whitespace-separated tokens for a heading to count as a headline.
pub const DEFAULT_MIN_WORDS: usize = 4;

/// Tags inspected by [`HeadingStrategy`]. `yt-formatted-string` carries video
/// titles on embedded YouTube markup.
pub const HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6, yt-formatted-string";

/// Pulls candidate headline strings out of a document.
pub trait CandidateStrategy {
    fn name(&self) -> &'static str;

    /// Raw candidate strings in document order.
    fn candidates(&self, document: &Html) -> Vec<String>;
}

/// Text content of every heading element (`h1`..`h6` plus `yt-formatted-string`).
#[derive(Debug, Clone)]
pub struct HeadingStrategy {
    selector: Selector,
}

impl HeadingStrategy {
    pub fn new() -> Self {
        Self {
            // HEADING_SELECTOR is a constant, known-valid selector list
            selector: Selector::parse(HEADING_SELECTOR).unwrap(),
        }
    }
}

impl Default for HeadingStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateStrategy for HeadingStrategy {
    fn name(&self) -> &'static str {
        "headings"
    }

    fn candidates(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.selector)
            .map(|element| element.text().collect::<String>())
            .collect()
    }
}

/// Applies a [`CandidateStrategy`] and the minimum word filter.
#[derive(Debug, Clone)]
pub struct HtmlExtractor<S = HeadingStrategy> {
    strategy: S,
    min_words: usize,
}

impl<S: CandidateStrategy> HtmlExtractor<S> {
    pub fn new(strategy: S, min_words: usize) -> Self {
        Self {
            strategy,
            min_words,
        }
    }

    /// Headlines found in `html`, in document order.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; the HTML parser
    /// recovers from any malformed markup, so this never fails.
    #[instrument(level = "debug", skip_all, fields(%source_label, strategy = self.strategy.name()))]
    pub fn extract(&self, html: &[u8], source_label: &str) -> Vec<Headline> {
        let text = String::from_utf8_lossy(html);
        let document = Html::parse_document(&text);

        let candidates = self.strategy.candidates(&document);
        let total = candidates.len();

        let headlines: Vec<Headline> = candidates
            .into_iter()
            .map(|c| collapse_whitespace(c.trim()))
            .filter_map(Headline::new)
            .filter(|h| h.word_count() >= self.min_words)
            .collect();

        debug!(
            candidates = total,
            kept = headlines.len(),
            "Filtered heading candidates"
        );
        headlines
    }
}
