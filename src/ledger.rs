//! The durable headline log.
//!
//! Every extracted headline becomes one line of an append-only text file:
//!
//! ```text
//! {%m%d%H%M%S}   {source}   {sequence id}   "{headline}"   "{search link}"
//! ```
//!
//! Sequence ids come from a single [`SequenceCounter`] owned by the caller and
//! shared by every source of a run. Each record is flushed before
//! [`EntryLog::record`] returns.

use crate::error::HarvestError;
use crate::models::{Headline, LogEntry};
use crate::utils::collapse_whitespace;
use chrono::Local;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

/// Query-template prefix the encoded headline is appended to.
pub const DEFAULT_SEARCH_URL: &str = "https://yandex.com/search/?text=";

/// Timestamp format of the first log column.
pub const TIMESTAMP_FORMAT: &str = "%m%d%H%M%S";

/// Run-wide, gap-free sequence of headline ids.
///
/// Starts at 0; the first id handed out is 1. Not persisted across runs.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    current: u64,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and return the new id.
    pub fn next_id(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    /// Last id handed out, 0 if none.
    pub fn current(&self) -> u64 {
        self.current
    }
}

/// Replace right/left single quotes and double quotes with `'`.
pub fn normalize_quotes(headline: &str) -> String {
    headline.replace(['\u{2019}', '\u{2018}', '"'], "'")
}

/// Percent-encode a headline for use as a search query.
///
/// Alphanumerics and `-._~/` stay literal; encoded spaces become `+`.
pub fn encode_query(headline: &str) -> String {
    urlencoding::encode(headline)
        .replace("%2F", "/")
        .replace("%20", "+")
}

/// Search link for an already-normalized headline.
pub fn search_link(search_url: &str, headline: &str) -> String {
    format!("{search_url}{}", encode_query(headline))
}

/// Appends formatted records to the headline log file.
#[derive(Debug, Clone)]
pub struct EntryLog {
    path: PathBuf,
    search_url: String,
}

impl EntryLog {
    pub fn new(path: impl Into<PathBuf>, search_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            search_url: search_url.into(),
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Build the record for `headline` without writing it.
    pub fn entry(&self, sequence_id: u64, headline: &Headline, source: &str) -> LogEntry {
        // line breaks, tabs and space runs would split the record or its columns
        let normalized = collapse_whitespace(&normalize_quotes(headline.as_str()));
        LogEntry {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            source: source.to_string(),
            sequence_id,
            search_link: search_link(&self.search_url, &normalized),
            headline: normalized,
        }
    }

    /// Assign the next sequence id to `headline` and append its record.
    ///
    /// # Errors
    ///
    /// [`HarvestError::LogWriteFailed`] if the log cannot be opened, written
    /// or flushed. Callers must stop the run.
    #[instrument(level = "debug", skip_all, fields(%source))]
    pub async fn record(
        &self,
        counter: &mut SequenceCounter,
        headline: &Headline,
        source: &str,
    ) -> Result<LogEntry, HarvestError> {
        let entry = self.entry(counter.next_id(), headline, source);
        let mut line = entry.to_line();
        line.push('\n');

        let write_failed = |e| HarvestError::LogWriteFailed {
            path: self.path.clone(),
            source: e,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(write_failed)?;
        file.write_all(line.as_bytes()).await.map_err(write_failed)?;
        file.flush().await.map_err(write_failed)?;

        debug!(sequence_id = entry.sequence_id, "Recorded headline");
        Ok(entry)
    }
}
