//! Error types for the harvesting pipeline.
//!
//! Every failure the collector can hit is a [`HarvestError`]. Only
//! [`HarvestError::LogWriteFailed`] stops a run; everything else is logged
//! and the pipeline moves on to the next source.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while collecting and recording headlines.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Non-200 status or a transport-level failure.
    #[error("fetch of {url} failed: {reason}")]
    FetchFailed { url: String, reason: String },

    /// The cache entry exists but could not be read.
    #[error("cache read for {key} failed: {source}")]
    CacheReadFailed {
        key: String,
        #[source]
        source: io::Error,
    },

    /// The cache root could not be created or the entry could not be written.
    #[error("cache write for {key} failed: {source}")]
    CacheWriteFailed {
        key: String,
        #[source]
        source: io::Error,
    },

    /// Malformed markup or feed content.
    #[error("failed to parse {what}: {reason}")]
    ParseFailed { what: String, reason: String },

    /// Appending to the headline log failed. Fatal for the run.
    #[error("failed to append to headline log {}: {source}", path.display())]
    LogWriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The source catalog could not be loaded.
    #[error("invalid catalog {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    /// The annotation model exists but could not be loaded.
    #[error("annotator at {} could not be loaded: {reason}", path.display())]
    Annotator { path: PathBuf, reason: String },
}

impl HarvestError {
    /// Whether this error must abort the whole catalog traversal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HarvestError::LogWriteFailed { .. })
    }
}
