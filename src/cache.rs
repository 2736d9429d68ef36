//! Raw page cache keyed by hostname.
//!
//! [`PageCache`] is a narrow get/put capability over byte blobs. The
//! filesystem implementation stores one file per host under a cache root:
//!
//! ```text
//! .html_cache/
//! ├── www.cnn.com_downloaded_html.html
//! └── finance.yahoo.com_downloaded_html.html
//! ```
//!
//! Entries never expire. Clearing the directory is the only invalidation.

use crate::error::HarvestError;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::fs;
use tracing::{debug, instrument};

/// Suffix appended to the hostname to form the cache file name.
pub const CACHE_FILE_SUFFIX: &str = "_downloaded_html.html";

/// Key-value store for previously downloaded pages.
pub trait PageCache {
    /// Cached bytes for `key`, or `None` on a miss.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, HarvestError>;

    /// Store `bytes` under `key`, replacing any previous entry.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), HarvestError>;
}

/// Filesystem-backed cache. The root directory is created lazily on first write.
#[derive(Debug, Clone)]
pub struct FsCache {
    root: PathBuf,
}

impl FsCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[cfg(test)]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Path of the cache file for `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}{CACHE_FILE_SUFFIX}"))
    }
}

impl PageCache for FsCache {
    #[instrument(level = "debug", skip_all, fields(%key))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, HarvestError> {
        let path = self.entry_path(key);
        match fs::read(&path).await {
            Ok(bytes) => {
                debug!(path = %path.display(), bytes = bytes.len(), "Cache hit");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(HarvestError::CacheReadFailed {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    #[instrument(level = "debug", skip_all, fields(%key, bytes = bytes.len()))]
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), HarvestError> {
        let write_failed = |e| HarvestError::CacheWriteFailed {
            key: key.to_string(),
            source: e,
        };
        fs::create_dir_all(&self.root).await.map_err(write_failed)?;
        fs::write(self.entry_path(key), bytes)
            .await
            .map_err(write_failed)?;
        debug!("Cached page");
        Ok(())
    }
}

/// In-process cache. Pages live for the duration of the run only.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }
}

impl PageCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, HarvestError> {
        Ok(self
            .entries
            .lock()
            .ok()
            .and_then(|m| m.get(key).cloned()))
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), HarvestError> {
        match self.entries.lock() {
            Ok(mut m) => {
                m.insert(key.to_string(), bytes.to_vec());
                Ok(())
            }
            Err(_) => Err(HarvestError::CacheWriteFailed {
                key: key.to_string(),
                source: std::io::Error::other("memory cache lock poisoned"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_root_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path().join("not-created-yet"));
        assert!(cache.get("www.cnn.com").await.unwrap().is_none());
        assert!(!cache.root().exists());
    }

    #[tokio::test]
    async fn test_put_creates_root_and_get_returns_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path().join("nested/.html_cache"));

        cache.put("www.cnn.com", b"<html>cnn</html>").await.unwrap();

        let path = cache.entry_path("www.cnn.com");
        assert!(path.ends_with("www.cnn.com_downloaded_html.html"));
        assert!(path.exists());
        assert_eq!(
            cache.get("www.cnn.com").await.unwrap(),
            Some(b"<html>cnn</html>".to_vec())
        );
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path());

        cache.put("medium.com", b"first").await.unwrap();
        cache.put("medium.com", b"second").await.unwrap();

        assert_eq!(cache.get("medium.com").await.unwrap(), Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_unwritable_root_is_cache_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let cache = FsCache::new(&blocker);
        let err = cache.put("www.ft.com", b"x").await.unwrap_err();
        assert!(matches!(err, HarvestError::CacheWriteFailed { .. }));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_memory_cache_round_trip() {
        let cache = MemoryCache::new();
        assert!(cache.get("a").await.unwrap().is_none());
        cache.put("a", b"1").await.unwrap();
        cache.put("a", b"2").await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), Some(b"2".to_vec()));
        assert_eq!(cache.len(), 1);
    }
}
