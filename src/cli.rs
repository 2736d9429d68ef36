//! Command-line interface definitions for Origin News.
//!
//! All options can be provided via command-line flags or environment variables.

use crate::fetch::DEFAULT_USER_AGENT;
use crate::ledger::DEFAULT_SEARCH_URL;
use crate::scrapers::html::DEFAULT_MIN_WORDS;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Origin News collector.
///
/// # Examples
///
/// ```sh
/// # Built-in catalog, default paths
/// origin_news
///
/// # Custom catalog and log location
/// origin_news --catalog ./catalog.yaml --log-file /var/log/headlines.log
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// YAML source catalog; the built-in catalog is used when omitted
    #[arg(short, long, env = "ORIGIN_NEWS_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Append-only headline log
    #[arg(short, long, env = "ORIGIN_NEWS_LOG_FILE", default_value = "./headlines.log")]
    pub log_file: PathBuf,

    /// Directory holding downloaded front pages
    #[arg(long, env = "ORIGIN_NEWS_CACHE_DIR", default_value = "./.html_cache")]
    pub cache_dir: PathBuf,

    /// Keep downloaded pages in memory only; nothing is written to the cache directory
    #[arg(long)]
    pub memory_cache: bool,

    /// Directory searched for an entity annotation model
    #[arg(long, env = "ORIGIN_NEWS_MODEL_DIR", default_value = "./.model")]
    pub model_dir: PathBuf,

    /// Minimum words for a heading to be logged
    #[arg(long, default_value_t = DEFAULT_MIN_WORDS)]
    pub min_words: usize,

    /// Search URL prefix the encoded headline is appended to
    #[arg(long, default_value = DEFAULT_SEARCH_URL)]
    pub search_url: String,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["origin_news"]);

        assert!(cli.catalog.is_none());
        assert_eq!(cli.log_file, PathBuf::from("./headlines.log"));
        assert_eq!(cli.cache_dir, PathBuf::from("./.html_cache"));
        assert_eq!(cli.model_dir, PathBuf::from("./.model"));
        assert!(!cli.memory_cache);
        assert_eq!(cli.min_words, 4);
        assert_eq!(cli.search_url, "https://yandex.com/search/?text=");
        assert!(cli.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "origin_news",
            "-c",
            "/etc/origin/catalog.yaml",
            "-l",
            "/tmp/headlines.log",
            "--min-words",
            "6",
        ]);

        assert_eq!(cli.catalog, Some(PathBuf::from("/etc/origin/catalog.yaml")));
        assert_eq!(cli.log_file, PathBuf::from("/tmp/headlines.log"));
        assert_eq!(cli.min_words, 6);
    }
}
