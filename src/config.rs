//! Source catalog loading.
//!
//! The catalog is an ordered list of categories, each an ordered list of
//! source strings. It is loaded from YAML when a path is given, otherwise the
//! built-in catalog is used.

use crate::error::HarvestError;
use crate::models::SourceRef;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// A named, ordered group of sources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl Category {
    /// Sources of this category, classified, in catalog order.
    pub fn source_refs(&self) -> impl Iterator<Item = SourceRef> + '_ {
        self.sources.iter().map(|s| SourceRef::classify(s))
    }
}

/// The full, ordered source catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    pub categories: Vec<Category>,
}

impl Catalog {
    /// Parse a catalog from YAML text.
    pub fn from_yaml_str(yaml: &str, origin: &Path) -> Result<Self, HarvestError> {
        serde_yaml::from_str(yaml).map_err(|e| HarvestError::Config {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read and parse a YAML catalog file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, HarvestError> {
        let yaml = fs::read_to_string(path)
            .await
            .map_err(|e| HarvestError::Config {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let catalog = Self::from_yaml_str(&yaml, path)?;
        info!(
            categories = catalog.categories.len(),
            sources = catalog.source_count(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Total number of sources across all categories.
    pub fn source_count(&self) -> usize {
        self.categories.iter().map(|c| c.sources.len()).sum()
    }

    /// The catalog the collector ships with: business, politics and
    /// government front pages plus one wire-service feed.
    pub fn builtin() -> Self {
        fn category(name: &str, sources: &[&str]) -> Category {
            Category {
                name: name.to_string(),
                sources: sources.iter().map(|s| s.to_string()).collect(),
            }
        }

        Catalog {
            categories: vec![
                category(
                    "business",
                    &[
                        "finance.yahoo.com",
                        "www.foxbusiness.com",
                        "www.bloomberg.com",
                        "www.cnbc.com",
                        "www.marketwatch.com",
                        "www.wsj.com",
                        "www.ft.com",
                        "www.economist.com",
                        "www.businessinsider.com",
                        "www.barrons.com",
                    ],
                ),
                category(
                    "politics",
                    &[
                        "www.theatlantic.com",
                        "therecord.media",
                        "www.wired.com",
                        "www.zdnet.com",
                        "medium.com",
                        "www.theepochtimes.com",
                        "www.dailywire.com",
                        "www.yahoo.com",
                        "www.nytimes.com",
                        "www.washingtonpost.com",
                        "www.foxnews.com",
                        "www.politico.eu",
                        "https://www.reutersagency.com/feed/?taxonomy=best-sectors&post_type=best",
                        "www.cnbc.com",
                        "www.cnn.com",
                        "www.msnbc.com",
                    ],
                ),
                category(
                    "government",
                    &[
                        "www.whitehouse.gov/briefing-room/statements-releases",
                        "www.govtrack.us/congress/bills",
                        "www.senate.gov/legislative/bills_acts_laws.htm",
                        "www.commerce.gov/news/press-releases",
                        "www.justice.gov/blogs",
                    ],
                ),
            ],
        }
    }
}
