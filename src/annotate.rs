//! Optional named-entity annotation.
//!
//! An [`Annotator`] labels spans of text with CoNLL-style entity types. The
//! harvester can hold one, but extraction and logging do not consult it yet;
//! a run without an annotator produces the same log.
//!
//! The bundled implementation is a gazetteer loaded from
//! `{model_dir}/gazetteer.yaml`:
//!
//! ```yaml
//! PER: [Janet Yellen, Jerome Powell]
//! ORG: [Federal Reserve, Senate]
//! LOC: [Washington]
//! ```

use crate::error::HarvestError;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// File looked up inside the model directory.
pub const GAZETTEER_FILE: &str = "gazetteer.yaml";

/// Entity types, as used by CoNLL-03 trained taggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum EntityLabel {
    #[serde(rename = "PER")]
    Person,
    #[serde(rename = "ORG")]
    Organization,
    #[serde(rename = "LOC")]
    Location,
    #[serde(rename = "MISC")]
    Misc,
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            EntityLabel::Person => "PER",
            EntityLabel::Organization => "ORG",
            EntityLabel::Location => "LOC",
            EntityLabel::Misc => "MISC",
        };
        f.write_str(tag)
    }
}

/// A labelled byte range of the annotated text.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    pub label: EntityLabel,
    pub text: String,
}

/// Labels token spans of text with entity types.
// held by the harvester; extraction does not call into it yet
#[allow(dead_code)]
pub trait Annotator: fmt::Debug {
    fn name(&self) -> &str;

    /// Entity spans in `text`, ordered by start offset.
    fn annotate(&self, text: &str) -> Vec<EntitySpan>;
}

/// Case-sensitive, whole-word dictionary matcher.
#[derive(Debug)]
pub struct GazetteerAnnotator {
    patterns: Vec<(EntityLabel, Regex)>,
}

impl GazetteerAnnotator {
    /// Build from label -> names. Longer names win over overlapping shorter ones.
    pub fn from_entries(entries: BTreeMap<EntityLabel, Vec<String>>) -> Result<Self, regex::Error> {
        let mut patterns = Vec::new();
        for (label, mut names) in entries {
            names.retain(|n| !n.trim().is_empty());
            if names.is_empty() {
                continue;
            }
            names.sort_by_key(|n| std::cmp::Reverse(n.len()));
            let alternation = names
                .iter()
                .map(|n| regex::escape(n.trim()))
                .collect::<Vec<_>>()
                .join("|");
            patterns.push((label, Regex::new(&format!(r"\b(?:{alternation})\b"))?));
        }
        Ok(Self { patterns })
    }

    /// Load `{model_dir}/gazetteer.yaml`.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    #[instrument(level = "info", skip_all, fields(model_dir = %model_dir.display()))]
    pub async fn load(model_dir: &Path) -> Result<Option<Self>, HarvestError> {
        let path = model_dir.join(GAZETTEER_FILE);
        let invalid = |reason: String| HarvestError::Annotator {
            path: path.clone(),
            reason,
        };

        let yaml = match fs::read_to_string(&path).await {
            Ok(y) => y,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No gazetteer found; running without annotator");
                return Ok(None);
            }
            Err(e) => return Err(invalid(e.to_string())),
        };

        let entries: BTreeMap<EntityLabel, Vec<String>> =
            serde_yaml::from_str(&yaml).map_err(|e| invalid(e.to_string()))?;
        let annotator = Self::from_entries(entries).map_err(|e| invalid(e.to_string()))?;
        info!(labels = annotator.patterns.len(), "Gazetteer annotator loaded");
        Ok(Some(annotator))
    }
}

impl Annotator for GazetteerAnnotator {
    fn name(&self) -> &str {
        "gazetteer"
    }

    fn annotate(&self, text: &str) -> Vec<EntitySpan> {
        let mut spans: Vec<EntitySpan> = self
            .patterns
            .iter()
            .flat_map(|(label, re)| {
                re.find_iter(text).map(move |m| EntitySpan {
                    start: m.start(),
                    end: m.end(),
                    label: *label,
                    text: m.as_str().to_string(),
                })
            })
            .collect();
        spans.sort_by_key(|s| (s.start, s.end));
        spans
    }
}
