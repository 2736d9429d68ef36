//! Feed headline extraction.
//!
//! Feeds are fetched on every run (no cache) and every entry title is taken
//! verbatim, without the word-count filter applied to scraped headings.
//! RSS 2.0 (`rss/channel/item`), RSS 1.0 (`rdf:RDF/item`) and Atom
//! (`feed/entry`) documents are understood.

use crate::error::HarvestError;
use crate::fetch::Transport;
use crate::models::Headline;
use quick_xml::de::from_str;
use quick_xml::escape::{escape, resolve_html5_entity, resolve_xml_entity};
use regex::{Captures, Regex};
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Deserialize)]
struct FeedDocument {
    channel: Option<Channel>,
    #[serde(rename = "item", default)]
    items: Vec<Entry>,
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    title: Option<String>,
}

/// Entry titles of a feed document, in feed order.
///
/// Entries without a title, or with a blank one, are skipped.
pub fn parse_feed(xml: &str) -> Result<Vec<Headline>, HarvestError> {
    let cleaned = scrub_html_entities_for_xml(xml);
    let doc: FeedDocument = from_str(&cleaned).map_err(|e| HarvestError::ParseFailed {
        what: "feed".to_string(),
        reason: e.to_string(),
    })?;

    let entries = doc
        .channel
        .map(|c| c.items)
        .unwrap_or_default()
        .into_iter()
        .chain(doc.items)
        .chain(doc.entries);

    let mut headlines = Vec::new();
    for entry in entries {
        match entry.title.and_then(Headline::new) {
            Some(h) => headlines.push(h),
            None => debug!("Skipping feed entry without a title"),
        }
    }
    Ok(headlines)
}

/// Fetch `feed_url` and return its entry titles.
///
/// Any failure (transport, status, parse) is logged and yields an empty list.
#[instrument(level = "info", skip_all, fields(%feed_url))]
pub async fn read_feed<T: Transport>(transport: &T, feed_url: &str) -> Vec<Headline> {
    let resp = match transport.get(feed_url).await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(error = %e, "Feed fetch failed");
            return Vec::new();
        }
    };
    if resp.status != 200 {
        warn!(status = resp.status, "Feed fetch returned non-200 status");
        return Vec::new();
    }

    let body = String::from_utf8_lossy(&resp.body);
    match parse_feed(&body) {
        Ok(headlines) => {
            info!(count = headlines.len(), "Parsed feed entries");
            headlines
        }
        Err(e) => {
            warn!(error = %e, "Feed could not be parsed");
            Vec::new()
        }
    }
}

static NAMED_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]*);").expect("static regex"));

/// Rewrite named entities XML does not define.
///
/// HTML5 names are replaced by their (XML-escaped) text; unknown names are
/// escaped so they survive as literal `&name;` instead of failing the parse.
fn scrub_html_entities_for_xml(s: &str) -> String {
    NAMED_ENTITY
        .replace_all(s, |caps: &Captures<'_>| {
            let name = &caps[1];
            if resolve_xml_entity(name).is_some() {
                return caps[0].to_string();
            }
            match resolve_html5_entity(name) {
                Some(text) => escape(text).into_owned(),
                None => format!("&amp;{name};"),
            }
        })
        .into_owned()
}
