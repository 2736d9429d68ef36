//! Headline extractors.
//!
//! Two kinds of sources feed the log:
//!
//! | Source | Module | Method | Filter |
//! |--------|--------|--------|--------|
//! | Scraped domain | [`html`] | Heading markup via a [`html::CandidateStrategy`] | At least `min_words` tokens |
//! | Feed URL | [`feed`] | RSS 2.0 / RSS 1.0 / Atom entry titles | None |
//!
//! Extractors return headlines in discovery order and never deduplicate.

pub mod feed;
pub mod html;
