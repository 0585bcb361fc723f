//! Corpus of arXiv statistics papers for text classification
//!
//! Paper metadata is queried from the arXiv API one category at a time,
//! assembled into a deduplicated raw corpus that is cached on disk, and then
//! split into reproducible train and test sets.
//!
//! The arXiv API is slow and rate-limited, so a full fetch takes a long time.
//! Once `raw_data.csv` exists in the data directory, it is reused as-is and no
//! network request is made. Delete it to force a new fetch.

pub mod arxiv;
pub mod cache;
pub mod config;
pub mod corpus;
pub mod fetch;
pub mod progress;
pub mod split;
mod table;

use crate::{
    arxiv::PageSource, config::Config, progress::ProgressReport, split::Split, table::Row,
};
use chrono::{DateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

/// Use anyhow for Result type erasure
pub use anyhow::Result;

/// arXiv category code, e.g. "stat.ML"
pub type Category = Box<str>;

/// Legacy code under which arXiv still files some statistics theory papers
pub const LEGACY_THEORY_CATEGORY: &str = "math.ST";

/// Category that [`LEGACY_THEORY_CATEGORY`] papers are folded into
pub const THEORY_CATEGORY: &str = "stat.TH";

/// Map a primary category reported by arXiv to the code we classify it under
pub fn canonical_category(primary_category: &str) -> &str {
    if primary_category == LEGACY_THEORY_CATEGORY {
        THEORY_CATEGORY
    } else {
        primary_category
    }
}

/// Collapse whitespace runs (including line breaks) into single spaces and
/// trim both ends
pub fn normalize_whitespace(text: &str) -> Box<str> {
    text.split_whitespace().collect::<Vec<_>>().join(" ").into()
}

/// Paper metadata, as fetched from arXiv and stored in the raw corpus
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct PaperRecord {
    /// Paper title on a single line (may contain LaTeX markup)
    #[serde(rename = "Title")]
    pub title: Box<str>,

    /// Paper abstract, as provided by arXiv
    #[serde(rename = "Abstract")]
    pub abstract_text: Box<str>,

    /// Date of submission of the first version
    ///
    /// Written in RFC 3339 format. Files where dates look like
    /// `2021-03-01 08:30:00+00:00` can be loaded too.
    #[serde(rename = "Publish Date", deserialize_with = "deserialize_date")]
    pub publish_date: DateTime<Utc>,

    /// Main subject classification of the paper
    #[serde(rename = "Primary Category")]
    pub primary_category: Category,
}
//
impl PaperRecord {
    /// Keep this record if its primary category, after folding legacy codes,
    /// is the requested category
    pub fn into_category(self, category: &str) -> Option<Self> {
        let canonical = canonical_category(&self.primary_category);
        if canonical != category {
            return None;
        }
        if canonical == &*self.primary_category {
            Some(self)
        } else {
            Some(Self {
                primary_category: canonical.into(),
                ..self
            })
        }
    }
}
//
impl Row for PaperRecord {
    const COLUMNS: &'static [&'static str] =
        &["Title", "Abstract", "Publish Date", "Primary Category"];
}

/// Decode a publication date in either RFC 3339 or `YYYY-MM-DD HH:MM:SS+HH:MM`
/// format
fn deserialize_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let text = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&text)
        .or_else(|_| DateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%:z"))
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| D::Error::custom(format!("invalid publication date {text:?}: {e}")))
}

/// Paper metadata, as stored in the train and test sets
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct LabeledPaper {
    /// Paper title
    #[serde(rename = "Title")]
    pub title: Box<str>,

    /// Paper abstract, with whitespace normalized
    #[serde(rename = "Abstract")]
    pub abstract_text: Box<str>,

    /// Classification label
    #[serde(rename = "Primary Category")]
    pub primary_category: Category,
}
//
impl Row for LabeledPaper {
    const COLUMNS: &'static [&'static str] = &["Title", "Abstract", "Primary Category"];
}

/// Build the train and test sets described by `config`
///
/// The raw corpus is loaded from the data directory if it was cached by a
/// previous run, otherwise it is fetched from `source` and cached. The train
/// and test sets are then written next to it and returned.
pub async fn run(
    config: &Config,
    source: &impl PageSource,
    report: &ProgressReport,
) -> Result<Split> {
    let corpus = cache::load_or_assemble(config, source, report).await?;
    let split = split::split(&corpus, config.split)?;
    split::save(config, &split).await?;
    log::info!(
        "Split {} papers into {} training and {} test papers",
        corpus.len(),
        split.train.len(),
        split.test.len()
    );
    Ok(split)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Build a paper record published on a given day of January 2020
    pub fn paper(title: &str, abstract_text: &str, day: u32, category: &str) -> PaperRecord {
        PaperRecord {
            title: title.into(),
            abstract_text: abstract_text.into(),
            publish_date: Utc
                .with_ymd_and_hms(2020, 1, day, 12, 0, 0)
                .single()
                .expect("test dates should be valid"),
            primary_category: category.into(),
        }
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(&*normalize_whitespace("Line one.\n  Line two."), "Line one. Line two.");
        assert_eq!(&*normalize_whitespace("  \tpadded\r\n\n text \n"), "padded text");
        assert_eq!(&*normalize_whitespace("clean"), "clean");
        assert_eq!(&*normalize_whitespace(" \n "), "");
    }

    #[test]
    fn legacy_theory_code_is_folded() {
        assert_eq!(canonical_category("math.ST"), "stat.TH");
        assert_eq!(canonical_category("stat.TH"), "stat.TH");
        assert_eq!(canonical_category("stat.ML"), "stat.ML");
    }

    #[test]
    fn category_filter_applies_after_remap() {
        let legacy = paper("t", "a", 1, "math.ST");
        let kept = legacy.clone().into_category("stat.TH").expect("math.ST is stat.TH");
        assert_eq!(&*kept.primary_category, "stat.TH");
        assert_eq!(kept.title, legacy.title);

        assert!(legacy.into_category("math.ST").is_none());
        assert!(paper("t", "a", 1, "cs.LG").into_category("stat.ML").is_none());
        assert!(paper("t", "a", 1, "stat.ML").into_category("stat.ML").is_some());
    }
}
