//! Decoding of the Atom feeds returned by the arXiv API

use crate::{normalize_whitespace, Category, PaperRecord, Result};
use anyhow::Context;
use chrono::{DateTime, Utc};
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

/// Decoded contents of an API response
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Feed {
    /// Total number of matches for the query (`opensearch:totalResults`)
    pub total_results: Option<usize>,

    /// Papers listed in this response
    pub entries: Vec<PaperRecord>,
}

/// Prefix of the entry id that arXiv uses to report query errors
const API_ERROR_ID: &str = "http://arxiv.org/api/errors";

/// Decode an Atom feed from the arXiv API
pub fn parse(xml: &str) -> Result<Feed> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut feed = Feed::default();
    let mut entry: Option<EntryBuilder> = None;
    let mut field: Option<Field> = None;
    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("decoding Atom feed at byte {}", reader.buffer_position()))?;
        match event {
            Event::Start(e) => {
                field = None;
                let name = e.local_name();
                if name.as_ref() == b"entry" {
                    entry = Some(EntryBuilder::default());
                    continue;
                }
                match (name.as_ref(), entry.as_mut()) {
                    (b"totalResults", None) => field = Some(Field::TotalResults),
                    (b"id", Some(_)) => field = Some(Field::Id),
                    (b"title", Some(_)) => field = Some(Field::Title),
                    (b"summary", Some(_)) => field = Some(Field::Summary),
                    (b"published", Some(_)) => field = Some(Field::Published),
                    (b"primary_category", Some(builder)) => builder.set_primary_category(&e)?,
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if let (b"primary_category", Some(builder)) = (e.local_name().as_ref(), entry.as_mut()) {
                    builder.set_primary_category(&e)?;
                }
            }
            Event::Text(t) => {
                let Some(field) = field else { continue };
                let text = t.unescape().context("unescaping Atom feed text")?;
                match (field, entry.as_mut()) {
                    (Field::TotalResults, _) => {
                        let total = text
                            .trim()
                            .parse()
                            .with_context(|| format!("parsing total result count {text:?}"))?;
                        feed.total_results = Some(total);
                    }
                    (Field::Id, Some(builder)) => builder.id.push_str(&text),
                    (Field::Title, Some(builder)) => builder.title.push_str(&text),
                    (Field::Summary, Some(builder)) => builder.summary.push_str(&text),
                    (Field::Published, Some(builder)) => builder.published.push_str(&text),
                    (_, None) => {}
                }
            }
            Event::End(e) => {
                field = None;
                if e.local_name().as_ref() == b"entry" {
                    if let Some(builder) = entry.take() {
                        feed.entries.push(builder.build()?);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(feed)
}

/// Feed elements whose text we care about
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Field {
    TotalResults,
    Id,
    Title,
    Summary,
    Published,
}

/// Data collected from an `<entry>` element so far
#[derive(Debug, Default)]
struct EntryBuilder {
    id: String,
    title: String,
    summary: String,
    published: String,
    primary_category: Option<Category>,
}
//
impl EntryBuilder {
    /// Record the `term` attribute of an `arxiv:primary_category` element
    fn set_primary_category(&mut self, element: &BytesStart<'_>) -> Result<()> {
        let term = element
            .try_get_attribute("term")
            .context("reading primary category attributes")?
            .context("primary category has no term")?;
        let term = term
            .unescape_value()
            .context("unescaping primary category term")?;
        self.primary_category = Some(term.trim().into());
        Ok(())
    }

    /// Turn the collected data into a paper record
    fn build(self) -> Result<PaperRecord> {
        let Self {
            id,
            title,
            summary,
            published,
            primary_category,
        } = self;
        let id = id.trim();
        if id.starts_with(API_ERROR_ID) {
            anyhow::bail!("arXiv rejected the query: {}", summary.trim());
        }
        // Long titles are wrapped over several lines
        let title = normalize_whitespace(&title);
        anyhow::ensure!(!title.is_empty(), "entry {id} has no title");
        let summary = summary.trim();
        anyhow::ensure!(!summary.is_empty(), "entry {id} has no summary");
        let publish_date = DateTime::parse_from_rfc3339(published.trim())
            .with_context(|| format!("parsing publication date {published:?} of entry {id}"))?
            .with_timezone(&Utc);
        let primary_category =
            primary_category.with_context(|| format!("entry {id} has no primary category"))?;
        Ok(PaperRecord {
            title,
            abstract_text: summary.into(),
            publish_date,
            primary_category,
        })
    }
}
