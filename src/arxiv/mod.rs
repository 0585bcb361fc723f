//! Access to the arXiv paper metadata query API
//!
//! The API is documented at <https://info.arxiv.org/help/api/user-manual.html>.
//! Results come back as Atom feeds, one page of results per request.

pub mod client;
pub mod feed;

pub use client::ArxivClient;

use crate::{PaperRecord, Result};
use async_trait::async_trait;
use std::fmt;

/// Source of paginated paper metadata
///
/// Implemented by [`ArxivClient`] for the real thing, and by deterministic
/// fakes in tests. Implementations should not retry or pace requests
/// themselves, this is the job of [`CategoryFetcher`](crate::fetch::CategoryFetcher).
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page of papers listed under `category`
    ///
    /// Records are returned as the server reported them, without any
    /// category filtering, sorted by submission date in the requested order.
    async fn fetch_page(
        &self,
        category: &str,
        token: PageToken,
        order: SortOrder,
        page_size: usize,
    ) -> Result<Page>;
}

/// One page of query results
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Page {
    /// Papers on this page
    pub records: Vec<PaperRecord>,

    /// Total number of matches that the server reported for the query
    pub total_results: Option<usize>,

    /// Where the next page starts, if there is one
    pub next: Option<PageToken>,
}

/// Position of a page within the results of a query
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PageToken(usize);
//
impl PageToken {
    /// Token of the first page of results
    pub const FIRST: Self = Self(0);

    /// Token of the page that starts at the `offset`-th result
    pub fn at(offset: usize) -> Self {
        Self(offset)
    }

    /// Index of the first result of this page
    pub fn offset(self) -> usize {
        self.0
    }
}

/// Order in which query results are sorted by submission date
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SortOrder {
    /// Newest papers first
    Descending,

    /// Oldest papers first
    Ascending,
}
//
impl SortOrder {
    /// Value of the API's `sortOrder` query parameter
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Descending => "descending",
            Self::Ascending => "ascending",
        }
    }
}
//
impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Descending => "newest first",
            Self::Ascending => "oldest first",
        })
    }
}
