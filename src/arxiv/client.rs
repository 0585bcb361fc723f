//! HTTP client for the arXiv query API

use super::{feed, Page, PageSource, PageToken, SortOrder};
use crate::Result;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Response;

/// Endpoint of the arXiv query API
pub const API_URL: &str = "https://export.arxiv.org/api/query";

/// [`PageSource`] that queries the arXiv API over HTTP
///
/// Each call performs exactly one request. Pacing and retries are handled by
/// the caller.
#[derive(Clone, Debug)]
pub struct ArxivClient {
    /// Underlying HTTP client
    client: reqwest::Client,

    /// Query endpoint
    api_url: Box<str>,
}
//
impl ArxivClient {
    /// Query the public arXiv API
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_api_url(client, API_URL)
    }

    /// Query an arXiv-compatible API at another location
    pub fn with_api_url(client: reqwest::Client, api_url: impl Into<Box<str>>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    /// Query parameters for one page of a category listing
    fn query(
        category: &str,
        token: PageToken,
        order: SortOrder,
        page_size: usize,
    ) -> [(&'static str, String); 5] {
        [
            ("search_query", format!("cat:{category}")),
            ("start", token.offset().to_string()),
            ("max_results", page_size.to_string()),
            ("sortBy", "submittedDate".to_owned()),
            ("sortOrder", order.as_query().to_owned()),
        ]
    }
}

#[async_trait]
impl PageSource for ArxivClient {
    async fn fetch_page(
        &self,
        category: &str,
        token: PageToken,
        order: SortOrder,
        page_size: usize,
    ) -> Result<Page> {
        let start = token.offset();
        let context = || format!("querying {category} papers ({order}) starting at #{start}");
        log::trace!("Requesting {page_size} {category} papers ({order}) starting at #{start}");

        let body = self
            .client
            .get(&*self.api_url)
            .query(&Self::query(category, token, order, page_size))
            .send()
            .await
            .and_then(Response::error_for_status)
            .with_context(context)?
            .text()
            .await
            .with_context(context)?;
        let feed = feed::parse(&body).with_context(context)?;
        next_page(start, feed).with_context(context)
    }
}

/// Turn a decoded feed into a page, figuring out where the next page starts
fn next_page(start: usize, feed: feed::Feed) -> Result<Page> {
    let feed::Feed {
        total_results,
        entries,
    } = feed;
    // The API sometimes answers with an empty page under load
    if let Some(total) = total_results {
        anyhow::ensure!(
            !entries.is_empty() || start >= total,
            "received an empty page although {total} results were announced"
        );
    }
    let end = start + entries.len();
    let next = (!entries.is_empty() && total_results.map_or(true, |total| end < total))
        .then(|| PageToken::at(end));
    Ok(Page {
        records: entries,
        total_results,
        next,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::paper;

    fn feed(total_results: Option<usize>, len: usize) -> feed::Feed {
        feed::Feed {
            total_results,
            entries: (0..len).map(|i| paper(&format!("title {i}"), "abstract", 1, "stat.ML")).collect(),
        }
    }

    #[test]
    fn default_endpoint_is_secure() {
        let client = ArxivClient::new(reqwest::Client::new());
        assert_eq!(&*client.api_url, "https://export.arxiv.org/api/query");
    }

    #[test]
    fn query_parameters() {
        let query = ArxivClient::query("stat.ML", PageToken::at(2000), SortOrder::Ascending, 1000);
        assert_eq!(query[0], ("search_query", "cat:stat.ML".to_owned()));
        assert_eq!(query[1], ("start", "2000".to_owned()));
        assert_eq!(query[2], ("max_results", "1000".to_owned()));
        assert_eq!(query[3], ("sortBy", "submittedDate".to_owned()));
        assert_eq!(query[4], ("sortOrder", "ascending".to_owned()));
    }

    #[test]
    fn next_page_follows_offsets() {
        let page = next_page(0, feed(Some(5), 3)).unwrap();
        assert_eq!(page.records.len(), 3);
        assert_eq!(page.total_results, Some(5));
        assert_eq!(page.next, Some(PageToken::at(3)));

        let page = next_page(3, feed(Some(5), 2)).unwrap();
        assert_eq!(page.next, None);
    }

    #[test]
    fn missing_total_pages_until_empty() {
        let page = next_page(10, feed(None, 4)).unwrap();
        assert_eq!(page.next, Some(PageToken::at(14)));
        let page = next_page(14, feed(None, 0)).unwrap();
        assert_eq!(page.next, None);
    }

    #[test]
    fn premature_empty_page_is_an_error() {
        assert!(next_page(1000, feed(Some(5000), 0)).is_err());
        let page = next_page(5000, feed(Some(5000), 0)).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.next, None);
    }
}
