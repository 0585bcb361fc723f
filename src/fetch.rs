//! Download of all papers from one category

use crate::{
    arxiv::{Page, PageSource, PageToken, SortOrder},
    config::ClientConfig,
    progress::{ProgressConfig, ProgressReport, Work},
    PaperRecord, Result,
};
use anyhow::Context;
use tokio::time::{self, Instant};

/// Paginated, paced and retried access to a [`PageSource`]
///
/// The minimal delay between requests is enforced across all the queries
/// performed by a fetcher, so one fetcher should be used per run.
#[derive(Debug)]
pub struct CategoryFetcher<'run, S: ?Sized> {
    /// Where pages come from
    source: &'run S,

    /// Paging and retry policy
    config: ClientConfig,

    /// Progress reporting
    report: &'run ProgressReport,

    /// Time at which the last request was sent, if any
    last_request: Option<Instant>,
}
//
impl<'run, S: PageSource + ?Sized> CategoryFetcher<'run, S> {
    /// Set up a fetcher
    pub fn new(source: &'run S, config: ClientConfig, report: &'run ProgressReport) -> Self {
        Self {
            source,
            config,
            report,
            last_request: None,
        }
    }

    /// Fetch every paper whose primary category is `category`
    ///
    /// Papers come out in the order the source listed them. At most
    /// [`ClientConfig::max_results`] papers are examined, so in large
    /// categories, the `order` determines which end of the timeline is seen.
    pub async fn fetch(&mut self, category: &str, order: SortOrder) -> Result<Vec<PaperRecord>> {
        let progress = self.report.add(
            format!("Downloading {category} papers ({order})"),
            ProgressConfig::new(Work::Papers(0)),
        );
        let max_results = self.config.max_results;
        let mut papers = Vec::new();
        let mut seen = 0;
        let mut token = Some(PageToken::FIRST);
        while let Some(current) = token {
            let remaining = max_results.saturating_sub(seen);
            if remaining == 0 {
                log::debug!("Reached the {max_results} results limit for {category} ({order})");
                break;
            }
            let page_size = remaining.min(self.config.page_size.get());
            let Page {
                records,
                total_results,
                next,
            } = self.fetch_page(category, current, order, page_size).await?;
            if let Some(total) = total_results {
                progress.set_work(total.min(max_results) as u64);
            }
            log::debug!(
                "Got {} {category} papers ({order}) starting at #{}",
                records.len(),
                current.offset()
            );
            seen += records.len();
            progress.make_progress(records.len() as u64);
            papers.extend(records.into_iter().filter_map(|paper| paper.into_category(category)));
            token = next;
        }
        progress.finish();
        log::info!("Kept {} of {seen} {category} papers ({order})", papers.len());
        Ok(papers)
    }

    /// Fetch one page, retrying failed requests
    async fn fetch_page(
        &mut self,
        category: &str,
        token: PageToken,
        order: SortOrder,
        page_size: usize,
    ) -> Result<Page> {
        let mut failures = 0;
        loop {
            self.wait_for_turn().await;
            match self.source.fetch_page(category, token, order, page_size).await {
                Ok(page) => return Ok(page),
                Err(e) if failures < self.config.num_retries => {
                    failures += 1;
                    log::warn!(
                        "Failed to fetch {category} papers ({order}) at #{}, retrying ({failures}/{}): {e:#}",
                        token.offset(),
                        self.config.num_retries
                    );
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!(
                            "giving up on {category} papers ({order}) at #{} after {failures} retries",
                            token.offset()
                        )
                    })
                }
            }
        }
    }

    /// Wait until the minimal delay since the last request has elapsed
    async fn wait_for_turn(&mut self) {
        if let Some(last_request) = self.last_request {
            time::sleep_until(last_request + self.config.page_delay).await;
        }
        self.last_request = Some(Instant::now());
    }
}
