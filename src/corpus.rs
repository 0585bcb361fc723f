//! Assembly of the raw corpus from all configured categories

use crate::{
    arxiv::{PageSource, SortOrder},
    config::Config,
    fetch::CategoryFetcher,
    progress::{ProgressConfig, ProgressReport, Work},
    PaperRecord, Result,
};
use anyhow::Context;
use std::collections::HashSet;

/// Fetch every configured category and merge the results into a raw corpus
///
/// All categories are first queried newest-first, then, if both directions
/// are enabled, oldest-first. Any failure aborts the whole assembly.
pub async fn assemble(
    config: &Config,
    source: &(impl PageSource + ?Sized),
    report: &ProgressReport,
) -> Result<Vec<PaperRecord>> {
    let orders: &[SortOrder] = if config.both_directions {
        &[SortOrder::Descending, SortOrder::Ascending]
    } else {
        &[SortOrder::Descending]
    };
    let queries = orders
        .iter()
        .flat_map(|&order| config.categories.iter().map(move |category| (category, order)))
        .collect::<Vec<_>>();
    let progress = report.add(
        "Querying categories",
        ProgressConfig::new(Work::Steps(queries.len())).dont_show_rate(),
    );

    let mut fetcher = CategoryFetcher::new(source, config.client, report);
    let mut papers = Vec::new();
    for (idx, (category, order)) in queries.into_iter().enumerate() {
        if idx > 0 && !config.category_delay.is_zero() {
            log::debug!("Waiting {:?} before querying {category}", config.category_delay);
            tokio::time::sleep(config.category_delay).await;
        }
        let fetched = fetcher
            .fetch(category, order)
            .await
            .with_context(|| format!("fetching {category} papers ({order})"))?;
        papers.extend(fetched);
        progress.make_progress(1);
    }
    progress.finish();
    Ok(sort_and_dedup(papers))
}

/// Sort papers by publication date, then drop repeated (title, abstract) pairs
///
/// Sorting is stable, and the earliest copy of a paper is the one that is
/// kept, so the output only depends on the input order for papers that were
/// published at the same time.
pub fn sort_and_dedup(mut papers: Vec<PaperRecord>) -> Vec<PaperRecord> {
    papers.sort_by_key(|paper| paper.publish_date);
    let initial_len = papers.len();
    let mut seen = HashSet::with_capacity(initial_len);
    papers.retain(|paper| seen.insert((paper.title.clone(), paper.abstract_text.clone())));
    log::info!(
        "Assembled {} papers ({} duplicates removed)",
        papers.len(),
        initial_len - papers.len()
    );
    papers
}
