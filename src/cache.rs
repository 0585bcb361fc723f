//! Disk cache of the raw corpus
//!
//! Fetching the corpus from arXiv takes hours and fails often, so once a raw
//! corpus has been assembled, it is saved to the data directory and reused by
//! every subsequent run. The cache is never refreshed automatically: delete
//! the raw corpus file to fetch the data again.

use crate::{
    arxiv::PageSource, config::Config, corpus, progress::ProgressReport, table, PaperRecord,
    Result,
};
use anyhow::Context;
use tokio::fs;

/// Load the raw corpus from the cache, or assemble and cache it
///
/// `source` is not used at all when a cached corpus exists.
pub async fn load_or_assemble(
    config: &Config,
    source: &(impl PageSource + ?Sized),
    report: &ProgressReport,
) -> Result<Vec<PaperRecord>> {
    if let Some(corpus) = load(config).await? {
        return Ok(corpus);
    }
    log::info!("No cached corpus found, fetching papers from arXiv");
    let corpus = corpus::assemble(config, source, report).await?;
    save(config, &corpus).await?;
    Ok(corpus)
}

/// Load the cached raw corpus, if any
pub async fn load(config: &Config) -> Result<Option<Vec<PaperRecord>>> {
    let path = config.raw_corpus_path();
    let exists = fs::try_exists(&path)
        .await
        .with_context(|| format!("checking for a cached corpus at {}", path.display()))?;
    if !exists {
        return Ok(None);
    }
    let corpus = table::load(&path).await.context("loading the cached corpus")?;
    log::info!("Loaded {} papers from {}", corpus.len(), path.display());
    Ok(Some(corpus))
}

/// Save the raw corpus into the cache
pub async fn save(config: &Config, corpus: &[PaperRecord]) -> Result<()> {
    fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("creating data directory {}", config.data_dir.display()))?;
    let path = config.raw_corpus_path();
    table::save(&path, corpus).await.context("caching the raw corpus")?;
    log::info!("Cached {} papers into {}", corpus.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        arxiv::{Page, PageToken, SortOrder},
        tests::paper,
    };
    use async_trait::async_trait;

    /// Source that always fails
    struct Offline;
    //
    #[async_trait]
    impl PageSource for Offline {
        async fn fetch_page(
            &self,
            category: &str,
            _token: PageToken,
            _order: SortOrder,
            _page_size: usize,
        ) -> Result<Page> {
            anyhow::bail!("cannot reach arXiv for {category}")
        }
    }

    fn offline_config(data_dir: &std::path::Path) -> Config {
        let mut config = Config::new(data_dir).without_pacing();
        config.client.num_retries = 0;
        config
    }

    #[tokio::test]
    async fn missing_cache() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load(&Config::new(dir.path())).await.unwrap(), None);
    }

    #[tokio::test]
    async fn cached_corpus_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let config = offline_config(dir.path());
        let corpus = vec![
            paper("First", "Older.", 1, "stat.AP"),
            paper("Second", "Newer.", 2, "stat.TH"),
        ];
        save(&config, &corpus).await.unwrap();

        let loaded = load_or_assemble(&config, &Offline, &ProgressReport::hidden())
            .await
            .unwrap();
        assert_eq!(loaded, corpus);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_no_cache() {
        let dir = tempfile::tempdir().unwrap();
        let config = offline_config(&dir.path().join("data"));
        let error = load_or_assemble(&config, &Offline, &ProgressReport::hidden())
            .await
            .unwrap_err();
        assert!(format!("{error:#}").contains("cannot reach arXiv for stat.AP"));
        assert!(!config.raw_corpus_path().exists());
    }

    #[tokio::test]
    async fn save_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().join("nested").join("data"));
        save(&config, &[paper("t", "a", 3, "stat.CO")]).await.unwrap();
        assert_eq!(load(&config).await.unwrap().unwrap().len(), 1);
    }
}
