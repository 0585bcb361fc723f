//! Reproducible train/test split of the raw corpus

use crate::{
    config::{Config, SplitConfig},
    normalize_whitespace, table, LabeledPaper, PaperRecord, Result,
};
use anyhow::Context;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Training and test sets
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Split {
    /// Papers to train on
    pub train: Vec<LabeledPaper>,

    /// Papers to evaluate on
    pub test: Vec<LabeledPaper>,
}

/// Split a corpus into training and test sets
///
/// Papers are shuffled with a seeded RNG, then the first
/// `ceil(test_fraction * len)` shuffled papers go to the test set and the
/// rest go to the training set. The result only depends on the corpus
/// contents, corpus order and configuration.
pub fn split(corpus: &[PaperRecord], config: SplitConfig) -> Result<Split> {
    let SplitConfig {
        seed,
        test_fraction,
    } = config;
    anyhow::ensure!(
        (0.0..=1.0).contains(&test_fraction),
        "test fraction {test_fraction} is not within [0, 1]"
    );
    let mut order = (0..corpus.len()).collect::<Vec<_>>();
    order.shuffle(&mut StdRng::seed_from_u64(seed));
    let (test, train) = order.split_at(test_len(corpus.len(), test_fraction));
    let labeled = |indices: &[usize]| -> Vec<LabeledPaper> {
        indices.iter().map(|&idx| label(&corpus[idx])).collect()
    };
    Ok(Split {
        train: labeled(train),
        test: labeled(test),
    })
}

/// Number of papers that go to the test set
fn test_len(corpus_len: usize, test_fraction: f64) -> usize {
    ((test_fraction * corpus_len as f64).ceil() as usize).min(corpus_len)
}

/// Drop the publication date and clean up the abstract
fn label(paper: &PaperRecord) -> LabeledPaper {
    LabeledPaper {
        title: paper.title.clone(),
        abstract_text: normalize_whitespace(&paper.abstract_text),
        primary_category: paper.primary_category.clone(),
    }
}

/// Save the training and test sets into the data directory
pub async fn save(config: &Config, split: &Split) -> Result<()> {
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("creating data directory {}", config.data_dir.display()))?;
    table::save(&config.train_path(), &split.train)
        .await
        .context("saving the training set")?;
    table::save(&config.test_path(), &split.test)
        .await
        .context("saving the test set")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::paper;
    use std::collections::HashSet;

    fn corpus(len: usize) -> Vec<PaperRecord> {
        (0..len)
            .map(|i| paper(&format!("title {i}"), &format!("abstract {i}"), 1 + (i % 28) as u32, "stat.ML"))
            .collect()
    }

    #[test]
    fn test_set_size() {
        assert_eq!(test_len(0, 0.3), 0);
        assert_eq!(test_len(5, 0.3), 2);
        assert_eq!(test_len(10, 0.3), 3);
        assert_eq!(test_len(7, 0.0), 0);
        assert_eq!(test_len(7, 1.0), 7);
    }

    #[test]
    fn partitions_the_corpus() {
        let corpus = corpus(101);
        let split = split(&corpus, SplitConfig::default()).unwrap();
        assert_eq!(split.test.len(), 31);
        assert_eq!(split.train.len(), 70);

        let train = split.train.iter().map(|p| &p.title).collect::<HashSet<_>>();
        let test = split.test.iter().map(|p| &p.title).collect::<HashSet<_>>();
        assert!(train.is_disjoint(&test));
        let all = corpus.iter().map(|p| &p.title).collect::<HashSet<_>>();
        assert_eq!(train.union(&test).copied().collect::<HashSet<_>>(), all);
    }

    #[test]
    fn seeded_and_reproducible() {
        let corpus = corpus(50);
        let config = SplitConfig::default();
        let first = split(&corpus, config).unwrap();
        assert_eq!(split(&corpus, config).unwrap(), first);

        let other_seed = split(&corpus, SplitConfig { seed: 7, ..config }).unwrap();
        assert_ne!(other_seed, first);

        // The shuffle actually moves papers around
        let shuffled = (first.test.iter().chain(&first.train))
            .map(|p| p.title.clone())
            .collect::<Vec<_>>();
        let original = corpus.iter().map(|p| p.title.clone()).collect::<Vec<_>>();
        assert_ne!(shuffled, original);
    }

    #[test]
    fn abstracts_are_normalized_titles_are_not() {
        let corpus = vec![paper("Two\n  lines", "Line one.\n  Line two.", 1, "stat.ME")];
        let split = split(
            &corpus,
            SplitConfig {
                test_fraction: 0.0,
                ..SplitConfig::default()
            },
        )
        .unwrap();
        assert!(split.test.is_empty());
        assert_eq!(
            split.train,
            [LabeledPaper {
                title: "Two\n  lines".into(),
                abstract_text: "Line one. Line two.".into(),
                primary_category: "stat.ME".into(),
            }]
        );
    }

    #[test]
    fn invalid_fraction() {
        let config = SplitConfig {
            test_fraction: 1.5,
            ..SplitConfig::default()
        };
        assert!(split(&corpus(3), config).is_err());
    }
}
