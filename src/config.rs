//! Processing pipeline configuration

use crate::Category;
use std::{num::NonZeroUsize, path::PathBuf, time::Duration};

/// Statistics categories that make up the corpus
pub const DEFAULT_CATEGORIES: [&str; 5] = ["stat.AP", "stat.CO", "stat.ML", "stat.ME", "stat.TH"];

/// Name of the raw corpus file within the data directory
pub const RAW_CORPUS_FILE: &str = "raw_data.csv";

/// Name of the training set file within the data directory
pub const TRAIN_FILE: &str = "train.csv";

/// Name of the test set file within the data directory
pub const TEST_FILE: &str = "test.csv";

/// Final process configuration
///
/// The binary builds this from its command-line arguments, tests build it
/// with [`Config::new`] and tweak the fields they care about.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Categories to be fetched, in fetch order
    pub categories: Box<[Category]>,

    /// Directory where the raw corpus and the train/test sets are stored
    pub data_dir: PathBuf,

    /// How pages are requested from the API
    pub client: ClientConfig,

    /// Query every category a second time in oldest-first order
    ///
    /// arXiv truncates each query to [`ClientConfig::max_results`] matches.
    /// Querying from both ends of the submission timeline recovers papers
    /// that a single newest-first query would miss in large categories.
    pub both_directions: bool,

    /// Pause between two consecutive category queries
    pub category_delay: Duration,

    /// How the corpus is split into train and test sets
    pub split: SplitConfig,
}
//
impl Config {
    /// Default configuration, storing data in `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|&c| c.into()).collect(),
            data_dir: data_dir.into(),
            client: ClientConfig::default(),
            both_directions: true,
            category_delay: Duration::from_secs(30),
            split: SplitConfig::default(),
        }
    }

    /// Replace the list of fetched categories
    pub fn with_categories<C: Into<Category>>(self, categories: impl IntoIterator<Item = C>) -> Self {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    /// Disable all pauses between API requests
    pub fn without_pacing(self) -> Self {
        Self {
            client: ClientConfig {
                page_delay: Duration::ZERO,
                ..self.client
            },
            category_delay: Duration::ZERO,
            ..self
        }
    }

    /// Location of the cached raw corpus
    pub fn raw_corpus_path(&self) -> PathBuf {
        self.data_dir.join(RAW_CORPUS_FILE)
    }

    /// Location of the training set
    pub fn train_path(&self) -> PathBuf {
        self.data_dir.join(TRAIN_FILE)
    }

    /// Location of the test set
    pub fn test_path(&self) -> PathBuf {
        self.data_dir.join(TEST_FILE)
    }
}

/// Paging and retry policy for API requests
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ClientConfig {
    /// Number of results requested per page
    pub page_size: NonZeroUsize,

    /// Minimal delay between two page requests
    pub page_delay: Duration,

    /// Number of times a failed page request is retried before giving up
    pub num_retries: usize,

    /// Maximal number of results consumed from a single query
    pub max_results: usize,
}
//
impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            page_size: NonZeroUsize::new(1000).expect("1000 is not zero"),
            page_delay: Duration::from_secs(5),
            num_retries: 10,
            max_results: 50_000,
        }
    }
}

/// Train/test split parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitConfig {
    /// Seed of the shuffle that assigns papers to either set
    pub seed: u64,

    /// Fraction of the corpus that goes to the test set, within [0, 1]
    pub test_fraction: f64,
}
//
impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.3,
        }
    }
}
