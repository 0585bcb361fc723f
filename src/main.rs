//! This program builds a text classification corpus from the abstracts of
//! arXiv statistics papers, using the arXiv API documented at
//! <https://info.arxiv.org/help/api/user-manual.html>.

use arxiv_stats_corpus::{
    arxiv::ArxivClient,
    config::{Config, SplitConfig},
    progress::ProgressReport,
    Category, Result,
};
use clap::Parser;
use log::LevelFilter;
use std::{path::PathBuf, time::Duration};

/// Fetch arXiv statistics papers, then split them into train and test sets
///
/// The raw corpus is cached in the data directory after the first successful
/// fetch, and reused by later runs. Fetching again is slow and puts load on
/// the arXiv API, so only delete the cached raw_data.csv if you really need
/// fresh data.
#[derive(Parser, Debug)]
#[command(version, author)]
struct Args {
    /// Directory where raw_data.csv, train.csv and test.csv are stored
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// arXiv category to include in the corpus (can be repeated)
    ///
    /// Defaults to stat.AP, stat.CO, stat.ML, stat.ME and stat.TH. Papers
    /// filed under math.ST are counted as stat.TH.
    #[arg(short, long = "category")]
    categories: Vec<Category>,

    /// Only query each category newest-first
    ///
    /// arXiv returns at most 50000 results per query, so by default, each
    /// category is queried a second time oldest-first to cover more papers.
    #[arg(long, default_value_t = false)]
    single_direction: bool,

    /// Seconds to wait between two category queries
    #[arg(long, default_value = "30")]
    category_delay: u64,

    /// Minimal number of seconds between two page requests
    #[arg(long, default_value = "5")]
    page_delay: u64,

    /// Number of times a failed page request is retried
    #[arg(long, default_value = "10")]
    retries: usize,

    /// Seed of the train/test split
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Fraction of the corpus that goes into the test set
    #[arg(long, default_value = "0.3")]
    test_fraction: f64,
}
//
impl Args {
    /// Decode and validate CLI arguments
    pub fn parse_and_check() -> Result<Self> {
        let args = Args::parse();
        anyhow::ensure!(
            (0.0..=1.0).contains(&args.test_fraction),
            "the test fraction must be between 0 and 1"
        );
        Ok(args)
    }

    /// Process configuration
    pub fn config(self) -> Config {
        let Args {
            data_dir,
            categories,
            single_direction,
            category_delay,
            page_delay,
            retries,
            seed,
            test_fraction,
        } = self;
        let mut config = Config::new(data_dir);
        if !categories.is_empty() {
            config = config.with_categories(categories);
        }
        config.both_directions = !single_direction;
        config.category_delay = Duration::from_secs(category_delay);
        config.client.page_delay = Duration::from_secs(page_delay);
        config.client.num_retries = retries;
        config.split = SplitConfig {
            seed,
            test_fraction,
        };
        config
    }
}
//
#[tokio::main]
async fn main() -> Result<()> {
    // Set up logging
    setup_logging().map_err(|e| anyhow::format_err!("{e}"))?;

    // Decode CLI arguments
    let config = Args::parse_and_check()?.config();

    // Build the dataset, fetching the raw corpus if it isn't cached yet
    let report = ProgressReport::new();
    let client = ArxivClient::new(reqwest::Client::new());
    let split = arxiv_stats_corpus::run(&config, &client, &report).await?;

    println!(
        "Saved {} training papers to {} and {} test papers to {}",
        split.train.len(),
        config.train_path().display(),
        split.test.len(),
        config.test_path().display()
    );
    Ok(())
}

/// Set up logging
fn setup_logging() -> syslog::Result<()> {
    syslog::init(
        syslog::Facility::LOG_USER,
        if cfg!(feature = "log-trace") {
            LevelFilter::Trace
        } else if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        None,
    )
}
