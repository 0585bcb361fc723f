//! Progress reporting infrastructure

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::borrow::Cow;

/// CLI progress report of ongoing operations
///
/// To avoid corrupted terminal output, you should not write anything to stdout
/// or stderr yourself as long as a report is being displayed. Please use logs
/// for debug messages.
#[derive(Clone, Debug, Default)]
pub struct ProgressReport(MultiProgress);
//
impl ProgressReport {
    /// Prepare to report progress on the cli
    pub fn new() -> Self {
        Self::default()
    }

    /// Track progress without displaying anything
    pub fn hidden() -> Self {
        Self(MultiProgress::with_draw_target(ProgressDrawTarget::hidden()))
    }

    /// Prepare to report on a new operation
    pub fn add(&self, what: impl Into<Cow<'static, str>>, config: ProgressConfig) -> ProgressTracker {
        let ProgressConfig {
            initial_work,
            show_rate,
        } = config;
        let style_header = "{prefix} {wide_bar} ";
        let style_trailer = match (initial_work, show_rate) {
            (Work::Steps(_), false) => "{pos}/{len}",
            (Work::Steps(_), true) => "{pos}/{len} ({per_sec})",
            (Work::Papers(_), false) => "{human_pos}/{human_len} papers",
            (Work::Papers(_), true) => "{human_pos}/{human_len} papers ({per_sec}, ~{eta} left)",
        };
        let bar = ProgressBar::new(initial_work.into())
            .with_prefix(what)
            .with_style(
                ProgressStyle::with_template(&format!("{style_header}{style_trailer}"))
                    .expect("all styles above should be valid indicatif styles"),
            );
        ProgressTracker {
            bar: self.0.add(bar),
            report: self.0.clone(),
        }
    }
}

/// Progress bar configuration
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct ProgressConfig {
    /// Initial length of the progress bar
    initial_work: Work,

    /// Show the completion rate and estimated remaining time
    show_rate: bool,
}
//
impl ProgressConfig {
    /// Default configuration, with some initial amount of work
    pub fn new(initial_work: Work) -> Self {
        Self {
            initial_work,
            show_rate: true,
        }
    }

    /// Disable display of the completion rate
    pub fn dont_show_rate(self) -> Self {
        Self {
            show_rate: false,
            ..self
        }
    }
}

/// Work whose progression that can be tracked
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Work {
    /// Steps to be taken, with a precise count display
    Steps(usize),

    /// Papers to be downloaded
    Papers(usize),
}
//
impl From<Work> for u64 {
    fn from(value: Work) -> Self {
        let inner = match value {
            Work::Steps(s) => s,
            Work::Papers(p) => p,
        };
        inner as u64
    }
}

/// Mechanism to track progress
#[derive(Clone, Debug)]
pub struct ProgressTracker {
    /// Progress bar for this specific process
    bar: ProgressBar,

    /// Underlying process report
    report: MultiProgress,
}
//
impl ProgressTracker {
    /// Show that a certain amount of progress has been made
    pub fn make_progress(&self, progress: u64) {
        self.bar.inc(progress);
        // Remote totals are estimates, never show more done than planned
        let current = self.bar.position();
        if self.bar.length().is_some_and(|max| current > max) {
            self.bar.set_length(current);
        }
    }

    /// Update the total amount of work, e.g. once a remote server told us
    pub fn set_work(&self, total: u64) {
        self.bar.set_length(total.max(self.bar.position()));
    }

    /// Amount of progress made so far
    #[cfg(test)]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Hide the progress bar once the operation is over
    pub fn finish(&self) {
        self.bar.finish_and_clear();
        self.report.remove(&self.bar);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_totals_never_lag_behind_progress() {
        let report = ProgressReport::hidden();
        let tracker = report.add("Downloading", ProgressConfig::new(Work::Papers(0)));
        tracker.set_work(10);
        tracker.make_progress(4);
        assert_eq!(tracker.position(), 4);
        tracker.set_work(2);
        tracker.make_progress(8);
        assert_eq!(tracker.position(), 12);
        tracker.finish();
    }
}
