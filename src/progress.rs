//! Shared progress accounting and its single-line display.

use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counts processed URLs across every worker of a run.
///
/// "Processed" is not "succeeded": failed downloads count too, so the line
/// always ends at 100%.
#[derive(Debug)]
pub struct Progress {
    completed: AtomicU64,
    total: u64,
    bar: ProgressBar,
    clear: bool,
}

impl Progress {
    /// Creates a tracker for `total` URLs, displayed according to `opts`.
    pub fn new(total: u64, opts: &ProgressBarOpts) -> Self {
        let progress = Self {
            completed: AtomicU64::new(0),
            total,
            bar: opts.clone().to_progress_bar(total),
            clear: opts.clear,
        };
        progress.bar.set_message(progress.snapshot().to_string());
        progress
    }

    /// The text currently shown after the line prefix.
    pub fn message(&self) -> String {
        self.bar.message()
    }

    /// Records one processed URL and redraws the line.
    pub fn record(&self) -> Snapshot {
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Snapshot {
            completed,
            total: self.total,
        };
        self.bar.set_position(completed);
        self.bar.set_message(snapshot.to_string());
        snapshot
    }

    /// Current state of the counter.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            completed: self.completed.load(Ordering::SeqCst),
            total: self.total,
        }
    }

    /// Finish the line once every worker is done, and optionally remove it.
    pub fn finish(&self) {
        if self.clear {
            self.bar.finish_and_clear();
        } else {
            self.bar.finish();
        }
    }
}

/// A point-in-time reading of a [`Progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub completed: u64,
    pub total: u64,
}

impl Snapshot {
    /// Percentage of processed URLs. An empty run is complete.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        100.0 * self.completed as f64 / self.total as f64
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}% ({}/{})",
            self.percentage(),
            self.completed,
            self.total
        )
    }
}

/// Define the options for the progress line.
#[derive(Debug, Clone)]
pub struct ProgressBarOpts {
    /// Progress bar template string.
    template: Option<String>,
    /// Enable or disable the progress bar.
    enabled: bool,
    /// Clear the progress bar once completed.
    clear: bool,
}

impl Default for ProgressBarOpts {
    fn default() -> Self {
        Self {
            template: Some(ProgressBarOpts::TEMPLATE_PROGRESS_LINE.into()),
            enabled: true,
            clear: false,
        }
    }
}

impl ProgressBarOpts {
    /// Template rewriting a single status line.
    ///
    /// `[PROGRESS] - 50.00% (1/2)`
    pub const TEMPLATE_PROGRESS_LINE: &'static str = "[PROGRESS] - {msg}";

    /// Options for a progress line that is never drawn.
    pub fn hidden() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Create a [`ProgressStyle`] based on the provided options.
    ///
    /// An invalid template falls back to the default bar.
    pub fn to_progress_style(self) -> ProgressStyle {
        match self.template {
            Some(template) => ProgressStyle::with_template(&template)
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            None => ProgressStyle::default_bar(),
        }
    }

    /// Create a [`ProgressBar`] based on the provided options.
    pub fn to_progress_bar(self, len: u64) -> ProgressBar {
        // Return a hidden Progress bar if we disabled it.
        if !self.enabled {
            return ProgressBar::hidden();
        }

        // Otherwise returns a ProgressBar with the style.
        let style = self.to_progress_style();
        ProgressBar::new(len).with_style(style)
    }
}
