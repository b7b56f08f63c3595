use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

use super::traits::{RunEvent, RunObserver};

/// Terminal progress bar driven by run events.
///
/// The bar advances on progress events only, so it moves in
/// `progress_step_percent` increments.
pub struct ProgressBarObserver {
    bar: ProgressBar,
    failed: AtomicUsize,
    enabled: bool,
}

impl ProgressBarObserver {
    /// # Arguments
    ///
    /// * `enabled` - Whether to draw anything (disabled for jsonl output or non-TTY)
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self {
                bar: ProgressBar::hidden(),
                failed: AtomicUsize::new(0),
                enabled: false,
            };
        }

        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} rows ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░  ");
        bar.set_style(style);
        bar.set_message("Starting...");

        Self {
            bar,
            failed: AtomicUsize::new(0),
            enabled: true,
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl RunObserver for ProgressBarObserver {
    fn name(&self) -> &str {
        "progress-bar"
    }

    fn observe(&self, event: &RunEvent) {
        match event {
            RunEvent::RunStart { total, .. } => {
                self.bar.set_length(*total as u64);
                self.bar.set_position(0);
                self.failed.store(0, Ordering::Relaxed);
            }
            RunEvent::BatchStart { batch_index, .. } => {
                if self.enabled {
                    self.bar.set_message(format!("batch {}", batch_index + 1));
                }
            }
            RunEvent::Progress { event, .. } => {
                self.bar.set_position(event.processed as u64);
            }
            RunEvent::RowFailed { .. } => {
                let failed = self.failed.fetch_add(1, Ordering::Relaxed) + 1;
                if self.enabled {
                    self.bar.set_message(format!("{} failed", failed));
                }
            }
            RunEvent::RunEnd { stats, .. } => {
                self.bar.set_position(stats.processed as u64);
                if self.enabled {
                    let msg = if stats.errors == 0 {
                        "✅ All rows processed".to_string()
                    } else {
                        format!("❌ {} rows failed", stats.errors)
                    };
                    self.bar.finish_with_message(msg);
                }
            }
            RunEvent::Cancelled { .. } => {
                if self.enabled {
                    self.bar.abandon_with_message("cancelled");
                }
            }
            RunEvent::BatchEnd { .. } => {}
        }
    }
}

impl Drop for ProgressBarObserver {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
