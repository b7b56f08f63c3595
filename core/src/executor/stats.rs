use std::num::NonZeroU32;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::types::{ExecStats, ProgressEvent};

/// Run-scoped, mutex-guarded [`ExecStats`].
///
/// Every completion is a single critical section covering the counter
/// update, the threshold check and the progress emission, so concurrent
/// completions can neither lose an update nor report a percentage twice or
/// out of order.
pub struct StatsAggregator {
    progress_step: NonZeroU32,
    inner: Mutex<ExecStats>,
}

impl StatsAggregator {
    pub fn new(total: usize, progress_step: NonZeroU32) -> Self {
        Self {
            progress_step,
            inner: Mutex::new(ExecStats::new(total)),
        }
    }

    /// Record one finished row and call `emit` if a new progress step was
    /// crossed. `emit` runs while the stats lock is held.
    pub fn record_completion<F>(&self, success: bool, emit: F)
    where
        F: FnOnce(ProgressEvent),
    {
        let mut stats = self.lock();
        debug_assert!(stats.processed < stats.total, "more completions than rows");

        stats.processed += 1;
        if !success {
            stats.errors += 1;
        }

        if let Some(event) = crossed_threshold(&stats, self.progress_step) {
            stats.last_logged_percent = event.percent as i32;
            emit(event);
        }
    }

    pub fn snapshot(&self) -> ExecStats {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, ExecStats> {
        // Counters stay consistent even if an observer panicked mid-emit.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn crossed_threshold(stats: &ExecStats, step: NonZeroU32) -> Option<ProgressEvent> {
    let percent = if stats.total == 0 {
        100
    } else {
        (stats.processed * 100 / stats.total) as u32
    };

    if percent % step.get() != 0 || percent as i32 == stats.last_logged_percent {
        return None;
    }

    Some(ProgressEvent {
        percent,
        processed: stats.processed,
        total: stats.total,
    })
}
