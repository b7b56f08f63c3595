use std::sync::Arc;

use super::traits::{RunEvent, RunObserver};

/// Fan-out of run events to every registered observer.
#[derive(Clone, Default)]
pub(crate) struct ObserverSet {
    observers: Vec<Arc<dyn RunObserver>>,
}

impl ObserverSet {
    pub(crate) fn push(&mut self, observer: Arc<dyn RunObserver>) {
        self.observers.push(observer);
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn emit(&self, event: &RunEvent) {
        for observer in &self.observers {
            observer.observe(event);
        }
    }
}

/// Reports run events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn name(&self) -> &str {
        "tracing"
    }

    fn observe(&self, event: &RunEvent) {
        match event {
            RunEvent::RunStart {
                run_id,
                total,
                batches,
            } => {
                tracing::info!(
                    run_id = %run_id,
                    "[BatchRunner] Starting run: {} rows in {} batches",
                    total,
                    batches
                );
            }
            RunEvent::BatchStart {
                run_id,
                batch_index,
                rows,
            } => {
                tracing::debug!(
                    run_id = %run_id,
                    batch = batch_index,
                    rows = rows,
                    "[BatchRunner] batch started"
                );
            }
            RunEvent::BatchEnd {
                run_id,
                batch_index,
            } => {
                tracing::debug!(run_id = %run_id, batch = batch_index, "[BatchRunner] batch done");
            }
            RunEvent::Progress { event, .. } => {
                tracing::info!(
                    "[BatchRunner] Progress: {}% ({}/{})",
                    event.percent,
                    event.processed,
                    event.total
                );
            }
            RunEvent::RowFailed {
                run_id,
                row_index,
                error,
            } => {
                tracing::error!(
                    run_id = %run_id,
                    row = row_index,
                    "[BatchRunner] Failed to process row (index={}): {}",
                    row_index,
                    error
                );
            }
            RunEvent::RunEnd {
                run_id,
                stats,
                duration_ms,
            } => {
                tracing::info!(
                    run_id = %run_id,
                    "[BatchRunner] Run finished: {}/{} rows, {} errors ({}ms)",
                    stats.processed,
                    stats.total,
                    stats.errors,
                    duration_ms
                );
            }
            RunEvent::Cancelled { run_id, stats } => {
                tracing::warn!(
                    run_id = %run_id,
                    "[BatchRunner] Run cancelled after {}/{} rows",
                    stats.processed,
                    stats.total
                );
            }
        }
    }
}
