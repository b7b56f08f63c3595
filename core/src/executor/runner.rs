use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::dataset::Dataset;
use crate::error::{BatchError, ValidationError};

use super::output::{ObserverSet, TracingObserver};
use super::scheduler::{execute_batch, DispatchContext};
use super::stats::StatsAggregator;
use super::traits::{RowHandler, RunEvent, RunObserver};
use super::types::config::RunLimits;
use super::types::{BatchConfig, ExecStats};

/// Applies a [`RowHandler`] to every row of a [`Dataset`] in sequential
/// batches, with at most `concurrency` handler calls in flight.
#[derive(Clone)]
pub struct BatchRunner {
    config: BatchConfig,
    observers: ObserverSet,
}

impl BatchRunner {
    /// Runner without observers; see [`BatchRunner::with_observer`].
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            observers: ObserverSet::default(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn with_tracing(self) -> Self {
        self.with_observer(Arc::new(TracingObserver))
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Process every row and return the final stats.
    ///
    /// Fails only on invalid configuration or an empty dataset, both before
    /// any row is dispatched. Handler errors are counted, not returned.
    pub async fn run<H>(&self, dataset: &Dataset, handler: &H) -> Result<ExecStats, BatchError>
    where
        H: RowHandler + ?Sized,
    {
        self.run_until(dataset, handler, std::future::pending()).await
    }

    /// Like [`BatchRunner::run`], but stops as soon as `shutdown` resolves.
    ///
    /// On shutdown, in-flight handler futures are dropped, no further batch
    /// is dispatched, and [`BatchError::Cancelled`] carries the partial stats.
    pub async fn run_until<H, S>(
        &self,
        dataset: &Dataset,
        handler: &H,
        shutdown: S,
    ) -> Result<ExecStats, BatchError>
    where
        H: RowHandler + ?Sized,
        S: Future<Output = ()>,
    {
        let limits = self.prepare(dataset)?;

        let run_id = Uuid::new_v4().to_string();
        let total = dataset.len();
        let stats = StatsAggregator::new(total, limits.progress_step);
        let gate = Semaphore::new(limits.concurrency.get());
        let start = Instant::now();

        self.observers.emit(&RunEvent::RunStart {
            run_id: run_id.clone(),
            total,
            batches: dataset.batch_count(limits.batch_size),
        });

        let ctx = DispatchContext {
            run_id: &run_id,
            gate: &gate,
            stats: &stats,
            observers: &self.observers,
            log_errors: self.config.log_errors,
        };

        let work = self.execute_batches(dataset, handler, &ctx, limits);
        tokio::pin!(work);
        tokio::pin!(shutdown);

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                let partial = stats.snapshot();
                self.observers.emit(&RunEvent::Cancelled {
                    run_id: run_id.clone(),
                    stats: partial,
                });
                return Err(BatchError::Cancelled { stats: partial });
            }
            res = &mut work => res?,
        }

        let final_stats = stats.snapshot();
        debug_assert!(final_stats.is_complete());

        self.observers.emit(&RunEvent::RunEnd {
            run_id: run_id.clone(),
            stats: final_stats,
            duration_ms: start.elapsed().as_millis() as u64,
        });

        Ok(final_stats)
    }

    fn prepare(&self, dataset: &Dataset) -> Result<RunLimits, BatchError> {
        let limits = self.config.limits()?;
        if dataset.is_empty() {
            return Err(ValidationError::EmptyDataset.into());
        }
        Ok(limits)
    }

    /// Batches run strictly one after another; rows inside a batch run
    /// concurrently under the run-wide gate.
    async fn execute_batches<H>(
        &self,
        dataset: &Dataset,
        handler: &H,
        ctx: &DispatchContext<'_>,
        limits: RunLimits,
    ) -> Result<(), BatchError>
    where
        H: RowHandler + ?Sized,
    {
        for batch in dataset.batches(limits.batch_size) {
            self.observers.emit(&RunEvent::BatchStart {
                run_id: ctx.run_id.to_string(),
                batch_index: batch.index(),
                rows: batch.len(),
            });

            execute_batch(batch.rows(), handler, ctx).await?;

            self.observers.emit(&RunEvent::BatchEnd {
                run_id: ctx.run_id.to_string(),
                batch_index: batch.index(),
            });
        }
        Ok(())
    }
}

/// One-shot form of [`BatchRunner::run`] that reports through `tracing`.
pub async fn process_dataset<H>(
    dataset: &Dataset,
    handler: &H,
    config: BatchConfig,
) -> Result<ExecStats, BatchError>
where
    H: RowHandler + ?Sized,
{
    BatchRunner::new(config)
        .with_tracing()
        .run(dataset, handler)
        .await
}

/// Run-wide validation that needs no dataset, for callers that want to fail
/// fast before fetching data.
pub fn validate_config(config: &BatchConfig) -> Result<(), BatchError> {
    config.validate().map_err(BatchError::from)
}
