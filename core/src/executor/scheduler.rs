use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::Semaphore;

use crate::dataset::Row;
use crate::error::BatchError;

use super::output::ObserverSet;
use super::stats::StatsAggregator;
use super::traits::{RowHandler, RunEvent};

/// Per-run state shared by every row future.
pub(crate) struct DispatchContext<'a> {
    pub run_id: &'a str,
    pub gate: &'a Semaphore,
    pub stats: &'a StatsAggregator,
    pub observers: &'a ObserverSet,
    pub log_errors: bool,
}

/// Execute one batch of rows concurrently, bounded by the shared gate.
///
/// Futures are created in row order, so rows reach the gate in dataset
/// order. Returns once every row of the batch has completed.
pub(crate) async fn execute_batch<H>(
    rows: &[Row],
    handler: &H,
    ctx: &DispatchContext<'_>,
) -> Result<(), BatchError>
where
    H: RowHandler + ?Sized,
{
    let mut futs: FuturesUnordered<_> = rows
        .iter()
        .map(|row| process_row(row, handler, ctx))
        .collect();

    while let Some(res) = futs.next().await {
        res?;
    }

    Ok(())
}

async fn process_row<H>(row: &Row, handler: &H, ctx: &DispatchContext<'_>) -> Result<(), BatchError>
where
    H: RowHandler + ?Sized,
{
    let outcome = {
        let _permit = ctx
            .gate
            .acquire()
            .await
            .map_err(|_| BatchError::GateClosed)?;
        handler.handle(row).await
    };

    let success = match outcome {
        Ok(()) => true,
        Err(err) => {
            if ctx.log_errors {
                ctx.observers.emit(&RunEvent::RowFailed {
                    run_id: ctx.run_id.to_string(),
                    row_index: row.index(),
                    error: format!("{err:#}"),
                });
            }
            false
        }
    };

    ctx.stats.record_completion(success, |event| {
        ctx.observers.emit(&RunEvent::Progress {
            run_id: ctx.run_id.to_string(),
            event,
        });
    });

    Ok(())
}
