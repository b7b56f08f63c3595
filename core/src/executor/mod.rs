//! Bounded-concurrency batch executor for tabular datasets.
//!
//! # Architecture
//!
//! ```text
//! Dataset
//!   ↓
//! BatchRunner::run() → validate config + dataset
//!   ↓
//! Dataset::batches() → Batch 0, Batch 1, ... (sequential)
//!   ↓
//! execute_batch() → one future per row, FuturesUnordered
//!   ↓                 each: gate.acquire() → handler.handle(row) → release
//! StatsAggregator::record_completion() → progress threshold → RunObserver
//!   ↓
//! ExecStats
//! ```
//!
//! The gate is a single semaphore created per run, so the concurrency
//! ceiling holds across batch boundaries as well as within a batch.

mod output;
mod progress;
mod runner;
mod scheduler;
mod stats;
pub mod traits;
pub mod types;

pub use output::TracingObserver;
pub use progress::ProgressBarObserver;
pub use runner::{process_dataset, validate_config, BatchRunner};
pub use stats::StatsAggregator;
pub use traits::{handler_fn, FnHandler, RowHandler, RunEvent, RunObserver};
pub use types::{BatchConfig, ExecStats, ProgressEvent};
