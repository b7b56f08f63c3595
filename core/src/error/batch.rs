use thiserror::Error;

use crate::executor::types::ExecStats;

/// Errors returned by [`crate::executor::BatchRunner`].
///
/// Row failures are intentionally absent: they are counted into
/// [`ExecStats::errors`] and never surface here.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("run cancelled after {}/{} rows", stats.processed, stats.total)]
    Cancelled { stats: ExecStats },

    #[error("concurrency gate closed unexpectedly")]
    GateClosed,
}

impl BatchError {
    /// Partial stats of a cancelled run, if any.
    pub fn partial_stats(&self) -> Option<&ExecStats> {
        match self {
            Self::Cancelled { stats } => Some(stats),
            _ => None,
        }
    }
}

/// Invalid batch configuration, rejected before any row is dispatched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("batch_size must be greater than 0")]
    ZeroBatchSize,

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("progress_step_percent must be a positive integer")]
    ZeroProgressStep,
}

/// Invalid input dataset, rejected before any row is dispatched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("dataset is empty")]
    EmptyDataset,

    #[error("dataset is missing")]
    MissingDataset,
}
