use rowflow_core::{BatchError, DatasetError};
use rowflow_plugins::extract::ExtractError;
use rowflow_plugins::transform::TransformError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    Batch(#[from] BatchError),
    #[error("invalid dataset: {0}")]
    Dataset(#[from] DatasetError),
    #[error("fetch failed: {0}")]
    Extract(#[from] ExtractError),
    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    // 0: success (row failures included)
    // 11: config error
    // 12: validation error (empty/missing/malformed dataset)
    // 20: IO / network error
    // 130: cancelled (ctrl-c)
    // 50: internal/uncategorized
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 11,
            Self::Batch(be) => match be {
                BatchError::Config(_) => 11,
                BatchError::Validation(_) => 12,
                BatchError::Cancelled { .. } => 130,
                BatchError::GateClosed => 50,
            },
            Self::Dataset(DatasetError::Io(_)) => 20,
            Self::Dataset(_) => 12,
            Self::Extract(_) => 20,
            Self::Transform(_) => 12,
            Self::Io(_) => 20,
            Self::Anyhow(_) => 50,
        }
    }
}
