//! rowflow-core: dataset model, bounded-concurrency batch runner, run
//! observers and configuration shared by the plugins and the CLI.

pub mod config;
pub mod dataset;
pub mod error;
pub mod executor;

pub use dataset::{Batch, Dataset, Row};
pub use error::{BatchError, ConfigError, DatasetError, ValidationError};
pub use executor::{
    handler_fn, process_dataset, validate_config, BatchConfig, BatchRunner, ExecStats,
    ProgressEvent, RowHandler, RunEvent, RunObserver,
};
