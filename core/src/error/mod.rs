pub mod batch;
pub mod dataset;

pub use batch::{BatchError, ConfigError, ValidationError};
pub use dataset::DatasetError;
pub(crate) use dataset::json_kind;
