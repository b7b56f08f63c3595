use thiserror::Error;

use super::batch::ValidationError;

/// Errors raised while building a [`crate::dataset::Dataset`] from JSON input.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("expected a JSON array of records, got {0}")]
    NotAnArray(&'static str),

    #[error("record {index} is not a JSON object (got {kind})")]
    InvalidRecord { index: usize, kind: &'static str },

    #[error("invalid JSON on line {line}: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
