pub mod http;

pub use http::{ExtractError, ExtractErrorKind, HttpExtractor};
