pub mod funds;

pub use funds::{parse_funds, TransformError};
