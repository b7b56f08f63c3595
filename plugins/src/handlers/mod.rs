//! Row sinks: what happens to each row once the runner dispatches it.

pub mod http;
pub mod jsonl;
pub mod log;

pub use http::HttpPostHandler;
pub use jsonl::JsonlRowWriter;
pub use log::LogRowHandler;
