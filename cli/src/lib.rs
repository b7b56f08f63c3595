//! rowflow-cli library: argument types, command flows and exit-code mapping,
//! exposed for unit tests.

pub mod app;
pub mod commands;
pub mod error;
