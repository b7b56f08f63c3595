//! rowflow-plugins: source extraction, dataset transforms, row sinks and
//! run-event observers built on rowflow-core.

pub mod extract;
pub mod factory;
pub mod handlers;
pub mod observers;
pub mod transform;
