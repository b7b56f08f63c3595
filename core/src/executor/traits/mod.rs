pub mod handler;
pub mod observer;

pub use handler::*;
pub use observer::*;
