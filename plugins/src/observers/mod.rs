pub mod jsonl;

pub use jsonl::JsonlEventObserver;
