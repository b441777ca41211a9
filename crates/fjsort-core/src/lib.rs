#![forbid(unsafe_code)]
//! fjsort-core: vocabulary shared by the future cell, executors, and sort engine.
//!
//! - `Span`: positional (begin, end) bounds into a caller-owned slice.
//! - `SortError` / `TaskFailure`: the error taxonomy surfaced through futures.
//! - `SortConfig`: partition count and leaf-sort choice, injectable or from env.
//!
//! No threads, no I/O here.

pub mod config;
pub mod contract;
pub mod error;
pub mod prelude;
pub mod span;

pub use config::{LeafSort, SortConfig};
pub use error::{ConfigError, Result, SortError, TaskFailure};
pub use span::Span;
