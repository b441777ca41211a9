//! Convenient re-exports for downstream crates.

pub use crate::config::{LeafSort, SortConfig};
pub use crate::contract::violated;
pub use crate::error::{ConfigError, Result, SortError, TaskFailure};
pub use crate::span::Span;
