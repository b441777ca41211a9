#![deny(unsafe_code)]
//! fjsort-engine: fork-join sort over the future cell.
//!
//! Pipeline:
//! 1. `partition_range` cuts the slice into contiguous spans.
//! 2. One executor task per span sorts it in place (`leaf`).
//! 3. `reduce_futures` folds the leaf futures pairwise, left to right, into a
//!    single future; each pair is a continuation that merges two adjacent
//!    spans in place (`merge`). No thread blocks mid-reduction.
//! 4. The caller blocks once on the root future.
//!
//! The only `unsafe` lives in `job`, which lets `'static` tasks reach the
//! caller's borrowed slice; `drain` is what makes that sound.

mod drain;
mod job;
pub mod leaf;
pub mod merge;
pub mod metrics;
pub mod partition;
pub mod reduce;
pub mod sorter;

pub use merge::merge_in_place;
pub use partition::partition_range;
pub use reduce::reduce_futures;
pub use sorter::ForkJoinSort;
