#![forbid(unsafe_code)]
//! fjsort-future: a single-assignment result slot shared by one producer and
//! one consumer.
//!
//! The consumer either blocks (`wait`, `wait_for`, `get`) or registers exactly
//! one continuation (`set_continuation`, `on_ready`). A continuation registered
//! after the result exists runs inline on the registering thread; one
//! registered before runs on the producer's thread as the last step of
//! `set_value`/`set_error`. Errors skip user code and flow down the chain.

pub mod promise;

pub use promise::{Promise, WaitStatus};
