#![forbid(unsafe_code)]
//! fjsort-exec: where submitted work actually runs.
//!
//! The sort engine only ever calls [`submit`]; it never creates or joins
//! threads. Anything implementing [`Executor`] can host it:
//! - [`InlineExecutor`]: runs on the submitting thread (deterministic tests).
//! - [`ThreadPerTask`]: a fresh named OS thread per task.
//! - [`WorkerPool`]: fixed worker threads draining a shared queue.
//! - `rayon::ThreadPool` (feature `rayon`) and `tokio::runtime::Handle`
//!   (feature `async-executor`).

pub mod executor;
pub mod inline;
pub mod metrics;
pub mod pool;
pub mod task;
pub mod thread;

#[cfg(feature = "rayon")]
pub mod rayon_pool;

#[cfg(feature = "async-executor")]
pub mod tokio_handle;

pub use executor::{Executor, Job};
pub use inline::InlineExecutor;
pub use pool::{ExecError, WorkerPool};
pub use task::submit;
pub use thread::ThreadPerTask;
