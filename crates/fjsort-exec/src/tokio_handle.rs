//! tokio-backed executor (feature: `async-executor`).
//!
//! Sorting is CPU-bound and blocking, so jobs go to tokio's blocking pool,
//! never onto the async worker threads.

use crate::executor::{Executor, Job};

impl Executor for tokio::runtime::Handle {
    fn execute(&self, job: Job) {
        // Detached: completion is observed through the task's future.
        drop(self.spawn_blocking(job));
    }

    fn parallelism(&self) -> usize {
        fjsort_core::config::available_parallelism()
    }
}
