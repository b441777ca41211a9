//! One OS thread per task, detached.

use std::sync::atomic::{AtomicUsize, Ordering};

use fjsort_core::config::available_parallelism;

use crate::executor::{Executor, Job};
use crate::metrics;

/// Spawns a named thread for every job. If the OS refuses a thread the job is
/// dropped, which resolves its future to `Abandoned`.
#[derive(Debug)]
pub struct ThreadPerTask {
    name: String,
    spawned: AtomicUsize,
}

impl ThreadPerTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spawned: AtomicUsize::new(0),
        }
    }

    /// Threads spawned so far.
    pub fn spawned(&self) -> usize {
        self.spawned.load(Ordering::Relaxed)
    }
}

impl Default for ThreadPerTask {
    fn default() -> Self {
        Self::new("fjsort-task")
    }
}

impl Executor for ThreadPerTask {
    fn execute(&self, job: Job) {
        let n = self.spawned.fetch_add(1, Ordering::Relaxed);
        let spawned = std::thread::Builder::new()
            .name(format!("{}-{}", self.name, n))
            .spawn(job);
        if let Err(e) = spawned {
            metrics::spawn_failed(&e);
        }
    }

    fn parallelism(&self) -> usize {
        available_parallelism()
    }
}
