//! rayon-backed executors (feature: `rayon`).

use crate::executor::{Executor, Job};

impl Executor for rayon::ThreadPool {
    fn execute(&self, job: Job) {
        self.spawn(job);
    }

    fn parallelism(&self) -> usize {
        self.current_num_threads()
    }
}

/// rayon's global pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct RayonGlobal;

impl Executor for RayonGlobal {
    fn execute(&self, job: Job) {
        rayon::spawn(job);
    }

    fn parallelism(&self) -> usize {
        rayon::current_num_threads()
    }
}
