//! The executor capability consumed by the sort engine.

use std::sync::Arc;

/// A unit of work handed to an executor.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Something that runs jobs on its own concurrency resources.
///
/// Contract: every accepted job eventually runs, or is dropped (never leaked).
/// A dropped job resolves its future to `TaskFailure::Abandoned`, so callers
/// blocked on it wake up instead of hanging.
pub trait Executor: Send + Sync {
    fn execute(&self, job: Job);

    /// Advisory degree of parallelism, used as a partitioning hint.
    fn parallelism(&self) -> usize {
        1
    }
}

impl<X: Executor + ?Sized> Executor for &X {
    fn execute(&self, job: Job) {
        (**self).execute(job)
    }

    fn parallelism(&self) -> usize {
        (**self).parallelism()
    }
}

impl<X: Executor + ?Sized> Executor for Arc<X> {
    fn execute(&self, job: Job) {
        (**self).execute(job)
    }

    fn parallelism(&self) -> usize {
        (**self).parallelism()
    }
}

impl<X: Executor + ?Sized> Executor for Box<X> {
    fn execute(&self, job: Job) {
        (**self).execute(job)
    }

    fn parallelism(&self) -> usize {
        (**self).parallelism()
    }
}
