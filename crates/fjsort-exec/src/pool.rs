//! Fixed-size worker pool over a crossbeam channel.
//!
//! Workers drain one shared unbounded queue. Dropping the pool closes the
//! queue, lets the workers finish whatever is already queued, and joins them.

use std::panic::{self, AssertUnwindSafe};
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Sender};
use thiserror::Error;

use fjsort_core::{SortConfig, TaskFailure};

use crate::executor::{Executor, Job};
use crate::metrics;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("worker pool needs at least one worker")]
    NoWorkers,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),
}

pub struct WorkerPool {
    queue: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self, ExecError> {
        if workers == 0 {
            return Err(ExecError::NoWorkers);
        }

        let (tx, rx) = unbounded::<Job>();
        let mut handles = Vec::with_capacity(workers);
        for i in 0..workers {
            let rx = rx.clone();
            let name = format!("fjsort-worker-{i}");
            let handle = std::thread::Builder::new()
                .name(name.clone())
                .spawn(move || {
                    for job in rx.iter() {
                        // Tasks catch their own panics; this only trips on a
                        // panic from a continuation run by the task's write.
                        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                            if let TaskFailure::Panicked(msg) = TaskFailure::from_panic(payload.as_ref()) {
                                metrics::job_panicked(&name, &msg);
                            }
                        }
                    }
                })
                .map_err(|e| ExecError::Spawn(e.to_string()))?;
            handles.push(handle);
        }

        metrics::pool_started(workers);
        Ok(Self {
            queue: Some(tx),
            workers: handles,
        })
    }

    /// Pool sized by `cfg.workers` (default: host parallelism).
    pub fn from_config(cfg: &SortConfig) -> Result<Self, ExecError> {
        Self::new(cfg.resolved_workers())
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }
}

impl Executor for WorkerPool {
    fn execute(&self, job: Job) {
        if let Some(queue) = &self.queue {
            // Fails only if every worker is gone; the returned job is dropped,
            // which abandons its task.
            let _ = queue.send(job);
        }
    }

    fn parallelism(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.queue.take());
        let n = self.workers.len();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        metrics::pool_stopped(n);
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::submit;
    use fjsort_core::SortError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn rejects_zero_workers() {
        assert!(matches!(WorkerPool::new(0), Err(ExecError::NoWorkers)));
    }

    #[test]
    fn runs_all_jobs_before_shutdown() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::new(3).unwrap();
            assert_eq!(pool.parallelism(), 3);
            for _ in 0..100 {
                let c = Arc::clone(&counter);
                pool.execute(Box::new(move || {
                    c.fetch_add(1, Ordering::SeqCst);
                }));
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn submitted_tasks_resolve() {
        let pool = WorkerPool::new(2).unwrap();
        let futures: Vec<_> = (0..10u64)
            .map(|i| submit(&pool, move || Ok::<_, SortError>(i * i)))
            .collect();
        let squares: Vec<u64> = futures.iter().map(|f| f.get().unwrap()).collect();
        assert_eq!(squares, (0..10u64).map(|i| i * i).collect::<Vec<_>>());
    }

    #[test]
    fn survives_a_panicking_job() {
        let pool = WorkerPool::new(1).unwrap();
        pool.execute(Box::new(|| panic!("raw job panic")));
        let fut = submit(&pool, || Ok::<_, SortError>(5));
        assert_eq!(fut.get(), Ok(5));
    }
}
