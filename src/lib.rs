#![forbid(unsafe_code)]
//! fjsort: parallel in-place sorting over a single-assignment future cell.
//!
//! The free functions here sort on a lazily started process-wide
//! [`WorkerPool`] configured from the environment (`FJSORT_PARTITIONS`,
//! `FJSORT_LEAF_SORT`, `FJSORT_WORKERS`). For control over where tasks run,
//! build a [`ForkJoinSort`] over any [`Executor`].
//!
//! ```
//! let mut v = vec![5, 3, 9, 1, 7];
//! fjsort::sort(&mut v).unwrap();
//! assert_eq!(v, [1, 3, 5, 7, 9]);
//! ```

use std::cmp::Ordering;
use std::fmt::Display;

use once_cell::sync::Lazy;

pub use fjsort_core::{ConfigError, LeafSort, Result, SortConfig, SortError, Span, TaskFailure};
pub use fjsort_engine::{merge_in_place, partition_range, reduce_futures, ForkJoinSort};
pub use fjsort_exec::{submit, ExecError, Executor, InlineExecutor, Job, ThreadPerTask, WorkerPool};
pub use fjsort_future::{Promise, WaitStatus};

#[cfg(feature = "rayon")]
pub use fjsort_exec::rayon_pool::RayonGlobal;

/// Where the process-wide sorter runs its tasks.
#[derive(Debug)]
pub enum SharedExecutor {
    Pool(WorkerPool),
    /// The pool could not start; tasks run on the calling thread.
    Inline(InlineExecutor),
}

impl Executor for SharedExecutor {
    fn execute(&self, job: Job) {
        match self {
            SharedExecutor::Pool(pool) => pool.execute(job),
            SharedExecutor::Inline(inline) => inline.execute(job),
        }
    }

    fn parallelism(&self) -> usize {
        match self {
            SharedExecutor::Pool(pool) => pool.parallelism(),
            SharedExecutor::Inline(inline) => inline.parallelism(),
        }
    }
}

static GLOBAL: Lazy<ForkJoinSort<SharedExecutor>> = Lazy::new(|| {
    let config = match SortConfig::from_env() {
        Ok(config) => config,
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "ignoring invalid fjsort environment");
            SortConfig::default()
        }
    };
    let executor = match WorkerPool::from_config(&config) {
        Ok(pool) => SharedExecutor::Pool(pool),
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "worker pool unavailable, sorting inline");
            SharedExecutor::Inline(InlineExecutor)
        }
    };
    ForkJoinSort::with_config(executor, config)
});

/// The process-wide sorter behind [`sort`], [`sort_by`] and [`try_sort_by`].
pub fn global() -> &'static ForkJoinSort<SharedExecutor> {
    &GLOBAL
}

pub fn sort<T: Ord + Send>(v: &mut [T]) -> Result<()> {
    global().sort(v)
}

pub fn sort_by<T, F>(v: &mut [T], cmp: F) -> Result<()>
where
    T: Send,
    F: Fn(&T, &T) -> Ordering + Sync,
{
    global().sort_by(v, cmp)
}

pub fn try_sort_by<T, F, E>(v: &mut [T], cmp: F) -> Result<()>
where
    T: Send,
    F: Fn(&T, &T) -> std::result::Result<Ordering, E> + Sync,
    E: Display,
{
    global().try_sort_by(v, cmp)
}
