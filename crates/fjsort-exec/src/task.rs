//! Task submission: the bridge from "a closure" to "a future of its result".

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use fjsort_core::TaskFailure;
use fjsort_future::Promise;

use crate::executor::Executor;
use crate::metrics;

/// Hand `task` to `executor` and return the future of its result.
///
/// A panic inside `task` resolves the future to `TaskFailure::Panicked`; a job
/// the executor drops without running resolves it to `TaskFailure::Abandoned`.
/// Either way the future always becomes ready.
pub fn submit<X, T, E, F>(executor: &X, task: F) -> Arc<Promise<T, E>>
where
    X: Executor + ?Sized,
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: From<TaskFailure> + Send + 'static,
{
    let promise = Arc::new(Promise::new());
    let completion = Completion {
        promise: Some(Arc::clone(&promise)),
    };
    executor.execute(Box::new(move || completion.run(task)));
    promise
}

// Producer half owned by the job. Resolves the promise exactly once: from
// `run`, or from `Drop` if the job never ran.
struct Completion<T, E: From<TaskFailure>> {
    promise: Option<Arc<Promise<T, E>>>,
}

impl<T, E: From<TaskFailure>> Completion<T, E> {
    fn run<F>(mut self, task: F)
    where
        F: FnOnce() -> Result<T, E>,
    {
        let result = match panic::catch_unwind(AssertUnwindSafe(task)) {
            Ok(result) => result,
            Err(payload) => Err(E::from(TaskFailure::from_panic(payload.as_ref()))),
        };
        if let Some(promise) = self.promise.take() {
            promise.complete(result);
        }
    }
}

impl<T, E: From<TaskFailure>> Drop for Completion<T, E> {
    fn drop(&mut self) {
        if let Some(promise) = self.promise.take() {
            metrics::task_abandoned();
            promise.set_error(E::from(TaskFailure::Abandoned));
        }
    }
}
