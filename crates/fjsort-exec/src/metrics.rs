//! Tracing hooks for executors (feature: `tracing`).
//!
//! Without the feature every hook is an empty function.

#[cfg(feature = "tracing")]
pub fn pool_started(workers: usize) {
    tracing::debug!(workers, "worker pool started");
}

#[cfg(not(feature = "tracing"))]
pub fn pool_started(_workers: usize) {}

#[cfg(feature = "tracing")]
pub fn pool_stopped(workers: usize) {
    tracing::debug!(workers, "worker pool stopped");
}

#[cfg(not(feature = "tracing"))]
pub fn pool_stopped(_workers: usize) {}

#[cfg(feature = "tracing")]
pub fn job_panicked(worker: &str, message: &str) {
    tracing::warn!(worker, message, "job panicked outside its task");
}

#[cfg(not(feature = "tracing"))]
pub fn job_panicked(_worker: &str, _message: &str) {}

#[cfg(feature = "tracing")]
pub fn task_abandoned() {
    tracing::warn!("task dropped before it ran");
}

#[cfg(not(feature = "tracing"))]
pub fn task_abandoned() {}

#[cfg(feature = "tracing")]
pub fn spawn_failed(error: &std::io::Error) {
    tracing::warn!(%error, "could not spawn task thread");
}

#[cfg(not(feature = "tracing"))]
pub fn spawn_failed(_error: &std::io::Error) {}
