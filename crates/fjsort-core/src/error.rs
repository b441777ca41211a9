use thiserror::Error;

/// Canonical result for sort operations.
pub type Result<T> = std::result::Result<T, SortError>;

/// Errors a sort (or any future in its reduction tree) can resolve to.
///
/// `Clone` because a ready future hands out its error on every `get`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    #[error("comparator failed: {0}")]
    Comparator(String),

    #[error("task panicked: {0}")]
    Panicked(String),

    #[error("task was dropped by the executor before it ran")]
    Abandoned,
}

/// Why a submitted task produced no result of its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskFailure {
    #[error("task panicked: {0}")]
    Panicked(String),

    #[error("task was dropped by the executor before it ran")]
    Abandoned,
}

impl TaskFailure {
    /// Build a `Panicked` failure from a `catch_unwind` payload.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        TaskFailure::Panicked(msg)
    }
}

impl From<TaskFailure> for SortError {
    fn from(f: TaskFailure) -> Self {
        match f {
            TaskFailure::Panicked(msg) => SortError::Panicked(msg),
            TaskFailure::Abandoned => SortError::Abandoned,
        }
    }
}

/// Invalid configuration input (environment or deserialized).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("partition count must be at least 1")]
    ZeroPartitions,

    #[error("worker count must be at least 1")]
    ZeroWorkers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_become_messages() {
        let p: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(
            TaskFailure::from_panic(p.as_ref()),
            TaskFailure::Panicked("boom".into())
        );

        let p: Box<dyn std::any::Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(
            SortError::from(TaskFailure::from_panic(p.as_ref())),
            SortError::Panicked("owned boom".into())
        );

        let p: Box<dyn std::any::Any + Send> = Box::new(42_u32);
        assert!(matches!(
            TaskFailure::from_panic(p.as_ref()),
            TaskFailure::Panicked(_)
        ));
    }

    #[test]
    fn abandoned_maps_through() {
        assert_eq!(SortError::from(TaskFailure::Abandoned), SortError::Abandoned);
    }
}
