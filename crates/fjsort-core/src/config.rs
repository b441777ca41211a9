//! Sort configuration that callers can construct, deserialize, or read from env.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Sequential algorithm used inside each leaf task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafSort {
    /// `slice::sort_by`. Together with the stable merge this keeps equal
    /// elements in input order.
    #[default]
    Stable,
    /// `slice::sort_unstable_by`. Faster, no ordering promise among equals.
    Unstable,
}

impl std::str::FromStr for LeafSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stable" => Ok(LeafSort::Stable),
            "unstable" => Ok(LeafSort::Unstable),
            other => Err(format!("expected `stable` or `unstable`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Number of leaf partitions. `None` means the host's available parallelism.
    pub partitions: Option<usize>,

    /// Leaf sort algorithm.
    pub leaf_sort: LeafSort,

    /// Worker threads for executors built from this config (`WorkerPool`).
    /// `None` means the host's available parallelism.
    pub workers: Option<usize>,
}

impl SortConfig {
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = Some(partitions);
        self
    }

    pub fn with_leaf_sort(mut self, leaf_sort: LeafSort) -> Self {
        self.leaf_sort = leaf_sort;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Partition count to use, falling back to the host's parallelism. Never 0.
    pub fn resolved_partitions(&self) -> usize {
        self.partitions.unwrap_or_else(available_parallelism).max(1)
    }

    /// Worker count to use, falling back to the host's parallelism. Never 0.
    pub fn resolved_workers(&self) -> usize {
        self.workers.unwrap_or_else(available_parallelism).max(1)
    }

    /// Reject explicit zero counts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.partitions == Some(0) {
            return Err(ConfigError::ZeroPartitions);
        }
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }

    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `FJSORT_PARTITIONS`: leaf partition count
    /// - `FJSORT_LEAF_SORT`: `stable` or `unstable`
    /// - `FJSORT_WORKERS`: worker pool size
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`SortConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(s) = lookup("FJSORT_PARTITIONS") {
            cfg.partitions = Some(parse_count("FJSORT_PARTITIONS", &s)?);
        }

        if let Some(s) = lookup("FJSORT_LEAF_SORT") {
            cfg.leaf_sort = s.parse().map_err(|reason| ConfigError::InvalidEnv {
                var: "FJSORT_LEAF_SORT",
                value: s.clone(),
                reason,
            })?;
        }

        if let Some(s) = lookup("FJSORT_WORKERS") {
            cfg.workers = Some(parse_count("FJSORT_WORKERS", &s)?);
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_count(var: &'static str, s: &str) -> Result<usize, ConfigError> {
    s.trim()
        .parse::<usize>()
        .map_err(|e| ConfigError::InvalidEnv {
            var,
            value: s.to_string(),
            reason: e.to_string(),
        })
}

/// Host parallelism, or 1 when it cannot be queried.
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
