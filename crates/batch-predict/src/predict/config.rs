//! Batch driver configuration with builder pattern.
//!
//! [`BatchPredictConfig`] controls partition granularity and threading. It uses
//! the `bon` crate for builder generation.
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroUsize;
//! use batch_predict::BatchPredictConfig;
//!
//! // All defaults: 64-row partitions on the ambient rayon pool
//! let config = BatchPredictConfig::builder().build();
//! assert_eq!(config.partition_size, 64);
//!
//! // Auto-sized partitions on a dedicated 4-thread pool
//! let config = BatchPredictConfig::builder()
//!     .partition_size(0)
//!     .n_threads(NonZeroUsize::new(4).unwrap())
//!     .build();
//! ```

use std::num::NonZeroUsize;

use bon::Builder;

use crate::utils::{Parallelism, RowPartitions};

/// Default rows per partition.
pub const DEFAULT_PARTITION_SIZE: usize = 64;

/// Configuration for the batch driver.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(derive(Clone, Debug))]
pub struct BatchPredictConfig {
    /// Target rows per partition. Default: 64.
    ///
    /// Only affects parallel granularity, never results. `0` picks one
    /// partition per worker thread.
    #[builder(default = DEFAULT_PARTITION_SIZE)]
    pub partition_size: usize,

    /// Number of threads.
    ///
    /// - `None`: run on the ambient rayon pool
    /// - `Some(1)`: run sequentially on the calling thread
    /// - `Some(n)`: build a dedicated pool of `n` threads for each call
    pub n_threads: Option<NonZeroUsize>,
}

impl Default for BatchPredictConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BatchPredictConfig {
    /// Config with the given partition size on the ambient pool.
    pub fn with_partition_size(partition_size: usize) -> Self {
        Self {
            partition_size,
            ..Self::default()
        }
    }

    /// Row partitions for `n_rows` rows under `parallelism`.
    pub(crate) fn partitions(&self, n_rows: usize, parallelism: Parallelism) -> RowPartitions {
        match self.partition_size {
            0 => RowPartitions::balanced(n_rows, parallelism.n_workers()),
            size => RowPartitions::new(n_rows, size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = BatchPredictConfig::default();
        assert_eq!(config.partition_size, DEFAULT_PARTITION_SIZE);
        assert_eq!(config.n_threads, None);
        assert_eq!(config, BatchPredictConfig::builder().build());
    }

    #[test]
    fn explicit_partition_size() {
        let config = BatchPredictConfig::with_partition_size(10);
        let parts = config.partitions(25, Parallelism::Parallel);
        assert_eq!(parts.size(), 10);
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn auto_partition_size_sequential() {
        let config = BatchPredictConfig::builder().partition_size(0).build();
        let parts = config.partitions(25, Parallelism::Sequential);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts.size(), 25);
    }

    #[test]
    fn builder_sets_threads() {
        let config = BatchPredictConfig::builder()
            .n_threads(NonZeroUsize::new(3).unwrap())
            .build();
        assert_eq!(config.n_threads.map(NonZeroUsize::get), Some(3));
    }
}
