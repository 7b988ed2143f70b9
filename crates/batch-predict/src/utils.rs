//! Common utilities used across the crate.
//!
//! This module provides parallelism configuration, thread pool setup and
//! row partitioning for the batch driver.

use std::ops::Range;

use rayon::prelude::*;

// =============================================================================
// Parallelism Configuration
// =============================================================================

/// Whether parallel execution is allowed.
///
/// When `Parallel`, work is distributed with `rayon` parallel iterators on the
/// current pool. When `Sequential`, everything runs on the calling thread.
/// Both modes must produce identical results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    Parallel,
}

impl Parallelism {
    /// Create from thread count semantics.
    ///
    /// - 0 = auto (parallel if rayon pool has multiple threads, sequential otherwise)
    /// - 1 = sequential
    /// - >1 = parallel
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        if n_threads == 1 || (n_threads == 0 && rayon::current_num_threads() == 1) {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    /// Returns `true` if parallel execution is allowed.
    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }

    /// Number of workers this mode will use on the current pool.
    #[inline]
    pub fn n_workers(self) -> usize {
        match self {
            Parallelism::Sequential => 1,
            Parallelism::Parallel => rayon::current_num_threads(),
        }
    }

    /// Fallible for_each that stops at the first error.
    ///
    /// In parallel mode, items not yet started when an error is observed are
    /// skipped; items already running finish. Which error is returned when
    /// several items fail is unspecified. In sequential mode, the first failing
    /// item in iteration order wins and later items never run.
    #[inline]
    pub fn maybe_par_try_for_each<T, E, I, F>(self, iter: I, f: F) -> Result<(), E>
    where
        T: Send,
        E: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        F: Fn(T) -> Result<(), E> + Sync + Send,
    {
        if self.is_parallel() {
            iter.into_par_iter().try_for_each(f)
        } else {
            iter.into_iter().try_for_each(f)
        }
    }
}

// =============================================================================
// Thread Pool Setup
// =============================================================================

/// Run a closure with the appropriate thread pool.
///
/// Thread count semantics:
/// - `0` = auto (use all available cores)
/// - `1` = sequential (no thread pool)
/// - `n > 1` = use exactly `n` threads
///
/// # Errors
///
/// Returns the rayon error if a dedicated pool cannot be built.
///
/// # Example
///
/// ```
/// use batch_predict::run_with_threads;
///
/// let n = run_with_threads(2, |_| rayon::current_num_threads()).unwrap();
/// assert_eq!(n, 2);
/// ```
#[inline]
pub fn run_with_threads<T: Send>(
    n_threads: usize,
    f: impl FnOnce(Parallelism) -> T + Send,
) -> Result<T, rayon::ThreadPoolBuildError> {
    match Parallelism::from_threads(n_threads) {
        Parallelism::Sequential => Ok(f(Parallelism::Sequential)),
        Parallelism::Parallel => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n_threads)
                .build()?;
            Ok(pool.install(|| f(Parallelism::Parallel)))
        }
    }
}

// =============================================================================
// Row Partitioning
// =============================================================================

/// Split of `0..n_rows` into contiguous, disjoint ranges of `size` rows.
///
/// The last range is shorter when `size` does not divide `n_rows`.
///
/// ```
/// use batch_predict::RowPartitions;
///
/// let parts = RowPartitions::new(7, 3);
/// assert_eq!(parts.iter().collect::<Vec<_>>(), vec![0..3, 3..6, 6..7]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowPartitions {
    n_rows: usize,
    size: usize,
}

impl RowPartitions {
    /// Partitions of `size` rows. A `size` of 0 is treated as 1.
    #[inline]
    pub fn new(n_rows: usize, size: usize) -> Self {
        Self {
            n_rows,
            size: size.max(1),
        }
    }

    /// Spread `n_rows` evenly over `n_workers`, one partition per worker.
    #[inline]
    pub fn balanced(n_rows: usize, n_workers: usize) -> Self {
        Self::new(n_rows, n_rows.div_ceil(n_workers.max(1)))
    }

    /// Total number of rows covered.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Target rows per partition.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of partitions.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_rows.div_ceil(self.size)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Iterate over the row ranges in increasing order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Range<usize>> + '_ {
        (0..self.len()).map(move |i| {
            let start = i * self.size;
            start..start + self.size.min(self.n_rows - start)
        })
    }
}
