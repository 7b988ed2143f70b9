//! batch-predict: row-parallel batch prediction over dense matrices.
//!
//! Applies a per-sample [`Predictor`] to every row of an input matrix and writes
//! the results into the matching rows of an output matrix. Rows are split into
//! contiguous partitions; each partition gets its own predictor instance from a
//! [`PredictorFactory`], so predictors can keep mutable scratch state without
//! any synchronization.
//!
//! # Key Types
//!
//! - [`batch_predict`] / [`batch_predict_into`] - The driver entry points
//! - [`BatchPredictor`] / [`BatchPredictConfig`] - Reusable driver with configuration
//! - [`Predictor`] / [`PredictorFactory`] - The capabilities the driver consumes
//! - [`DenseMatrix`] - Dense storage with [`RowMajor`] or [`ColMajor`] layout
//!
//! # Matrix Capabilities
//!
//! Any type implementing [`Matrix`] can be an input and any [`MatrixMut`] an output.
//! Types that expose contiguous rows are read and written in place; everything else
//! goes through an elementwise copy. Both paths produce identical results.
//!
//! # Example
//!
//! ```
//! use batch_predict::{batch_predict, RowMatrix};
//!
//! let inputs = RowMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
//! let factory = || |input: &[f64], output: &mut [f64]| output[0] = input[0] + input[1];
//!
//! let outputs: RowMatrix = batch_predict(&factory, &inputs, None, 2, 1, 64).unwrap();
//! assert_eq!(outputs.as_slice(), &[3.0, 7.0]);
//! ```

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod data;
pub mod predict;
pub mod testing;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use data::{
    ColMajor, ColMatrix, DenseMatrix, Element, Layout, Matrix, MatrixMut, RowBlockMut, RowMajor,
    RowMatrix, ZerosMatrix,
};

pub use predict::{
    batch_predict, batch_predict_into, try_batch_predict, try_batch_predict_into,
    BatchPredictConfig, BatchPredictError, BatchPredictor, CloneFactory, FalliblePredictor,
    FalliblePredictorFactory, MatrixSide, Predictor, PredictorFactory, DEFAULT_PARTITION_SIZE,
};

pub use utils::{run_with_threads, Parallelism, RowPartitions};
