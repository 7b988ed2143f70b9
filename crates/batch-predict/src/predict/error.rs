//! Errors reported by the batch driver.

use std::convert::Infallible;
use std::fmt;

/// Which matrix a dimension error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixSide {
    Inputs,
    Outputs,
}

impl fmt::Display for MatrixSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inputs => f.write_str("input"),
            Self::Outputs => f.write_str("output"),
        }
    }
}

/// Errors from [`batch_predict`](super::batch_predict) and friends.
///
/// Shape errors are detected before any predictor is created, so the output
/// matrix is untouched when one is returned. `E` is the predictor's error type
/// and is [`Infallible`] for the non-fallible entry points.
#[derive(Debug, thiserror::Error)]
pub enum BatchPredictError<E = Infallible> {
    /// A matrix has the wrong number of columns.
    #[error("{side} dimension mismatch: expected {expected} columns, got {actual}")]
    DimensionMismatch {
        side: MatrixSide,
        expected: usize,
        actual: usize,
    },

    /// The output matrix has a different number of rows than the input matrix.
    #[error("rows mismatch: inputs have {inputs} rows, outputs have {outputs}")]
    RowCountMismatch { inputs: usize, outputs: usize },

    /// A dedicated thread pool could not be created.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The predictor failed on a row. Remaining partitions were cancelled.
    #[error("predictor failed on row {row}")]
    Predictor {
        row: usize,
        #[source]
        source: E,
    },
}

impl<E> BatchPredictError<E> {
    /// Whether this is a shape error detected before any work started.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. } | Self::RowCountMismatch { .. }
        )
    }

    /// Row index of a predictor failure.
    pub fn failed_row(&self) -> Option<usize> {
        match self {
            Self::Predictor { row, .. } => Some(*row),
            _ => None,
        }
    }
}
