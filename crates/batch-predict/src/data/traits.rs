//! Core traits for matrix access.

use std::fmt::Debug;

use crate::utils::RowPartitions;

// ============================================================================
// Element
// ============================================================================

/// Scalar type stored in matrices and exchanged with predictors.
///
/// `Element::default()` is the zero value used for freshly allocated outputs.
pub trait Element: Copy + Default + PartialEq + Debug + Send + Sync + 'static {}

impl Element for f32 {}
impl Element for f64 {}

// ============================================================================
// Matrix
// ============================================================================

/// Read access to a 2-D matrix of samples.
///
/// Rows are samples, columns are the per-sample values. Implementors must be
/// safe to read from several threads at once (the driver shares inputs by `&`).
///
/// # Row Views
///
/// [`row_slice()`](Self::row_slice) is an optional fast path. Return `Some` only
/// when the row is stored contiguously; callers must get the same values from
/// [`get()`](Self::get) either way.
pub trait Matrix {
    /// Element type stored in the matrix.
    type Element: Element;

    /// Number of rows (samples).
    fn n_rows(&self) -> usize;

    /// Number of columns.
    fn n_cols(&self) -> usize;

    /// Element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    fn get(&self, row: usize, col: usize) -> Self::Element;

    /// Row `row` as a contiguous slice, if the storage allows it.
    #[inline]
    fn row_slice(&self, _row: usize) -> Option<&[Self::Element]> {
        None
    }

    /// Copy row `row` into `buf`.
    ///
    /// Uses the row view when available, elementwise access otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `buf.len() != n_cols()` or `row >= n_rows()`.
    #[inline]
    fn copy_row(&self, row: usize, buf: &mut [Self::Element]) {
        match self.row_slice(row) {
            Some(slice) => buf.copy_from_slice(slice),
            None => {
                assert_eq!(buf.len(), self.n_cols(), "row buffer length mismatch");
                for (col, value) in buf.iter_mut().enumerate() {
                    *value = self.get(row, col);
                }
            }
        }
    }

    /// `(n_rows, n_cols)`.
    #[inline]
    fn dims(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols())
    }
}

// ============================================================================
// MatrixMut
// ============================================================================

/// Write access to a 2-D matrix, including partitioned access for parallel writers.
pub trait MatrixMut: Matrix {
    /// Mutable view over a contiguous range of rows.
    type RowBlock<'a>: RowBlockMut<Element = Self::Element> + Send
    where
        Self: 'a;

    /// Set the element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    fn set(&mut self, row: usize, col: usize, value: Self::Element);

    /// Split the matrix into one row block per partition.
    ///
    /// Blocks are returned in partition order and never overlap, so each can be
    /// handed to a different thread.
    ///
    /// # Panics
    ///
    /// Panics if `partitions.n_rows() != self.n_rows()`.
    fn partition_rows_mut(&mut self, partitions: &RowPartitions) -> Vec<Self::RowBlock<'_>>;
}

/// Mutable view over rows `first_row()..first_row() + n_rows()` of an output matrix.
///
/// All coordinates are block-local: local row `0` is matrix row `first_row()`.
pub trait RowBlockMut {
    /// Element type.
    type Element: Element;

    /// Index of the first matrix row covered by this block.
    fn first_row(&self) -> usize;

    /// Number of rows in this block.
    fn n_rows(&self) -> usize;

    /// Number of columns.
    fn n_cols(&self) -> usize;

    /// Element at (local_row, col).
    fn get(&self, local_row: usize, col: usize) -> Self::Element;

    /// Set the element at (local_row, col).
    fn set(&mut self, local_row: usize, col: usize, value: Self::Element);

    /// Row `local_row` as a contiguous mutable slice, if the storage allows it.
    #[inline]
    fn row_slice_mut(&mut self, _local_row: usize) -> Option<&mut [Self::Element]> {
        None
    }

    /// Copy row `local_row` into `buf` elementwise.
    #[inline]
    fn read_row(&self, local_row: usize, buf: &mut [Self::Element]) {
        for (col, value) in buf.iter_mut().enumerate() {
            *value = self.get(local_row, col);
        }
    }

    /// Write `values` into row `local_row` elementwise.
    #[inline]
    fn write_row(&mut self, local_row: usize, values: &[Self::Element]) {
        for (col, &value) in values.iter().enumerate() {
            self.set(local_row, col, value);
        }
    }
}

// ============================================================================
// ZerosMatrix
// ============================================================================

/// Owned matrices that can be allocated zero-filled.
pub trait ZerosMatrix: MatrixMut + Sized {
    /// Allocate an `n_rows × n_cols` matrix filled with `Element::default()`.
    fn zeros(n_rows: usize, n_cols: usize) -> Self;
}
