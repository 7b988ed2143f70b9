//! Dense matrix implementation with configurable layout.
//!
//! Supports both row-major and column-major storage via the [`Layout`] trait.
//! Row-major is the default because it gives the batch driver direct row views.
//!
//! # Layouts
//!
//! Layout is a type parameter, so all layout-dependent code is monomorphized.
//! There is no runtime overhead for layout dispatch.
//!
//! - [`RowMajor`]: Rows are contiguous. `index = row * n_cols + col`
//! - [`ColMajor`]: Columns are contiguous. `index = col * n_rows + row`
//!
//! # Example
//!
//! ```
//! use batch_predict::{ColMatrix, Matrix, RowMatrix};
//!
//! // Row-major: rows are contiguous
//! let rm = RowMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
//! assert_eq!(rm.row_slice(0), Some(&[1.0, 2.0][..]));
//!
//! // Column-major: rows are strided, so no row view
//! let cm = ColMatrix::from_vec(vec![1.0, 3.0, 2.0, 4.0], 2, 2);
//! assert_eq!(cm.row_slice(0), None);
//! assert_eq!(cm.get(0, 1), 2.0);
//! ```

use std::marker::PhantomData;
use std::ops::Range;

use super::traits::{Element, Matrix, MatrixMut, RowBlockMut, ZerosMatrix};
use crate::utils::RowPartitions;

// =============================================================================
// Layout trait and types
// =============================================================================

// Sealed trait pattern to prevent external implementations
mod sealed {
    pub trait Sealed {}
}

/// Matrix memory layout.
///
/// Determines how 2D indices map to linear memory offsets.
/// Sealed to prevent external implementations.
pub trait Layout:
    sealed::Sealed + Copy + Default + std::fmt::Debug + Send + Sync + 'static
{
    /// Convert (row, col) to linear index.
    fn index(row: usize, col: usize, n_rows: usize, n_cols: usize) -> usize;

    /// Linear range holding row `row`, if rows are contiguous in this layout.
    fn row_range(row: usize, n_rows: usize, n_cols: usize) -> Option<Range<usize>>;
}

/// Row-major layout: rows are stored contiguously.
///
/// Memory layout for 2x3 matrix:
/// ```text
/// Logical:     Memory:
/// [a b c]      [a b c d e f]
/// [d e f]       ^row0^ ^row1^
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowMajor;

impl sealed::Sealed for RowMajor {}

impl Layout for RowMajor {
    #[inline]
    fn index(row: usize, col: usize, _n_rows: usize, n_cols: usize) -> usize {
        row * n_cols + col
    }

    #[inline]
    fn row_range(row: usize, _n_rows: usize, n_cols: usize) -> Option<Range<usize>> {
        let start = row * n_cols;
        Some(start..start + n_cols)
    }
}

/// Column-major layout: columns are stored contiguously.
///
/// Memory layout for 2x3 matrix:
/// ```text
/// Logical:     Memory:
/// [a b c]      [a d b e c f]
/// [d e f]       ^c0 ^c1 ^c2
/// ```
///
/// Rows are strided, so the driver reads and writes them elementwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColMajor;

impl sealed::Sealed for ColMajor {}

impl Layout for ColMajor {
    #[inline]
    fn index(row: usize, col: usize, n_rows: usize, _n_cols: usize) -> usize {
        col * n_rows + row
    }

    #[inline]
    fn row_range(_row: usize, _n_rows: usize, _n_cols: usize) -> Option<Range<usize>> {
        None
    }
}

// =============================================================================
// DenseMatrix
// =============================================================================

/// Dense matrix with configurable memory layout.
///
/// # Generic Parameters
///
/// - `T`: Element type (default `f64`)
/// - `L`: Memory layout (default [`RowMajor`])
/// - `S`: Storage type implementing `AsRef<[T]>` (default `Box<[T]>`)
///
/// The storage generic allows zero-copy views over borrowed slices
/// (`&[T]` for inputs, `&mut [T]` for outputs) as well as owned allocations.
#[derive(Debug, Clone)]
pub struct DenseMatrix<T = f64, L: Layout = RowMajor, S: AsRef<[T]> = Box<[T]>> {
    data: S,
    n_rows: usize,
    n_cols: usize,
    _marker: PhantomData<(T, L)>,
}

/// Row-major dense matrix.
pub type RowMatrix<T = f64> = DenseMatrix<T, RowMajor>;

/// Column-major dense matrix.
pub type ColMatrix<T = f64> = DenseMatrix<T, ColMajor>;

// =============================================================================
// Constructors (layout-generic)
// =============================================================================

impl<T, L: Layout> DenseMatrix<T, L, Box<[T]>> {
    /// Create a dense matrix from a Vec, taking ownership.
    ///
    /// Data should be in the layout specified by `L`:
    /// - `RowMajor`: `[row0_col0, row0_col1, ..., row1_col0, ...]`
    /// - `ColMajor`: `[col0_row0, col0_row1, ..., col1_row0, ...]`
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != n_rows * n_cols`.
    pub fn from_vec(data: Vec<T>, n_rows: usize, n_cols: usize) -> Self {
        Self::new(data.into_boxed_slice(), n_rows, n_cols)
    }

    /// Consume the matrix and return its storage in layout order.
    pub fn into_vec(self) -> Vec<T> {
        self.data.into_vec()
    }
}

impl<T: Copy + Default, L: Layout> DenseMatrix<T, L, Box<[T]>> {
    /// Create a dense matrix from a list of rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows have different lengths.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Self {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |row| row.as_ref().len());
        let mut data = vec![T::default(); n_rows * n_cols];

        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            assert_eq!(
                values.len(),
                n_cols,
                "Row {} has {} columns, expected {}",
                row,
                values.len(),
                n_cols
            );
            for (col, &value) in values.iter().enumerate() {
                data[L::index(row, col, n_rows, n_cols)] = value;
            }
        }

        Self::from_vec(data, n_rows, n_cols)
    }
}

impl<T, L: Layout, S: AsRef<[T]>> DenseMatrix<T, L, S> {
    /// Create a dense matrix from storage.
    ///
    /// # Panics
    ///
    /// Panics if `storage.as_ref().len() != n_rows * n_cols`.
    pub fn new(storage: S, n_rows: usize, n_cols: usize) -> Self {
        assert_eq!(
            storage.as_ref().len(),
            n_rows * n_cols,
            "Storage length {} does not match dimensions {}x{}",
            storage.as_ref().len(),
            n_rows,
            n_cols
        );
        Self {
            data: storage,
            n_rows,
            n_cols,
            _marker: PhantomData,
        }
    }

    /// Get the underlying data as a slice.
    ///
    /// The ordering depends on the layout:
    /// - `RowMajor`: row 0, then row 1, etc.
    /// - `ColMajor`: col 0, then col 1, etc.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.data.as_ref()
    }
}

impl<T, L: Layout, S: AsRef<[T]> + AsMut<[T]>> DenseMatrix<T, L, S> {
    /// Get the underlying data as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_mut()
    }
}

impl<'a, T, L: Layout> DenseMatrix<T, L, &'a [T]> {
    /// Create a borrowed view of a dense matrix from a slice.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != n_rows * n_cols`.
    pub fn from_slice(data: &'a [T], n_rows: usize, n_cols: usize) -> Self {
        Self::new(data, n_rows, n_cols)
    }
}

impl<'a, T, L: Layout> DenseMatrix<T, L, &'a mut [T]> {
    /// Create a mutable borrowed view of a dense matrix from a slice.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != n_rows * n_cols`.
    pub fn from_slice_mut(data: &'a mut [T], n_rows: usize, n_cols: usize) -> Self {
        Self::new(data, n_rows, n_cols)
    }
}

// =============================================================================
// Layout conversion
// =============================================================================

impl<T: Copy + Default, L: Layout, S: AsRef<[T]>> DenseMatrix<T, L, S> {
    /// Convert to a different layout.
    ///
    /// This creates a new matrix with data rearranged for the target layout.
    ///
    /// # Example
    ///
    /// ```
    /// use batch_predict::{ColMajor, DenseMatrix, RowMatrix};
    ///
    /// let rm = RowMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
    /// let cm: DenseMatrix<f64, ColMajor> = rm.to_layout();
    /// assert_eq!(cm.as_slice(), &[1.0, 3.0, 2.0, 4.0]);
    /// ```
    pub fn to_layout<L2: Layout>(&self) -> DenseMatrix<T, L2, Box<[T]>> {
        let (n_rows, n_cols) = (self.n_rows, self.n_cols);
        let src = self.data.as_ref();
        let mut data = vec![T::default(); n_rows * n_cols];

        for row in 0..n_rows {
            for col in 0..n_cols {
                data[L2::index(row, col, n_rows, n_cols)] = src[L::index(row, col, n_rows, n_cols)];
            }
        }

        DenseMatrix::from_vec(data, n_rows, n_cols)
    }
}

/// Convert from RowMajor to ColMajor.
impl<T: Copy + Default, S: AsRef<[T]>> From<&DenseMatrix<T, RowMajor, S>>
    for DenseMatrix<T, ColMajor, Box<[T]>>
{
    fn from(source: &DenseMatrix<T, RowMajor, S>) -> Self {
        source.to_layout()
    }
}

/// Convert from ColMajor to RowMajor.
impl<T: Copy + Default, S: AsRef<[T]>> From<&DenseMatrix<T, ColMajor, S>>
    for DenseMatrix<T, RowMajor, Box<[T]>>
{
    fn from(source: &DenseMatrix<T, ColMajor, S>) -> Self {
        source.to_layout()
    }
}

// =============================================================================
// Matrix trait implementations
// =============================================================================

impl<T: Element, L: Layout, S: AsRef<[T]>> Matrix for DenseMatrix<T, L, S> {
    type Element = T;

    #[inline]
    fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    fn n_cols(&self) -> usize {
        self.n_cols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> T {
        assert!(
            row < self.n_rows && col < self.n_cols,
            "Index ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.n_rows,
            self.n_cols
        );
        self.data.as_ref()[L::index(row, col, self.n_rows, self.n_cols)]
    }

    #[inline]
    fn row_slice(&self, row: usize) -> Option<&[T]> {
        assert!(row < self.n_rows, "Row index {} out of bounds", row);
        L::row_range(row, self.n_rows, self.n_cols)
            .map(|range| &self.data.as_ref()[range])
    }
}

impl<T: Element, S: AsRef<[T]> + AsMut<[T]>> MatrixMut for DenseMatrix<T, RowMajor, S> {
    type RowBlock<'a>
        = RowMajorRowsMut<'a, T>
    where
        Self: 'a;

    #[inline]
    fn set(&mut self, row: usize, col: usize, value: T) {
        assert!(
            row < self.n_rows && col < self.n_cols,
            "Index ({}, {}) out of bounds",
            row,
            col
        );
        let idx = RowMajor::index(row, col, self.n_rows, self.n_cols);
        self.data.as_mut()[idx] = value;
    }

    fn partition_rows_mut(&mut self, partitions: &RowPartitions) -> Vec<RowMajorRowsMut<'_, T>> {
        assert_eq!(
            partitions.n_rows(),
            self.n_rows,
            "Partitions do not cover the matrix rows"
        );
        let n_cols = self.n_cols;
        let mut rest = self.data.as_mut();
        let mut blocks = Vec::with_capacity(partitions.len());

        for rows in partitions.iter() {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(rows.len() * n_cols);
            rest = tail;
            blocks.push(RowMajorRowsMut {
                data: head,
                first_row: rows.start,
                n_rows: rows.len(),
                n_cols,
            });
        }

        blocks
    }
}

impl<T: Element, S: AsRef<[T]> + AsMut<[T]>> MatrixMut for DenseMatrix<T, ColMajor, S> {
    type RowBlock<'a>
        = ColMajorRowsMut<'a, T>
    where
        Self: 'a;

    #[inline]
    fn set(&mut self, row: usize, col: usize, value: T) {
        assert!(
            row < self.n_rows && col < self.n_cols,
            "Index ({}, {}) out of bounds",
            row,
            col
        );
        let idx = ColMajor::index(row, col, self.n_rows, self.n_cols);
        self.data.as_mut()[idx] = value;
    }

    fn partition_rows_mut(&mut self, partitions: &RowPartitions) -> Vec<ColMajorRowsMut<'_, T>> {
        assert_eq!(
            partitions.n_rows(),
            self.n_rows,
            "Partitions do not cover the matrix rows"
        );
        let (n_rows, n_cols) = (self.n_rows, self.n_cols);
        let mut blocks: Vec<ColMajorRowsMut<'_, T>> = partitions
            .iter()
            .map(|rows| ColMajorRowsMut {
                columns: Vec::with_capacity(n_cols),
                first_row: rows.start,
                n_rows: rows.len(),
            })
            .collect();

        if n_rows == 0 {
            return blocks;
        }

        // Each column is cut at the same row boundaries; block k owns piece k of every column.
        for column in self.data.as_mut().chunks_mut(n_rows) {
            let mut rest = column;
            for block in blocks.iter_mut() {
                let (head, tail) = std::mem::take(&mut rest).split_at_mut(block.n_rows);
                rest = tail;
                block.columns.push(head);
            }
        }

        blocks
    }
}

impl<T: Element, L: Layout> ZerosMatrix for DenseMatrix<T, L, Box<[T]>>
where
    Self: MatrixMut<Element = T>,
{
    fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self::from_vec(vec![T::default(); n_rows * n_cols], n_rows, n_cols)
    }
}

// =============================================================================
// Row blocks
// =============================================================================

/// Contiguous rows of a row-major matrix.
#[derive(Debug)]
pub struct RowMajorRowsMut<'a, T> {
    data: &'a mut [T],
    first_row: usize,
    n_rows: usize,
    n_cols: usize,
}

impl<T: Element> RowBlockMut for RowMajorRowsMut<'_, T> {
    type Element = T;

    #[inline]
    fn first_row(&self) -> usize {
        self.first_row
    }

    #[inline]
    fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    fn n_cols(&self) -> usize {
        self.n_cols
    }

    #[inline]
    fn get(&self, local_row: usize, col: usize) -> T {
        assert!(col < self.n_cols);
        self.data[local_row * self.n_cols + col]
    }

    #[inline]
    fn set(&mut self, local_row: usize, col: usize, value: T) {
        assert!(col < self.n_cols);
        self.data[local_row * self.n_cols + col] = value;
    }

    #[inline]
    fn row_slice_mut(&mut self, local_row: usize) -> Option<&mut [T]> {
        let start = local_row * self.n_cols;
        Some(&mut self.data[start..start + self.n_cols])
    }
}

/// Rows of a column-major matrix, held as one slice per column.
#[derive(Debug)]
pub struct ColMajorRowsMut<'a, T> {
    columns: Vec<&'a mut [T]>,
    first_row: usize,
    n_rows: usize,
}

impl<T: Element> RowBlockMut for ColMajorRowsMut<'_, T> {
    type Element = T;

    #[inline]
    fn first_row(&self) -> usize {
        self.first_row
    }

    #[inline]
    fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    fn n_cols(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    fn get(&self, local_row: usize, col: usize) -> T {
        self.columns[col][local_row]
    }

    #[inline]
    fn set(&mut self, local_row: usize, col: usize, value: T) {
        self.columns[col][local_row] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_indexing() {
        let m = RowMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        assert_eq!(m.dims(), (2, 3));
        assert_eq!(m.get(0, 2), 3.0);
        assert_eq!(m.get(1, 0), 4.0);
        assert_eq!(m.row_slice(1), Some(&[4.0, 5.0, 6.0][..]));
    }

    #[test]
    fn col_major_indexing() {
        let m = ColMatrix::from_vec(vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0], 2, 3);
        assert_eq!(m.get(0, 2), 3.0);
        assert_eq!(m.get(1, 0), 4.0);
        assert_eq!(m.row_slice(1), None);

        let mut buf = [0.0; 3];
        m.copy_row(1, &mut buf);
        assert_eq!(buf, [4.0, 5.0, 6.0]);
    }

    #[test]
    fn from_rows_matches_layout() {
        let rows = [[1.0f32, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let rm = RowMatrix::<f32>::from_rows(&rows);
        let cm = ColMatrix::<f32>::from_rows(&rows);
        assert_eq!(rm.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(cm.as_slice(), &[1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    #[should_panic(expected = "does not match dimensions")]
    fn from_vec_rejects_wrong_length() {
        let _ = RowMatrix::from_vec(vec![1.0, 2.0, 3.0], 2, 2);
    }

    #[test]
    fn layout_round_trip() {
        let rm = RowMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
        let cm = ColMatrix::from(&rm);
        assert_eq!(cm.as_slice(), &[1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);
        let back = RowMatrix::from(&cm);
        assert_eq!(back.as_slice(), rm.as_slice());
    }

    #[test]
    fn borrowed_views() {
        let data = [1.0, 2.0, 3.0, 4.0];
        let view = DenseMatrix::<f64, RowMajor, &[f64]>::from_slice(&data, 2, 2);
        assert_eq!(view.get(1, 1), 4.0);

        let mut out = [0.0; 4];
        let mut view = DenseMatrix::<f64, ColMajor, &mut [f64]>::from_slice_mut(&mut out, 2, 2);
        view.set(0, 1, 7.0);
        assert_eq!(out, [0.0, 0.0, 7.0, 0.0]);
    }

    #[test]
    fn row_major_partitions_are_disjoint() {
        let mut m = RowMatrix::<f64>::zeros(5, 2);
        let partitions = RowPartitions::new(5, 2);
        {
            let mut blocks = m.partition_rows_mut(&partitions);
            assert_eq!(blocks.len(), 3);
            assert_eq!(
                blocks
                    .iter()
                    .map(|b| (b.first_row(), b.n_rows()))
                    .collect::<Vec<_>>(),
                vec![(0, 2), (2, 2), (4, 1)]
            );
            for block in blocks.iter_mut() {
                for local in 0..block.n_rows() {
                    let row = (block.first_row() + local) as f64;
                    let slice = block.row_slice_mut(local).unwrap();
                    slice.copy_from_slice(&[row, -row]);
                }
            }
        }
        assert_eq!(
            m.as_slice(),
            &[0.0, -0.0, 1.0, -1.0, 2.0, -2.0, 3.0, -3.0, 4.0, -4.0]
        );
    }

    #[test]
    fn col_major_partitions_are_disjoint() {
        let mut m = ColMatrix::<f64>::zeros(5, 2);
        let partitions = RowPartitions::new(5, 3);
        {
            let mut blocks = m.partition_rows_mut(&partitions);
            assert_eq!(blocks.len(), 2);
            for block in blocks.iter_mut() {
                assert_eq!(block.n_cols(), 2);
                assert!(block.row_slice_mut(0).is_none());
                for local in 0..block.n_rows() {
                    let row = (block.first_row() + local) as f64;
                    block.write_row(local, &[row, 10.0 * row]);
                }
            }
        }
        assert_eq!(
            m.as_slice(),
            &[0.0, 1.0, 2.0, 3.0, 4.0, 0.0, 10.0, 20.0, 30.0, 40.0]
        );
    }

    #[test]
    fn partitions_of_empty_matrix() {
        let mut rm = RowMatrix::<f64>::zeros(0, 3);
        assert!(rm.partition_rows_mut(&RowPartitions::new(0, 4)).is_empty());

        let mut cm = ColMatrix::<f64>::zeros(0, 3);
        assert!(cm.partition_rows_mut(&RowPartitions::new(0, 4)).is_empty());
    }

    #[test]
    fn partitions_with_zero_columns() {
        let mut rm = RowMatrix::<f64>::zeros(3, 0);
        let blocks = rm.partition_rows_mut(&RowPartitions::new(3, 2));
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].n_rows(), 1);
    }
}
