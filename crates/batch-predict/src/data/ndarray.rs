//! ndarray integration.
//!
//! Any 2-D `ndarray` array (`Array2`, `ArrayView2`, `ArrayViewMut2`, ...) can be a
//! batch input; any mutable one can be a batch output. Axis 0 is samples, axis 1
//! is the per-sample values.
//!
//! Row views are available whenever a row is contiguous in memory, which is the
//! case for C-order arrays. Fortran-order arrays and transposed views fall back to
//! elementwise access.

use ndarray::{Array2, ArrayBase, ArrayViewMut2, Data, DataMut, Ix2};

use super::traits::{Element, Matrix, MatrixMut, RowBlockMut, ZerosMatrix};
use crate::utils::RowPartitions;

/// Semantic axis constants.
pub mod axis {
    use ndarray::Axis;

    pub const ROWS: Axis = Axis(0);
    pub const COLS: Axis = Axis(1);
}

impl<T: Element, S: Data<Elem = T>> Matrix for ArrayBase<S, Ix2> {
    type Element = T;

    #[inline]
    fn n_rows(&self) -> usize {
        self.len_of(axis::ROWS)
    }

    #[inline]
    fn n_cols(&self) -> usize {
        self.len_of(axis::COLS)
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> T {
        self[[row, col]]
    }

    #[inline]
    fn row_slice(&self, row: usize) -> Option<&[T]> {
        self.row(row).to_slice()
    }
}

impl<T: Element, S: DataMut<Elem = T>> MatrixMut for ArrayBase<S, Ix2> {
    type RowBlock<'a>
        = NdRowsMut<'a, T>
    where
        Self: 'a;

    #[inline]
    fn set(&mut self, row: usize, col: usize, value: T) {
        self[[row, col]] = value;
    }

    fn partition_rows_mut(&mut self, partitions: &RowPartitions) -> Vec<NdRowsMut<'_, T>> {
        assert_eq!(
            partitions.n_rows(),
            self.len_of(axis::ROWS),
            "Partitions do not cover the matrix rows"
        );
        let mut rest = self.view_mut();
        let mut blocks = Vec::with_capacity(partitions.len());

        for rows in partitions.iter() {
            let (head, tail) = rest.split_at(axis::ROWS, rows.len());
            rest = tail;
            blocks.push(NdRowsMut {
                view: head,
                first_row: rows.start,
            });
        }

        blocks
    }
}

impl<T: Element> ZerosMatrix for Array2<T> {
    fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Array2::from_elem((n_rows, n_cols), T::default())
    }
}

/// Row block of a 2-D ndarray.
#[derive(Debug)]
pub struct NdRowsMut<'a, T> {
    view: ArrayViewMut2<'a, T>,
    first_row: usize,
}

impl<T: Element> RowBlockMut for NdRowsMut<'_, T> {
    type Element = T;

    #[inline]
    fn first_row(&self) -> usize {
        self.first_row
    }

    #[inline]
    fn n_rows(&self) -> usize {
        self.view.len_of(axis::ROWS)
    }

    #[inline]
    fn n_cols(&self) -> usize {
        self.view.len_of(axis::COLS)
    }

    #[inline]
    fn get(&self, local_row: usize, col: usize) -> T {
        self.view[[local_row, col]]
    }

    #[inline]
    fn set(&mut self, local_row: usize, col: usize, value: T) {
        self.view[[local_row, col]] = value;
    }

    #[inline]
    fn row_slice_mut(&mut self, local_row: usize) -> Option<&mut [T]> {
        self.view.row_mut(local_row).into_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, ShapeBuilder};

    #[test]
    fn c_order_rows_are_viewable() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        assert_eq!(a.dims(), (2, 2));
        assert_eq!(a.row_slice(1), Some(&[3.0, 4.0][..]));
    }

    #[test]
    fn transposed_rows_fall_back() {
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let t = a.t();
        assert_eq!(t.dims(), (3, 2));
        assert_eq!(t.row_slice(0), None);

        let mut buf = [0.0; 2];
        t.copy_row(2, &mut buf);
        assert_eq!(buf, [3.0, 6.0]);
    }

    #[test]
    fn fortran_order_blocks_use_elementwise_writes() {
        let mut out = Array2::<f64>::zeros((4, 2).f());
        {
            let mut blocks = out.partition_rows_mut(&RowPartitions::new(4, 3));
            assert_eq!(blocks.len(), 2);
            assert!(blocks[0].row_slice_mut(0).is_none());
            blocks[1].write_row(0, &[7.0, 8.0]);
            assert_eq!(blocks[1].first_row(), 3);
        }
        assert_eq!(out.row(3).to_vec(), vec![7.0, 8.0]);
    }

    #[test]
    fn c_order_blocks_expose_row_slices() {
        let mut out = Array2::<f32>::zeros((3, 2));
        {
            let mut blocks = out.partition_rows_mut(&RowPartitions::new(3, 1));
            assert_eq!(blocks.len(), 3);
            let slice = blocks[2].row_slice_mut(0).unwrap();
            slice.copy_from_slice(&[1.0, 2.0]);
        }
        assert_eq!(out, array![[0.0, 0.0], [0.0, 0.0], [1.0, 2.0]]);
    }

    #[test]
    fn zeros_has_requested_shape() {
        let z = <Array2<f64> as ZerosMatrix>::zeros(3, 5);
        assert_eq!(z.dim(), (3, 5));
        assert!(z.iter().all(|&v| v == 0.0));
    }
}
