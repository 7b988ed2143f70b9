//! Matrix abstractions consumed by the batch driver.
//!
//! The driver never touches storage directly. It reads inputs through [`Matrix`]
//! and writes outputs through [`MatrixMut`], which hands out one disjoint
//! [`RowBlockMut`] per row partition.
//!
//! # Storage Types
//!
//! - [`DenseMatrix`]: Dense storage, row-major ([`RowMatrix`]) or column-major ([`ColMatrix`])
//! - `ndarray` arrays: `Array2`, `ArrayView2` and `ArrayViewMut2`
//!
//! # Row Views
//!
//! [`Matrix::row_slice`] and [`RowBlockMut::row_slice_mut`] return `Some` only when
//! a row is contiguous in memory. The driver uses the slice directly in that case
//! and falls back to an elementwise copy otherwise.

mod matrix;
mod ndarray;
mod traits;

pub use self::ndarray::{axis, NdRowsMut};
pub use matrix::{
    ColMajor, ColMajorRowsMut, ColMatrix, DenseMatrix, Layout, RowMajor, RowMajorRowsMut, RowMatrix,
};
pub use traits::{Element, Matrix, MatrixMut, RowBlockMut, ZerosMatrix};
