//! Matrix-specific operations.
//!
//! Dims are stored as `[cols, rows]`, so `(row, col)` maps to index
//! `[col, row]` and offset `col + row * cols`: rows are contiguous.

use crate::element::Element;
use crate::error::Result;

use super::{MatrixKind, NdContainer};

impl<T: Element> NdContainer<T, MatrixKind> {
    /// Zero-filled in-memory matrix.
    pub fn zeros(rows: u64, cols: u64) -> Result<Self> {
        Self::with_dims(&[cols, rows])
    }

    /// In-memory matrix from primitive values in row-major order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndstore::MatrixMember;
    ///
    /// let m: MatrixMember<f64> = MatrixMember::from_rows(2, 3, &[1i32, 2, 3, 4, 5, 6]).unwrap();
    /// assert_eq!(m.get_rc(1, 0).unwrap(), 4.0);
    /// assert_eq!(m.get_rc(0, 2).unwrap(), 3.0);
    /// ```
    pub fn from_rows<P: Copy>(rows: u64, cols: u64, values: &[P]) -> Result<Self>
    where
        T: From<P>,
    {
        Self::from_primitives(&[cols, rows], values)
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> u64 {
        self.dims()[1]
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> u64 {
        self.dims()[0]
    }

    /// Element at `(row, col)`.
    pub fn get_rc(&self, row: u64, col: u64) -> Result<T> {
        self.get(&[col, row])
    }

    /// Write element `(row, col)`.
    pub fn set_rc(&mut self, row: u64, col: u64, value: &T) -> Result<()> {
        self.set(&[col, row], value)
    }

    /// Element at `(row, col)`, zero outside the matrix.
    pub fn get_rc_safe(&self, row: i64, col: i64) -> Result<T> {
        self.get_safe(&[col, row])
    }

    /// Write element `(row, col)`; zero writes outside the matrix are ignored.
    pub fn set_rc_safe(&mut self, row: i64, col: i64, value: &T) -> Result<()> {
        self.set_safe(&[col, row], value)
    }

    /// Establish a zeroed `rows x cols` matrix.
    pub fn init_rc(&mut self, rows: u64, cols: u64) -> Result<()> {
        self.init(&[cols, rows])
    }

    /// Change the size, keeping the overlapping top-left block.
    pub fn resize(&mut self, rows: u64, cols: u64) -> Result<()> {
        self.reshape(&[cols, rows])
    }
}
