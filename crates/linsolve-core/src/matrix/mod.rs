//! Dense, row-major matrix storage.
//!
//! [`DenseMatrix`] is the buffer every decomposition and solver in this crate
//! reads and writes. Element `(i, j)` lives at `data[i * num_cols + j]`.

mod create;
mod display;
mod fixed;
pub mod ops;

use crate::Scalar;
use crate::error::{CoreError, Result};

pub use fixed::FixedMatrix3x3;

/// A dense `num_rows x num_cols` matrix with contiguous row-major storage.
///
/// The matrix owns its data and cloning performs a deep copy.
///
/// # Type Parameters
///
/// - `T`: The element type, which must implement [`Scalar`].
#[derive(Debug, Clone)]
pub struct DenseMatrix<T: Scalar> {
    data: Vec<T>,
    num_rows: usize,
    num_cols: usize,
}

impl<T: Scalar> DenseMatrix<T> {
    // ------------------------------------------------------------------
    // Construction from raw parts
    // ------------------------------------------------------------------

    /// Create a matrix from a flat row-major vector.
    ///
    /// Returns an error if `num_rows * num_cols != data.len()`.
    pub fn from_vec(data: Vec<T>, num_rows: usize, num_cols: usize) -> Result<Self> {
        if num_rows * num_cols != data.len() {
            return Err(CoreError::InvalidShape {
                rows: num_rows,
                cols: num_cols,
                len: data.len(),
                reason: "row and column counts do not match data length",
            });
        }
        Ok(Self {
            data,
            num_rows,
            num_cols,
        })
    }

    /// Create a matrix from a flat row-major slice (copies the data).
    pub fn from_slice(data: &[T], num_rows: usize, num_cols: usize) -> Result<Self> {
        Self::from_vec(data.to_vec(), num_rows, num_cols)
    }

    /// Create a matrix from a list of equally long rows.
    ///
    /// ```
    /// # use linsolve_core::matrix::DenseMatrix;
    /// let m = DenseMatrix::from_rows(&[&[1.0_f64, 2.0], &[3.0, 4.0]]).unwrap();
    /// assert_eq!(m.shape(), (2, 2));
    /// assert_eq!(m.get(1, 0).unwrap(), 3.0);
    /// ```
    pub fn from_rows(rows: &[&[T]]) -> Result<Self> {
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(num_rows * num_cols);
        for row in rows {
            if row.len() != num_cols {
                return Err(CoreError::InvalidShape {
                    rows: num_rows,
                    cols: row.len(),
                    len: data.len(),
                    reason: "rows have different lengths",
                });
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(data, num_rows, num_cols)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns.
    #[inline]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// `(num_rows, num_cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows, self.num_cols)
    }

    /// Whether the matrix has as many rows as columns.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.num_rows == self.num_cols
    }

    /// The total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the matrix has zero elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A flat row-major slice of all elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// A mutable flat row-major slice of all elements.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    // ------------------------------------------------------------------
    // Element access
    // ------------------------------------------------------------------

    fn flat_index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.num_rows || col >= self.num_cols {
            return Err(CoreError::IndexOutOfBounds {
                index: (row, col),
                shape: self.shape(),
            });
        }
        Ok(row * self.num_cols + col)
    }

    /// Bounds-checked read of element `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        let flat = self.flat_index(row, col)?;
        Ok(self.data[flat])
    }

    /// Bounds-checked write of element `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let flat = self.flat_index(row, col)?;
        self.data[flat] = value;
        Ok(())
    }

    /// Read element `(row, col)` without bounds checking.
    ///
    /// # Safety
    ///
    /// `row < num_rows` and `col < num_cols` must hold.
    #[inline]
    pub unsafe fn unsafe_get(&self, row: usize, col: usize) -> T {
        debug_assert!(row < self.num_rows && col < self.num_cols);
        // SAFETY: the caller guarantees the index is inside the buffer.
        unsafe { *self.data.get_unchecked(row * self.num_cols + col) }
    }

    /// Write element `(row, col)` without bounds checking.
    ///
    /// # Safety
    ///
    /// `row < num_rows` and `col < num_cols` must hold.
    #[inline]
    pub unsafe fn unsafe_set(&mut self, row: usize, col: usize, value: T) {
        debug_assert!(row < self.num_rows && col < self.num_cols);
        // SAFETY: the caller guarantees the index is inside the buffer.
        unsafe {
            *self.data.get_unchecked_mut(row * self.num_cols + col) = value;
        }
    }

    /// Row `row` as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `row >= num_rows`.
    #[inline]
    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.num_cols..(row + 1) * self.num_cols]
    }

    /// Row `row` as a mutable slice.
    ///
    /// # Panics
    ///
    /// Panics if `row >= num_rows`.
    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        let cols = self.num_cols;
        &mut self.data[row * cols..(row + 1) * cols]
    }

    /// Change the dimensions to `num_rows x num_cols`.
    ///
    /// The contents afterwards are all zero; the existing allocation is reused
    /// when it is large enough.
    pub fn reshape(&mut self, num_rows: usize, num_cols: usize) {
        self.data.clear();
        self.data.resize(num_rows * num_cols, T::zero());
        self.num_rows = num_rows;
        self.num_cols = num_cols;
    }

    // ------------------------------------------------------------------
    // Iterators / map
    // ------------------------------------------------------------------

    /// Iterate over all elements in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Apply a function to every element, returning a new matrix.
    #[must_use]
    pub fn map<F>(&self, f: F) -> DenseMatrix<T>
    where
        F: Fn(T) -> T,
    {
        DenseMatrix {
            data: self.data.iter().map(|&x| f(x)).collect(),
            num_rows: self.num_rows,
            num_cols: self.num_cols,
        }
    }

    /// Apply a function to every element in place.
    pub fn apply<F>(&mut self, f: F)
    where
        F: Fn(T) -> T,
    {
        for x in &mut self.data {
            *x = f(*x);
        }
    }
}

impl<T: Scalar> PartialEq for DenseMatrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.data == other.data
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec() {
        let m = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.len(), 6);
        assert!(!m.is_square());
    }

    #[test]
    fn test_from_vec_shape_mismatch() {
        let r = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0], 2, 3);
        assert!(matches!(r, Err(CoreError::InvalidShape { .. })));
    }

    #[test]
    fn test_from_rows_ragged() {
        let r = DenseMatrix::from_rows(&[&[1.0_f64, 2.0], &[3.0]]);
        assert!(r.is_err());
    }

    #[test]
    fn test_get_set() {
        let mut m = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        assert_eq!(m.get(0, 0).unwrap(), 1.0);
        assert_eq!(m.get(1, 2).unwrap(), 6.0);
        m.set(0, 1, 99.0).unwrap();
        assert_eq!(m.get(0, 1).unwrap(), 99.0);
        assert_eq!(m.row(0), &[1.0, 99.0, 3.0]);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let m = DenseMatrix::<f64>::zeros(2, 2);
        assert_eq!(
            m.get(2, 0),
            Err(CoreError::IndexOutOfBounds {
                index: (2, 0),
                shape: (2, 2)
            })
        );
        assert!(m.get(0, 2).is_err());
    }

    #[test]
    fn test_unsafe_access() {
        let mut m = DenseMatrix::<f32>::zeros(3, 3);
        unsafe {
            m.unsafe_set(2, 1, 7.0);
            assert_eq!(m.unsafe_get(2, 1), 7.0);
        }
        assert_eq!(m.as_slice()[7], 7.0);
    }

    #[test]
    fn test_map_apply() {
        let mut m = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        let doubled = m.map(|x| x * 2.0);
        assert_eq!(doubled.as_slice(), &[2.0, 4.0, 6.0, 8.0]);
        m.apply(|x| -x);
        assert_eq!(m.as_slice(), &[-1.0, -2.0, -3.0, -4.0]);
    }

    #[test]
    fn test_partial_eq_respects_shape() {
        let a = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        let b = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], 4, 1).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_reshape_zeroes() {
        let mut m = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        m.reshape(3, 1);
        assert_eq!(m.shape(), (3, 1));
        assert_eq!(m.as_slice(), &[0.0, 0.0, 0.0]);
        m.row_mut(1)[0] = 5.0;
        assert_eq!(m.get(1, 0).unwrap(), 5.0);
    }
}
