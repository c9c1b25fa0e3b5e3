//! Fixed-size 3x3 matrix stored in named fields.
//!
//! Element `(i, j)` is the field `a{i+1}{j+1}`, so `a23` is row 1, column 2.
//! There is no heap buffer; the matrix is `Copy` and lives on the stack.

use crate::Float;
use crate::error::{CoreError, Result};

use super::DenseMatrix;

/// A 3x3 matrix with one field per element.
///
/// ```
/// use linsolve_core::matrix::FixedMatrix3x3;
///
/// let mut m = FixedMatrix3x3::<f32>::zeros();
/// m.set(1, 2, 5.0).unwrap();
/// assert_eq!(m.a23, 5.0);
/// assert!(m.get(3, 0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedMatrix3x3<T: Float> {
    pub a11: T,
    pub a12: T,
    pub a13: T,
    pub a21: T,
    pub a22: T,
    pub a23: T,
    pub a31: T,
    pub a32: T,
    pub a33: T,
}

impl<T: Float> FixedMatrix3x3<T> {
    /// Number of rows.
    pub const NUM_ROWS: usize = 3;
    /// Number of columns.
    pub const NUM_COLS: usize = 3;

    /// All elements zero.
    pub fn zeros() -> Self {
        Self::default()
    }

    /// Build from three rows.
    pub fn from_rows(rows: [[T; 3]; 3]) -> Self {
        let [[a11, a12, a13], [a21, a22, a23], [a31, a32, a33]] = rows;
        Self {
            a11,
            a12,
            a13,
            a21,
            a22,
            a23,
            a31,
            a32,
            a33,
        }
    }

    /// The elements as three rows.
    pub fn to_rows(&self) -> [[T; 3]; 3] {
        [
            [self.a11, self.a12, self.a13],
            [self.a21, self.a22, self.a23],
            [self.a31, self.a32, self.a33],
        ]
    }

    /// Copy a `3 x 3` [`DenseMatrix`].
    pub fn from_dense(m: &DenseMatrix<T>) -> Result<Self> {
        if m.shape() != (3, 3) {
            return Err(CoreError::DimensionMismatch {
                expected: (3, 3),
                got: m.shape(),
            });
        }
        let s = m.as_slice();
        Ok(Self::from_rows([
            [s[0], s[1], s[2]],
            [s[3], s[4], s[5]],
            [s[6], s[7], s[8]],
        ]))
    }

    /// Copy into a freshly allocated [`DenseMatrix`].
    pub fn to_dense(&self) -> DenseMatrix<T> {
        DenseMatrix {
            data: self.to_rows().concat(),
            num_rows: 3,
            num_cols: 3,
        }
    }

    fn field(&self, row: usize, col: usize) -> Option<&T> {
        Some(match (row, col) {
            (0, 0) => &self.a11,
            (0, 1) => &self.a12,
            (0, 2) => &self.a13,
            (1, 0) => &self.a21,
            (1, 1) => &self.a22,
            (1, 2) => &self.a23,
            (2, 0) => &self.a31,
            (2, 1) => &self.a32,
            (2, 2) => &self.a33,
            _ => return None,
        })
    }

    fn field_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        Some(match (row, col) {
            (0, 0) => &mut self.a11,
            (0, 1) => &mut self.a12,
            (0, 2) => &mut self.a13,
            (1, 0) => &mut self.a21,
            (1, 1) => &mut self.a22,
            (1, 2) => &mut self.a23,
            (2, 0) => &mut self.a31,
            (2, 1) => &mut self.a32,
            (2, 2) => &mut self.a33,
            _ => return None,
        })
    }

    /// Bounds-checked read of element `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.field(row, col)
            .copied()
            .ok_or(CoreError::IndexOutOfBounds {
                index: (row, col),
                shape: (3, 3),
            })
    }

    /// Bounds-checked write of element `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let slot = self
            .field_mut(row, col)
            .ok_or(CoreError::IndexOutOfBounds {
                index: (row, col),
                shape: (3, 3),
            })?;
        *slot = value;
        Ok(())
    }

    /// Read element `(row, col)` without bounds checking.
    ///
    /// # Safety
    ///
    /// `row < 3` and `col < 3` must hold.
    #[inline]
    pub unsafe fn unsafe_get(&self, row: usize, col: usize) -> T {
        debug_assert!(row < 3 && col < 3);
        // SAFETY: the caller guarantees the index names a field.
        unsafe { *self.field(row, col).unwrap_unchecked() }
    }

    /// Write element `(row, col)` without bounds checking.
    ///
    /// # Safety
    ///
    /// `row < 3` and `col < 3` must hold.
    #[inline]
    pub unsafe fn unsafe_set(&mut self, row: usize, col: usize, value: T) {
        debug_assert!(row < 3 && col < 3);
        // SAFETY: the caller guarantees the index names a field.
        unsafe { *self.field_mut(row, col).unwrap_unchecked() = value };
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn counting() -> FixedMatrix3x3<f32> {
        FixedMatrix3x3::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]])
    }

    #[test]
    fn test_field_layout() {
        let m = counting();
        assert_eq!(m.a11, 1.0);
        assert_eq!(m.a23, 6.0);
        assert_eq!(m.a32, 8.0);
        let mut expected = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                expected += 1.0;
                assert_eq!(m.get(i, j).unwrap(), expected);
                // SAFETY: i, j < 3.
                assert_eq!(unsafe { m.unsafe_get(i, j) }, expected);
            }
        }
    }

    #[test]
    fn test_set_and_unsafe_set() {
        let mut m = FixedMatrix3x3::<f64>::zeros();
        m.set(2, 0, 7.5).unwrap();
        // SAFETY: (0, 2) is in range.
        unsafe { m.unsafe_set(0, 2, -1.0) };
        assert_eq!(m.a31, 7.5);
        assert_eq!(m.a13, -1.0);
        assert_eq!(m.get(1, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_out_of_range() {
        let mut m = counting();
        assert!(matches!(
            m.get(0, 3),
            Err(CoreError::IndexOutOfBounds {
                index: (0, 3),
                shape: (3, 3)
            })
        ));
        assert!(m.set(3, 1, 0.0).is_err());
        assert_eq!(m, counting());
    }

    #[test]
    fn test_copy_is_independent() {
        let a = counting();
        let mut b = a;
        b.a22 = 0.0;
        assert_eq!(a.a22, 5.0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_dense_round_trip() {
        let m = counting();
        let dense = m.to_dense();
        assert_eq!(dense.shape(), (3, 3));
        assert_eq!(dense.get(1, 2).unwrap(), 6.0);
        assert_eq!(FixedMatrix3x3::from_dense(&dense).unwrap(), m);
        assert!(FixedMatrix3x3::from_dense(&DenseMatrix::<f32>::zeros(2, 3)).is_err());
    }
}
