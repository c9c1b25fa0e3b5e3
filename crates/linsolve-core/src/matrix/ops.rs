//! Elementary operations on [`DenseMatrix`].
//!
//! All functions validate shapes and return [`Result`] on dimension
//! mismatches. The decompositions and solvers only depend on the handful of
//! operations here: fill, transpose, multiply, multiply-accumulate and column
//! extraction.

use crate::error::{CoreError, Result};
use crate::{Float, Scalar};

use super::DenseMatrix;

/// Set every element of `m` to `value`.
pub fn fill<T: Scalar>(m: &mut DenseMatrix<T>, value: T) {
    for x in m.as_mut_slice() {
        *x = value;
    }
}

/// Return `m^T` as a new matrix.
pub fn transpose<T: Scalar>(m: &DenseMatrix<T>) -> DenseMatrix<T> {
    let (rows, cols) = m.shape();
    let src = m.as_slice();
    let mut data = vec![T::zero(); rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            data[c * rows + r] = src[r * cols + c];
        }
    }
    DenseMatrix {
        data,
        num_rows: cols,
        num_cols: rows,
    }
}

/// `C = alpha * op(A) * op(B) + beta * C`, where `op` optionally transposes.
///
/// If `beta` is zero, `c` is overwritten (not read).
#[allow(clippy::many_single_char_names)]
fn gemm<T: Scalar>(
    alpha: T,
    a: &DenseMatrix<T>,
    trans_a: bool,
    b: &DenseMatrix<T>,
    trans_b: bool,
    beta: T,
    c: &mut DenseMatrix<T>,
) -> Result<()> {
    let (m, k) = if trans_a {
        (a.num_cols, a.num_rows)
    } else {
        a.shape()
    };
    let (kb, n) = if trans_b {
        (b.num_cols, b.num_rows)
    } else {
        b.shape()
    };

    if kb != k {
        return Err(CoreError::DimensionMismatch {
            expected: (k, n),
            got: (kb, n),
        });
    }
    if c.shape() != (m, n) {
        return Err(CoreError::DimensionMismatch {
            expected: (m, n),
            got: c.shape(),
        });
    }

    let a_data = a.as_slice();
    let b_data = b.as_slice();
    let (a_cols, b_cols) = (a.num_cols, b.num_cols);
    let at = |i: usize, p: usize| {
        if trans_a {
            a_data[p * a_cols + i]
        } else {
            a_data[i * a_cols + p]
        }
    };
    let bt = |p: usize, j: usize| {
        if trans_b {
            b_data[j * b_cols + p]
        } else {
            b_data[p * b_cols + j]
        }
    };

    let c_data = c.as_mut_slice();
    for i in 0..m {
        for j in 0..n {
            let mut sum = T::zero();
            for p in 0..k {
                sum += at(i, p) * bt(p, j);
            }
            let c_idx = i * n + j;
            c_data[c_idx] = if beta == T::zero() {
                alpha * sum
            } else {
                alpha * sum + beta * c_data[c_idx]
            };
        }
    }

    Ok(())
}

/// `A * B` as a new matrix.
///
/// ```
/// # use linsolve_core::matrix::{DenseMatrix, ops};
/// let a = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
/// let b = DenseMatrix::from_vec(vec![5.0, 6.0, 7.0, 8.0], 2, 2).unwrap();
/// let c = ops::mult(&a, &b).unwrap();
/// assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0]);
/// ```
pub fn mult<T: Scalar>(a: &DenseMatrix<T>, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
    let mut c = DenseMatrix::zeros(a.num_rows, b.num_cols);
    gemm(T::one(), a, false, b, false, T::zero(), &mut c)?;
    Ok(c)
}

/// `A^T * B` as a new matrix.
pub fn mult_trans_a<T: Scalar>(a: &DenseMatrix<T>, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
    let mut c = DenseMatrix::zeros(a.num_cols, b.num_cols);
    gemm(T::one(), a, true, b, false, T::zero(), &mut c)?;
    Ok(c)
}

/// `A * B^T` as a new matrix.
pub fn mult_trans_b<T: Scalar>(a: &DenseMatrix<T>, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
    let mut c = DenseMatrix::zeros(a.num_rows, b.num_rows);
    gemm(T::one(), a, false, b, true, T::zero(), &mut c)?;
    Ok(c)
}

/// `C += A * B` (multiply-accumulate into `c`).
///
/// ```
/// # use linsolve_core::matrix::{DenseMatrix, ops};
/// let a = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
/// let x = DenseMatrix::column_vector(vec![1.0, 1.0]);
/// let mut y = DenseMatrix::column_vector(vec![10.0, 20.0]);
/// ops::mult_add(&a, &x, &mut y).unwrap();
/// assert_eq!(y.as_slice(), &[13.0, 27.0]);
/// ```
pub fn mult_add<T: Scalar>(
    a: &DenseMatrix<T>,
    b: &DenseMatrix<T>,
    c: &mut DenseMatrix<T>,
) -> Result<()> {
    gemm(T::one(), a, false, b, false, T::one(), c)
}

/// `A += B` element-wise.
pub fn add_equals<T: Scalar>(a: &mut DenseMatrix<T>, b: &DenseMatrix<T>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(CoreError::DimensionMismatch {
            expected: a.shape(),
            got: b.shape(),
        });
    }
    for (x, &y) in a.as_mut_slice().iter_mut().zip(b.as_slice()) {
        *x += y;
    }
    Ok(())
}

/// Scale every element of `m` in place.
pub fn scale<T: Scalar>(alpha: T, m: &mut DenseMatrix<T>) {
    for x in m.as_mut_slice() {
        *x *= alpha;
    }
}

/// Copy column `col` out of `m`.
///
/// # Panics
///
/// Panics if `col >= m.num_cols()`.
pub fn extract_column<T: Scalar>(m: &DenseMatrix<T>, col: usize) -> Vec<T> {
    assert!(col < m.num_cols, "column {col} out of bounds");
    (0..m.num_rows)
        .map(|r| m.data[r * m.num_cols + col])
        .collect()
}

/// Overwrite column `col` of `m` with `values`.
///
/// # Panics
///
/// Panics if `col >= m.num_cols()` or `values.len() != m.num_rows()`.
pub fn set_column<T: Scalar>(m: &mut DenseMatrix<T>, col: usize, values: &[T]) {
    assert!(col < m.num_cols, "column {col} out of bounds");
    assert_eq!(values.len(), m.num_rows, "column length mismatch");
    let cols = m.num_cols;
    for (r, &v) in values.iter().enumerate() {
        m.data[r * cols + col] = v;
    }
}

/// Largest absolute value on the main diagonal.
pub fn diagonal_max_abs<T: Float>(m: &DenseMatrix<T>) -> T {
    let size = m.num_rows.min(m.num_cols);
    (0..size)
        .map(|i| m.data[i * m.num_cols + i].abs())
        .fold(T::zero(), Float::max)
}

/// Quality of a triangular matrix used as a linear-system factor.
///
/// The product of the diagonal elements after each is scaled by the largest
/// diagonal magnitude. Zero means singular, one means every pivot is as
/// large as the largest one.
pub fn quality_triangular<T: Float>(m: &DenseMatrix<T>) -> f64 {
    let size = m.num_rows.min(m.num_cols);
    let max = diagonal_max_abs(m).to_f64();
    if max == 0.0 {
        return 0.0;
    }
    let mut quality = 1.0;
    for i in 0..size {
        quality *= m.data[i * m.num_cols + i].to_f64() / max;
    }
    quality.abs()
}

/// Whether two matrices have the same shape and every pair of elements
/// differs by at most `tol`.
pub fn is_identical<T: Float>(a: &DenseMatrix<T>, b: &DenseMatrix<T>, tol: T) -> bool {
    a.shape() == b.shape()
        && a
            .as_slice()
            .iter()
            .zip(b.as_slice())
            .all(|(&x, &y)| (x - y).abs() <= tol)
}

impl<T: Scalar> DenseMatrix<T> {
    /// Matrix-matrix multiply: returns `self * other`.
    pub fn matmul(&self, other: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
        mult(self, other)
    }

    /// Returns `self^T`.
    #[must_use]
    pub fn transpose(&self) -> DenseMatrix<T> {
        transpose(self)
    }
}
