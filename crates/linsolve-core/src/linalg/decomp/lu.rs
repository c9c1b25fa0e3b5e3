//! LU decomposition with partial pivoting.
//!
//! Decomposes a square matrix `A` into `PA = LU` where:
//! - `P` is a permutation matrix (stored as a pivot vector)
//! - `L` is lower triangular with unit diagonal
//! - `U` is upper triangular

use log::debug;

use crate::Float;
use crate::error::{CoreError, Result};
use crate::matrix::{DenseMatrix, ops};

/// Result of an LU decomposition with partial pivoting.
///
/// Stores the factorization `PA = LU` in compact form: `L` and `U` are
/// packed into a single matrix (the unit diagonal of `L` is implicit),
/// and the permutation is stored as a pivot index vector.
#[derive(Debug, Clone)]
pub struct LuDecomposition<T: Float> {
    /// Packed LU matrix: lower triangle holds L (without diagonal),
    /// upper triangle (including diagonal) holds U.
    lu: Vec<T>,
    /// `pivots[i]` is the row of `A` that ended up in row `i`.
    pivots: Vec<usize>,
    /// Matrix dimension (n x n).
    n: usize,
    /// Sign of the permutation (+1 or -1), for determinant computation.
    sign: T,
}

impl<T: Float> LuDecomposition<T> {
    /// Perform LU decomposition with partial pivoting on a square matrix.
    ///
    /// Returns [`CoreError::SingularMatrix`] when a pivot is negligible
    /// relative to the largest element of `a`.
    ///
    /// ```
    /// # use linsolve_core::matrix::DenseMatrix;
    /// # use linsolve_core::linalg::decomp::LuDecomposition;
    /// let a = DenseMatrix::from_vec(vec![2.0_f64, 1.0, 1.0, 4.0], 2, 2).unwrap();
    /// let lu = LuDecomposition::decompose(&a).unwrap();
    /// let det = lu.det();
    /// assert!((det - 7.0).abs() < 1e-10);
    /// ```
    pub fn decompose(a: &DenseMatrix<T>) -> Result<Self> {
        if !a.is_square() {
            return Err(CoreError::InvalidArgument {
                reason: "LU decomposition requires a square matrix",
            });
        }
        let n = a.num_rows();

        // Copy matrix data into working buffer
        let mut lu: Vec<T> = a.as_slice().to_vec();
        let mut pivots: Vec<usize> = (0..n).collect();
        let mut sign = T::one();

        let scale = lu.iter().fold(T::zero(), |m, &x| m.max(x.abs()));
        let tiny = T::epsilon() * scale;

        for k in 0..n {
            // Find pivot: row with largest |lu[i, k]| for i >= k
            let mut max_val = lu[k * n + k].abs();
            let mut max_row = k;
            for i in (k + 1)..n {
                let val = lu[i * n + k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            // Swap rows if needed
            if max_row != k {
                for j in 0..n {
                    lu.swap(k * n + j, max_row * n + j);
                }
                pivots.swap(k, max_row);
                sign = -sign;
            }

            let pivot = lu[k * n + k];
            if pivot.abs() <= tiny {
                debug!("lu: pivot {k} of {n}x{n} matrix is negligible");
                return Err(CoreError::SingularMatrix);
            }

            // Eliminate below the pivot
            for i in (k + 1)..n {
                let factor = lu[i * n + k] / pivot;
                lu[i * n + k] = factor; // Store L factor

                for j in (k + 1)..n {
                    let ukj = lu[k * n + j];
                    lu[i * n + j] -= factor * ukj;
                }
            }
        }

        Ok(Self {
            lu,
            pivots,
            n,
            sign,
        })
    }

    /// Dimension of the factored matrix.
    pub fn dimension(&self) -> usize {
        self.n
    }

    /// Extract the lower triangular matrix `L` (with unit diagonal).
    pub fn l(&self) -> DenseMatrix<T> {
        let n = self.n;
        let mut l = DenseMatrix::identity(n);
        for i in 0..n {
            l.row_mut(i)[..i].copy_from_slice(&self.lu[i * n..i * n + i]);
        }
        l
    }

    /// Extract the upper triangular matrix `U`.
    pub fn u(&self) -> DenseMatrix<T> {
        let n = self.n;
        let mut u = DenseMatrix::zeros(n, n);
        for i in 0..n {
            u.row_mut(i)[i..].copy_from_slice(&self.lu[i * n + i..(i + 1) * n]);
        }
        u
    }

    /// Extract the permutation matrix `P`.
    pub fn p(&self) -> DenseMatrix<T> {
        let n = self.n;
        let mut p = DenseMatrix::zeros(n, n);
        for (i, &pi) in self.pivots.iter().enumerate() {
            p.row_mut(i)[pi] = T::one();
        }
        p
    }

    /// The permutation pivot vector.
    pub fn pivots(&self) -> &[usize] {
        &self.pivots
    }

    /// Compute the determinant from the LU factorization.
    ///
    /// `det(A) = sign * product(diag(U))`
    pub fn det(&self) -> T {
        let n = self.n;
        let mut d = self.sign;
        for i in 0..n {
            d *= self.lu[i * n + i];
        }
        d
    }

    /// How well conditioned `U` is as a factor, see
    /// [`ops::quality_triangular`].
    pub fn quality(&self) -> f64 {
        ops::quality_triangular(&self.u())
    }

    /// Solve `Ax = b` for a single right-hand side, overwriting `x` (which
    /// holds `b` on entry).
    ///
    /// # Panics
    ///
    /// Panics if `x.len() != n`.
    pub fn solve_in_place(&self, x: &mut [T]) {
        let n = self.n;
        assert_eq!(x.len(), n, "right-hand side length mismatch");

        // Apply permutation: Pb
        let b: Vec<T> = x.to_vec();
        for (xi, &pi) in x.iter_mut().zip(&self.pivots) {
            *xi = b[pi];
        }

        // Forward substitution: Ly = Pb
        // We index x[j] while updating x[i] where j < i, so iterators
        // are safe but less clear; use index loops instead.
        #[allow(clippy::needless_range_loop)]
        for i in 1..n {
            for j in 0..i {
                let lij_xj = self.lu[i * n + j] * x[j];
                x[i] -= lij_xj;
            }
        }

        // Back substitution: Ux = y
        #[allow(clippy::needless_range_loop)]
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                let uij_xj = self.lu[i * n + j] * x[j];
                x[i] -= uij_xj;
            }
            x[i] /= self.lu[i * n + i];
        }
    }

    /// Solve `AX = B` using the precomputed LU factorization.
    ///
    /// Each column of `b` (which must have `n` rows) is one right-hand side.
    pub fn solve(&self, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
        if b.num_rows() != self.n {
            return Err(CoreError::DimensionMismatch {
                expected: (self.n, b.num_cols()),
                got: b.shape(),
            });
        }

        let mut x = DenseMatrix::zeros(self.n, b.num_cols());
        for col in 0..b.num_cols() {
            let mut column = ops::extract_column(b, col);
            self.solve_in_place(&mut column);
            ops::set_column(&mut x, col, &column);
        }
        Ok(x)
    }

    /// Compute the inverse matrix using the LU factorization.
    ///
    /// Solves `AX = I` column by column.
    pub fn inverse(&self) -> Result<DenseMatrix<T>> {
        self.solve(&DenseMatrix::identity(self.n))
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn mat(data: &[f64], n: usize) -> DenseMatrix<f64> {
        DenseMatrix::from_vec(data.to_vec(), n, n).unwrap()
    }

    fn col(data: &[f64]) -> DenseMatrix<f64> {
        DenseMatrix::column_vector(data.to_vec())
    }

    fn approx_eq(a: &[f64], b: &[f64], tol: f64) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| (x - y).abs() < tol)
    }

    #[test]
    fn test_lu_2x2() {
        let a = mat(&[2.0, 1.0, 1.0, 4.0], 2);
        let lu = LuDecomposition::decompose(&a).unwrap();

        // Verify PA = LU
        let p = lu.p();
        let l = lu.l();
        let u = lu.u();
        let pa = p.matmul(&a).unwrap();
        let lu_prod = l.matmul(&u).unwrap();
        assert!(approx_eq(pa.as_slice(), lu_prod.as_slice(), 1e-12));
    }

    #[test]
    fn test_lu_3x3() {
        let a = mat(&[2.0, 1.0, 1.0, 4.0, 3.0, 3.0, 8.0, 7.0, 9.0], 3);
        let lu = LuDecomposition::decompose(&a).unwrap();

        let p = lu.p();
        let l = lu.l();
        let u = lu.u();
        let pa = p.matmul(&a).unwrap();
        let lu_prod = l.matmul(&u).unwrap();
        assert!(approx_eq(pa.as_slice(), lu_prod.as_slice(), 1e-12));
    }

    #[test]
    fn test_lu_4x4() {
        // >>> np.linalg.det([[1,2,3,4],[5,6,7,8],[2,6,4,8],[3,1,1,2]])
        // 72.0
        let a = mat(
            &[
                1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 2.0, 6.0, 4.0, 8.0, 3.0, 1.0, 1.0, 2.0,
            ],
            4,
        );
        let lu = LuDecomposition::decompose(&a).unwrap();

        let p = lu.p();
        let l = lu.l();
        let u = lu.u();
        let pa = p.matmul(&a).unwrap();
        let lu_prod = l.matmul(&u).unwrap();
        assert!(approx_eq(pa.as_slice(), lu_prod.as_slice(), 1e-10));
    }

    #[test]
    fn test_det_2x2() {
        let a = mat(&[2.0, 1.0, 1.0, 4.0], 2);
        let lu = LuDecomposition::decompose(&a).unwrap();
        assert!((lu.det() - 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_det_3x3() {
        // >>> np.linalg.det([[6,1,1],[4,-2,5],[2,8,7]])
        // -306.0
        let a = mat(&[6.0, 1.0, 1.0, 4.0, -2.0, 5.0, 2.0, 8.0, 7.0], 3);
        let lu = LuDecomposition::decompose(&a).unwrap();
        assert!((lu.det() - (-306.0)).abs() < 1e-10);
    }

    #[test]
    fn test_det_4x4_numpy() {
        let a = mat(
            &[
                1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 2.0, 6.0, 4.0, 8.0, 3.0, 1.0, 1.0, 2.0,
            ],
            4,
        );
        let lu = LuDecomposition::decompose(&a).unwrap();
        assert!((lu.det() - 72.0).abs() < 1e-10);
    }

    #[test]
    fn test_det_identity() {
        let eye = DenseMatrix::<f64>::identity(5);
        let lu = LuDecomposition::decompose(&eye).unwrap();
        assert!((lu.det() - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_singular_matrix() {
        // Rows are linearly dependent
        let a = mat(&[1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 7.0, 8.0, 9.0], 3);
        assert!(LuDecomposition::decompose(&a).is_err());
    }

    #[test]
    fn test_solve_2x2() {
        // 2x + y = 5
        // x + 4y = 6
        // => x = 2, y = 1
        let a = mat(&[2.0, 1.0, 1.0, 4.0], 2);
        let b = col(&[5.0, 6.0]);
        let lu = LuDecomposition::decompose(&a).unwrap();
        let x = lu.solve(&b).unwrap();
        assert!(approx_eq(x.as_slice(), &[2.0, 1.0], 1e-12));
    }

    #[test]
    fn test_solve_3x3() {
        // >>> A = np.array([[1,2,3],[4,5,6],[7,8,10]])
        // >>> b = np.array([1,2,3])
        // >>> np.linalg.solve(A, b)
        // array([-0.33333333,  0.66666667,  0.        ])
        let a = mat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0], 3);
        let b = col(&[1.0, 2.0, 3.0]);
        let lu = LuDecomposition::decompose(&a).unwrap();
        let x = lu.solve(&b).unwrap();
        assert!(approx_eq(
            x.as_slice(),
            &[-1.0 / 3.0, 2.0 / 3.0, 0.0],
            1e-12
        ));
    }

    #[test]
    fn test_solve_4x4_numpy() {
        // >>> A = np.array([[1,2,3,4],[5,6,7,8],[2,6,4,8],[3,1,1,2]])
        // >>> b = np.array([10, 26, 20, 7])
        // >>> np.linalg.solve(A, b)
        // array([1., 1., 1., 1.])
        let a = mat(
            &[
                1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 2.0, 6.0, 4.0, 8.0, 3.0, 1.0, 1.0, 2.0,
            ],
            4,
        );
        let b = col(&[10.0, 26.0, 20.0, 7.0]);
        let lu = LuDecomposition::decompose(&a).unwrap();
        let x = lu.solve(&b).unwrap();
        assert!(approx_eq(x.as_slice(), &[1.0, 1.0, 1.0, 1.0], 1e-10));
    }

    #[test]
    fn test_inverse_2x2() {
        // >>> np.linalg.inv([[2,1],[1,4]])
        // array([[ 0.57142857, -0.14285714],
        //        [-0.14285714,  0.28571429]])
        let a = mat(&[2.0, 1.0, 1.0, 4.0], 2);
        let lu = LuDecomposition::decompose(&a).unwrap();
        let inv = lu.inverse().unwrap();

        // Verify A * A^-1 = I
        let eye = a.matmul(&inv).unwrap();
        let identity = DenseMatrix::<f64>::identity(2);
        assert!(approx_eq(eye.as_slice(), identity.as_slice(), 1e-12));
    }

    #[test]
    fn test_inverse_3x3() {
        let a = mat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0], 3);
        let lu = LuDecomposition::decompose(&a).unwrap();
        let inv = lu.inverse().unwrap();

        let eye = a.matmul(&inv).unwrap();
        let identity = DenseMatrix::<f64>::identity(3);
        assert!(approx_eq(eye.as_slice(), identity.as_slice(), 1e-10));
    }

    #[test]
    fn test_inverse_identity() {
        let eye = DenseMatrix::<f64>::identity(4);
        let lu = LuDecomposition::decompose(&eye).unwrap();
        let inv = lu.inverse().unwrap();
        assert!(approx_eq(inv.as_slice(), eye.as_slice(), 1e-14));
    }

    #[test]
    fn test_not_square() {
        let a = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        assert!(LuDecomposition::decompose(&a).is_err());
    }

    #[test]
    fn test_singular_is_scale_invariant() {
        let a = mat(&[1e-20, 2e-20, 2e-20, 4e-20], 2);
        assert_eq!(
            LuDecomposition::decompose(&a).unwrap_err(),
            CoreError::SingularMatrix
        );
        let tiny = mat(&[1e-20, 0.0, 0.0, 1e-20], 2);
        assert!(LuDecomposition::decompose(&tiny).is_ok());
    }

    #[test]
    fn test_solve_multiple_columns() {
        let a = mat(&[2.0, 1.0, 1.0, 4.0], 2);
        let b = DenseMatrix::from_vec(vec![5.0, 3.0, 6.0, 5.0], 2, 2).unwrap();
        let x = LuDecomposition::decompose(&a).unwrap().solve(&b).unwrap();
        assert!(approx_eq(x.as_slice(), &[2.0, 1.0, 1.0, 1.0], 1e-12));
    }

    #[test]
    fn test_quality() {
        let eye = DenseMatrix::<f64>::identity(3);
        assert_eq!(LuDecomposition::decompose(&eye).unwrap().quality(), 1.0);
        let a = mat(&[1.0, 0.0, 0.0, 1e-8], 2);
        assert!(LuDecomposition::decompose(&a).unwrap().quality() < 1e-7);
    }

    #[test]
    fn test_solve_dimension_mismatch() {
        let a = mat(&[1.0, 0.0, 0.0, 1.0], 2);
        let b = col(&[1.0, 2.0, 3.0]);
        let lu = LuDecomposition::decompose(&a).unwrap();
        assert!(lu.solve(&b).is_err());
    }
}
