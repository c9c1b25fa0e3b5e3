//! Singular Value Decomposition (SVD).
//!
//! Decomposes a matrix `A` (m x n) into the thin form `A = U S V^T` where,
//! with `k = min(m, n)`:
//! - `U` has `k` orthonormal columns (m x k)
//! - `S` is diagonal with non-negative entries in descending order (k x k)
//! - `V` has `k` orthonormal columns (n x k)
//!
//! Implementation uses the one-sided Jacobi method.

use crate::Float;
use crate::error::{CoreError, Result};
use crate::matrix::{DenseMatrix, ops};

/// Result of a Singular Value Decomposition.
#[derive(Debug, Clone)]
pub struct SvdDecomposition<T: Float> {
    /// Left singular vectors (m x k). Columns belonging to a zero singular
    /// value are zero.
    u: DenseMatrix<T>,
    /// Singular values in descending order (length k).
    s: Vec<T>,
    /// Right singular vectors (n x k).
    v: DenseMatrix<T>,
}

/// Maximum number of Jacobi sweeps before giving up.
const MAX_SWEEPS: usize = 100;

#[allow(clippy::many_single_char_names)]
impl<T: Float> SvdDecomposition<T> {
    /// Compute the SVD of a matrix `A` (m x n).
    ///
    /// ```
    /// # use linsolve_core::matrix::DenseMatrix;
    /// # use linsolve_core::linalg::decomp::SvdDecomposition;
    /// let a = DenseMatrix::from_vec(vec![3.0_f64, 0.0, 0.0, 4.0], 2, 2).unwrap();
    /// let svd = SvdDecomposition::decompose(&a);
    /// let s = svd.singular_values();
    /// // Singular values of diag(3,4) are 4 and 3
    /// assert!((s[0] - 4.0).abs() < 1e-10);
    /// assert!((s[1] - 3.0).abs() < 1e-10);
    /// ```
    pub fn decompose(a: &DenseMatrix<T>) -> Self {
        if a.num_rows() >= a.num_cols() {
            Self::svd_tall(a.clone())
        } else {
            // A^T = U' S V'^T  =>  A = V' S U'^T
            let Self { u, s, v } = Self::svd_tall(ops::transpose(a));
            Self { u: v, s, v: u }
        }
    }

    /// SVD for tall/square matrices (m >= n) using one-sided Jacobi.
    fn svd_tall(mut work: DenseMatrix<T>) -> Self {
        let (m, n) = work.shape();
        let w = work.as_mut_slice();
        // V starts as identity
        let mut v = DenseMatrix::identity(n);
        let vd = v.as_mut_slice();

        let tol = T::epsilon() * T::from_f64(100.0);

        for _sweep in 0..MAX_SWEEPS {
            let mut converged = true;

            // Apply Jacobi rotations to pairs of columns (p, q)
            for p in 0..n {
                for q in (p + 1)..n {
                    // Compute Gram matrix elements for columns p and q
                    let mut app = T::zero();
                    let mut aqq = T::zero();
                    let mut apq = T::zero();
                    for i in 0..m {
                        let wp = w[i * n + p];
                        let wq = w[i * n + q];
                        app += wp * wp;
                        aqq += wq * wq;
                        apq += wp * wq;
                    }

                    if apq.abs() <= tol * (app * aqq).sqrt() {
                        continue;
                    }
                    converged = false;

                    // Compute Jacobi rotation angle
                    let tau = (aqq - app) / (apq + apq);
                    let t = if tau >= T::zero() {
                        (tau + (T::one() + tau * tau).sqrt()).recip()
                    } else {
                        -(-tau + (T::one() + tau * tau).sqrt()).recip()
                    };
                    let cs = (T::one() + t * t).sqrt().recip();
                    let sn = t * cs;

                    rotate_columns(w, n, p, q, cs, sn);
                    rotate_columns(vd, n, p, q, cs, sn);
                }
            }

            if converged {
                break;
            }
        }

        // Singular values are the column norms of the rotated matrix
        let s: Vec<T> = (0..n)
            .map(|j| (0..m).map(|i| w[i * n + j] * w[i * n + j]).sum::<T>().sqrt())
            .collect();

        // Sort singular values in descending order
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| s[b].partial_cmp(&s[a]).unwrap_or(std::cmp::Ordering::Equal));

        let mut u_sorted = DenseMatrix::zeros(m, n);
        let mut v_sorted = DenseMatrix::zeros(n, n);
        let mut s_sorted = Vec::with_capacity(n);
        for (new_j, &old_j) in order.iter().enumerate() {
            let norm = s[old_j];
            s_sorted.push(norm);
            if norm > T::zero() {
                let inv = norm.recip();
                let us = u_sorted.as_mut_slice();
                for i in 0..m {
                    us[i * n + new_j] = w[i * n + old_j] * inv;
                }
            }
            let vs = v_sorted.as_mut_slice();
            for i in 0..n {
                vs[i * n + new_j] = vd[i * n + old_j];
            }
        }

        Self {
            u: u_sorted,
            s: s_sorted,
            v: v_sorted,
        }
    }

    /// The singular values in descending order.
    pub fn singular_values(&self) -> &[T] {
        &self.s
    }

    /// The left singular vectors `U` (m x k).
    pub fn u(&self) -> &DenseMatrix<T> {
        &self.u
    }

    /// The right singular vectors `V` (n x k).
    pub fn v(&self) -> &DenseMatrix<T> {
        &self.v
    }

    /// `V^T` (k x n).
    pub fn vt(&self) -> DenseMatrix<T> {
        ops::transpose(&self.v)
    }

    /// Compute the matrix rank (number of singular values above a tolerance).
    pub fn rank(&self, tol: T) -> usize {
        self.s.iter().filter(|&&sv| sv > tol).count()
    }

    /// Singular values at or below this are treated as zero by
    /// [`solve`](Self::solve): `eps * max(m, n) * s_max`.
    pub fn default_threshold(&self) -> T {
        let largest = self.s.first().copied().unwrap_or_else(T::zero);
        let dim = self.u.num_rows().max(self.v.num_rows());
        T::epsilon() * T::from_usize(dim) * largest
    }

    /// Compute the condition number (ratio of largest to smallest singular value).
    pub fn condition_number(&self) -> T {
        match (self.s.first(), self.s.last()) {
            (Some(&max_s), Some(&min_s)) if min_s > T::zero() => max_s / min_s,
            (Some(_), Some(_)) => T::from_f64(f64::INFINITY),
            _ => T::zero(),
        }
    }

    /// Ratio of the smallest to the largest singular value, in `[0, 1]`.
    pub fn quality(&self) -> f64 {
        match (self.s.first(), self.s.last()) {
            (Some(&max_s), Some(&min_s)) if max_s > T::zero() => (min_s / max_s).to_f64(),
            _ => 0.0,
        }
    }

    /// Minimum-norm least-squares solution `X = V S^+ U^T B`.
    ///
    /// `b` must have m rows; each column is one right-hand side. Singular
    /// values at or below [`default_threshold`](Self::default_threshold) are
    /// dropped.
    pub fn solve(&self, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
        if b.num_rows() != self.u.num_rows() {
            return Err(CoreError::DimensionMismatch {
                expected: (self.u.num_rows(), b.num_cols()),
                got: b.shape(),
            });
        }
        let threshold = self.default_threshold();

        // U^T B, then scale row i by 1/s_i (or zero)
        let mut utb = ops::mult_trans_a(&self.u, b)?;
        for (i, &sv) in self.s.iter().enumerate() {
            let factor = if sv > threshold {
                sv.recip()
            } else {
                T::zero()
            };
            for x in utb.row_mut(i) {
                *x *= factor;
            }
        }
        ops::mult(&self.v, &utb)
    }

    /// The Moore-Penrose pseudo-inverse (n x m).
    pub fn pseudo_inverse(&self) -> Result<DenseMatrix<T>> {
        self.solve(&DenseMatrix::identity(self.u.num_rows()))
    }
}

/// Rotate columns `p` and `q` of a row-major buffer with `cols` columns
/// (`R = [[c, s], [-s, c]]`).
fn rotate_columns<T: Float>(data: &mut [T], cols: usize, p: usize, q: usize, cs: T, sn: T) {
    for row in data.chunks_exact_mut(cols) {
        let xp = row[p];
        let xq = row[q];
        row[p] = cs * xp - sn * xq;
        row[q] = sn * xp + cs * xq;
    }
}
