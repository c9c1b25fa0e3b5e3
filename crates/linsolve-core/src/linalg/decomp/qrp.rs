//! QR decomposition with column pivoting.
//!
//! Decomposes `A` (m x n, any shape) into `A P = Q R` where `P` is a column
//! permutation chosen so that the diagonal of `R` is non-increasing in
//! magnitude. The leading `rank x rank` block `R11` is well conditioned,
//! which makes the factorization usable on rank-deficient systems.
//!
//! ```text
//! A P = Q [ R11  R12 ]
//!         [  0    0  ]
//! ```

use log::trace;

use crate::Float;
use crate::error::{CoreError, Result};
use crate::matrix::{DenseMatrix, ops};

use super::qr::QrDecomposition;

/// Householder QR with column pivoting.
#[derive(Debug, Clone)]
pub struct QrpDecomposition<T: Float> {
    /// Working matrix in pivoted column order: upper trapezoid holds R,
    /// below the diagonal the Householder vectors.
    qr: Vec<T>,
    r_diag: Vec<T>,
    /// `pivots[j]` is the column of `A` stored in column `j`.
    pivots: Vec<usize>,
    rank: usize,
    m: usize,
    n: usize,
}

#[allow(clippy::many_single_char_names)]
impl<T: Float> QrpDecomposition<T> {
    /// Factor `a`.
    ///
    /// A column whose remaining norm is at or below
    /// `eps * max(m, n) * (largest column norm of A)` ends the factorization;
    /// the number of columns processed before that is the numerical rank.
    ///
    /// ```
    /// # use linsolve_core::matrix::DenseMatrix;
    /// # use linsolve_core::linalg::decomp::QrpDecomposition;
    /// // Second column is twice the first.
    /// let a = DenseMatrix::from_vec(vec![1.0_f64, 2.0, 2.0, 4.0, 3.0, 6.0], 3, 2).unwrap();
    /// let qrp = QrpDecomposition::decompose(&a);
    /// assert_eq!(qrp.rank(), 1);
    /// assert_eq!(qrp.pivots()[0], 1);
    /// ```
    pub fn decompose(a: &DenseMatrix<T>) -> Self {
        let (m, n) = a.shape();
        let steps = m.min(n);
        let mut qr = a.as_slice().to_vec();
        let mut pivots: Vec<usize> = (0..n).collect();
        let mut r_diag = vec![T::zero(); steps];
        let mut norms = vec![T::zero(); n];

        let column_norm_sq = |qr: &[T], k: usize, j: usize| -> T {
            (k..m).map(|i| qr[i * n + j] * qr[i * n + j]).sum::<T>()
        };

        let initial = (0..n)
            .map(|j| column_norm_sq(&qr, 0, j))
            .fold(T::zero(), Float::max)
            .sqrt();
        let threshold = T::epsilon() * T::from_usize(m.max(n)) * initial;

        let mut rank = 0;
        for k in 0..steps {
            // Remaining column norms are recomputed to avoid downdating error.
            for (j, norm) in norms.iter_mut().enumerate().skip(k) {
                *norm = column_norm_sq(&qr, k, j);
            }
            let mut best = k;
            for j in (k + 1)..n {
                if norms[j] > norms[best] {
                    best = j;
                }
            }
            if best != k {
                for i in 0..m {
                    qr.swap(i * n + k, i * n + best);
                }
                pivots.swap(k, best);
                norms.swap(k, best);
            }

            let mut norm = norms[k].sqrt();
            if norm <= threshold {
                break;
            }
            rank += 1;

            if qr[k * n + k] > T::zero() {
                norm = -norm;
            }
            for i in k..m {
                qr[i * n + k] /= -norm;
            }
            qr[k * n + k] += T::one();
            r_diag[k] = norm;

            let vk = qr[k * n + k];
            for j in (k + 1)..n {
                let mut s = T::zero();
                for i in k..m {
                    s += qr[i * n + k] * qr[i * n + j];
                }
                s = -s / vk;
                for i in k..m {
                    let v = qr[i * n + k];
                    qr[i * n + j] += s * v;
                }
            }
        }
        trace!("qrp: {m}x{n} matrix has numerical rank {rank}");

        Self {
            qr,
            r_diag,
            pivots,
            rank,
            m,
            n,
        }
    }

    /// Numerical rank.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of rows of the factored matrix.
    pub fn num_rows(&self) -> usize {
        self.m
    }

    /// Number of columns of the factored matrix.
    pub fn num_cols(&self) -> usize {
        self.n
    }

    /// Column permutation: `pivots()[j]` is the column of `A` in position `j`.
    pub fn pivots(&self) -> &[usize] {
        &self.pivots
    }

    /// The permutation matrix `P` (n x n) with `A P = Q R`.
    pub fn p(&self) -> DenseMatrix<T> {
        let mut p = DenseMatrix::zeros(self.n, self.n);
        for (j, &col) in self.pivots.iter().enumerate() {
            p.row_mut(col)[j] = T::one();
        }
        p
    }

    /// `R` (min(m, n) x n), upper trapezoidal. Rows past the rank are zero.
    pub fn r(&self) -> DenseMatrix<T> {
        let (k, n) = (self.m.min(self.n), self.n);
        let mut r = DenseMatrix::zeros(k, n);
        for i in 0..self.rank {
            let row = r.row_mut(i);
            row[i] = self.r_diag[i];
            row[i + 1..].copy_from_slice(&self.qr[i * n + i + 1..(i + 1) * n]);
        }
        r
    }

    /// The leading `rank x rank` block of `R`.
    pub fn r11(&self) -> DenseMatrix<T> {
        let (r, n) = (self.rank, self.n);
        let mut r11 = DenseMatrix::zeros(r, r);
        for i in 0..r {
            let row = r11.row_mut(i);
            row[i] = self.r_diag[i];
            row[i + 1..].copy_from_slice(&self.qr[i * n + i + 1..i * n + r]);
        }
        r11
    }

    /// The first `cols` columns of `Q` (m x cols), `cols <= m`.
    fn accumulate_q(&self, cols: usize) -> DenseMatrix<T> {
        let (m, n) = (self.m, self.n);
        let mut q = DenseMatrix::zeros(m, cols);
        for i in 0..cols {
            q.row_mut(i)[i] = T::one();
        }
        let qd = q.as_mut_slice();
        for k in (0..self.rank).rev() {
            let vk = self.qr[k * n + k];
            for j in 0..cols {
                let mut s = T::zero();
                for i in k..m {
                    s += self.qr[i * n + k] * qd[i * cols + j];
                }
                s = -s / vk;
                for i in k..m {
                    qd[i * cols + j] += s * self.qr[i * n + k];
                }
            }
        }
        q
    }

    /// The orthogonal matrix `Q` (m x m).
    pub fn q(&self) -> DenseMatrix<T> {
        self.accumulate_q(self.m)
    }

    /// The first `rank` columns of `Q` (m x rank).
    pub fn q_rank(&self) -> DenseMatrix<T> {
        self.accumulate_q(self.rank)
    }

    /// Overwrite `x` (length m) with `Q^T x`.
    ///
    /// # Panics
    ///
    /// Panics if `x.len() != m`.
    pub fn apply_qt_in_place(&self, x: &mut [T]) {
        let (m, n) = (self.m, self.n);
        assert_eq!(x.len(), m, "vector length mismatch");
        #[allow(clippy::needless_range_loop)]
        for k in 0..self.rank {
            let vk = self.qr[k * n + k];
            let mut s = T::zero();
            for i in k..m {
                s += self.qr[i * n + k] * x[i];
            }
            s = -s / vk;
            for i in k..m {
                x[i] += s * self.qr[i * n + k];
            }
        }
    }

    /// Solve `R11 y = c` in place for the first `rank` entries of `c`.
    fn back_substitute(&self, c: &mut [T]) {
        let n = self.n;
        for i in (0..self.rank).rev() {
            for j in (i + 1)..self.rank {
                let cj = c[j];
                c[i] -= self.qr[i * n + j] * cj;
            }
            c[i] /= self.r_diag[i];
        }
    }

    /// Basic solution in pivoted order from `c = Q^T b` (only the first
    /// `rank` entries are read). Free variables are zero.
    fn basic_from_qtb(&self, c: &[T]) -> Vec<T> {
        let mut y = vec![T::zero(); self.n];
        y[..self.rank].copy_from_slice(&c[..self.rank]);
        self.back_substitute(&mut y);
        y
    }

    /// Minimum 2-norm solution in pivoted order from `c = Q^T b`.
    ///
    /// With `y = R11^-1 c` and `W = R11^-1 R12` every solution has the form
    /// `[y - W z; z]`; the shortest one solves `min || [y; 0] - [W; -I] z ||`.
    fn minimum_norm_from_qtb(&self, c: &[T]) -> Result<Vec<T>> {
        let (r, n) = (self.rank, self.n);
        let mut x = self.basic_from_qtb(c);
        let free = n - r;
        if free == 0 || r == 0 {
            return Ok(x);
        }

        // Stack [W; -I] column by column
        let mut stacked = DenseMatrix::zeros(n, free);
        let mut w_col = vec![T::zero(); n];
        for f in 0..free {
            for (i, w) in w_col.iter_mut().enumerate().take(r) {
                *w = self.qr[i * n + r + f];
            }
            self.back_substitute(&mut w_col);
            let sd = stacked.as_mut_slice();
            for i in 0..r {
                sd[i * free + f] = w_col[i];
            }
            sd[(r + f) * free + f] = -T::one();
        }

        let rhs = DenseMatrix::column_vector(x.clone());
        let z = QrDecomposition::decompose(&stacked)?.solve(&rhs)?;
        let z = z.as_slice();

        for i in 0..r {
            let mut s = T::zero();
            for (f, &zf) in z.iter().enumerate() {
                s += stacked.as_slice()[i * free + f] * zf;
            }
            x[i] -= s;
        }
        x[r..].copy_from_slice(z);
        Ok(x)
    }

    /// Undo the column permutation.
    fn unpermute(&self, pivoted: &[T], out: &mut [T]) {
        for (j, &col) in self.pivots.iter().enumerate() {
            out[col] = pivoted[j];
        }
    }

    fn check_rhs(&self, b: &DenseMatrix<T>) -> Result<()> {
        if b.num_rows() != self.m {
            return Err(CoreError::DimensionMismatch {
                expected: (self.m, b.num_cols()),
                got: b.shape(),
            });
        }
        Ok(())
    }

    /// Solve from precomputed `Q^T B` columns (m x k, or rank x k).
    ///
    /// `minimum_norm` selects between the basic and the minimum-norm
    /// solution.
    pub fn solve_from_qtb(
        &self,
        qtb: &DenseMatrix<T>,
        minimum_norm: bool,
    ) -> Result<DenseMatrix<T>> {
        if qtb.num_rows() < self.rank {
            return Err(CoreError::DimensionMismatch {
                expected: (self.rank, qtb.num_cols()),
                got: qtb.shape(),
            });
        }
        let mut x = DenseMatrix::zeros(self.n, qtb.num_cols());
        let mut column = vec![T::zero(); self.n];
        for col in 0..qtb.num_cols() {
            let c = ops::extract_column(qtb, col);
            let pivoted = if minimum_norm {
                self.minimum_norm_from_qtb(&c)?
            } else {
                self.basic_from_qtb(&c)
            };
            self.unpermute(&pivoted, &mut column);
            ops::set_column(&mut x, col, &column);
        }
        Ok(x)
    }

    /// Basic solution of `min ||A X - B||`: the free variables (pivoted
    /// columns past the rank) are zero.
    pub fn solve_basic(&self, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
        self.check_rhs(b)?;
        self.solve_from_qtb(&self.apply_qt(b), false)
    }

    /// Minimum 2-norm solution of `min ||A X - B||`.
    pub fn solve_minimum_norm(&self, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
        self.check_rhs(b)?;
        self.solve_from_qtb(&self.apply_qt(b), true)
    }

    fn apply_qt(&self, b: &DenseMatrix<T>) -> DenseMatrix<T> {
        let mut qtb = b.clone();
        for col in 0..b.num_cols() {
            let mut c = ops::extract_column(b, col);
            self.apply_qt_in_place(&mut c);
            ops::set_column(&mut qtb, col, &c);
        }
        qtb
    }
}
