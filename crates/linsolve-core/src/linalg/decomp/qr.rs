//! QR decomposition via Householder reflections.
//!
//! Decomposes a matrix `A` (m x n, m >= n) into `A = QR` where:
//! - `Q` is an orthogonal matrix (m x m) such that `Q^T Q = I`
//! - `R` is upper triangular (m x n)
//!
//! Two drivers produce the same compact factorization: the column-at-a-time
//! [`QrDecomposition::decompose`] and the panel-oriented
//! [`QrDecomposition::decompose_blocked`], which applies a whole panel of
//! reflectors to each trailing column while it is hot in cache.

use log::trace;

use crate::Float;
use crate::error::{CoreError, Result};
use crate::matrix::{DenseMatrix, ops};

/// Default panel width of the blocked driver.
pub const DEFAULT_PANEL_WIDTH: usize = 60;

/// Result of a QR decomposition via Householder reflections.
///
/// Stores the factorization `A = QR` in compact form: the Householder
/// vectors are stored in the lower triangle of the working matrix,
/// and `R` is stored in the upper triangle.
#[derive(Debug, Clone)]
pub struct QrDecomposition<T: Float> {
    /// Working matrix: upper triangle holds R, columns below the diagonal
    /// hold the Householder vectors. `qr[k][k]` holds the leading element
    /// of reflector `k`, or zero when column `k` needed no reflection.
    qr: Vec<T>,
    /// Diagonal of R stored separately (the Householder reflections
    /// overwrite the diagonal of the working matrix).
    r_diag: Vec<T>,
    /// Number of rows.
    m: usize,
    /// Number of columns.
    n: usize,
}

#[allow(clippy::many_single_char_names)]
impl<T: Float> QrDecomposition<T> {
    /// Perform QR decomposition on a matrix `A` (m x n, m >= n).
    ///
    /// Uses Householder reflections for numerical stability.
    ///
    /// ```
    /// # use linsolve_core::matrix::{DenseMatrix, ops};
    /// # use linsolve_core::linalg::decomp::QrDecomposition;
    /// let a = DenseMatrix::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2).unwrap();
    /// let qr = QrDecomposition::decompose(&a).unwrap();
    /// let q = qr.q();
    /// // Verify Q is orthogonal: Q^T Q = I
    /// let qtq = ops::mult_trans_a(&q, &q).unwrap();
    /// assert!(ops::is_identical(&qtq, &DenseMatrix::identity(3), 1e-10));
    /// ```
    pub fn decompose(a: &DenseMatrix<T>) -> Result<Self> {
        let mut qr = Self::prepare(a)?;
        for k in 0..qr.n {
            qr.householder_column(k, qr.n);
        }
        Ok(qr)
    }

    /// Same factorization as [`decompose`](Self::decompose), computed one
    /// panel of `width` columns at a time.
    ///
    /// Within a panel reflectors are applied only to the panel itself; the
    /// trailing columns are then updated with every reflector of the panel
    /// in turn. The per-column sequence of operations is unchanged, so the
    /// result matches the unblocked driver.
    pub fn decompose_blocked(a: &DenseMatrix<T>, width: usize) -> Result<Self> {
        let mut qr = Self::prepare(a)?;
        let width = width.max(1);
        let n = qr.n;
        trace!("qr: blocked {}x{n}, panel width {width}", qr.m);

        let mut k0 = 0;
        while k0 < n {
            let k1 = (k0 + width).min(n);
            for k in k0..k1 {
                qr.householder_column(k, k1);
            }
            for j in k1..n {
                for k in k0..k1 {
                    qr.reflect_column(k, j);
                }
            }
            k0 = k1;
        }
        Ok(qr)
    }

    fn prepare(a: &DenseMatrix<T>) -> Result<Self> {
        let (m, n) = a.shape();
        if m < n {
            return Err(CoreError::InvalidArgument {
                reason: "QR decomposition requires m >= n (tall or square matrix)",
            });
        }
        Ok(Self {
            qr: a.as_slice().to_vec(),
            r_diag: vec![T::zero(); n],
            m,
            n,
        })
    }

    /// Form reflector `k` and apply it to columns `k + 1 .. end`.
    fn householder_column(&mut self, k: usize, end: usize) {
        let (m, n) = (self.m, self.n);
        let qr = &mut self.qr;

        // Compute the norm of the k-th column below the diagonal
        let mut norm_sq = T::zero();
        for i in k..m {
            norm_sq += qr[i * n + k] * qr[i * n + k];
        }
        let mut norm = norm_sq.sqrt();

        if norm == T::zero() {
            self.r_diag[k] = T::zero();
            return;
        }

        // Choose sign to avoid cancellation
        if qr[k * n + k] > T::zero() {
            norm = -norm;
        }

        // Scale the Householder vector
        for i in k..m {
            qr[i * n + k] /= -norm;
        }
        qr[k * n + k] += T::one();
        self.r_diag[k] = norm;

        for j in (k + 1)..end {
            self.reflect_column(k, j);
        }
    }

    /// Apply reflector `k` to column `j` of the working matrix.
    fn reflect_column(&mut self, k: usize, j: usize) {
        let (m, n) = (self.m, self.n);
        let qr = &mut self.qr;
        let vk = qr[k * n + k];
        if vk <= T::zero() {
            return;
        }
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

    /// Number of rows of the factored matrix.
    pub fn num_rows(&self) -> usize {
        self.m
    }

    /// Number of columns of the factored matrix.
    pub fn num_cols(&self) -> usize {
        self.n
    }

    /// The diagonal of `R`.
    pub fn r_diagonal(&self) -> &[T] {
        &self.r_diag
    }

    /// Whether the matrix has full column rank.
    ///
    /// A diagonal element of `R` counts as zero when it is below
    /// `eps * max(m, n)` relative to the largest one.
    pub fn is_full_rank(&self) -> bool {
        let largest = self.r_diag.iter().fold(T::zero(), |acc, d| acc.max(d.abs()));
        let threshold = T::epsilon() * T::from_usize(self.m.max(self.n)) * largest;
        self.r_diag.iter().all(|d| d.abs() > threshold)
    }

    /// Quality of `R` as a triangular factor, see
    /// [`ops::quality_triangular`].
    pub fn quality(&self) -> f64 {
        ops::quality_triangular(&self.r())
    }

    /// Extract the upper triangular matrix `R` (m x n).
    pub fn r(&self) -> DenseMatrix<T> {
        let (m, n) = (self.m, self.n);
        let mut r = DenseMatrix::zeros(m, n);
        for i in 0..n {
            let row = r.row_mut(i);
            row[i] = self.r_diag[i];
            row[i + 1..].copy_from_slice(&self.qr[i * n + i + 1..(i + 1) * n]);
        }
        r
    }

    /// Extract the orthogonal matrix `Q` (m x m).
    pub fn q(&self) -> DenseMatrix<T> {
        self.accumulate_q(self.m)
    }

    /// Extract the "thin" Q matrix (m x n), only the first `n` columns.
    pub fn q_thin(&self) -> DenseMatrix<T> {
        self.accumulate_q(self.n)
    }

    /// Apply the reflections in reverse order to the first `cols` columns of
    /// the identity.
    fn accumulate_q(&self, cols: usize) -> DenseMatrix<T> {
        let (m, n) = (self.m, self.n);
        let mut q = DenseMatrix::zeros(m, cols);
        for i in 0..cols {
            q.row_mut(i)[i] = T::one();
        }
        let q_data = q.as_mut_slice();

        for k in (0..n).rev() {
            let vk = self.qr[k * n + k];
            if vk <= T::zero() {
                continue;
            }
            // Apply H_k = I - v*v^T/v[k] to Q
            for j in 0..cols {
                let mut s = T::zero();
                for i in k..m {
                    s += self.qr[i * n + k] * q_data[i * cols + j];
                }
                s = -s / vk;
                for i in k..m {
                    q_data[i * cols + j] += s * self.qr[i * n + k];
                }
            }
        }
        q
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
        for k in 0..n {
            let vk = self.qr[k * n + k];
            if vk <= T::zero() {
                continue;
            }
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

    /// Least-squares solve for one right-hand side.
    ///
    /// `x` holds `b` (length m) on entry; on exit its first `n` entries hold
    /// the solution. Assumes full column rank.
    ///
    /// # Panics
    ///
    /// Panics if `x.len() != m`.
    pub fn solve_in_place(&self, x: &mut [T]) {
        let n = self.n;
        self.apply_qt_in_place(x);

        // Back substitution on the upper triangular part: Rx = Q^T b
        #[allow(clippy::needless_range_loop)]
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                let xj = x[j];
                x[i] -= self.qr[i * n + j] * xj;
            }
            x[i] /= self.r_diag[i];
        }
    }

    /// Solve the least-squares problem `min ||AX - B||_2`, one column of `b`
    /// (which must have m rows) at a time.
    ///
    /// For a full-rank system where `m == n`, this is equivalent to solving
    /// `AX = B`. For overdetermined systems (`m > n`), it returns the
    /// least-squares solution.
    pub fn solve(&self, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
        if !self.is_full_rank() {
            return Err(CoreError::SingularMatrix);
        }
        if b.num_rows() != self.m {
            return Err(CoreError::DimensionMismatch {
                expected: (self.m, b.num_cols()),
                got: b.shape(),
            });
        }

        let mut x = DenseMatrix::zeros(self.n, b.num_cols());
        for col in 0..b.num_cols() {
            let mut column = ops::extract_column(b, col);
            self.solve_in_place(&mut column);
            // Only the first n elements are the solution
            ops::set_column(&mut x, col, &column[..self.n]);
        }
        Ok(x)
    }
}

/// Solve the least-squares problem `min ||Ax - b||_2` via QR decomposition.
///
/// For square full-rank systems this is equivalent to `solve`. For
/// overdetermined systems (`m > n`), returns the least-squares solution.
///
/// ```
/// # use linsolve_core::matrix::DenseMatrix;
/// # use linsolve_core::linalg::decomp;
/// // Overdetermined system: 3 equations, 2 unknowns
/// let a = DenseMatrix::from_vec(vec![1.0_f64, 1.0, 1.0, 2.0, 1.0, 3.0], 3, 2).unwrap();
/// let b = DenseMatrix::column_vector(vec![6.0_f64, 5.0, 7.0]);
/// let x = decomp::lstsq(&a, &b).unwrap();
/// assert_eq!(x.shape(), (2, 1));
/// ```
pub fn lstsq<T: Float>(a: &DenseMatrix<T>, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
    QrDecomposition::decompose(a)?.solve(b)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn approx_eq(a: &[f64], b: &[f64], tol: f64) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| (x - y).abs() < tol)
    }

    #[test]
    fn test_qr_3x3() {
        let a = DenseMatrix::from_vec(vec![12.0_f64, -51.0, 4.0, 6.0, 167.0, -68.0, -4.0, 24.0, -41.0], 3, 3).unwrap();
        let qr = QrDecomposition::decompose(&a).unwrap();

        let q = qr.q();
        let r = qr.r();

        // Verify A = QR
        let qr_prod = q.matmul(&r).unwrap();
        assert!(approx_eq(qr_prod.as_slice(), a.as_slice(), 1e-10));

        // Verify Q is orthogonal: Q^T Q = I
        let qtq = ops::mult_trans_a(&q, &q).unwrap();
        let eye = DenseMatrix::<f64>::identity(3);
        assert!(approx_eq(qtq.as_slice(), eye.as_slice(), 1e-10));
    }

    #[test]
    fn test_qr_identity() {
        let eye = DenseMatrix::<f64>::identity(4);
        let qr = QrDecomposition::decompose(&eye).unwrap();

        let q = qr.q();
        let r = qr.r();
        let qr_prod = q.matmul(&r).unwrap();
        assert!(approx_eq(qr_prod.as_slice(), eye.as_slice(), 1e-14));
    }

    #[test]
    fn test_qr_tall_matrix() {
        // 4x2 matrix
        let a =
            DenseMatrix::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], 4, 2).unwrap();
        let qr = QrDecomposition::decompose(&a).unwrap();

        let q = qr.q();
        let r = qr.r();

        // Q is 4x4, R is 4x2
        assert_eq!(q.shape(), (4, 4));
        assert_eq!(r.shape(), (4, 2));

        // Verify A = QR
        let qr_prod = q.matmul(&r).unwrap();
        assert!(approx_eq(qr_prod.as_slice(), a.as_slice(), 1e-10));

        // Q orthogonal
        let qtq = ops::mult_trans_a(&q, &q).unwrap();
        let eye = DenseMatrix::<f64>::identity(4);
        assert!(approx_eq(qtq.as_slice(), eye.as_slice(), 1e-10));
    }

    #[test]
    fn test_qr_thin_q() {
        let a =
            DenseMatrix::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], 4, 2).unwrap();
        let qr = QrDecomposition::decompose(&a).unwrap();

        let q_thin = qr.q_thin();
        assert_eq!(q_thin.shape(), (4, 2));

        // Q_thin^T Q_thin should be 2x2 identity
        let qtq = ops::mult_trans_a(&q_thin, &q_thin).unwrap();
        let eye = DenseMatrix::<f64>::identity(2);
        assert!(approx_eq(qtq.as_slice(), eye.as_slice(), 1e-10));
    }

    #[test]
    fn test_qr_solve_square() {
        // Same system as LU test: 2x + y = 5, x + 4y = 6 => x=2, y=1
        let a = DenseMatrix::from_vec(vec![2.0_f64, 1.0, 1.0, 4.0], 2, 2).unwrap();
        let b = DenseMatrix::column_vector(vec![5.0_f64, 6.0]);
        let qr = QrDecomposition::decompose(&a).unwrap();
        let x = qr.solve(&b).unwrap();
        assert!(approx_eq(x.as_slice(), &[2.0, 1.0], 1e-10));
    }

    #[test]
    fn test_qr_solve_3x3() {
        // >>> A = np.array([[1,2,3],[4,5,6],[7,8,10]])
        // >>> b = np.array([1,2,3])
        // >>> np.linalg.lstsq(A, b, rcond=None)[0]
        // array([-0.33333333,  0.66666667,  0.        ])
        let a = DenseMatrix::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0], 3, 3).unwrap();
        let b = DenseMatrix::column_vector(vec![1.0_f64, 2.0, 3.0]);
        let qr = QrDecomposition::decompose(&a).unwrap();
        let x = qr.solve(&b).unwrap();
        assert!(approx_eq(
            x.as_slice(),
            &[-1.0 / 3.0, 2.0 / 3.0, 0.0],
            1e-10
        ));
    }

    #[test]
    fn test_lstsq_overdetermined() {
        // Overdetermined system: fit y = a + b*x to points (1,6), (2,5), (3,7)
        // A = [[1,1],[1,2],[1,3]], b = [6,5,7]
        // Normal equations: A^T A = [[3,6],[6,14]], A^T b = [18,37]
        // Solution: x = [5.0, 0.5]
        let a = DenseMatrix::from_vec(vec![1.0_f64, 1.0, 1.0, 2.0, 1.0, 3.0], 3, 2).unwrap();
        let b = DenseMatrix::column_vector(vec![6.0_f64, 5.0, 7.0]);
        let x = lstsq(&a, &b).unwrap();
        assert!(approx_eq(x.as_slice(), &[5.0, 0.5], 1e-10));
    }

    #[test]
    fn test_lstsq_perfect_fit() {
        // Exactly determined system through lstsq path
        // y = 2x + 1 at x=0,1,2 => b=[1,3,5]
        // A = [[1,0],[1,1],[1,2]], b = [1,3,5]
        let a = DenseMatrix::from_vec(vec![1.0_f64, 0.0, 1.0, 1.0, 1.0, 2.0], 3, 2).unwrap();
        let b = DenseMatrix::column_vector(vec![1.0_f64, 3.0, 5.0]);
        let x = lstsq(&a, &b).unwrap();
        assert!(approx_eq(x.as_slice(), &[1.0, 2.0], 1e-10));
    }

    #[test]
    fn test_qr_is_full_rank() {
        let a = DenseMatrix::from_vec(vec![1.0_f64, 0.0, 0.0, 1.0], 2, 2).unwrap();
        let qr = QrDecomposition::decompose(&a).unwrap();
        assert!(qr.is_full_rank());
    }

    #[test]
    fn test_qr_not_full_rank() {
        // Columns are linearly dependent
        let a = DenseMatrix::from_vec(vec![1.0_f64, 2.0, 2.0, 4.0, 3.0, 6.0], 3, 2).unwrap();
        let qr = QrDecomposition::decompose(&a).unwrap();
        assert!(!qr.is_full_rank());
    }

    #[test]
    fn test_qr_solve_not_full_rank() {
        let a = DenseMatrix::from_vec(vec![1.0_f64, 2.0, 2.0, 4.0, 3.0, 6.0], 3, 2).unwrap();
        let b = DenseMatrix::column_vector(vec![1.0_f64, 2.0, 3.0]);
        let qr = QrDecomposition::decompose(&a).unwrap();
        assert!(qr.solve(&b).is_err());
    }

    fn test_matrix(m: usize, n: usize) -> DenseMatrix<f64> {
        let data = (0..m * n)
            .map(|v| ((v * 13 + 5) % 17) as f64 - 8.0 + if v % (n + 1) == 0 { 10.0 } else { 0.0 })
            .collect();
        DenseMatrix::from_vec(data, m, n).unwrap()
    }

    #[test]
    fn test_blocked_matches_unblocked() {
        let a = test_matrix(9, 7);
        let plain = QrDecomposition::decompose(&a).unwrap();
        for width in [1, 2, 3, 7, 100] {
            let blocked = QrDecomposition::decompose_blocked(&a, width).unwrap();
            assert!(approx_eq(blocked.r().as_slice(), plain.r().as_slice(), 1e-12));
            assert!(approx_eq(blocked.q().as_slice(), plain.q().as_slice(), 1e-12));
        }
    }

    #[test]
    fn test_blocked_reconstructs() {
        let a = test_matrix(12, 12);
        let qr = QrDecomposition::decompose_blocked(&a, 5).unwrap();
        let prod = qr.q().matmul(&qr.r()).unwrap();
        assert!(approx_eq(prod.as_slice(), a.as_slice(), 1e-10));
    }

    #[test]
    fn test_column_vector() {
        let a = DenseMatrix::column_vector(vec![3.0_f64, 0.0, 4.0]);
        let qr = QrDecomposition::decompose(&a).unwrap();
        assert!((qr.r_diagonal()[0].abs() - 5.0).abs() < 1e-12);
        assert!(qr.is_full_rank());
    }

    #[test]
    fn test_zero_column_is_skipped() {
        let a = DenseMatrix::from_vec(vec![0.0_f64, 1.0, 0.0, 2.0, 0.0, 3.0], 3, 2).unwrap();
        let qr = QrDecomposition::decompose(&a).unwrap();
        assert!(!qr.is_full_rank());
        assert_eq!(qr.quality(), 0.0);
        let prod = qr.q().matmul(&qr.r()).unwrap();
        assert!(approx_eq(prod.as_slice(), a.as_slice(), 1e-12));
    }

    #[test]
    fn test_solve_multiple_columns() {
        let a = DenseMatrix::from_vec(vec![1.0_f64, 1.0, 1.0, 2.0, 1.0, 3.0], 3, 2).unwrap();
        let b = DenseMatrix::from_vec(vec![6.0, 1.0, 5.0, 3.0, 7.0, 5.0], 3, 2).unwrap();
        let x = QrDecomposition::decompose(&a).unwrap().solve(&b).unwrap();
        // Second column is exactly 2x - 1.
        assert!(approx_eq(x.as_slice(), &[5.0, -1.0, 0.5, 2.0], 1e-10));
    }

    #[test]
    fn test_qr_wide_matrix() {
        // m < n should fail
        let a = DenseMatrix::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        assert!(QrDecomposition::decompose(&a).is_err());
    }

    #[test]
    fn test_qr_solve_dimension_mismatch() {
        let a = DenseMatrix::from_vec(vec![1.0_f64, 0.0, 0.0, 1.0], 2, 2).unwrap();
        let b = DenseMatrix::column_vector(vec![1.0_f64, 2.0, 3.0]);
        let qr = QrDecomposition::decompose(&a).unwrap();
        assert!(qr.solve(&b).is_err());
    }

    #[test]
    fn test_lstsq_4x3_numpy() {
        // >>> A = np.array([[1,1,1],[1,2,4],[1,3,9],[1,4,16]], dtype=float)
        // >>> b = np.array([2,3,5,8], dtype=float)
        // Normal equations solution: x = [2.0, -0.5, 0.5]
        let a = DenseMatrix::from_vec(vec![1.0_f64, 1.0, 1.0, 1.0, 2.0, 4.0, 1.0, 3.0, 9.0, 1.0, 4.0, 16.0], 4, 3).unwrap();
        let b = DenseMatrix::column_vector(vec![2.0_f64, 3.0, 5.0, 8.0]);
        let x = lstsq(&a, &b).unwrap();
        assert!(approx_eq(x.as_slice(), &[2.0, -0.5, 0.5], 1e-10));
    }
}
