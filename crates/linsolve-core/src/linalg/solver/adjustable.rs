//! QR solver whose factorization follows row insertions and removals.

use log::trace;

use crate::Float;
use crate::error::{CoreError, Result};
use crate::linalg::decomp::QrDecomposition;
use crate::matrix::{DenseMatrix, ops};

use super::{AdjustableLinearSolver, LinearSolver, SolverKind, check_rows, not_ready};

/// Least-squares solver keeping the full `Q` (m x m) and `R` (m x n) so that
/// rows of `A` can be added or removed with Givens rotations in `O(m^2)`
/// instead of refactoring in `O(m n^2)`.
///
/// ```
/// # use linsolve_core::matrix::DenseMatrix;
/// # use linsolve_core::linalg::solver::{AdjustableLinearSolver, AdjustableQrSolver, LinearSolver};
/// let a = DenseMatrix::from_vec(vec![1.0_f64, 1.0, 1.0, 2.0], 2, 2).unwrap();
/// let mut solver = AdjustableQrSolver::new();
/// solver.set_a(&a).unwrap();
/// // Add the observation x + 3y = 7 as a third row.
/// assert!(solver.add_row_to_a(&[1.0, 3.0], 2).unwrap());
/// assert_eq!(solver.shape(), Some((3, 2)));
/// ```
#[derive(Debug, Clone)]
pub struct AdjustableQrSolver<T: Float> {
    q: DenseMatrix<T>,
    r: DenseMatrix<T>,
    ready: bool,
}

impl<T: Float> AdjustableQrSolver<T> {
    /// Solver with no system set.
    pub fn new() -> Self {
        Self {
            q: DenseMatrix::zeros(0, 0),
            r: DenseMatrix::zeros(0, 0),
            ready: false,
        }
    }

    /// The orthogonal factor (m x m).
    pub fn q(&self) -> &DenseMatrix<T> {
        &self.q
    }

    /// The upper triangular factor (m x n).
    pub fn r(&self) -> &DenseMatrix<T> {
        &self.r
    }

    fn has_full_rank(&self) -> bool {
        let n = self.r.num_cols();
        let diag: Vec<T> = (0..n).map(|i| self.r.row(i)[i].abs()).collect();
        let largest = diag.iter().fold(T::zero(), |acc, &d| acc.max(d));
        let threshold = T::epsilon() * T::from_usize(self.r.num_rows().max(n)) * largest;
        diag.iter().all(|&d| d > threshold)
    }

    fn refresh(&mut self) -> bool {
        self.ready = self.r.num_rows() >= self.r.num_cols() && self.has_full_rank();
        self.ready
    }
}

impl<T: Float> Default for AdjustableQrSolver<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Givens rotation `(c, s)` mapping `(a, b)` onto `(hypot(a, b), 0)`.
fn givens<T: Float>(a: T, b: T) -> Option<(T, T)> {
    let r = a.hypot(b);
    if r == T::zero() {
        None
    } else {
        Some((a / r, b / r))
    }
}

/// `[x; y] <- [[c, s], [-s, c]] [x; y]`, element-wise.
fn rotate<T: Float>(x: &mut [T], y: &mut [T], c: T, s: T) {
    for (xi, yi) in x.iter_mut().zip(y.iter_mut()) {
        let (a, b) = (*xi, *yi);
        *xi = c * a + s * b;
        *yi = c * b - s * a;
    }
}

/// Rotate rows `i` and `i + 1` of `m`.
fn rotate_rows<T: Float>(m: &mut DenseMatrix<T>, i: usize, c: T, s: T) {
    let cols = m.num_cols();
    let (upper, lower) = m.as_mut_slice().split_at_mut((i + 1) * cols);
    rotate(&mut upper[i * cols..], &mut lower[..cols], c, s);
}

/// Rotate columns `j` and `j + 1` of `m`.
fn rotate_cols<T: Float>(m: &mut DenseMatrix<T>, j: usize, c: T, s: T) {
    let cols = m.num_cols();
    for row in m.as_mut_slice().chunks_exact_mut(cols) {
        let (a, b) = (row[j], row[j + 1]);
        row[j] = c * a + s * b;
        row[j + 1] = c * b - s * a;
    }
}

impl<T: Float> LinearSolver<T> for AdjustableQrSolver<T> {
    fn set_a(&mut self, a: &DenseMatrix<T>) -> Result<bool> {
        self.ready = false;
        if a.num_rows() < a.num_cols() {
            return Err(CoreError::InvalidArgument {
                reason: "adjustable QR requires at least as many rows as columns",
            });
        }
        let qr = QrDecomposition::decompose(a)?;
        self.q = qr.q();
        self.r = qr.r();
        Ok(self.refresh())
    }

    fn solve(&self, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
        if !self.ready {
            return Err(not_ready());
        }
        check_rows(self.q.num_rows(), b)?;
        let n = self.r.num_cols();

        let qtb = ops::mult_trans_a(&self.q, b)?;
        let mut x = DenseMatrix::zeros(n, b.num_cols());
        for col in 0..b.num_cols() {
            let mut y = ops::extract_column(&qtb, col);
            for i in (0..n).rev() {
                let row = self.r.row(i);
                let mut s = y[i];
                for j in (i + 1)..n {
                    s -= row[j] * y[j];
                }
                y[i] = s / row[i];
            }
            ops::set_column(&mut x, col, &y[..n]);
        }
        Ok(x)
    }

    fn quality(&self) -> f64 {
        if self.r.is_empty() {
            0.0
        } else {
            ops::quality_triangular(&self.r)
        }
    }

    fn shape(&self) -> Option<(usize, usize)> {
        (!self.q.is_empty()).then(|| self.r.shape())
    }

    fn kind(&self) -> SolverKind {
        SolverKind::AdjustableQr
    }
}

impl<T: Float> AdjustableLinearSolver<T> for AdjustableQrSolver<T> {
    fn add_row_to_a(&mut self, row: &[T], index: usize) -> Result<bool> {
        let (m, n) = self.r.shape();
        if self.q.is_empty() {
            return Err(not_ready());
        }
        if row.len() != n {
            return Err(CoreError::DimensionMismatch {
                expected: (1, n),
                got: (1, row.len()),
            });
        }
        if index > m {
            return Err(CoreError::IndexOutOfBounds {
                index: (index, 0),
                shape: (m + 1, n),
            });
        }
        trace!("adjustable qr: inserting row {index} into {m}x{n} system");

        // With the new row moved to the top, A' = diag(1, Q) [row; R] and
        // [row; R] is upper Hessenberg.
        let mut q = DenseMatrix::zeros(m + 1, m + 1);
        q.row_mut(index)[0] = T::one();
        for i in 0..m {
            let dst = if i < index { i } else { i + 1 };
            q.row_mut(dst)[1..].copy_from_slice(self.q.row(i));
        }
        let mut h = DenseMatrix::zeros(m + 1, n);
        h.row_mut(0).copy_from_slice(row);
        for i in 0..m {
            h.row_mut(i + 1).copy_from_slice(self.r.row(i));
        }

        for k in 0..n.min(m) {
            if let Some((c, s)) = givens(h.row(k)[k], h.row(k + 1)[k]) {
                rotate_rows(&mut h, k, c, s);
                rotate_cols(&mut q, k, c, s);
                h.row_mut(k + 1)[k] = T::zero();
            }
        }

        self.q = q;
        self.r = h;
        Ok(self.refresh())
    }

    fn remove_row_from_a(&mut self, index: usize) -> Result<bool> {
        let (m, n) = self.r.shape();
        if self.q.is_empty() {
            return Err(not_ready());
        }
        if index >= m {
            return Err(CoreError::IndexOutOfBounds {
                index: (index, 0),
                shape: (m, n),
            });
        }
        if m - 1 < n {
            return Err(CoreError::InvalidArgument {
                reason: "removing the row would leave fewer rows than columns",
            });
        }
        trace!("adjustable qr: removing row {index} from {m}x{n} system");

        // Rotate row `index` of Q onto +-e_0; R picks up one subdiagonal.
        for j in (1..m).rev() {
            let (a, b) = (self.q.row(index)[j - 1], self.q.row(index)[j]);
            if let Some((c, s)) = givens(a, b) {
                rotate_cols(&mut self.q, j - 1, c, s);
                rotate_rows(&mut self.r, j - 1, c, s);
            }
        }

        // Drop row `index` and column 0 of Q, and row 0 of R.
        let mut q = DenseMatrix::zeros(m - 1, m - 1);
        for i in 0..m {
            if i == index {
                continue;
            }
            let dst = if i < index { i } else { i - 1 };
            q.row_mut(dst).copy_from_slice(&self.q.row(i)[1..]);
        }
        let r = DenseMatrix::from_slice(&self.r.as_slice()[n..], m - 1, n)?;

        self.q = q;
        self.r = r;
        Ok(self.refresh())
    }
}
