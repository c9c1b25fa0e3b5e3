//! Symmetric positive-definite solver backed by the Cholesky engine.

use log::debug;

use crate::Float;
use crate::error::{CoreError, Result};
use crate::linalg::decomp::{Blocked, CholeskyDecomposition, CholeskyKernel, InnerProduct};
use crate::matrix::{DenseMatrix, ops};

use super::{LinearSolver, SolverKind, check_rows, not_ready};

/// Solves `A X = B` for symmetric positive-definite `A` via `A = L L^T`.
///
/// Only the lower triangle of `A` is read. The engine's buffer is reused
/// between calls to [`set_a`](LinearSolver::set_a) with equally sized
/// matrices.
#[derive(Debug, Clone)]
pub struct CholeskySolver<T: Float, K: CholeskyKernel<T> = InnerProduct> {
    engine: CholeskyDecomposition<T, K>,
    ready: bool,
}

impl<T: Float> CholeskySolver<T, InnerProduct> {
    /// Solver using the unblocked inner-product kernel.
    pub fn inner() -> Self {
        Self::new(InnerProduct)
    }
}

impl<T: Float> CholeskySolver<T, Blocked> {
    /// Solver using the blocked kernel with the given block width.
    pub fn blocked(width: usize) -> Self {
        Self::new(Blocked::new(width))
    }
}

impl<T: Float, K: CholeskyKernel<T>> CholeskySolver<T, K> {
    /// Solver factoring with `kernel` (lower orientation).
    pub fn new(kernel: K) -> Self {
        Self {
            engine: CholeskyDecomposition::new(true, kernel),
            ready: false,
        }
    }

    /// The underlying decomposition engine.
    pub fn engine(&self) -> &CholeskyDecomposition<T, K> {
        &self.engine
    }

    fn factor(&self) -> Result<&DenseMatrix<T>> {
        if !self.ready {
            return Err(not_ready());
        }
        self.engine.internal_triangle().ok_or_else(not_ready)
    }
}

/// Solve `L L^T x = b` in place, reading only the lower triangle of `l`.
fn substitute<T: Float>(l: &DenseMatrix<T>, x: &mut [T]) {
    let n = l.num_rows();
    // Forward: L y = b
    for i in 0..n {
        let row = l.row(i);
        let mut s = x[i];
        for (k, &lik) in row[..i].iter().enumerate() {
            s -= lik * x[k];
        }
        x[i] = s / row[i];
    }
    // Backward: L^T x = y
    for i in (0..n).rev() {
        let mut s = x[i];
        for k in (i + 1)..n {
            // SAFETY: i < k < n and `l` is n x n.
            s -= unsafe { l.unsafe_get(k, i) } * x[k];
        }
        x[i] = s / l.row(i)[i];
    }
}

impl<T: Float, K: CholeskyKernel<T>> LinearSolver<T> for CholeskySolver<T, K> {
    fn set_a(&mut self, a: &DenseMatrix<T>) -> Result<bool> {
        self.ready = false;
        if !a.is_square() {
            return Err(CoreError::InvalidArgument {
                reason: "Cholesky solver requires a square matrix",
            });
        }

        let buffer = match self.engine.take_matrix() {
            Some(mut buf) if buf.shape() == a.shape() => {
                buf.as_mut_slice().copy_from_slice(a.as_slice());
                buf
            }
            _ => a.clone(),
        };

        self.ready = self.engine.decompose(buffer)?.is_factored();
        if !self.ready {
            debug!("cholesky solver: matrix rejected as not positive definite");
        }
        Ok(self.ready)
    }

    fn solve(&self, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
        let l = self.factor()?;
        check_rows(l.num_rows(), b)?;

        let mut x = DenseMatrix::zeros(b.num_rows(), b.num_cols());
        for col in 0..b.num_cols() {
            let mut column = ops::extract_column(b, col);
            substitute(l, &mut column);
            ops::set_column(&mut x, col, &column);
        }
        Ok(x)
    }

    fn quality(&self) -> f64 {
        self.factor().map_or(0.0, ops::quality_triangular)
    }

    fn shape(&self) -> Option<(usize, usize)> {
        self.engine
            .internal_triangle()
            .map(|_| (self.engine.dimension(), self.engine.dimension()))
    }

    fn kind(&self) -> SolverKind {
        if K::BLOCKED {
            SolverKind::CholeskyBlock
        } else {
            SolverKind::Cholesky
        }
    }
}
