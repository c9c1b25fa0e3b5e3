//! Square solver backed by LU with partial pivoting.

use log::debug;

use crate::Float;
use crate::error::{CoreError, Result};
use crate::linalg::decomp::LuDecomposition;
use crate::matrix::DenseMatrix;

use super::{LinearSolver, SolverKind, check_rows, not_ready};

/// Solves square systems with [`LuDecomposition`].
///
/// ```
/// # use linsolve_core::matrix::DenseMatrix;
/// # use linsolve_core::linalg::solver::{LinearSolver, LuSolver};
/// let a = DenseMatrix::from_vec(vec![2.0_f64, 1.0, 1.0, 4.0], 2, 2).unwrap();
/// let mut solver = LuSolver::new();
/// assert!(solver.set_a(&a).unwrap());
/// let x = solver.solve(&DenseMatrix::column_vector(vec![5.0, 6.0])).unwrap();
/// assert!((x.as_slice()[0] - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LuSolver<T: Float> {
    decomp: Option<LuDecomposition<T>>,
    shape: Option<(usize, usize)>,
}

impl<T: Float> LuSolver<T> {
    /// Solver with no system set.
    pub fn new() -> Self {
        Self {
            decomp: None,
            shape: None,
        }
    }

    /// The factorization from the last successful `set_a`.
    pub fn decomposition(&self) -> Option<&LuDecomposition<T>> {
        self.decomp.as_ref()
    }
}

impl<T: Float> LinearSolver<T> for LuSolver<T> {
    fn set_a(&mut self, a: &DenseMatrix<T>) -> Result<bool> {
        self.decomp = None;
        self.shape = Some(a.shape());
        match LuDecomposition::decompose(a) {
            Ok(lu) => {
                self.decomp = Some(lu);
                Ok(true)
            }
            Err(CoreError::SingularMatrix) => {
                debug!("lu solver: {}x{} matrix is singular", a.num_rows(), a.num_cols());
                Ok(false)
            }
            Err(e) => {
                self.shape = None;
                Err(e)
            }
        }
    }

    fn solve(&self, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
        let lu = self.decomp.as_ref().ok_or_else(not_ready)?;
        check_rows(lu.dimension(), b)?;
        lu.solve(b)
    }

    fn quality(&self) -> f64 {
        self.decomp.as_ref().map_or(0.0, LuDecomposition::quality)
    }

    fn shape(&self) -> Option<(usize, usize)> {
        self.shape
    }

    fn kind(&self) -> SolverKind {
        SolverKind::Lu
    }
}
