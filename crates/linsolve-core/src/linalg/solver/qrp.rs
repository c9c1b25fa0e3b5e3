//! Pseudo-inverse style solver backed by column-pivoted QR.

use crate::Float;
use crate::error::Result;
use crate::linalg::decomp::QrpDecomposition;
use crate::matrix::{DenseMatrix, ops};

use super::{LinearSolver, SolverKind, check_rows, not_ready};

/// How [`QrpSolver`] applies `Q^T` to the right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrpMode {
    /// Apply the stored Householder reflectors to each column of `B`.
    /// Cheapest for a single right-hand side.
    Householder,
    /// Form the first `rank` columns of `Q` once in `set_a` and multiply.
    /// Pays off for many right-hand sides or repeated solves.
    ExplicitQ,
}

/// Solves any system, including singular ones, with
/// [`QrpDecomposition`].
///
/// `set_a` never reports failure: rank deficiency is handled by solving
/// only for the leading `rank` pivoted unknowns. With `minimum_norm` set the
/// remaining freedom is used to return the solution of smallest 2-norm;
/// otherwise the free unknowns are zero (the basic solution).
#[derive(Debug, Clone)]
pub struct QrpSolver<T: Float> {
    mode: QrpMode,
    minimum_norm: bool,
    decomp: Option<QrpDecomposition<T>>,
    /// `Q` restricted to the rank, in [`QrpMode::ExplicitQ`].
    q: Option<DenseMatrix<T>>,
}

impl<T: Float> QrpSolver<T> {
    /// Solver in `mode`; `minimum_norm` selects the smallest-norm solution
    /// for rank-deficient systems.
    pub fn new(mode: QrpMode, minimum_norm: bool) -> Self {
        Self {
            mode,
            minimum_norm,
            decomp: None,
            q: None,
        }
    }

    /// How `Q` is kept after factoring.
    pub fn mode(&self) -> QrpMode {
        self.mode
    }

    /// Whether the minimum 2-norm solution is computed.
    pub fn minimum_norm(&self) -> bool {
        self.minimum_norm
    }

    /// Numerical rank of the last matrix, if any.
    pub fn rank(&self) -> Option<usize> {
        self.decomp.as_ref().map(QrpDecomposition::rank)
    }
}

impl<T: Float> LinearSolver<T> for QrpSolver<T> {
    fn set_a(&mut self, a: &DenseMatrix<T>) -> Result<bool> {
        let qrp = QrpDecomposition::decompose(a);
        self.q = match self.mode {
            QrpMode::ExplicitQ => Some(qrp.q_rank()),
            QrpMode::Householder => None,
        };
        self.decomp = Some(qrp);
        Ok(true)
    }

    fn solve(&self, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
        let qrp = self.decomp.as_ref().ok_or_else(not_ready)?;
        check_rows(qrp.num_rows(), b)?;
        match &self.q {
            Some(q) => qrp.solve_from_qtb(&ops::mult_trans_a(q, b)?, self.minimum_norm),
            None if self.minimum_norm => qrp.solve_minimum_norm(b),
            None => qrp.solve_basic(b),
        }
    }

    fn quality(&self) -> f64 {
        self.decomp
            .as_ref()
            .map_or(0.0, |qrp| ops::quality_triangular(&qrp.r11()))
    }

    fn shape(&self) -> Option<(usize, usize)> {
        self.decomp.as_ref().map(|qrp| (qrp.num_rows(), qrp.num_cols()))
    }

    fn kind(&self) -> SolverKind {
        match self.mode {
            QrpMode::Householder => SolverKind::QrpHouseCol,
            QrpMode::ExplicitQ => SolverKind::PseudoInverseQrp,
        }
    }

    /// The pseudo-inverse (cols x rows); any shape is accepted.
    fn invert(&self) -> Result<DenseMatrix<T>> {
        let (rows, _) = self.shape().ok_or_else(not_ready)?;
        self.solve(&DenseMatrix::identity(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn norm(m: &DenseMatrix<f64>) -> f64 {
        m.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    #[test]
    fn test_singular_system_is_solved() {
        let a = DenseMatrix::from_vec(vec![1.0, 2.0, 1.0, 2.0], 2, 2).unwrap();
        let b = DenseMatrix::column_vector(vec![5.0, 5.0]);
        for mode in [QrpMode::Householder, QrpMode::ExplicitQ] {
            let mut basic = QrpSolver::new(mode, false);
            let mut min = QrpSolver::new(mode, true);
            assert!(basic.set_a(&a).unwrap());
            assert!(min.set_a(&a).unwrap());
            assert_eq!(min.rank(), Some(1));

            let xb = basic.solve(&b).unwrap();
            let xm = min.solve(&b).unwrap();
            assert!(norm(&xm) < norm(&xb));
            assert_approx_eq!(xm.as_slice()[0], 1.0, 1e-10);
            assert_approx_eq!(xm.as_slice()[1], 2.0, 1e-10);
        }
    }

    #[test]
    fn test_pseudo_inverse_of_rank_one() {
        // pinv([[1, 1], [1, 1]]) = [[1, 1], [1, 1]] / 4
        let a = DenseMatrix::from_vec(vec![1.0, 1.0, 1.0, 1.0], 2, 2).unwrap();
        let mut solver = QrpSolver::new(QrpMode::ExplicitQ, true);
        solver.set_a(&a).unwrap();
        let pinv = solver.invert().unwrap();
        for &v in pinv.as_slice() {
            assert_approx_eq!(v, 0.25, 1e-12);
        }
    }

    #[test]
    fn test_kinds_and_flags() {
        let s = QrpSolver::<f64>::new(QrpMode::Householder, true);
        assert_eq!(s.kind(), SolverKind::QrpHouseCol);
        assert!(s.minimum_norm());
        let s = QrpSolver::<f64>::new(QrpMode::ExplicitQ, false);
        assert_eq!(s.kind(), SolverKind::PseudoInverseQrp);
        assert_eq!(s.mode(), QrpMode::ExplicitQ);
        assert!(s.rank().is_none());
    }
}
