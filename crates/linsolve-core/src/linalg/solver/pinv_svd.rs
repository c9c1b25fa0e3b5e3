//! Pseudo-inverse solver backed by the SVD.

use crate::Float;
use crate::error::Result;
use crate::linalg::decomp::SvdDecomposition;
use crate::matrix::DenseMatrix;

use super::{LinearSolver, SolverKind, check_rows, not_ready};

/// Solves any system with the Moore-Penrose pseudo-inverse
/// `A^+ = V S^+ U^T`.
///
/// The most robust solver for singular or nearly singular systems and the
/// slowest. Singular values at or below `eps * max(m, n) * s_max` are
/// treated as zero, which yields the minimum-norm least-squares solution.
#[derive(Debug, Clone, Default)]
pub struct SvdPseudoInverseSolver<T: Float> {
    svd: Option<SvdDecomposition<T>>,
    shape: Option<(usize, usize)>,
}

impl<T: Float> SvdPseudoInverseSolver<T> {
    /// Solver with no system set.
    pub fn new() -> Self {
        Self {
            svd: None,
            shape: None,
        }
    }

    /// The decomposition from the last `set_a`.
    pub fn decomposition(&self) -> Option<&SvdDecomposition<T>> {
        self.svd.as_ref()
    }
}

impl<T: Float> LinearSolver<T> for SvdPseudoInverseSolver<T> {
    fn set_a(&mut self, a: &DenseMatrix<T>) -> Result<bool> {
        self.svd = Some(SvdDecomposition::decompose(a));
        self.shape = Some(a.shape());
        Ok(true)
    }

    fn solve(&self, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
        let svd = self.svd.as_ref().ok_or_else(not_ready)?;
        let (rows, _) = self.shape.ok_or_else(not_ready)?;
        check_rows(rows, b)?;
        svd.solve(b)
    }

    fn quality(&self) -> f64 {
        self.svd.as_ref().map_or(0.0, SvdDecomposition::quality)
    }

    fn shape(&self) -> Option<(usize, usize)> {
        self.shape
    }

    fn kind(&self) -> SolverKind {
        SolverKind::PseudoInverseSvd
    }

    /// The pseudo-inverse (cols x rows); any shape is accepted.
    fn invert(&self) -> Result<DenseMatrix<T>> {
        self.svd.as_ref().ok_or_else(not_ready)?.pseudo_inverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::solver::{QrpMode, QrpSolver};
    use crate::matrix::ops;

    #[test]
    fn test_matches_qrp_minimum_norm() {
        // Rank 2, 4x3
        let a = DenseMatrix::from_vec(
            vec![1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 1.0, 3.0],
            4,
            3,
        )
        .unwrap();
        let b = DenseMatrix::from_vec(
            vec![1.0, 0.5, 2.0, -1.0, 3.0, 0.0, 4.0, 2.0],
            4,
            2,
        )
        .unwrap();

        let mut svd = SvdPseudoInverseSolver::new();
        let mut qrp = QrpSolver::new(QrpMode::Householder, true);
        assert!(svd.set_a(&a).unwrap());
        assert!(qrp.set_a(&a).unwrap());

        let xs = svd.solve(&b).unwrap();
        let xq = qrp.solve(&b).unwrap();
        assert!(ops::is_identical(&xs, &xq, 1e-10), "{xs}\n{xq}");
        assert!(svd.quality() < 1e-10);
    }

    #[test]
    fn test_invert_wide() {
        let a = DenseMatrix::from_vec(vec![1.0, 0.0, 0.0, 0.0, 2.0, 0.0], 2, 3).unwrap();
        let mut solver = SvdPseudoInverseSolver::new();
        solver.set_a(&a).unwrap();
        let pinv = solver.invert().unwrap();
        assert_eq!(pinv.shape(), (3, 2));
        let apa = a.matmul(&pinv).unwrap().matmul(&a).unwrap();
        assert!(ops::is_identical(&apa, &a, 1e-12));
    }

    #[test]
    fn test_before_set_a() {
        let solver = SvdPseudoInverseSolver::<f64>::new();
        assert!(solver.solve(&DenseMatrix::zeros(1, 1)).is_err());
        assert!(solver.invert().is_err());
        assert!(solver.quality().abs() < f64::EPSILON);
    }
}
