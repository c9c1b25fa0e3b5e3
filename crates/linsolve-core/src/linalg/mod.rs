//! Linear algebra: decompositions and the solvers built on them.
//!
//! All routines are implemented from scratch, with no external BLAS/LAPACK
//! bindings.
//!
//! Decompositions: [`CholeskyDecomposition`], [`LuDecomposition`],
//! [`QrDecomposition`], [`QrpDecomposition`], [`SvdDecomposition`].
//!
//! Solvers: see [`solver`]; [`crate::factory`] picks one for a problem shape.

pub mod decomp;
pub mod solver;

pub use decomp::{
    CholeskyDecomposition, LuDecomposition, QrDecomposition, QrpDecomposition, SvdDecomposition,
    lstsq,
};
pub use solver::{AdjustableLinearSolver, LinearSolver, SolverKind};

use crate::Float;
use crate::error::Result;
use crate::matrix::DenseMatrix;

/// Solve the linear system `AX = B` for a square matrix `A`.
///
/// Uses LU decomposition with partial pivoting internally.
///
/// ```
/// # use linsolve_core::matrix::DenseMatrix;
/// # use linsolve_core::linalg;
/// let a = DenseMatrix::from_vec(vec![2.0_f64, 1.0, 1.0, 4.0], 2, 2).unwrap();
/// let b = DenseMatrix::column_vector(vec![5.0_f64, 6.0]);
/// let x = linalg::solve(&a, &b).unwrap();
/// assert!((x.as_slice()[0] - 2.0).abs() < 1e-10);
/// assert!((x.as_slice()[1] - 1.0).abs() < 1e-10);
/// ```
pub fn solve<T: Float>(a: &DenseMatrix<T>, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
    LuDecomposition::decompose(a)?.solve(b)
}

/// Compute the inverse of a square matrix.
///
/// Uses LU decomposition with partial pivoting internally.
/// Returns [`CoreError::SingularMatrix`](crate::CoreError::SingularMatrix) if the
/// matrix is singular.
///
/// ```
/// # use linsolve_core::matrix::{DenseMatrix, ops};
/// # use linsolve_core::linalg;
/// let a = DenseMatrix::from_vec(vec![2.0_f64, 1.0, 1.0, 4.0], 2, 2).unwrap();
/// let inv = linalg::inv(&a).unwrap();
/// let eye = a.matmul(&inv).unwrap();
/// assert!(ops::is_identical(&eye, &DenseMatrix::identity(2), 1e-10));
/// ```
pub fn inv<T: Float>(a: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
    LuDecomposition::decompose(a)?.inverse()
}

/// Compute the determinant of a square matrix.
///
/// A singular matrix has determinant zero.
///
/// ```
/// # use linsolve_core::matrix::DenseMatrix;
/// # use linsolve_core::linalg;
/// let a = DenseMatrix::from_vec(vec![2.0_f64, 1.0, 1.0, 4.0], 2, 2).unwrap();
/// let det = linalg::det(&a).unwrap();
/// assert!((det - 7.0).abs() < 1e-10);
/// ```
pub fn det<T: Float>(a: &DenseMatrix<T>) -> Result<T> {
    match LuDecomposition::decompose(a) {
        Ok(lu) => Ok(lu.det()),
        Err(crate::CoreError::SingularMatrix) => Ok(T::zero()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_det_singular_is_zero() {
        let a = DenseMatrix::from_vec(vec![1.0, 2.0, 2.0, 4.0], 2, 2).unwrap();
        assert_eq!(det(&a).unwrap(), 0.0);
        assert!(inv(&a).is_err());
    }

    #[test]
    fn test_det_non_square() {
        assert!(det(&DenseMatrix::<f64>::zeros(2, 3)).is_err());
    }
}
