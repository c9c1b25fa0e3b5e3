//! Linear solvers built on the decompositions in [`decomp`](super::decomp).
//!
//! Every solver follows the same two-step protocol: [`LinearSolver::set_a`]
//! factors the system matrix, then [`LinearSolver::solve`] may be called any
//! number of times with different right-hand sides. Solvers copy their
//! inputs; neither `A` nor `B` is modified.
//!
//! | Solver                     | Kind(s)                                   | System        |
//! |----------------------------|-------------------------------------------|---------------|
//! | [`LuSolver`]               | `Lu`                                      | square        |
//! | [`CholeskySolver`]         | `Cholesky`, `CholeskyBlock`               | SPD           |
//! | [`QrSolver`]               | `QrHouseCol`, `QrBlock`                   | `m >= n`      |
//! | [`QrpSolver`]              | `QrpHouseCol`, `PseudoInverseQrp`         | any, singular |
//! | [`SvdPseudoInverseSolver`] | `PseudoInverseSvd`                        | any, singular |
//! | [`AdjustableQrSolver`]     | `AdjustableQr`                            | `m >= n`      |

mod adjustable;
mod chol;
mod lu;
mod pinv_svd;
mod qr;
mod qrp;

pub use adjustable::AdjustableQrSolver;
pub use chol::CholeskySolver;
pub use lu::LuSolver;
pub use pinv_svd::SvdPseudoInverseSolver;
pub use qr::QrSolver;
pub use qrp::{QrpMode, QrpSolver};

use core::fmt;

use crate::Float;
use crate::error::{CoreError, Result};
use crate::matrix::DenseMatrix;

/// Identifies the algorithm behind a [`LinearSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverKind {
    /// LU with partial pivoting.
    Lu,
    /// Unblocked inner-product Cholesky.
    Cholesky,
    /// Blocked Cholesky.
    CholeskyBlock,
    /// Column-at-a-time Householder QR.
    QrHouseCol,
    /// Panel-blocked Householder QR.
    QrBlock,
    /// Column-pivoted QR applying the reflectors to each right-hand side.
    QrpHouseCol,
    /// Column-pivoted QR with `Q` formed explicitly.
    PseudoInverseQrp,
    /// SVD pseudo-inverse.
    PseudoInverseSvd,
    /// QR that can add and remove rows of `A`.
    AdjustableQr,
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lu => "lu",
            Self::Cholesky => "cholesky",
            Self::CholeskyBlock => "cholesky-block",
            Self::QrHouseCol => "qr-house-col",
            Self::QrBlock => "qr-block",
            Self::QrpHouseCol => "qrp-house-col",
            Self::PseudoInverseQrp => "pinv-qrp",
            Self::PseudoInverseSvd => "pinv-svd",
            Self::AdjustableQr => "adjustable-qr",
        };
        f.write_str(name)
    }
}

/// Solves `A X = B` for `X`.
pub trait LinearSolver<T: Float> {
    /// Factor `a`.
    ///
    /// Returns `Ok(false)` when the factorization failed numerically (the
    /// matrix is singular or, for Cholesky, not positive-definite) and
    /// `Err` when `a` has a shape the solver cannot handle. After `Ok(false)`
    /// [`solve`](Self::solve) is unavailable until the next successful call.
    fn set_a(&mut self, a: &DenseMatrix<T>) -> Result<bool>;

    /// Solve for every column of `b`.
    ///
    /// `b` must have as many rows as `A`; the result has as many rows as `A`
    /// has columns.
    fn solve(&self, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>>;

    /// How close `A` is to singular: 0 is singular, 1 is perfectly
    /// conditioned. Only meaningful relative to the same solver kind.
    fn quality(&self) -> f64;

    /// `(rows, cols)` of the last matrix passed to [`set_a`](Self::set_a).
    fn shape(&self) -> Option<(usize, usize)>;

    /// Which algorithm this solver runs.
    fn kind(&self) -> SolverKind;

    /// Invert `A` by solving against the identity.
    ///
    /// Only square systems can be inverted; pseudo-inverse solvers override
    /// this to return the Moore-Penrose inverse of any shape.
    fn invert(&self) -> Result<DenseMatrix<T>> {
        let (rows, cols) = self.shape().ok_or_else(not_ready)?;
        if rows != cols {
            return Err(CoreError::InvalidArgument {
                reason: "only square matrices can be inverted",
            });
        }
        self.solve(&DenseMatrix::identity(rows))
    }

    /// Whether `set_a` writes into its argument. Always `false`.
    fn modifies_a(&self) -> bool {
        false
    }

    /// Whether `solve` writes into its argument. Always `false`.
    fn modifies_b(&self) -> bool {
        false
    }
}

/// A [`LinearSolver`] whose factorization can be updated when a row of `A`
/// is added or removed, instead of being recomputed.
pub trait AdjustableLinearSolver<T: Float>: LinearSolver<T> {
    /// Insert `row` so that it becomes row `index` of `A`.
    ///
    /// Returns whether the updated system still has full column rank.
    fn add_row_to_a(&mut self, row: &[T], index: usize) -> Result<bool>;

    /// Remove row `index` of `A`.
    ///
    /// Returns whether the updated system still has full column rank.
    fn remove_row_from_a(&mut self, index: usize) -> Result<bool>;
}

pub(crate) fn not_ready() -> CoreError {
    CoreError::InvalidArgument {
        reason: "solve requires a successful set_a first",
    }
}

pub(crate) fn check_rows<T: Float>(rows: usize, b: &DenseMatrix<T>) -> Result<()> {
    if b.num_rows() != rows {
        return Err(CoreError::DimensionMismatch {
            expected: (rows, b.num_cols()),
            got: b.shape(),
        });
    }
    Ok(())
}
