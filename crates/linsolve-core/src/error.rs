use thiserror::Error;

/// All errors returned by `linsolve-core`.
///
/// Every variant is a caller contract violation. Numerical conditions such as
/// a singular system or a matrix that is not positive-definite are reported
/// through return values (`bool`, [`CholeskyOutcome`], `quality`) instead,
/// with the single exception of [`CoreError::NotPositiveDefinite`], which is
/// raised when an object cannot be constructed at all.
///
/// [`CholeskyOutcome`]: crate::linalg::decomp::CholeskyOutcome
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Operand dimensions do not match the required layout.
    #[error("dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// A buffer length does not agree with the requested dimensions.
    #[error("invalid shape {rows}x{cols} for {len} elements: {reason}")]
    InvalidShape {
        rows: usize,
        cols: usize,
        len: usize,
        reason: &'static str,
    },

    /// A `(row, col)` index is out of bounds.
    #[error("index {index:?} out of bounds for shape {shape:?}")]
    IndexOutOfBounds {
        index: (usize, usize),
        shape: (usize, usize),
    },

    /// Matrix is singular and cannot be inverted / decomposed.
    #[error("singular matrix")]
    SingularMatrix,

    /// A matrix required to be positive-definite was rejected by the
    /// Cholesky decomposition.
    #[error("matrix is not positive definite")]
    NotPositiveDefinite,

    /// The operation is not supported for the given input.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: &'static str },
}

/// Convenience alias used throughout `linsolve-core`.
pub type Result<T> = std::result::Result<T, CoreError>;
