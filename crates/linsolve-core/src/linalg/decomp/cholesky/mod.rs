//! Cholesky decomposition for symmetric positive-definite matrices.
//!
//! Factors a symmetric positive-definite matrix `A` into one of
//!
//! - `A = L L^T`, `L` lower triangular (lower mode), or
//! - `A = R^T R`, `R` upper triangular (upper mode),
//!
//! in place. [`CholeskyDecomposition`] owns the shape checks, the reusable
//! scratch vector and the working buffer; the arithmetic is delegated to a
//! [`CholeskyKernel`] ([`InnerProduct`] or [`Blocked`]).
//!
//! The matrix handed to [`CholeskyDecomposition::decompose`] is moved into the
//! engine and overwritten by the factor. It can be taken back with
//! [`CholeskyDecomposition::take_matrix`].

mod block;
mod inner;

pub use block::{Blocked, DEFAULT_BLOCK_WIDTH};
pub use inner::InnerProduct;

use log::{debug, trace};

use crate::Float;
use crate::error::{CoreError, Result};
use crate::matrix::{DenseMatrix, ops};

/// The arithmetic of a Cholesky factorization.
///
/// Implementations receive an `n x n` row-major buffer holding a symmetric
/// positive-definite matrix and overwrite it with the triangular factor so
/// that `L L^T` (lower) or `R^T R` (upper) reconstructs the input to
/// floating-point tolerance. Only the half being produced may be read as
/// input.
///
/// Returning `false` signals that a diagonal pivot was not strictly positive
/// and the factorization was abandoned; the buffer contents are then
/// unspecified. Not every indefinite matrix is caught.
pub trait CholeskyKernel<T: Float> {
    /// Whether this is a cache-blocked algorithm.
    const BLOCKED: bool;

    /// Short human-readable name, used in log output.
    fn name(&self) -> &'static str;

    /// Compute `L` in the lower half of `t`.
    fn factor_lower(&self, t: &mut [T], n: usize, scratch: &mut [T]) -> bool;

    /// Compute `R` in the upper half of `t`.
    fn factor_upper(&self, t: &mut [T], n: usize, scratch: &mut [T]) -> bool;
}

/// Maps logical lower-triangle coordinates onto the row-major buffer.
///
/// Kernels are written once for the lower factor. In upper mode the
/// coordinates are transposed, so `R[j][i] = L[i][j]`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Orientation {
    pub(crate) n: usize,
    lower: bool,
}

impl Orientation {
    pub(crate) fn lower(n: usize) -> Self {
        Self { n, lower: true }
    }

    pub(crate) fn upper(n: usize) -> Self {
        Self { n, lower: false }
    }

    #[inline]
    pub(crate) fn at(self, row: usize, col: usize) -> usize {
        if self.lower {
            row * self.n + col
        } else {
            col * self.n + row
        }
    }

    /// Zero the half of `t` that the factor does not occupy.
    pub(crate) fn zero_opposite<T: Float>(self, t: &mut [T]) {
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                t[self.at(i, j)] = T::zero();
            }
        }
    }
}

/// Result of [`CholeskyDecomposition::decompose`].
#[derive(Debug, PartialEq)]
pub enum CholeskyOutcome<'a, T: Float> {
    /// The factorization completed. Holds the engine's internal buffer; only
    /// the triangular half is meaningful.
    Factored(&'a DenseMatrix<T>),

    /// A non-positive pivot was met. This is a property of the input, not a
    /// programming error.
    NotPositiveDefinite,
}

impl<T: Float> CholeskyOutcome<'_, T> {
    /// Whether the factorization completed.
    pub fn is_factored(&self) -> bool {
        matches!(self, Self::Factored(_))
    }

    /// The internal factor buffer, if the factorization completed.
    pub fn factor(&self) -> Option<&DenseMatrix<T>> {
        match self {
            Self::Factored(t) => Some(t),
            Self::NotPositiveDefinite => None,
        }
    }
}

/// In-place Cholesky decomposition engine.
///
/// The orientation (lower or upper) is fixed at construction. The scratch
/// vector grows to fit the largest matrix seen and is reused afterwards, so
/// repeated decompositions of same-sized matrices do not allocate.
///
/// ```
/// # use linsolve_core::matrix::{DenseMatrix, ops};
/// # use linsolve_core::linalg::decomp::CholeskyDecomposition;
/// let a = DenseMatrix::from_vec(vec![4.0_f64, 2.0, 2.0, 3.0], 2, 2).unwrap();
/// let mut chol = CholeskyDecomposition::inner(true);
/// assert!(chol.decompose(a.clone()).unwrap().is_factored());
/// let l = chol.triangle().unwrap();
/// let llt = ops::mult_trans_b(&l, &l).unwrap();
/// assert!(ops::is_identical(&llt, &a, 1e-12));
/// ```
#[derive(Debug, Clone)]
pub struct CholeskyDecomposition<T: Float, K: CholeskyKernel<T> = InnerProduct> {
    /// Largest dimension the scratch vector can serve.
    max_width: usize,
    /// Dimension of the last decomposed matrix.
    n: usize,
    /// The decomposed matrix; the caller's buffer, moved in.
    t: Option<DenseMatrix<T>>,
    scratch: Vec<T>,
    lower: bool,
    kernel: K,
}

impl<T: Float> CholeskyDecomposition<T, InnerProduct> {
    /// Engine using the unblocked inner-product kernel.
    pub fn inner(lower: bool) -> Self {
        Self::new(lower, InnerProduct)
    }
}

impl<T: Float> CholeskyDecomposition<T, Blocked> {
    /// Engine using the blocked kernel with the given block width.
    pub fn blocked(lower: bool, width: usize) -> Self {
        Self::new(lower, Blocked::new(width))
    }
}

impl<T: Float, K: CholeskyKernel<T>> CholeskyDecomposition<T, K> {
    /// Create an engine producing a lower (`true`) or upper (`false`) factor.
    pub fn new(lower: bool, kernel: K) -> Self {
        Self {
            max_width: 0,
            n: 0,
            t: None,
            scratch: Vec::new(),
            lower,
            kernel,
        }
    }

    /// `true` if the engine computes `A = L L^T`, `false` for `A = R^T R`.
    pub fn is_lower(&self) -> bool {
        self.lower
    }

    /// Always `true`: [`decompose`](Self::decompose) overwrites its input.
    pub fn input_modified(&self) -> bool {
        true
    }

    /// The kernel performing the arithmetic.
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Dimension of the most recently decomposed matrix.
    pub fn dimension(&self) -> usize {
        self.n
    }

    /// Largest dimension that can be decomposed without reallocating.
    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// The reusable work vector (length [`max_width`](Self::max_width)).
    pub fn scratch(&self) -> &[T] {
        &self.scratch
    }

    /// Preallocate scratch for matrices up to `max_dimension x max_dimension`.
    ///
    /// The scratch vector is resized to exactly `max_dimension`. Returns
    /// `InvalidArgument` for a zero size.
    pub fn reserve(&mut self, max_dimension: usize) -> Result<()> {
        if max_dimension == 0 {
            return Err(CoreError::InvalidArgument {
                reason: "Cholesky reserve size must be positive",
            });
        }
        self.max_width = max_dimension;
        self.scratch = vec![T::zero(); max_dimension];
        Ok(())
    }

    /// Factor `matrix` in place.
    ///
    /// The matrix must be square; anything else is rejected with
    /// `InvalidArgument`. Matrices larger than the current capacity are
    /// accepted and the scratch vector is grown first.
    ///
    /// The matrix is moved into the engine and overwritten by the factor.
    /// [`CholeskyOutcome::NotPositiveDefinite`] is returned when a
    /// non-positive pivot is met; a `Factored` outcome is evidence, not
    /// proof, that the input is positive-definite.
    pub fn decompose(&mut self, matrix: DenseMatrix<T>) -> Result<CholeskyOutcome<'_, T>> {
        if !matrix.is_square() {
            return Err(CoreError::InvalidArgument {
                reason: "Cholesky decomposition requires a square matrix",
            });
        }
        let n = matrix.num_rows();
        if n > self.max_width {
            trace!("cholesky: growing scratch from {} to {n}", self.max_width);
            self.reserve(n)?;
        }
        self.n = n;

        trace!(
            "cholesky: decomposing {n}x{n} ({}, {})",
            self.kernel.name(),
            if self.lower { "lower" } else { "upper" }
        );

        let t = self.t.insert(matrix);
        let completed = if self.lower {
            self.kernel
                .factor_lower(t.as_mut_slice(), n, &mut self.scratch)
        } else {
            self.kernel
                .factor_upper(t.as_mut_slice(), n, &mut self.scratch)
        };

        if completed {
            Ok(CholeskyOutcome::Factored(&*t))
        } else {
            debug!("cholesky: {n}x{n} matrix is not positive definite");
            Ok(CholeskyOutcome::NotPositiveDefinite)
        }
    }

    /// A freshly allocated `n x n` copy of the triangular factor with the
    /// other half zeroed.
    pub fn triangle(&self) -> Result<DenseMatrix<T>> {
        let mut dst = DenseMatrix::zeros(self.n, self.n);
        self.triangle_into(&mut dst)?;
        Ok(dst)
    }

    /// Copy the triangular factor into `dst`, which must be exactly `n x n`.
    ///
    /// `dst` is zero-filled first, so the half the factor does not occupy is
    /// exactly zero.
    pub fn triangle_into(&self, dst: &mut DenseMatrix<T>) -> Result<()> {
        let t = self.t.as_ref().ok_or(CoreError::InvalidArgument {
            reason: "no matrix has been decomposed",
        })?;
        let n = self.n;
        if dst.shape() != (n, n) {
            return Err(CoreError::InvalidArgument {
                reason: "destination must be n x n",
            });
        }

        ops::fill(dst, T::zero());
        for i in 0..n {
            let cols = if self.lower { 0..=i } else { i..=n - 1 };
            for j in cols {
                // SAFETY: i, j < n and both matrices are n x n.
                unsafe { dst.unsafe_set(i, j, t.unsafe_get(i, j)) };
            }
        }
        Ok(())
    }

    /// The live factor buffer, without zero-filling the unused half.
    ///
    /// `None` until a matrix has been decomposed (or after
    /// [`take_matrix`](Self::take_matrix)).
    pub fn internal_triangle(&self) -> Option<&DenseMatrix<T>> {
        self.t.as_ref()
    }

    /// Hand the working buffer back to the caller.
    pub fn take_matrix(&mut self) -> Option<DenseMatrix<T>> {
        self.t.take()
    }
}
