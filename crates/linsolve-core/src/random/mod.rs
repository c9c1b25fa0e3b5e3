//! Correlated Gaussian sampling.
//!
//! [`CovarianceSampler`] draws vectors `x = L r` with covariance `Σ = L L^T`
//! from independent standard-normal draws `r`, where `L` is the lower
//! Cholesky factor of `Σ`.
//!
//! # Design
//!
//! - **Explicit state**: the sampler owns its generator; there is no hidden
//!   global or thread-local state.
//! - Generators and distributions come from `rand` / `rand_distr`, so any
//!   seeded [`Rng`] works and tests are reproducible with
//!   `StdRng::seed_from_u64`.

use log::trace;
use rand::Rng;
use rand::distributions::Distribution;
use rand_distr::StandardNormal;

use crate::Float;
use crate::error::{CoreError, Result};
use crate::linalg::decomp::CholeskyDecomposition;
use crate::matrix::{DenseMatrix, ops};

/// Draws random vectors from `N(0, Σ)`, added onto a caller-supplied mean.
///
/// # Examples
///
/// ```
/// use linsolve_core::matrix::DenseMatrix;
/// use linsolve_core::random::CovarianceSampler;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let cov = DenseMatrix::from_vec(vec![2.0_f64, 1.0, 1.0, 2.0], 2, 2).unwrap();
/// let mut sampler = CovarianceSampler::new(StdRng::seed_from_u64(42), &cov).unwrap();
///
/// let mut x = DenseMatrix::column_vector(vec![10.0, -10.0]); // the mean
/// sampler.draw(&mut x).unwrap();
/// assert!(sampler.likelihood_of_last_draw().unwrap() <= 1.0);
/// ```
pub struct CovarianceSampler<T: Float, R: Rng, D: Distribution<f64> = StandardNormal> {
    rng: R,
    dist: D,
    /// Lower triangular factor, zero above the diagonal.
    factor: DenseMatrix<T>,
    /// The last vector of independent draws (n x 1).
    r: DenseMatrix<T>,
    drawn: bool,
}

impl<T: Float, R: Rng> CovarianceSampler<T, R, StandardNormal> {
    /// Sampler drawing from the standard normal distribution.
    ///
    /// `cov` is copied; the caller's matrix is left untouched. Fails with
    /// `InvalidArgument` for a non-square matrix and with
    /// [`CoreError::NotPositiveDefinite`] when the Cholesky decomposition
    /// rejects `cov`.
    pub fn new(rng: R, cov: &DenseMatrix<T>) -> Result<Self> {
        Self::with_distribution(rng, StandardNormal, cov)
    }
}

impl<T: Float, R: Rng, D: Distribution<f64>> CovarianceSampler<T, R, D> {
    /// Sampler drawing the independent components from `dist`.
    ///
    /// The likelihood reported by
    /// [`likelihood_of_last_draw`](Self::likelihood_of_last_draw) assumes the
    /// components are standard normal.
    pub fn with_distribution(rng: R, dist: D, cov: &DenseMatrix<T>) -> Result<Self> {
        let mut chol = CholeskyDecomposition::inner(true);
        if !chol.decompose(cov.clone())?.is_factored() {
            return Err(CoreError::NotPositiveDefinite);
        }
        let factor = chol.triangle()?;
        let n = factor.num_rows();
        trace!("covariance sampler: factored {n}x{n} covariance");

        Ok(Self {
            rng,
            dist,
            factor,
            r: DenseMatrix::zeros(n, 1),
            drawn: false,
        })
    }

    /// Dimension of the sampled vectors.
    pub fn dimension(&self) -> usize {
        self.factor.num_rows()
    }

    /// The lower Cholesky factor `L` of the covariance.
    pub fn factor(&self) -> &DenseMatrix<T> {
        &self.factor
    }

    /// Add one random draw from `N(0, Σ)` to `x`, which must be `n x 1`.
    ///
    /// `x` is not cleared: pass zeros for a centered draw, or the mean to
    /// draw around it.
    pub fn draw(&mut self, x: &mut DenseMatrix<T>) -> Result<()> {
        let n = self.dimension();
        if x.shape() != (n, 1) {
            return Err(CoreError::DimensionMismatch {
                expected: (n, 1),
                got: x.shape(),
            });
        }
        for ri in self.r.as_mut_slice() {
            *ri = T::from_f64(self.dist.sample(&mut self.rng));
        }
        self.drawn = true;
        ops::mult_add(&self.factor, &self.r, x)
    }

    /// Unnormalized likelihood of the last independent draws,
    /// `Π exp(-r_i^2 / 2)`, in `(0, 1]`.
    ///
    /// `None` until [`draw`](Self::draw) has been called.
    pub fn likelihood_of_last_draw(&self) -> Option<f64> {
        self.drawn.then(|| {
            self.r
                .iter()
                .map(|&ri| (-(ri * ri) / T::from_f64(2.0)).exp().to_f64())
                .product()
        })
    }
}
