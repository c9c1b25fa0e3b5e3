//! `linsolve-core`: dense linear solvers built around an in-place Cholesky
//! engine.
//!
//! Provides a row-major [`DenseMatrix`], the Cholesky engine with
//! interchangeable kernels, LU / QR / pivoted QR / SVD decompositions, the
//! solvers built on them, a solver-selection policy and a correlated
//! Gaussian sampler.
//!
//! # Design
//!
//! - Generic over floating-point types via the [`Scalar`] / [`Float`] trait
//!   hierarchy.
//! - Decompositions own their working buffers; inputs are moved in and can be
//!   taken back out instead of being aliased.
//! - Selection thresholds live in a [`SolverConfig`] value, not in globals.
//!
//! ```
//! use linsolve_core::prelude::*;
//! use linsolve_core::factory;
//!
//! let a = DenseMatrix::from_vec(vec![4.0_f64, 2.0, 2.0, 3.0], 2, 2).unwrap();
//! let b = DenseMatrix::column_vector(vec![2.0, 1.0]);
//!
//! let mut solver = factory::choose_symmetric_positive_definite(&SolverConfig::default(), 2);
//! assert!(solver.set_a(&a).unwrap());
//! let x = solver.solve(&b).unwrap();
//! assert!((x.as_slice()[0] - 0.5).abs() < 1e-12);
//! assert!(x.as_slice()[1].abs() < 1e-12);
//! ```

pub mod config;
pub mod dtype;
pub mod error;
pub mod factory;
pub mod linalg;
pub mod matrix;
pub mod random;

// Re-export key types at crate root for convenience.
pub use config::{MemoryUsage, SolverConfig};
pub use dtype::{Float, Scalar};
pub use error::{CoreError, Result};
pub use matrix::{DenseMatrix, FixedMatrix3x3};

/// Items intended for glob-import: `use linsolve_core::prelude::*;`
pub mod prelude {
    pub use crate::config::{MemoryUsage, SolverConfig};
    pub use crate::dtype::{Float, Scalar};
    pub use crate::error::{CoreError, Result};
    pub use crate::linalg::decomp::{CholeskyDecomposition, CholeskyOutcome};
    pub use crate::linalg::{AdjustableLinearSolver, LinearSolver, SolverKind};
    pub use crate::matrix::{DenseMatrix, FixedMatrix3x3};
    pub use crate::random::CovarianceSampler;
}
