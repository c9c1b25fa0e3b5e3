//! # linsolve
//!
//! Dense linear system solvers in pure Rust.
//!
//! One `use linsolve::prelude::*;` gives you the matrix type, the Cholesky
//! engine, the solver trait and the configuration used by the
//! solver-selection policy.
//!
//! ## Feature Flags
//!
//! | Feature | Enables |
//! |---------|---------|
//! | `core` *(default)* | Matrices, decompositions, solvers, sampling |

pub use linsolve_core as core;

/// Glob-import convenience: `use linsolve::prelude::*;`
pub mod prelude {
    pub use linsolve_core::prelude::*;
}
