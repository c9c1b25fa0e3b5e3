//! Solver selection.
//!
//! Each `choose_*` function inspects the problem shape (and a
//! [`SolverConfig`] where blocking is an option) and hands back a fresh,
//! unconfigured solver. Nothing here factors a matrix; call
//! [`LinearSolver::set_a`] on the result.
//!
//! ```
//! use linsolve_core::config::{MemoryUsage, SolverConfig};
//! use linsolve_core::factory;
//! use linsolve_core::linalg::SolverKind;
//!
//! let config = SolverConfig::default();
//! let solver = factory::choose_least_squares::<f64>(&config, 5000, 2000);
//! assert_eq!(solver.kind(), SolverKind::QrBlock);
//!
//! let config = config.with_memory(MemoryUsage::LowMemory);
//! let solver = factory::choose_least_squares::<f64>(&config, 5000, 2000);
//! assert_eq!(solver.kind(), SolverKind::QrHouseCol);
//! ```

use log::debug;

use crate::Float;
use crate::config::{MemoryUsage, SolverConfig};
use crate::linalg::solver::{
    AdjustableQrSolver, CholeskySolver, LinearSolver, LuSolver, QrSolver, QrpMode, QrpSolver,
    SvdPseudoInverseSolver,
};

/// Solver for a general `rows x cols` system: LU when square, least squares
/// otherwise.
pub fn choose_general<T: Float>(
    config: &SolverConfig,
    rows: usize,
    cols: usize,
) -> Box<dyn LinearSolver<T>> {
    if rows == cols {
        choose_square(rows)
    } else {
        choose_least_squares(config, rows, cols)
    }
}

/// Solver for a square `size x size` system.
pub fn choose_square<T: Float>(size: usize) -> Box<dyn LinearSolver<T>> {
    debug!("selecting LU for {size}x{size} system");
    Box::new(LuSolver::new())
}

/// Least-squares solver for a `rows x cols` system.
///
/// Wide systems (`cols >= block_qr_threshold`) use the blocked QR unless the
/// configuration asks for [`MemoryUsage::LowMemory`].
pub fn choose_least_squares<T: Float>(
    config: &SolverConfig,
    rows: usize,
    cols: usize,
) -> Box<dyn LinearSolver<T>> {
    if cols >= config.block_qr_threshold && config.memory == MemoryUsage::Faster {
        debug!(
            "selecting blocked QR (width {}) for {rows}x{cols} system",
            config.block_width
        );
        Box::new(QrSolver::blocked(config.block_width))
    } else {
        debug!("selecting Householder QR for {rows}x{cols} system");
        Box::new(QrSolver::house_col())
    }
}

/// Solver for a symmetric positive-definite `size x size` system.
///
/// Large systems (`size >= block_cholesky_threshold`) use the blocked
/// Cholesky kernel unless the configuration asks for
/// [`MemoryUsage::LowMemory`].
pub fn choose_symmetric_positive_definite<T: Float>(
    config: &SolverConfig,
    size: usize,
) -> Box<dyn LinearSolver<T>> {
    if size >= config.block_cholesky_threshold && config.memory == MemoryUsage::Faster {
        debug!(
            "selecting blocked Cholesky (width {}) for {size}x{size} system",
            config.block_width_cholesky
        );
        Box::new(CholeskySolver::blocked(config.block_width_cholesky))
    } else {
        debug!("selecting inner-product Cholesky for {size}x{size} system");
        Box::new(CholeskySolver::inner())
    }
}

/// Column-pivoted QR solver for systems that may be singular.
///
/// With `minimum_norm` the solution of a rank-deficient system has the
/// smallest 2-norm; otherwise the free variables are zero. `precompute_q`
/// forms `Q` explicitly at factoring time.
pub fn choose_qr_with_column_pivoting<T: Float>(
    minimum_norm: bool,
    precompute_q: bool,
) -> Box<dyn LinearSolver<T>> {
    let mode = if precompute_q {
        QrpMode::ExplicitQ
    } else {
        QrpMode::Householder
    };
    debug!("selecting pivoted QR ({mode:?}, minimum_norm = {minimum_norm})");
    Box::new(QrpSolver::new(mode, minimum_norm))
}

/// Pseudo-inverse solver: SVD when `prefer_svd`, pivoted QR otherwise.
///
/// The SVD is more robust, the pivoted QR faster.
pub fn choose_pseudo_inverse<T: Float>(prefer_svd: bool) -> Box<dyn LinearSolver<T>> {
    if prefer_svd {
        debug!("selecting SVD pseudo-inverse");
        Box::new(SvdPseudoInverseSolver::new())
    } else {
        choose_qr_with_column_pivoting(true, false)
    }
}

/// QR solver whose system can gain or lose rows after factoring.
pub fn choose_adjustable<T: Float>() -> AdjustableQrSolver<T> {
    debug!("selecting adjustable QR");
    AdjustableQrSolver::new()
}
