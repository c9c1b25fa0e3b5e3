//! Configuration consumed by the solver-selection policy.
//!
//! The policy in [`crate::factory`] never reads process-wide state: every
//! threshold and preference it depends on lives in a [`SolverConfig`] value
//! passed in by the caller.

use serde::{Deserialize, Serialize};

use crate::linalg::decomp::cholesky::DEFAULT_BLOCK_WIDTH;
use crate::linalg::decomp::qr::DEFAULT_PANEL_WIDTH;

/// Whether algorithm selection should favour throughput or a bounded
/// memory footprint once a problem is large enough for blocked algorithms.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum MemoryUsage {
    /// Prefer the blocked, cache-friendly algorithms. They allocate more
    /// transient memory.
    #[default]
    Faster,

    /// Prefer the unblocked algorithms, which work inside the input buffer.
    LowMemory,
}

/// Thresholds and preferences governing blocked-versus-unblocked choices.
///
/// ### Default Values
/// - `block_qr_threshold`: `1000`
/// - `block_cholesky_threshold`: `1000`
/// - `memory`: [`MemoryUsage::Faster`]
/// - `block_width`: `60`
/// - `block_width_cholesky`: `20`
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    /// Column count at or above which least-squares problems may use the
    /// blocked QR decomposition.
    pub block_qr_threshold: usize,

    /// Matrix width at or above which symmetric positive-definite systems
    /// may use the blocked Cholesky decomposition.
    pub block_cholesky_threshold: usize,

    /// Tie-break between the blocked and unblocked algorithms for large
    /// problems.
    pub memory: MemoryUsage,

    /// Panel width of the blocked QR decomposition.
    pub block_width: usize,

    /// Block width of the blocked Cholesky decomposition.
    pub block_width_cholesky: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            block_qr_threshold: 1000,
            block_cholesky_threshold: 1000,
            memory: MemoryUsage::Faster,
            block_width: DEFAULT_PANEL_WIDTH,
            block_width_cholesky: DEFAULT_BLOCK_WIDTH,
        }
    }
}

impl SolverConfig {
    /// Same configuration with a different memory preference.
    #[must_use]
    pub fn with_memory(mut self, memory: MemoryUsage) -> Self {
        self.memory = memory;
        self
    }

    /// Same configuration with a different QR blocking threshold.
    #[must_use]
    pub fn with_block_qr_threshold(mut self, threshold: usize) -> Self {
        self.block_qr_threshold = threshold;
        self
    }

    /// Same configuration with a different Cholesky blocking threshold.
    #[must_use]
    pub fn with_block_cholesky_threshold(mut self, threshold: usize) -> Self {
        self.block_cholesky_threshold = threshold;
        self
    }

    /// Same configuration with different block widths (QR, Cholesky).
    ///
    /// Zero widths are clamped to one.
    #[must_use]
    pub fn with_block_widths(mut self, qr: usize, cholesky: usize) -> Self {
        self.block_width = qr.max(1);
        self.block_width_cholesky = cholesky.max(1);
        self
    }
}
