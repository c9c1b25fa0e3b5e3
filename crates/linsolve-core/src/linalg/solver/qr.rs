//! Least-squares solver backed by Householder QR.

use log::debug;

use crate::Float;
use crate::error::{CoreError, Result};
use crate::linalg::decomp::QrDecomposition;
use crate::matrix::DenseMatrix;

use super::{LinearSolver, SolverKind, check_rows, not_ready};

/// Solves square or overdetermined systems (`rows >= cols`) in the
/// least-squares sense with [`QrDecomposition`].
///
/// The unblocked variant factors one column at a time; the blocked variant
/// processes panels of columns and is the better choice for wide systems.
#[derive(Debug, Clone)]
pub struct QrSolver<T: Float> {
    /// Panel width, or `None` for the column-at-a-time driver.
    panel: Option<usize>,
    decomp: Option<QrDecomposition<T>>,
    ready: bool,
}

impl<T: Float> QrSolver<T> {
    /// Column-at-a-time Householder solver.
    pub fn house_col() -> Self {
        Self {
            panel: None,
            decomp: None,
            ready: false,
        }
    }

    /// Panel-blocked Householder solver.
    pub fn blocked(width: usize) -> Self {
        Self {
            panel: Some(width.max(1)),
            decomp: None,
            ready: false,
        }
    }

    /// Panel width of the blocked variant.
    pub fn panel_width(&self) -> Option<usize> {
        self.panel
    }
}

impl<T: Float> LinearSolver<T> for QrSolver<T> {
    fn set_a(&mut self, a: &DenseMatrix<T>) -> Result<bool> {
        self.ready = false;
        if a.num_rows() < a.num_cols() {
            return Err(CoreError::InvalidArgument {
                reason: "QR solver requires at least as many rows as columns",
            });
        }
        let qr = match self.panel {
            Some(width) => QrDecomposition::decompose_blocked(a, width)?,
            None => QrDecomposition::decompose(a)?,
        };
        self.ready = qr.is_full_rank();
        if !self.ready {
            debug!("qr solver: {}x{} matrix is rank deficient", a.num_rows(), a.num_cols());
        }
        self.decomp = Some(qr);
        Ok(self.ready)
    }

    fn solve(&self, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
        let qr = self
            .decomp
            .as_ref()
            .filter(|_| self.ready)
            .ok_or_else(not_ready)?;
        check_rows(qr.num_rows(), b)?;
        qr.solve(b)
    }

    fn quality(&self) -> f64 {
        self.decomp.as_ref().map_or(0.0, QrDecomposition::quality)
    }

    fn shape(&self) -> Option<(usize, usize)> {
        self.decomp.as_ref().map(|qr| (qr.num_rows(), qr.num_cols()))
    }

    fn kind(&self) -> SolverKind {
        if self.panel.is_some() {
            SolverKind::QrBlock
        } else {
            SolverKind::QrHouseCol
        }
    }
}
