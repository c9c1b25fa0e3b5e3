//! Cache-blocked (right-looking) Cholesky kernel.

use crate::Float;

use super::{CholeskyKernel, Orientation};

/// Default block width, chosen so a block row fits comfortably in L1.
pub const DEFAULT_BLOCK_WIDTH: usize = 20;

/// Right-looking blocked algorithm.
///
/// The matrix is processed in column blocks of `width`: factor the diagonal
/// block, solve the panel below it, then subtract the panel's outer product
/// from the trailing submatrix. The trailing update streams one panel row at
/// a time through the scratch vector.
///
/// Unlike [`InnerProduct`](super::InnerProduct) this kernel leaves the unused
/// half of the buffer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blocked {
    width: usize,
}

impl Blocked {
    /// A blocked kernel with the given block width (clamped to at least 1).
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    /// The block width.
    pub fn width(&self) -> usize {
        self.width
    }
}

impl Default for Blocked {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_WIDTH)
    }
}

impl<T: Float> CholeskyKernel<T> for Blocked {
    const BLOCKED: bool = true;

    fn name(&self) -> &'static str {
        "blocked"
    }

    fn factor_lower(&self, t: &mut [T], n: usize, scratch: &mut [T]) -> bool {
        factor(t, Orientation::lower(n), self.width, scratch)
    }

    fn factor_upper(&self, t: &mut [T], n: usize, scratch: &mut [T]) -> bool {
        factor(t, Orientation::upper(n), self.width, scratch)
    }
}

#[allow(clippy::neg_cmp_op_on_partial_ord)]
fn factor<T: Float>(t: &mut [T], o: Orientation, width: usize, scratch: &mut [T]) -> bool {
    let n = o.n;
    let mut k0 = 0;
    while k0 < n {
        let k1 = (k0 + width).min(n);

        // Diagonal block: contributions of earlier blocks were already
        // subtracted by their trailing updates.
        for j in k0..k1 {
            let mut sum = t[o.at(j, j)];
            for k in k0..j {
                let l = t[o.at(j, k)];
                sum -= l * l;
            }
            if !(sum > T::zero()) {
                return false;
            }
            let diag = sum.sqrt();
            t[o.at(j, j)] = diag;
            let inv_diag = diag.recip();

            for i in (j + 1)..k1 {
                let mut s = t[o.at(i, j)];
                for k in k0..j {
                    s -= t[o.at(i, k)] * t[o.at(j, k)];
                }
                t[o.at(i, j)] = s * inv_diag;
            }
        }

        // Panel: L21 = A21 * L11^-T
        for i in k1..n {
            for j in k0..k1 {
                let mut s = t[o.at(i, j)];
                for k in k0..j {
                    s -= t[o.at(i, k)] * t[o.at(j, k)];
                }
                t[o.at(i, j)] = s / t[o.at(j, j)];
            }
        }

        // Trailing update: A22 -= L21 * L21^T, lower half only
        let kb = k1 - k0;
        for i in k1..n {
            for k in 0..kb {
                scratch[k] = t[o.at(i, k0 + k)];
            }
            for j in k1..=i {
                let mut s = T::zero();
                for (k, &l) in scratch[..kb].iter().enumerate() {
                    s += l * t[o.at(j, k0 + k)];
                }
                t[o.at(i, j)] -= s;
            }
        }

        k0 = k1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::super::InnerProduct;
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    /// Symmetric positive-definite test matrix `B^T B + n I`.
    fn spd(n: usize) -> Vec<f64> {
        let b: Vec<f64> = (0..n * n)
            .map(|v| ((v * 7 + 3) % 11) as f64 - 5.0)
            .collect();
        let mut a = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                let mut s = 0.0;
                for k in 0..n {
                    s += b[k * n + i] * b[k * n + j];
                }
                a[i * n + j] = s;
            }
            a[i * n + i] += n as f64;
        }
        a
    }

    fn lower_half(t: &[f64], n: usize) -> Vec<f64> {
        let mut out = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..=i {
                out[i * n + j] = t[i * n + j];
            }
        }
        out
    }

    #[test]
    fn test_matches_inner_product_lower() {
        let n = 11;
        let mut inner = spd(n);
        let mut blocked = inner.clone();
        let mut scratch = vec![0.0; n];
        assert!(InnerProduct.factor_lower(&mut inner, n, &mut scratch));
        assert!(Blocked::new(3).factor_lower(&mut blocked, n, &mut scratch));
        for (a, b) in lower_half(&inner, n).iter().zip(lower_half(&blocked, n)) {
            assert_approx_eq!(*a, b, 1e-9);
        }
    }

    #[test]
    fn test_upper_leaves_lower_half_untouched() {
        let n = 7;
        let original = spd(n);
        let mut t = original.clone();
        let mut scratch = vec![0.0; n];
        assert!(Blocked::new(2).factor_upper(&mut t, n, &mut scratch));
        for i in 0..n {
            for j in 0..i {
                assert_eq!(t[i * n + j].to_bits(), original[i * n + j].to_bits());
            }
        }
    }

    #[test]
    fn test_width_larger_than_matrix() {
        let n = 4;
        let mut inner = spd(n);
        let mut blocked = inner.clone();
        let mut scratch = vec![0.0; n];
        assert!(InnerProduct.factor_lower(&mut inner, n, &mut scratch));
        assert!(Blocked::new(64).factor_lower(&mut blocked, n, &mut scratch));
        for (a, b) in lower_half(&inner, n).iter().zip(lower_half(&blocked, n)) {
            assert_approx_eq!(*a, b, 1e-12);
        }
    }

    #[test]
    fn test_rejects_indefinite_in_trailing_block() {
        // Positive leading block, indefinite after the first block update.
        let mut t = vec![4.0, 2.0, 0.0, 2.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let mut scratch = vec![0.0; 3];
        assert!(!Blocked::new(1).factor_lower(&mut t, 3, &mut scratch));
    }

    #[test]
    fn test_zero_width_is_clamped() {
        assert_eq!(Blocked::new(0).width(), 1);
        assert_eq!(Blocked::default().width(), DEFAULT_BLOCK_WIDTH);
    }
}
