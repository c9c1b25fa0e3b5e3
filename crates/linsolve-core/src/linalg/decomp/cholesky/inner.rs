//! Unblocked inner-product Cholesky kernel.

use crate::Float;

use super::{CholeskyKernel, Orientation};

/// Unblocked inner-product algorithm.
///
/// Column `j` of the factor is computed from the dot products of the rows
/// already factored. Best for small and medium matrices. After a successful
/// factorization the unused half of the buffer is zero-filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InnerProduct;

impl<T: Float> CholeskyKernel<T> for InnerProduct {
    const BLOCKED: bool = false;

    fn name(&self) -> &'static str {
        "inner-product"
    }

    fn factor_lower(&self, t: &mut [T], n: usize, scratch: &mut [T]) -> bool {
        factor(t, Orientation::lower(n), scratch)
    }

    fn factor_upper(&self, t: &mut [T], n: usize, scratch: &mut [T]) -> bool {
        factor(t, Orientation::upper(n), scratch)
    }
}

/// Factor the lower half of `t` (in the given orientation) in place.
///
/// `scratch[..j]` caches row `j` of the factor while column `j` is formed.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
fn factor<T: Float>(t: &mut [T], o: Orientation, scratch: &mut [T]) -> bool {
    let n = o.n;
    for j in 0..n {
        for k in 0..j {
            scratch[k] = t[o.at(j, k)];
        }

        // Diagonal element
        let mut sum = t[o.at(j, j)];
        for &l in &scratch[..j] {
            sum -= l * l;
        }
        // Negated comparison so a NaN pivot is rejected too.
        if !(sum > T::zero()) {
            return false;
        }
        let diag = sum.sqrt();
        t[o.at(j, j)] = diag;
        let inv_diag = diag.recip();

        // Off-diagonal elements
        for i in (j + 1)..n {
            let mut s = t[o.at(i, j)];
            for (k, &l) in scratch[..j].iter().enumerate() {
                s -= t[o.at(i, k)] * l;
            }
            t[o.at(i, j)] = s * inv_diag;
        }
    }

    o.zero_opposite(t);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_lower_3x3_known_factor() {
        // L = [[5,0,0],[3,3,0],[-1,1,3]]
        let mut t = vec![25.0, 15.0, -5.0, 15.0, 18.0, 0.0, -5.0, 0.0, 11.0];
        let mut scratch = vec![0.0; 3];
        assert!(InnerProduct.factor_lower(&mut t, 3, &mut scratch));
        let expected = [5.0, 0.0, 0.0, 3.0, 3.0, 0.0, -1.0, 1.0, 3.0];
        for (a, b) in t.iter().zip(expected) {
            assert_approx_eq!(*a, b, 1e-12);
        }
    }

    #[test]
    fn test_upper_is_transpose_of_lower() {
        let mut t = vec![25.0, 15.0, -5.0, 15.0, 18.0, 0.0, -5.0, 0.0, 11.0];
        let mut scratch = vec![0.0; 3];
        assert!(InnerProduct.factor_upper(&mut t, 3, &mut scratch));
        let expected = [5.0, 3.0, -1.0, 0.0, 3.0, 1.0, 0.0, 0.0, 3.0];
        for (a, b) in t.iter().zip(expected) {
            assert_approx_eq!(*a, b, 1e-12);
        }
    }

    #[test]
    fn test_rejects_negative_pivot() {
        let mut t = vec![1.0, 2.0, 2.0, 1.0];
        let mut scratch = vec![0.0; 2];
        assert!(!InnerProduct.factor_lower(&mut t, 2, &mut scratch));
    }

    #[test]
    fn test_rejects_nan_pivot() {
        let mut t = vec![f64::NAN, 0.0, 0.0, 1.0];
        let mut scratch = vec![0.0; 2];
        assert!(!InnerProduct.factor_upper(&mut t, 2, &mut scratch));
    }
}
