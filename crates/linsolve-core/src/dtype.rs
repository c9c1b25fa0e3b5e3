//! Numeric type hierarchy for generic dense linear algebra.
//!
//! The trait hierarchy is:
//! ```text
//! Scalar
//!   └── Float  (f32, f64)
//! ```
//!
//! Matrices, decompositions and solvers are generic over [`Float`] so the same
//! code runs in single and double precision.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

// ---------------------------------------------------------------------------
// Scalar: the root trait for every element type
// ---------------------------------------------------------------------------

/// Base trait for all numeric types storable in a [`DenseMatrix`].
///
/// [`DenseMatrix`]: crate::matrix::DenseMatrix
pub trait Scalar:
    Copy
    + Clone
    + fmt::Debug
    + fmt::Display
    + PartialEq
    + PartialOrd
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Sum
    + Default
    + 'static
{
    /// The additive identity (`0`).
    fn zero() -> Self;

    /// The multiplicative identity (`1`).
    fn one() -> Self;

    /// Convert from `usize` (used for dimension arithmetic).
    fn from_usize(v: usize) -> Self;
}

// ---------------------------------------------------------------------------
// Float
// ---------------------------------------------------------------------------

/// Trait for floating-point scalar types (`f32`, `f64`).
pub trait Float: Scalar + Neg<Output = Self> {
    /// Machine epsilon.
    fn epsilon() -> Self;

    fn abs(self) -> Self;
    fn sqrt(self) -> Self;
    fn exp(self) -> Self;
    fn hypot(self, other: Self) -> Self;
    fn recip(self) -> Self;
    fn max(self, other: Self) -> Self;

    /// Convert from an `f64` literal (used for constants and random draws).
    fn from_f64(v: f64) -> Self;

    /// Widen to `f64` (used for quality metrics and likelihoods).
    fn to_f64(self) -> f64;
}

// ===========================================================================
// Macro implementations
// ===========================================================================

macro_rules! impl_scalar_float {
    ($ty:ty) => {
        impl Scalar for $ty {
            #[inline]
            fn zero() -> Self {
                0.0
            }
            #[inline]
            fn one() -> Self {
                1.0
            }
            #[inline]
            fn from_usize(v: usize) -> Self {
                v as Self
            }
        }

        impl Float for $ty {
            #[inline]
            fn epsilon() -> Self {
                <$ty>::EPSILON
            }
            #[inline]
            fn abs(self) -> Self {
                <$ty>::abs(self)
            }
            #[inline]
            fn sqrt(self) -> Self {
                <$ty>::sqrt(self)
            }
            #[inline]
            fn exp(self) -> Self {
                <$ty>::exp(self)
            }
            #[inline]
            fn hypot(self, other: Self) -> Self {
                <$ty>::hypot(self, other)
            }
            #[inline]
            fn recip(self) -> Self {
                <$ty>::recip(self)
            }
            #[inline]
            fn max(self, other: Self) -> Self {
                <$ty>::max(self, other)
            }
            #[inline]
            #[allow(clippy::cast_possible_truncation)]
            fn from_f64(v: f64) -> Self {
                v as Self
            }
            #[inline]
            #[allow(clippy::cast_lossless)]
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_scalar_float!(f32);
impl_scalar_float!(f64);

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_zero_one() {
        assert_eq!(f64::zero(), 0.0);
        assert_eq!(f32::one(), 1.0);
    }

    #[test]
    fn test_float_ops() {
        let x: f64 = 4.0;
        assert_eq!(Float::sqrt(x), 2.0);
        assert_eq!(Float::abs(-3.0_f64), 3.0);
        assert_eq!(Float::recip(x), 0.25);
        assert_eq!(Float::hypot(3.0_f64, 4.0), 5.0);
        assert_eq!(Float::exp(0.0_f32), 1.0);
    }

    #[test]
    fn test_f32_widening() {
        assert_eq!(Float::to_f64(0.5_f32), 0.5);
        assert_eq!(<f32 as Float>::from_f64(2.0), 2.0_f32);
    }

    #[test]
    fn test_from_usize() {
        assert_eq!(f32::from_usize(42), 42.0_f32);
    }
}
