//! Scalar arithmetic capability set for container element types.
//!
//! [`NumericOps`] is the contract every element of a [`Vector`](crate::Vector)
//! or [`Matrix`](crate::Matrix) must satisfy. It is resolved at compile time
//! through a trait bound, so an element type without arithmetic is rejected by
//! the type checker rather than at run time.
//!
//! ## Supported Types
//!
//! | Type  | `divide`            | `sqrt`                     |
//! |-------|---------------------|----------------------------|
//! | `f64` | IEEE division       | IEEE square root           |
//! | `f32` | IEEE division       | IEEE square root           |
//! | `i32` | truncating division | truncated real square root |
//! | `i64` | truncating division | truncated real square root |
//!
//! Integer division by zero panics, as the primitive `/` does.

use num_traits::{Float, NumCast, One, PrimInt, ToPrimitive, Zero};
use std::fmt::{Debug, Display};

/// Arithmetic operations required from a container element.
///
/// All operations are stateless and take their operands by value.
///
/// # Examples
///
/// ```
/// use linalg_core::NumericOps;
///
/// assert_eq!(f64::add(1.5, 2.0), 3.5);
/// assert_eq!(i32::divide(7, 2), 3);
/// assert_eq!(i32::sqrt(10), 3);
/// assert_eq!(<f32 as NumericOps>::one(), 1.0);
/// ```
pub trait NumericOps: Copy + PartialEq + PartialOrd + Debug + Display + Send + Sync + 'static {
    /// Additive identity.
    fn zero() -> Self;

    /// Multiplicative identity.
    fn one() -> Self;

    /// `a + b`
    fn add(a: Self, b: Self) -> Self;

    /// `a - b`
    fn subtract(a: Self, b: Self) -> Self;

    /// `a * b`
    fn multiply(a: Self, b: Self) -> Self;

    /// `a / b`
    ///
    /// # Panics
    ///
    /// Integer implementations panic when `b` is zero.
    fn divide(a: Self, b: Self) -> Self;

    /// Square root; integer implementations truncate towards zero.
    fn sqrt(a: Self) -> Self;

    /// `-a`, expressed as `zero - a`.
    #[inline]
    fn negate(a: Self) -> Self {
        Self::subtract(Self::zero(), a)
    }

    /// `a * b + acc`, the accumulation step of inner products.
    #[inline]
    fn multiply_add(a: Self, b: Self, acc: Self) -> Self {
        Self::add(Self::multiply(a, b), acc)
    }
}

macro_rules! impl_float_ops {
    ($($t:ty),*) => {
        $(
            impl NumericOps for $t {
                #[inline]
                fn zero() -> Self {
                    <$t as Zero>::zero()
                }

                #[inline]
                fn one() -> Self {
                    <$t as One>::one()
                }

                #[inline]
                fn add(a: Self, b: Self) -> Self {
                    a + b
                }

                #[inline]
                fn subtract(a: Self, b: Self) -> Self {
                    a - b
                }

                #[inline]
                fn multiply(a: Self, b: Self) -> Self {
                    a * b
                }

                #[inline]
                fn divide(a: Self, b: Self) -> Self {
                    a / b
                }

                #[inline]
                fn sqrt(a: Self) -> Self {
                    Float::sqrt(a)
                }

                #[inline]
                fn negate(a: Self) -> Self {
                    -a
                }
            }
        )*
    };
}

macro_rules! impl_int_ops {
    ($($t:ty),*) => {
        $(
            impl NumericOps for $t {
                #[inline]
                fn zero() -> Self {
                    <$t as Zero>::zero()
                }

                #[inline]
                fn one() -> Self {
                    <$t as One>::one()
                }

                #[inline]
                fn add(a: Self, b: Self) -> Self {
                    a + b
                }

                #[inline]
                fn subtract(a: Self, b: Self) -> Self {
                    a - b
                }

                #[inline]
                fn multiply(a: Self, b: Self) -> Self {
                    a * b
                }

                #[inline]
                fn divide(a: Self, b: Self) -> Self {
                    a / b
                }

                #[inline]
                fn sqrt(a: Self) -> Self {
                    int_sqrt(a)
                }
            }
        )*
    };
}

impl_float_ops!(f64, f32);
impl_int_ops!(i32, i64);

/// Truncated square root of an integer.
///
/// The `f64` estimate is corrected by checked squaring, so the result is the
/// floor of the real root even where `f64` cannot represent `a` exactly.
/// Negative inputs have no real root and map to zero.
fn int_sqrt<I: PrimInt>(a: I) -> I {
    if a <= I::zero() {
        return I::zero();
    }
    let estimate = a.to_f64().map_or(0.0, f64::sqrt);
    let mut root = <I as NumCast>::from(estimate.trunc()).unwrap_or_else(I::zero);

    let square_at_most = |r: I| r.checked_mul(&r).is_some_and(|sq| sq <= a);
    while root > I::zero() && !square_at_most(root) {
        root = root - I::one();
    }
    while square_at_most(root + I::one()) {
        root = root + I::one();
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_f64_ops() {
        assert_eq!(f64::add(1.0, 2.0), 3.0);
        assert_eq!(f64::subtract(1.0, 2.0), -1.0);
        assert_eq!(f64::multiply(3.0, 2.0), 6.0);
        assert_eq!(f64::divide(1.0, 4.0), 0.25);
        assert_relative_eq!(NumericOps::sqrt(2.0_f64), std::f64::consts::SQRT_2);
        assert_eq!(<f64 as NumericOps>::zero(), 0.0);
        assert_eq!(<f64 as NumericOps>::one(), 1.0);
    }

    #[test]
    fn test_f32_ops() {
        assert_eq!(f32::add(1.5, 2.5), 4.0);
        assert_eq!(NumericOps::sqrt(9.0_f32), 3.0);
        assert_eq!(f32::negate(2.0), -2.0);
    }

    #[test]
    fn test_int_divide_truncates() {
        assert_eq!(i32::divide(7, 2), 3);
        assert_eq!(i32::divide(-7, 2), -3);
        assert_eq!(i64::divide(9, 4), 2);
    }

    #[test]
    fn test_int_sqrt_truncates() {
        assert_eq!(i32::sqrt(0), 0);
        assert_eq!(i32::sqrt(1), 1);
        assert_eq!(i32::sqrt(15), 3);
        assert_eq!(i32::sqrt(16), 4);
        assert_eq!(i64::sqrt(1_000_000_000_000), 1_000_000);
    }

    #[test]
    fn test_int_sqrt_exact_beyond_f64_precision() {
        for k in [100_000_001_i64, 3_037_000_499, 94_906_267] {
            assert_eq!(i64::sqrt(k * k), k);
            assert_eq!(i64::sqrt(k * k - 1), k - 1);
            assert_eq!(i64::sqrt(k * k + 1), k);
        }
        assert_eq!(i64::sqrt(i64::MAX), 3_037_000_499);
        assert_eq!(i32::sqrt(i32::MAX), 46_340);
    }

    #[test]
    fn test_int_sqrt_negative_is_zero() {
        assert_eq!(i32::sqrt(-4), 0);
    }

    #[test]
    #[should_panic]
    fn test_int_divide_by_zero_panics() {
        let zero = <i32 as NumericOps>::zero();
        let _ = i32::divide(1, zero);
    }

    #[test]
    fn test_negate_default_for_ints() {
        assert_eq!(i32::negate(5), -5);
        assert_eq!(i64::negate(-3), 3);
    }

    #[test]
    fn test_multiply_add() {
        assert_eq!(f64::multiply_add(2.0, 3.0, 1.0), 7.0);
        assert_eq!(i32::multiply_add(2, 3, 1), 7);
    }
}
