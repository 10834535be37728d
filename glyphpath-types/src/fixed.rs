//! fixed-point numerical types

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

// shared between Fixed, F26Dot6 and F2Dot14
macro_rules! fixed_impl {
    ($name:ident, $bits:literal, $fract_bits:literal, $ty:ty, $wide:ty) => {
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
        #[cfg_attr(feature = "bytemuck", derive(bytemuck_derive::Pod, bytemuck_derive::Zeroable))]
        #[repr(transparent)]
        #[doc = concat!(stringify!($bits), "-bit signed fixed point number with ", stringify!($fract_bits), " bits of fraction." )]
        pub struct $name($ty);

        impl $name {
            /// Minimum value.
            pub const MIN: Self = Self(<$ty>::MIN);

            /// Maximum value.
            pub const MAX: Self = Self(<$ty>::MAX);

            /// This type's smallest representable value
            pub const EPSILON: Self = Self(1);

            /// Representation of 0.0.
            pub const ZERO: Self = Self(0);

            /// Representation of 1.0.
            pub const ONE: Self = Self(1 << $fract_bits);

            const INT_MASK: $ty = !0 << $fract_bits;
            const ROUND: $ty = 1 << ($fract_bits - 1);
            const FRACT_BITS: usize = $fract_bits;

            /// Creates a new fixed point value from the underlying bit representation.
            #[inline(always)]
            pub const fn from_bits(bits: $ty) -> Self {
                Self(bits)
            }

            /// Returns the underlying bit representation of the value.
            #[inline(always)]
            pub const fn to_bits(self) -> $ty {
                self.0
            }

            /// Returns the nearest integer value.
            #[inline(always)]
            pub const fn round(self) -> Self {
                Self(self.0.wrapping_add(Self::ROUND) & Self::INT_MASK)
            }

            /// Returns the absolute value of the number.
            #[inline(always)]
            pub const fn abs(self) -> Self {
                Self(self.0.wrapping_abs())
            }

            /// Returns the largest integer less than or equal to the number.
            #[inline(always)]
            pub const fn floor(self) -> Self {
                Self(self.0 & Self::INT_MASK)
            }

            /// Returns the smallest integer greater than or equal to the number.
            #[inline(always)]
            pub const fn ceil(self) -> Self {
                Self(self.0.wrapping_add(Self::ONE.0 - 1) & Self::INT_MASK)
            }

            /// Returns the fractional part of the number.
            #[inline(always)]
            pub const fn fract(self) -> Self {
                Self(self.0.wrapping_sub(self.floor().0))
            }

            /// Wrapping addition.
            #[inline(always)]
            pub fn wrapping_add(self, other: Self) -> Self {
                Self(self.0.wrapping_add(other.0))
            }

            /// Saturating addition.
            #[inline(always)]
            pub fn saturating_add(self, other: Self) -> Self {
                Self(self.0.saturating_add(other.0))
            }

            /// Wrapping subtraction.
            #[inline(always)]
            pub fn wrapping_sub(self, other: Self) -> Self {
                Self(self.0.wrapping_sub(other.0))
            }

            /// Saturating subtraction.
            #[inline(always)]
            pub fn saturating_sub(self, other: Self) -> Self {
                Self(self.0.saturating_sub(other.0))
            }

            /// Multiplies `self` by `b` and divides the result by `c`,
            /// rounding half away from zero.
            ///
            /// The intermediate product is computed at double width. A zero
            /// divisor saturates to [`MAX`](Self::MAX) or [`MIN`](Self::MIN)
            /// based on the sign of the product.
            pub fn mul_div(self, b: Self, c: Self) -> Self {
                let ab = self.0 as $wide * b.0 as $wide;
                let c = c.0 as $wide;
                if c == 0 {
                    return if ab < 0 { Self::MIN } else { Self::MAX };
                }
                let half = c.abs() / 2;
                let q = if (ab < 0) != (c < 0) {
                    (ab - half) / c
                } else {
                    (ab + half) / c
                };
                Self(q.clamp(<$ty>::MIN as $wide, <$ty>::MAX as $wide) as $ty)
            }
        }

        impl Add for $name {
            type Output = Self;
            #[inline(always)]
            fn add(self, other: Self) -> Self {
                Self(self.0.wrapping_add(other.0))
            }
        }

        impl AddAssign for $name {
            #[inline(always)]
            fn add_assign(&mut self, other: Self) {
                *self = *self + other;
            }
        }

        impl Sub for $name {
            type Output = Self;
            #[inline(always)]
            fn sub(self, other: Self) -> Self {
                Self(self.0.wrapping_sub(other.0))
            }
        }

        impl SubAssign for $name {
            #[inline(always)]
            fn sub_assign(&mut self, other: Self) {
                *self = *self - other;
            }
        }

        impl Neg for $name {
            type Output = Self;
            #[inline(always)]
            fn neg(self) -> Self {
                Self(self.0.wrapping_neg())
            }
        }

        impl Mul for $name {
            type Output = Self;
            /// Fixed point multiplication, rounding half away from zero.
            #[inline(always)]
            fn mul(self, other: Self) -> Self {
                let ab = self.0 as $wide * other.0 as $wide;
                let round = (1 as $wide) << ($fract_bits - 1);
                let bias = if ab < 0 { round - 1 } else { round };
                Self(((ab + bias) >> $fract_bits) as $ty)
            }
        }

        impl Div for $name {
            type Output = Self;
            /// Fixed point division, saturating on a zero divisor.
            #[inline(always)]
            fn div(self, other: Self) -> Self {
                self.mul_div(Self::ONE, other)
            }
        }
    };
}

/// Implements integer conversions for the 32-bit types.
macro_rules! int_conv {
    ($name:ident) => {
        impl $name {
            /// Creates a fixed point value from an integer, wrapping on overflow.
            #[inline(always)]
            pub const fn from_i32(i: i32) -> Self {
                Self(i.wrapping_shl(Self::FRACT_BITS as u32))
            }

            /// Returns the value rounded to the nearest integer.
            #[inline(always)]
            pub const fn to_i32(self) -> i32 {
                self.0.wrapping_add(Self::ROUND) >> Self::FRACT_BITS
            }
        }
    };
}

/// impl float conversion methods.
///
/// We convert to different float types in order to ensure we can roundtrip
/// without floating point error.
macro_rules! float_conv {
    ($name:ident, $to:ident, $from:ident, $ty:ty) => {
        impl $name {
            #[doc = concat!("Creates a fixed point value from a", stringify!($ty), ".")]
            ///
            /// This operation is lossy; the float will be rounded to the nearest
            /// representable value.
            pub fn $from(x: $ty) -> Self {
                // round half away from zero without relying on std float methods
                let scaled = x * Self::ONE.0 as $ty;
                let bias = if scaled < 0.0 { -0.5 } else { 0.5 };
                Self((scaled + bias) as _)
            }

            #[doc = concat!("Returns the value as an ", stringify!($ty), ".")]
            ///
            /// This operation is lossless: all representable values can be
            /// round-tripped.
            pub fn $to(self) -> $ty {
                let int = ((self.0 & Self::INT_MASK) >> Self::FRACT_BITS) as $ty;
                let fract = (self.0 & !Self::INT_MASK) as $ty / Self::ONE.0 as $ty;
                int + fract
            }
        }

        //hack: we can losslessly go to float, so use those fmt impls
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.$to(), f)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                std::fmt::Debug::fmt(&self.$to(), f)
            }
        }
    };
}

fixed_impl!(F2Dot14, 16, 14, i16, i32);
fixed_impl!(Fixed, 32, 16, i32, i64);
fixed_impl!(F26Dot6, 32, 6, i32, i64);
int_conv!(Fixed);
int_conv!(F26Dot6);
float_conv!(F2Dot14, to_f32, from_f32, f32);
float_conv!(Fixed, to_f64, from_f64, f64);
float_conv!(F26Dot6, to_f64, from_f64, f64);
crate::newtype_scalar!(F2Dot14, [u8; 2]);
crate::newtype_scalar!(Fixed, [u8; 4]);

impl Fixed {
    /// Converts a 16.16 value to 26.6, rounding the dropped fraction bits.
    #[inline(always)]
    pub const fn to_f26dot6(self) -> F26Dot6 {
        F26Dot6(self.0.wrapping_add(0x200) >> 10)
    }
}

impl F26Dot6 {
    /// Converts a 26.6 value to 16.16, wrapping on overflow.
    #[inline(always)]
    pub const fn to_fixed(self) -> Fixed {
        Fixed(self.0.wrapping_shl(10))
    }
}

impl F2Dot14 {
    /// Multiplies a 26.6 value by this 2.14 factor, rounding half away from
    /// zero.
    ///
    /// This is the operation used to apply composite glyph transforms.
    #[inline(always)]
    pub fn mul_f26dot6(self, value: F26Dot6) -> F26Dot6 {
        let ab = value.0 as i64 * self.0 as i64;
        let bias = if ab < 0 { 0x1FFF } else { 0x2000 };
        F26Dot6(((ab + bias) >> 14) as i32)
    }
}
