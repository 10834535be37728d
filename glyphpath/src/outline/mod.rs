//! Loading outlines for each supported glyph format.

pub(crate) mod cff;
pub(crate) mod glyf;

use raw::types::{F26Dot6, Fixed, Point};

/// Scales a 26.6 coordinate by a 16.16 factor, rounding half away from
/// zero.
#[inline(always)]
pub(crate) fn scale_coord(value: F26Dot6, scale: Fixed) -> F26Dot6 {
    F26Dot6::from_bits((Fixed::from_bits(value.to_bits()) * scale).to_bits())
}

#[inline(always)]
pub(crate) fn scale_point(point: Point<F26Dot6>, scale: Fixed) -> Point<F26Dot6> {
    point.map(|c| scale_coord(c, scale))
}
