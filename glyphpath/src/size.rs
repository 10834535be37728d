//! Strongly typed font size representation.

use raw::types::{F26Dot6, Fixed};

/// Font size in pixels per em units.
///
/// Sizes are a ratio of pixels to the size of the em square defined by the
/// font. This is equivalent to the `px` unit in CSS (assuming a DPI scale
/// factor of 1.0).
///
/// To retrieve outlines in font units, use the [unscaled](Self::unscaled)
/// constructor.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
pub struct Size(f32);

impl Size {
    /// Creates a new font size from the given value in pixels per em units.
    ///
    /// Providing a value `<= 0.0` (or NaN) is equivalent to creating an
    /// unscaled size and results in outlines in font units.
    pub fn new(ppem: f32) -> Self {
        Self(ppem)
    }

    /// Creates a new font size for generating unscaled outlines in font
    /// units.
    pub fn unscaled() -> Self {
        Self(0.0)
    }

    /// Returns the raw size in pixels per em units.
    ///
    /// Results in `None` if the size is unscaled.
    pub fn ppem(self) -> Option<f32> {
        (self.0 > 0.0).then_some(self.0)
    }

    /// Computes a linear scale factor for this font size and the given units
    /// per em value.
    ///
    /// Returns 1.0 for an unscaled size or when `units_per_em` is 0.
    pub fn linear_scale(self, units_per_em: u16) -> f32 {
        if self.0 > 0.0 && units_per_em != 0 {
            self.0 / units_per_em as f32
        } else {
            1.0
        }
    }

    /// Computes the 16.16 factor that maps 26.6 font unit coordinates to
    /// 26.6 pixel coordinates.
    ///
    /// Returns `None` when no scaling is needed.
    pub(crate) fn fixed_scale(self, units_per_em: u16) -> Option<Fixed> {
        let ppem = self.ppem()?;
        if units_per_em == 0 {
            return None;
        }
        // round the size to 26.6 first so that the ratio is exact for
        // integral sizes
        let ppem = F26Dot6::from_f64(ppem as f64).to_fixed();
        let scale = ppem / Fixed::from_i32(units_per_em as i32);
        (scale != Fixed::ONE).then_some(scale)
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::unscaled()
    }
}

impl From<f32> for Size {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}
