//! Options for loading glyphs.

use crate::Size;

/// Hinting requested for a glyph load.
///
/// Hinting bytecode and CFF hints are never executed. A request for
/// [`Full`](Self::Full) hinting is accepted and logged, and the glyph is
/// loaded unhinted.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Hinting {
    #[default]
    None,
    Full,
}

/// Settings for [`Font::load_glyph`](crate::Font::load_glyph) and
/// [`Font::advance_width`](crate::Font::advance_width).
///
/// The default loads outlines in font units, carried as 26.6 values.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct LoadOptions {
    pub(crate) size: Size,
    pub(crate) hinting: Hinting,
}

impl LoadOptions {
    /// Options that scale outlines to the given size.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            hinting: Hinting::None,
        }
    }

    /// Options for unscaled outlines in font units.
    pub fn unscaled() -> Self {
        Self::default()
    }

    /// Sets the requested hinting mode.
    pub fn hinting(mut self, hinting: Hinting) -> Self {
        self.hinting = hinting;
        self
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn hinting_mode(&self) -> Hinting {
        self.hinting
    }
}

impl From<Size> for LoadOptions {
    fn from(size: Size) -> Self {
        Self::new(size)
    }
}
