//! The [hmtx](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx) table

use types::{GlyphId, Tag};

use crate::{FontData, FontReadWithArgs, ReadError, TopLevelTable};

/// The [hmtx](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx)
/// (horizontal metrics) table.
#[derive(Clone, Copy, Debug)]
pub struct Hmtx<'a> {
    data: FontData<'a>,
    number_of_h_metrics: u16,
}

impl TopLevelTable for Hmtx<'_> {
    const TAG: Tag = Tag::new(b"hmtx");
}

impl Hmtx<'_> {
    // advanceWidth: u16, lsb: i16
    const LONG_METRIC_LEN: usize = 4;

    /// Number of long metric records, from `hhea`.
    pub fn number_of_h_metrics(&self) -> u16 {
        self.number_of_h_metrics
    }

    /// Returns the advance width for the given glyph.
    ///
    /// Glyphs at or past `number_of_h_metrics` share the advance of the last
    /// long metric record. Returns `None` when there are no records.
    pub fn advance(&self, glyph_id: GlyphId) -> Option<u16> {
        let last = self.number_of_h_metrics.checked_sub(1)?;
        let index = glyph_id.to_u16().min(last) as usize;
        self.data.read_at(index * Self::LONG_METRIC_LEN).ok()
    }

    /// Returns the left side bearing for the given glyph, if present.
    pub fn side_bearing(&self, glyph_id: GlyphId) -> Option<i16> {
        let gid = glyph_id.to_u16() as usize;
        let n_long = self.number_of_h_metrics as usize;
        let offset = if gid < n_long {
            gid * Self::LONG_METRIC_LEN + 2
        } else {
            n_long * Self::LONG_METRIC_LEN + (gid - n_long) * 2
        };
        self.data.read_at(offset).ok()
    }
}

impl<'a> FontReadWithArgs<'a> for Hmtx<'a> {
    type Args = u16;

    fn read_with_args(data: FontData<'a>, args: &u16) -> Result<Self, ReadError> {
        let number_of_h_metrics = *args;
        if data.len() < number_of_h_metrics as usize * Self::LONG_METRIC_LEN {
            return Err(ReadError::OutOfBounds);
        }
        Ok(Self {
            data,
            number_of_h_metrics,
        })
    }
}
