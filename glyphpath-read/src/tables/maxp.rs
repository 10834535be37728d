//! The [maxp](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp) table

use types::Tag;

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// The [maxp](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp)
/// (maximum profile) table.
///
/// Only the version and glyph count are read. The remaining fields of the
/// version 1.0 table size hinting resources, which we do not need.
#[derive(Clone, Copy, Debug)]
pub struct Maxp<'a> {
    data: FontData<'a>,
}

impl TopLevelTable for Maxp<'_> {
    const TAG: Tag = Tag::new(b"maxp");
}

impl Maxp<'_> {
    /// Table version: 0x00005000 for CFF fonts, 0x00010000 for TrueType.
    pub fn version(&self) -> u32 {
        self.data.read_at(0).unwrap_or_default()
    }

    /// The number of glyphs in the font.
    pub fn num_glyphs(&self) -> u16 {
        self.data.read_at(4).unwrap_or_default()
    }
}

impl<'a> FontRead<'a> for Maxp<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let version = data.read_at::<u32>(0)?;
        data.read_at::<u16>(4)?;
        if version != 0x00005000 && version != 0x00010000 {
            log::warn!("unexpected maxp version 0x{version:08X}");
        }
        Ok(Self { data })
    }
}
