//! The [loca (Index to Location)][loca] table
//!
//! [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca

use std::ops::Range;

use crate::{
    read::{FontRead, FontReadWithArgs, ReadError},
    table_provider::TopLevelTable,
    FontData,
};
use types::{BigEndian, GlyphId, Tag};

use super::glyf::{Glyf, Glyph};

/// The [loca] table.
///
/// [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca
#[derive(Clone, Debug)]
pub enum Loca<'a> {
    Short(&'a [BigEndian<u16>]),
    Long(&'a [BigEndian<u32>]),
}

impl TopLevelTable for Loca<'_> {
    const TAG: Tag = Tag::new(b"loca");
}

impl<'a> Loca<'a> {
    pub fn read(data: FontData<'a>, is_long: bool) -> Result<Self, ReadError> {
        Self::read_with_args(data, &is_long)
    }

    /// The number of glyphs described by the table.
    ///
    /// This is one less than the number of offsets.
    pub fn len(&self) -> usize {
        match self {
            Loca::Short(data) => data.len().saturating_sub(1),
            Loca::Long(data) => data.len().saturating_sub(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempt to return the offset for a given glyph id.
    ///
    /// Short offsets are stored divided by two; this returns the actual
    /// byte offset.
    pub fn get_raw(&self, idx: usize) -> Option<u32> {
        match self {
            Loca::Short(data) => data.get(idx).map(|x| x.get() as u32 * 2),
            Loca::Long(data) => data.get(idx).map(|x| x.get()),
        }
    }

    /// Returns the byte range of the glyph in the `glyf` table.
    ///
    /// An empty range means the glyph has no outline.
    pub fn glyph_range(&self, gid: GlyphId) -> Result<Range<usize>, ReadError> {
        let idx = gid.to_u16() as usize;
        let start = self.get_raw(idx).ok_or(ReadError::OutOfBounds)? as usize;
        let end = self.get_raw(idx + 1).ok_or(ReadError::OutOfBounds)? as usize;
        if end < start {
            return Err(ReadError::MalformedData("loca offsets are not increasing"));
        }
        Ok(start..end)
    }

    /// Returns the glyph for the given id, or `None` if the glyph is empty.
    pub fn get_glyf(&self, gid: GlyphId, glyf: &Glyf<'a>) -> Result<Option<Glyph<'a>>, ReadError> {
        let range = self.glyph_range(gid)?;
        if range.is_empty() {
            return Ok(None);
        }
        let data = glyf
            .offset_data()
            .slice(range)
            .ok_or(ReadError::OutOfBounds)?;
        Glyph::read(data).map(Some)
    }
}

impl<'a> FontReadWithArgs<'a> for Loca<'a> {
    type Args = bool;

    fn read_with_args(data: FontData<'a>, args: &Self::Args) -> Result<Self, ReadError> {
        let is_long = *args;
        // trailing bytes that do not form a whole offset are ignored
        if is_long {
            data.read_array(0..data.len() / 4 * 4).map(Loca::Long)
        } else {
            data.read_array(0..data.len() / 2 * 2).map(Loca::Short)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphpath_test_data::bebuffer::BeBuffer;

    #[test]
    fn short_offsets_are_doubled() {
        let buf = BeBuffer::new().extend([0u16, 5, 5, 12]).push(0u8);
        let loca = Loca::read(FontData::new(&buf), false).unwrap();
        assert_eq!(loca.len(), 3);
        assert_eq!(loca.glyph_range(GlyphId::new(0)).unwrap(), 0..10);
        assert!(loca.glyph_range(GlyphId::new(1)).unwrap().is_empty());
        assert_eq!(loca.glyph_range(GlyphId::new(2)).unwrap(), 10..24);
        assert_eq!(
            loca.glyph_range(GlyphId::new(3)),
            Err(ReadError::OutOfBounds)
        );
    }

    #[test]
    fn long_offsets() {
        let buf = BeBuffer::new().extend([0u32, 40, 36]);
        let loca = Loca::read(FontData::new(&buf), true).unwrap();
        assert_eq!(loca.len(), 2);
        assert_eq!(loca.glyph_range(GlyphId::new(0)).unwrap(), 0..40);
        assert!(matches!(
            loca.glyph_range(GlyphId::new(1)),
            Err(ReadError::MalformedData(_))
        ));
    }

    #[test]
    fn glyph_past_end_of_glyf() {
        let buf = BeBuffer::new().extend([0u32, 0, 100]);
        let loca = Loca::read(FontData::new(&buf), true).unwrap();
        let glyf_data = [0u8; 20];
        let glyf = Glyf::new(FontData::new(&glyf_data));
        assert!(loca.get_glyf(GlyphId::new(0), &glyf).unwrap().is_none());
        assert!(loca.get_glyf(GlyphId::new(1), &glyf).is_err());
    }
}
