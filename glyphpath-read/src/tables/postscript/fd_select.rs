//! Parsing for CFF FDSelect tables.

use types::GlyphId;

use crate::{FontData, FontReadWithArgs, ReadError};

/// Maps glyphs to font DICT indices in a CID-keyed font.
///
/// See "19 FDSelect" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=28>
#[derive(Clone)]
pub enum FdSelect<'a> {
    /// One font DICT index per glyph.
    Format0(&'a [u8]),
    /// Ranges of glyphs sharing a font DICT index.
    Format3 {
        /// Packed `(first: u16, fd: u8)` records.
        ranges: &'a [u8],
        /// One past the last glyph covered by the ranges.
        sentinel: u16,
    },
}

impl<'a> FontReadWithArgs<'a> for FdSelect<'a> {
    /// The number of glyphs in the font.
    type Args = u16;

    fn read_with_args(data: FontData<'a>, num_glyphs: &u16) -> Result<Self, ReadError> {
        const RANGE3_LEN: usize = 3;
        let mut cursor = data.cursor();
        let format = cursor.read::<u8>()?;
        match format {
            0 => Ok(Self::Format0(cursor.read_bytes(*num_glyphs as usize)?)),
            3 => {
                let n_ranges = cursor.read::<u16>()? as usize;
                let ranges = cursor.read_bytes(n_ranges * RANGE3_LEN)?;
                let sentinel = cursor.read::<u16>()?;
                Ok(Self::Format3 { ranges, sentinel })
            }
            _ => Err(ReadError::InvalidFormat(format as _)),
        }
    }
}

impl FdSelect<'_> {
    /// Returns the associated font DICT index for the given glyph identifier.
    pub fn font_index(&self, glyph_id: GlyphId) -> Option<u16> {
        match self {
            Self::Format0(fds) => fds.get(glyph_id.to_u32() as usize).map(|fd| *fd as u16),
            Self::Format3 { ranges, sentinel } => {
                let gid = glyph_id.to_u16();
                if gid >= *sentinel {
                    return None;
                }
                let records = FontData::new(ranges);
                let first = |ix: usize| records.read_at::<u16>(ix * 3).ok();
                // the last range whose first glyph is <= gid
                let mut lo = 0;
                let mut hi = ranges.len() / 3;
                while lo < hi {
                    let mid = lo + (hi - lo) / 2;
                    if first(mid)? <= gid {
                        lo = mid + 1;
                    } else {
                        hi = mid;
                    }
                }
                let fd = records.read_at::<u8>(lo.checked_sub(1)? * 3 + 2).ok()?;
                Some(fd as u16)
            }
        }
    }
}
