//! The [hhea](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea) table

use types::Tag;

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// The [hhea](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea)
/// (horizontal header) table.
#[derive(Clone, Copy, Debug)]
pub struct Hhea<'a> {
    data: FontData<'a>,
}

impl TopLevelTable for Hhea<'_> {
    const TAG: Tag = Tag::new(b"hhea");
}

impl Hhea<'_> {
    const MIN_BYTE_LEN: usize = 36;

    pub fn ascender(&self) -> i16 {
        self.data.read_at(4).unwrap_or_default()
    }

    pub fn descender(&self) -> i16 {
        self.data.read_at(6).unwrap_or_default()
    }

    pub fn line_gap(&self) -> i16 {
        self.data.read_at(8).unwrap_or_default()
    }

    /// Maximum advance width value in `hmtx`.
    pub fn advance_width_max(&self) -> u16 {
        self.data.read_at(10).unwrap_or_default()
    }

    /// Number of LongMetric entries in the `hmtx` table.
    pub fn number_of_h_metrics(&self) -> u16 {
        self.data.read_at(34).unwrap_or_default()
    }
}

impl<'a> FontRead<'a> for Hhea<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        if data.len() < Self::MIN_BYTE_LEN {
            return Err(ReadError::OutOfBounds);
        }
        Ok(Self { data })
    }
}
