//! The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head) table

use types::{BoundingBox, Fixed, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head)
/// (font header) table.
#[derive(Clone, Copy, Debug)]
pub struct Head<'a> {
    data: FontData<'a>,
}

impl TopLevelTable for Head<'_> {
    const TAG: Tag = Tag::new(b"head");
}

impl Head<'_> {
    const MIN_BYTE_LEN: usize = 54;

    /// Revision set by the font manufacturer.
    pub fn font_revision(&self) -> Fixed {
        self.field(4)
    }

    /// Set to 0x5F0F3CF5.
    pub fn magic_number(&self) -> u32 {
        self.field(12)
    }

    /// Number of design units in one em.
    ///
    /// Valid values are 16 through 16384, which is checked by the consumer.
    pub fn units_per_em(&self) -> u16 {
        self.field(18)
    }

    pub fn x_min(&self) -> i16 {
        self.field(36)
    }

    pub fn y_min(&self) -> i16 {
        self.field(38)
    }

    pub fn x_max(&self) -> i16 {
        self.field(40)
    }

    pub fn y_max(&self) -> i16 {
        self.field(42)
    }

    /// The bounding box over all glyphs in the font, in font units.
    pub fn bounds(&self) -> BoundingBox<i16> {
        BoundingBox {
            x_min: self.x_min(),
            y_min: self.y_min(),
            x_max: self.x_max(),
            y_max: self.y_max(),
        }
    }

    /// 0 for short offsets (Offset16), 1 for long (Offset32).
    pub fn index_to_loc_format(&self) -> i16 {
        self.field(50)
    }

    // length was checked in `read`
    fn field<T: types::Scalar + Default>(&self, offset: usize) -> T {
        self.data.read_at(offset).unwrap_or_default()
    }
}

impl<'a> FontRead<'a> for Head<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        if data.len() < Self::MIN_BYTE_LEN {
            return Err(ReadError::OutOfBounds);
        }
        Ok(Self { data })
    }
}
