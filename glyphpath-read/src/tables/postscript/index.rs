//! Parsing for PostScript INDEX objects.
//!
//! See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=12>

use super::Error;
use crate::{FontData, ReadError};

/// An array of variable length objects, as found in the CFF table.
///
/// The count field is 16 bits and the objects are located through
/// `count + 1` offsets of `off_size` bytes each. Offsets are one based,
/// relative to the byte preceding the object data.
#[derive(Clone, Default)]
pub struct Index<'a> {
    count: u16,
    off_size: u8,
    offsets: &'a [u8],
    data: &'a [u8],
}

impl<'a> Index<'a> {
    /// Creates a new index from the given data.
    ///
    /// Bytes following the index are ignored. Use
    /// [`size_in_bytes`](Self::size_in_bytes) to locate the next structure.
    pub fn new(data: &'a [u8]) -> Result<Self, Error> {
        let data = FontData::new(data);
        let count = data.read_at::<u16>(0)?;
        if count == 0 {
            return Ok(Self::default());
        }
        let off_size = data.read_at::<u8>(2)?;
        if !(1..=4).contains(&off_size) {
            return Err(Error::InvalidIndexOffsetSize(off_size));
        }
        let offsets_len = (count as usize + 1) * off_size as usize;
        let offsets_end = 3 + offsets_len;
        let offsets = data
            .slice(3..offsets_end)
            .ok_or(ReadError::OutOfBounds)?
            .as_bytes();
        // the final offset gives the length of the object data
        let data_len = read_offset(count as usize, count as usize, off_size, offsets)?;
        let data = data
            .slice(offsets_end..offsets_end + data_len)
            .ok_or(ReadError::OutOfBounds)?
            .as_bytes();
        Ok(Self {
            count,
            off_size,
            offsets,
            data,
        })
    }

    /// Returns the number of objects in the index.
    pub fn count(&self) -> u32 {
        self.count as u32
    }

    /// Returns the size in bytes of each offset.
    pub fn off_size(&self) -> u8 {
        self.off_size
    }

    /// Computes a bias that is added to a subroutine operator in a
    /// charstring.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/cff2#9-local-and-global-subr-indexes>
    pub fn subr_bias(&self) -> i32 {
        let count = self.count();
        if count < 1240 {
            107
        } else if count < 33900 {
            1131
        } else {
            32768
        }
    }

    /// Returns the total size in bytes of the index.
    pub fn size_in_bytes(&self) -> usize {
        // an empty index is just the count field
        if self.count == 0 {
            return 2;
        }
        3 + self.offsets.len() + self.data.len()
    }

    /// Returns the offset of the object at the given index.
    pub fn get_offset(&self, index: usize) -> Result<usize, Error> {
        read_offset(index, self.count as usize, self.off_size, self.offsets)
    }

    /// Returns the data for the object at the given index.
    pub fn get(&self, index: usize) -> Result<&'a [u8], Error> {
        if index >= self.count as usize {
            return Err(ReadError::OutOfBounds.into());
        }
        let start = self.get_offset(index)?;
        let end = self.get_offset(index + 1)?;
        self.data
            .get(start..end)
            .ok_or_else(|| ReadError::OutOfBounds.into())
    }
}

impl std::fmt::Debug for Index<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("count", &self.count)
            .field("off_size", &self.off_size)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Reads an offset which is encoded as a variable sized integer.
fn read_offset(
    index: usize,
    count: usize,
    offset_size: u8,
    offset_data: &[u8],
) -> Result<usize, Error> {
    // there are count + 1 offsets
    if index > count {
        return Err(ReadError::OutOfBounds.into());
    }
    let size = offset_size as usize;
    let start = index * size;
    let bytes = offset_data
        .get(start..start + size)
        .ok_or(ReadError::OutOfBounds)?;
    let offset = bytes
        .iter()
        .fold(0usize, |acc, byte| (acc << 8) | *byte as usize);
    // offsets are one based
    offset.checked_sub(1).ok_or(Error::ZeroOffsetInIndex)
}
