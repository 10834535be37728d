//! The [CFF](https://learn.microsoft.com/en-us/typography/opentype/spec/cff) table

use super::postscript::{Error, Index};
use crate::{FontData, FontRead, ReadError, TopLevelTable};
use types::Tag;

/// The [Compact Font Format](https://learn.microsoft.com/en-us/typography/opentype/spec/cff) table.
///
/// Only version 1 is supported. The four INDEXes following the header are
/// located when the table is read; everything else is reached through the
/// Top DICT.
#[derive(Clone)]
pub struct Cff<'a> {
    data: FontData<'a>,
    major: u8,
    minor: u8,
    names: Index<'a>,
    top_dicts: Index<'a>,
    strings: Index<'a>,
    global_subrs: Index<'a>,
}

impl TopLevelTable for Cff<'_> {
    const TAG: Tag = Tag::new(b"CFF ");
}

impl<'a> FontRead<'a> for Cff<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let major = data.read_at::<u8>(0)?;
        let minor = data.read_at::<u8>(1)?;
        let hdr_size = data.read_at::<u8>(2)? as usize;
        if major != 1 {
            return Err(ReadError::InvalidFormat(major as _));
        }
        let (names, offset) = read_index(data, hdr_size)?;
        let (top_dicts, offset) = read_index(data, offset)?;
        let (strings, offset) = read_index(data, offset)?;
        let (global_subrs, _) = read_index(data, offset)?;
        Ok(Self {
            data,
            major,
            minor,
            names,
            top_dicts,
            strings,
            global_subrs,
        })
    }
}

/// Reads the INDEX at `offset`, returning it along with the offset of the
/// following byte.
fn read_index(data: FontData, offset: usize) -> Result<(Index, usize), ReadError> {
    let bytes = data.split_off(offset).ok_or(ReadError::OutOfBounds)?;
    let index = Index::new(bytes.as_bytes()).map_err(|e| match e {
        Error::Read(e) => e,
        _ => ReadError::MalformedData("invalid CFF INDEX"),
    })?;
    let next = offset + index.size_in_bytes();
    Ok((index, next))
}

impl<'a> Cff<'a> {
    /// The full table data. DICT offsets are relative to its start.
    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }

    /// Major format version. Always 1.
    pub fn major(&self) -> u8 {
        self.major
    }

    pub fn minor(&self) -> u8 {
        self.minor
    }

    /// Returns the name index.
    ///
    /// This contains the PostScript names of all fonts in the font set.
    ///
    /// See "Name INDEX" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=13>
    pub fn names(&self) -> Index<'a> {
        self.names.clone()
    }

    /// Returns the PostScript name for the font in the font set at the
    /// given index.
    pub fn name(&self, index: usize) -> Option<&'a [u8]> {
        self.names.get(index).ok()
    }

    /// Returns the top dict index.
    ///
    /// This contains the top-level DICTs of all fonts in the font set. The
    /// objects here correspond to those in the name index.
    ///
    /// See "Top DICT INDEX" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=14>
    pub fn top_dicts(&self) -> Index<'a> {
        self.top_dicts.clone()
    }

    /// Returns the string index.
    ///
    /// See "String INDEX" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=17>
    pub fn strings(&self) -> Index<'a> {
        self.strings.clone()
    }

    /// Returns the global subroutine index.
    ///
    /// This contains sub-programs that are referenced by one or more
    /// charstrings in the font set.
    ///
    /// See "Local/Global Subrs INDEXes" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=25>
    pub fn global_subrs(&self) -> Index<'a> {
        self.global_subrs.clone()
    }

    /// Reads the INDEX at the given offset from the start of the table.
    ///
    /// Used for the CharStrings, FDArray and local Subrs INDEXes, which are
    /// located through DICT entries.
    pub fn index_at(&self, offset: usize) -> Result<Index<'a>, Error> {
        let data = self.data.split_off(offset).ok_or(ReadError::OutOfBounds)?;
        Index::new(data.as_bytes())
    }
}
