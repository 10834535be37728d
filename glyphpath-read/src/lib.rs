//! Reading the sfnt tables that describe glyph outlines.
//!
//! This crate provides memory safe zero-allocation parsing of the parts of a
//! font file needed to decode glyph outlines: the table directory, the
//! `head`, `maxp`, `hhea` and `hmtx` metric tables, TrueType `glyf`/`loca`
//! and the `CFF ` table with its PostScript building blocks (INDEX, DICT,
//! FDSelect and the Type 2 charstring evaluator).
//!
//! All reads are bounds checked. Malformed input produces a [`ReadError`]
//! (or a [`tables::postscript::Error`]), never a panic.
//!
//! For higher level access to glyph outlines, see the `glyphpath` crate.
//!
//! # Example
//!
//! ```no_run
//! # let path_to_my_font_file = std::path::Path::new("");
//! use glyphpath_read::{FontRef, TableProvider};
//! let font_bytes = std::fs::read(path_to_my_font_file).unwrap();
//! let font = FontRef::new(&font_bytes).expect("failed to read font data");
//! let head = font.head().expect("missing 'head' table");
//! let maxp = font.maxp().expect("missing 'maxp' table");
//!
//! println!("{} units per em, {} glyphs", head.units_per_em(), maxp.num_glyphs());
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

#[cfg(all(not(feature = "std"), not(test)))]
#[macro_use]
extern crate core as std;

mod font_data;
mod read;
mod table_provider;
pub mod tables;

pub use font_data::{Cursor, FontData};
pub use read::{FontRead, FontReadWithArgs, ReadError};
pub use table_provider::{TableProvider, TopLevelTable};

/// Public re-export of the glyphpath-types crate.
pub extern crate glyphpath_types as types;

use types::{Tag, CFF_SFNT_VERSION, TRUE_SFNT_VERSION, TTC_HEADER_TAG, TT_SFNT_VERSION};

/// An entry in the table directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableRecord {
    /// Table identifier.
    pub tag: Tag,
    /// Checksum for the table. Not validated.
    pub checksum: u32,
    /// Offset from the beginning of the font data.
    pub offset: u32,
    /// Length of the table.
    pub length: u32,
}

impl TableRecord {
    const RAW_BYTE_LEN: usize = 16;

    fn read(data: FontData, index: usize) -> Result<Self, ReadError> {
        let mut cursor = data
            .split_off(index * Self::RAW_BYTE_LEN)
            .ok_or(ReadError::OutOfBounds)?
            .cursor();
        Ok(Self {
            tag: cursor.read()?,
            checksum: cursor.read()?,
            offset: cursor.read()?,
            length: cursor.read()?,
        })
    }
}

/// The [table directory](https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory)
/// at the start of an sfnt.
#[derive(Clone, Debug)]
pub struct TableDirectory<'a> {
    sfnt_version: u32,
    num_tables: u16,
    records: FontData<'a>,
}

impl<'a> FontRead<'a> for TableDirectory<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        // sfntVersion, numTables, searchRange, entrySelector, rangeShift
        const HEADER_LEN: usize = 12;
        let sfnt_version = data.read_at::<u32>(0)?;
        let num_tables = data.read_at::<u16>(4)?;
        let records_len = num_tables as usize * TableRecord::RAW_BYTE_LEN;
        let records = data
            .slice(HEADER_LEN..HEADER_LEN + records_len)
            .ok_or(ReadError::OutOfBounds)?;
        Ok(Self {
            sfnt_version,
            num_tables,
            records,
        })
    }
}

impl<'a> TableDirectory<'a> {
    /// The sfnt version tag of the font.
    pub fn sfnt_version(&self) -> u32 {
        self.sfnt_version
    }

    /// The number of tables in the font.
    pub fn num_tables(&self) -> u16 {
        self.num_tables
    }

    /// Returns the record at the given index.
    pub fn get(&self, index: usize) -> Option<TableRecord> {
        if index >= self.num_tables as usize {
            return None;
        }
        TableRecord::read(self.records, index).ok()
    }

    /// Returns an iterator over all table records.
    pub fn table_records(&self) -> impl Iterator<Item = TableRecord> + 'a + Clone {
        let records = self.records;
        (0..self.num_tables as usize).filter_map(move |ix| TableRecord::read(records, ix).ok())
    }

    fn is_sorted(&self) -> bool {
        let mut last_tag = Tag::new(&[0u8; 4]);

        for tag in self.table_records().map(|rec| rec.tag) {
            if tag <= last_tag {
                return false;
            }

            last_tag = tag;
        }

        true
    }

    fn binary_search(&self, tag: Tag) -> Option<TableRecord> {
        let mut lo = 0usize;
        let mut hi = self.num_tables as usize;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let record = self.get(mid)?;
            match record.tag.cmp(&tag) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => return Some(record),
            }
        }
        None
    }
}

/// Reference to an in-memory font.
///
/// This is a simple implementation of the [`TableProvider`] trait backed
/// by a borrowed slice containing font data.
#[derive(Clone)]
pub struct FontRef<'a> {
    data: FontData<'a>,
    table_directory: TableDirectory<'a>,
    // Whether the table directory is sorted and thus we can use binary search for
    // finding table records. In principle, fonts are required to have a sorted
    // table directory, but certain fonts don't seem to follow that requirement.
    table_directory_sorted: bool,
}

impl<'a> FontRef<'a> {
    /// Creates a new reference to an in-memory font backed by the given data.
    ///
    /// The data must be a single font and must begin with a table directory
    /// whose version is one of the TrueType (`0x00010000` or `true`) or CFF
    /// (`OTTO`) versions. Font collections are rejected with
    /// [`ReadError::InvalidTtc`].
    pub fn new(data: &'a [u8]) -> Result<Self, ReadError> {
        let data = FontData::new(data);
        let version = data.read_at::<u32>(0)?;
        if version == TTC_HEADER_TAG.to_u32() {
            return Err(ReadError::InvalidTtc);
        }
        if ![TT_SFNT_VERSION, CFF_SFNT_VERSION, TRUE_SFNT_VERSION].contains(&version) {
            return Err(ReadError::InvalidSfnt(version));
        }
        let table_directory = TableDirectory::read(data)?;
        let table_directory_sorted = table_directory.is_sorted();
        if !table_directory_sorted {
            log::warn!("table directory is not sorted, falling back to linear search");
        }
        Ok(FontRef {
            data,
            table_directory,
            table_directory_sorted,
        })
    }

    /// Returns the underlying font data.
    pub fn data(&self) -> FontData<'a> {
        self.data
    }

    /// Returns the associated table directory.
    pub fn table_directory(&self) -> &TableDirectory<'a> {
        &self.table_directory
    }

    /// Returns the record for the table with the specified tag, if present.
    pub fn table_record(&self, tag: Tag) -> Option<TableRecord> {
        if self.table_directory_sorted {
            self.table_directory.binary_search(tag)
        } else {
            self.table_directory
                .table_records()
                .find(|rec| rec.tag == tag)
        }
    }

    /// Returns the byte range of the table with the specified tag, if present
    /// and in bounds.
    pub fn table_range(&self, tag: Tag) -> Option<std::ops::Range<usize>> {
        let record = self.table_record(tag)?;
        let start = record.offset as usize;
        let end = start.checked_add(record.length as usize)?;
        (start != 0 && end <= self.data.len()).then_some(start..end)
    }

    /// Returns the data for the table with the specified tag, if present.
    pub fn table_data(&self, tag: Tag) -> Option<FontData<'a>> {
        self.table_range(tag)
            .and_then(|range| self.data.slice(range))
    }
}

impl<'a> TableProvider<'a> for FontRef<'a> {
    fn data_for_tag(&self, tag: Tag) -> Option<FontData<'a>> {
        self.table_data(tag)
    }
}
