//! Loading CFF outlines.

use std::ops::Range;

use raw::{
    tables::{
        cff::Cff,
        postscript::{
            charstring::{self, CommandSink},
            dict, FdSelect, Index,
        },
    },
    types::{F26Dot6, Fixed, GlyphId, Pen, Point, Segment},
    FontData, FontRead, FontReadWithArgs, ReadError,
};

use super::scale_point;
use crate::{error::MalformedKind, Error};

/// Locations of the structures needed to evaluate charstrings, resolved
/// from the Top DICT and Private DICTs when the font is opened.
///
/// All offsets are relative to the start of the `CFF ` table.
#[derive(Clone, Debug)]
pub(crate) struct Layout {
    charstrings: usize,
    num_glyphs: u16,
    subfonts: Subfonts,
}

#[derive(Clone, Debug)]
enum Subfonts {
    /// A name-keyed font with one Private DICT.
    Single { subrs: Option<usize> },
    /// A CID-keyed font: each Font DICT has its own Private DICT.
    Cid {
        fd_select: usize,
        font_dict_subrs: Vec<Option<usize>>,
    },
}

impl Layout {
    /// Reads Top DICT 0 and the Private DICTs it references.
    pub fn new(cff: &Cff, num_glyphs: u16) -> Result<Self, Error> {
        // "The Name INDEX in the CFF data must contain only one entry"
        // See <https://learn.microsoft.com/en-us/typography/opentype/spec/cff>
        if cff.names().count() != 1 {
            return Err(Error::Unsupported("CFF font sets with more than one font"));
        }
        let top_dict = cff.top_dicts().get(0)?;
        let mut charstrings = None;
        let mut private_range = None;
        let mut fd_array = None;
        let mut fd_select = None;
        for entry in dict::entries(top_dict) {
            match entry? {
                dict::Entry::CharstringsOffset(offset) => charstrings = Some(offset),
                dict::Entry::PrivateDictRange(range) => private_range = Some(range),
                dict::Entry::FdArrayOffset(offset) => fd_array = Some(offset),
                dict::Entry::FdSelectOffset(offset) => fd_select = Some(offset),
                dict::Entry::CharstringType(2) => {}
                dict::Entry::CharstringType(_) => {
                    return Err(Error::Unsupported("charstring types other than 2"))
                }
                _ => {}
            }
        }
        let charstrings = charstrings
            .ok_or(MalformedKind::Data("CFF Top DICT has no CharStrings offset"))?;
        let charstring_count = cff.index_at(charstrings)?.count();
        if charstring_count != num_glyphs as u32 {
            log::warn!(
                "CFF table has {charstring_count} charstrings but maxp counts {num_glyphs} glyphs"
            );
            return Err(MalformedKind::GlyphCountMismatch {
                num_glyphs,
                charstrings: charstring_count,
            }
            .into());
        }
        let table = cff.offset_data();
        let subfonts = match (fd_array, fd_select) {
            (Some(fd_array), Some(fd_select)) => {
                let select_data = table.split_off(fd_select).ok_or(ReadError::OutOfBounds)?;
                FdSelect::read_with_args(select_data, &num_glyphs)?;
                let font_dicts = cff.index_at(fd_array)?;
                let mut font_dict_subrs = Vec::with_capacity(font_dicts.count() as usize);
                for i in 0..font_dicts.count() as usize {
                    let mut private_range = None;
                    for entry in dict::entries(font_dicts.get(i)?) {
                        if let dict::Entry::PrivateDictRange(range) = entry? {
                            private_range = Some(range);
                        }
                    }
                    let range = private_range
                        .ok_or(MalformedKind::Data("CFF Font DICT has no Private DICT"))?;
                    font_dict_subrs.push(subrs_offset(cff, range)?);
                }
                Subfonts::Cid {
                    fd_select,
                    font_dict_subrs,
                }
            }
            (None, None) => {
                // "A Private DICT is required but may be specified as having
                // a length of 0 if there are no non-default values to be
                // stored."
                let subrs = match private_range {
                    Some(range) => subrs_offset(cff, range)?,
                    None => None,
                };
                Subfonts::Single { subrs }
            }
            _ => {
                return Err(
                    MalformedKind::Data("CFF FDArray and FDSelect must appear together").into(),
                )
            }
        };
        Ok(Self {
            charstrings,
            num_glyphs,
            subfonts,
        })
    }

    /// Evaluates the charstring for `glyph_id`, appending its segments.
    ///
    /// `table` must be the same `CFF ` table this layout was built from.
    pub fn load(
        &self,
        table: FontData,
        glyph_id: GlyphId,
        scale: Option<Fixed>,
        segments: &mut Vec<Segment>,
    ) -> Result<(), Error> {
        let cff = Cff::read(table)?;
        let charstring = cff
            .index_at(self.charstrings)?
            .get(glyph_id.to_u16() as usize)?;
        let subrs = match &self.subfonts {
            Subfonts::Single { subrs } => *subrs,
            Subfonts::Cid {
                fd_select,
                font_dict_subrs,
            } => {
                let select_data = table.split_off(*fd_select).ok_or(ReadError::OutOfBounds)?;
                let fd_select = FdSelect::read_with_args(select_data, &self.num_glyphs)?;
                let font_index = fd_select
                    .font_index(glyph_id)
                    .ok_or(MalformedKind::Data("glyph is not covered by FDSelect"))?;
                *font_dict_subrs
                    .get(font_index as usize)
                    .ok_or(MalformedKind::Data("FDSelect references a missing Font DICT"))?
            }
        };
        let subrs: Option<Index> = subrs.map(|offset| cff.index_at(offset)).transpose()?;
        let mut sink = SegmentSink {
            pen: segments,
            scale,
        };
        charstring::evaluate(charstring, cff.global_subrs(), subrs, &mut sink)?;
        Ok(())
    }
}

/// Resolves the Subrs INDEX offset of the Private DICT at `range` and
/// checks that the INDEX can be read.
fn subrs_offset(cff: &Cff, range: Range<usize>) -> Result<Option<usize>, Error> {
    let private = cff
        .offset_data()
        .slice(range.clone())
        .ok_or(ReadError::OutOfBounds)?;
    let mut subrs = None;
    for entry in dict::entries(private.as_bytes()) {
        // Subrs offset is relative to the private DICT
        if let dict::Entry::SubrsOffset(offset) = entry? {
            let offset = range
                .start
                .checked_add(offset)
                .ok_or(ReadError::OutOfBounds)?;
            cff.index_at(offset)?;
            subrs = Some(offset);
        }
    }
    Ok(subrs)
}

/// Converts 16.16 charstring coordinates to scaled 26.6 segments.
///
/// Contours are implicitly closed so `close` is dropped, along with the
/// width and hints.
struct SegmentSink<'a, P> {
    pen: &'a mut P,
    scale: Option<Fixed>,
}

impl<P: Pen> SegmentSink<'_, P> {
    fn point(&self, x: Fixed, y: Fixed) -> Point<F26Dot6> {
        let p = Point::new(x.to_f26dot6(), y.to_f26dot6());
        match self.scale {
            Some(scale) => scale_point(p, scale),
            None => p,
        }
    }
}

impl<P: Pen> CommandSink for SegmentSink<'_, P> {
    fn move_to(&mut self, x: Fixed, y: Fixed) {
        let p = self.point(x, y);
        self.pen.move_to(p);
    }

    fn line_to(&mut self, x: Fixed, y: Fixed) {
        let p = self.point(x, y);
        self.pen.line_to(p);
    }

    fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed) {
        let c0 = self.point(cx0, cy0);
        let c1 = self.point(cx1, cy1);
        let p = self.point(x, y);
        self.pen.curve_to(c0, c1, p);
    }

    fn close(&mut self) {}
}
