//! The font facade.

use std::{io::Read, ops::Range};

use raw::{
    tables::{cff::Cff, glyf::Glyf, hmtx::Hmtx, loca::Loca},
    types::{BoundingBox, F26Dot6, Fixed, GlyphId, Tag},
    FontData, FontRead, FontReadWithArgs, FontRef, ReadError, TableProvider, TopLevelTable,
};

use crate::{
    error::MalformedKind,
    outline::{cff, glyf, scale_coord},
    Error, GlyphBuffer, Hinting, LoadOptions,
};

const MIN_UNITS_PER_EM: u16 = 16;
const MAX_UNITS_PER_EM: u16 = 16384;

/// The kind of outlines stored in a font.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum OutlineFormat {
    /// Quadratic outlines in the `glyf` and `loca` tables.
    TrueType,
    /// Type 2 charstrings in the `CFF ` table.
    Cff,
}

#[derive(Clone, Debug)]
enum Outlines {
    TrueType {
        glyf: Range<usize>,
        loca: Range<usize>,
        loca_is_long: bool,
    },
    Cff {
        table: Range<usize>,
        layout: cff::Layout,
    },
}

#[derive(Clone, Debug)]
struct Metrics {
    hmtx: Range<usize>,
    number_of_h_metrics: u16,
}

/// A font opened for outline decoding.
///
/// Tables are located and validated once by [`open`](Self::open); after
/// that the font is immutable. The backing storage `D` may be borrowed
/// (`&[u8]`) or owned (`Vec<u8>`, `Arc<[u8]>`).
///
/// `Font` is `Sync` whenever `D` is, so one font may serve any number of
/// threads at once as long as each thread loads glyphs into its own
/// [`GlyphBuffer`].
#[derive(Clone, Debug)]
pub struct Font<D> {
    data: D,
    units_per_em: u16,
    num_glyphs: u16,
    bounds: BoundingBox<i16>,
    outlines: Outlines,
    metrics: Option<Metrics>,
}

impl<D: AsRef<[u8]>> Font<D> {
    /// Opens the font in `data`.
    ///
    /// Requires `head` and `maxp`, and either `glyf` with `loca` or `CFF `.
    /// When a font carries both outline formats, `glyf` is used.
    pub fn open(data: D) -> Result<Self, Error> {
        let font = FontRef::new(data.as_ref())?;
        let head = font.head()?;
        let units_per_em = head.units_per_em();
        if !(MIN_UNITS_PER_EM..=MAX_UNITS_PER_EM).contains(&units_per_em) {
            return Err(MalformedKind::UnitsPerEm(units_per_em).into());
        }
        let num_glyphs = font.maxp()?.num_glyphs();
        let outlines = if let Some(glyf) = font.table_range(Glyf::TAG) {
            let loca_is_long = head.index_to_loc_format() == 1;
            let loca = font.loca(loca_is_long)?;
            let expected = num_glyphs as usize + 1;
            let actual = loca.len() + 1;
            if actual < expected {
                return Err(MalformedKind::LocaTooShort { expected, actual }.into());
            }
            Outlines::TrueType {
                glyf,
                loca: table_range(&font, Loca::TAG)?,
                loca_is_long,
            }
        } else if let Some(table) = font.table_range(Cff::TAG) {
            let layout = cff::Layout::new(&font.cff()?, num_glyphs)?;
            Outlines::Cff { table, layout }
        } else {
            return Err(ReadError::TableIsMissing(Glyf::TAG).into());
        };
        let metrics = match font.hmtx() {
            Ok(hmtx) => Some(Metrics {
                hmtx: table_range(&font, Hmtx::TAG)?,
                number_of_h_metrics: hmtx.number_of_h_metrics(),
            }),
            Err(ReadError::TableIsMissing(tag)) => {
                log::debug!("no {tag} table, advance widths are unavailable");
                None
            }
            Err(e) => {
                log::warn!("ignoring horizontal metrics: {e}");
                None
            }
        };
        let font = Self {
            units_per_em,
            num_glyphs,
            bounds: head.bounds(),
            outlines,
            metrics,
            data,
        };
        log::debug!(
            "opened {:?} font with {} glyphs at {} units per em",
            font.outline_format(),
            num_glyphs,
            units_per_em
        );
        Ok(font)
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// The glyph count from `maxp`. Valid glyph ids are less than this.
    pub fn num_glyphs(&self) -> u16 {
        self.num_glyphs
    }

    pub fn outline_format(&self) -> OutlineFormat {
        match self.outlines {
            Outlines::TrueType { .. } => OutlineFormat::TrueType,
            Outlines::Cff { .. } => OutlineFormat::Cff,
        }
    }

    /// The font bounding box from `head`, in font units.
    pub fn bounds(&self) -> BoundingBox<i16> {
        self.bounds
    }

    /// Returns the advance width of the glyph, scaled like outlines.
    ///
    /// Glyphs past the last long metric share its advance. Returns `None`
    /// when the font has no horizontal metrics.
    pub fn advance_width(
        &self,
        glyph_id: GlyphId,
        options: &LoadOptions,
    ) -> Result<Option<F26Dot6>, Error> {
        self.check_glyph_id(glyph_id)?;
        let Some(metrics) = &self.metrics else {
            return Ok(None);
        };
        let hmtx = Hmtx::read_with_args(
            self.table_data(&metrics.hmtx)?,
            &metrics.number_of_h_metrics,
        )?;
        let Some(advance) = hmtx.advance(glyph_id) else {
            return Ok(None);
        };
        let advance = F26Dot6::from_i32(advance as i32);
        Ok(Some(match self.scale(options) {
            Some(scale) => scale_coord(advance, scale),
            None => advance,
        }))
    }

    /// Loads the outline of the glyph into `buffer`.
    ///
    /// The buffer is cleared first. If loading fails the buffer is left
    /// empty.
    pub fn load_glyph(
        &self,
        buffer: &mut GlyphBuffer,
        glyph_id: GlyphId,
        options: &LoadOptions,
    ) -> Result<(), Error> {
        buffer.clear();
        self.check_glyph_id(glyph_id)?;
        if options.hinting == Hinting::Full {
            log::debug!("hinting is not supported, loading {glyph_id} unhinted");
        }
        log::trace!("loading {glyph_id} ({:?})", self.outline_format());
        let result = self.load_unchecked(buffer, glyph_id, self.scale(options));
        if result.is_err() {
            buffer.clear();
        }
        result
    }

    fn load_unchecked(
        &self,
        buffer: &mut GlyphBuffer,
        glyph_id: GlyphId,
        scale: Option<Fixed>,
    ) -> Result<(), Error> {
        match &self.outlines {
            Outlines::TrueType {
                glyf,
                loca,
                loca_is_long,
            } => {
                let loca = Loca::read(self.table_data(loca)?, *loca_is_long)?;
                let glyf = Glyf::read(self.table_data(glyf)?)?;
                glyf::Outlines::new(loca, glyf).load(buffer, glyph_id, scale)
            }
            Outlines::Cff { table, layout } => layout.load(
                self.table_data(table)?,
                glyph_id,
                scale,
                &mut buffer.segments,
            ),
        }
    }

    fn check_glyph_id(&self, glyph_id: GlyphId) -> Result<(), Error> {
        if glyph_id.to_u16() >= self.num_glyphs {
            return Err(Error::GlyphNotFound(glyph_id));
        }
        Ok(())
    }

    fn scale(&self, options: &LoadOptions) -> Option<Fixed> {
        options.size.fixed_scale(self.units_per_em)
    }

    fn table_data(&self, range: &Range<usize>) -> Result<FontData<'_>, ReadError> {
        FontData::new(self.data.as_ref())
            .slice(range.clone())
            .ok_or(ReadError::OutOfBounds)
    }
}

impl Font<Vec<u8>> {
    /// Reads all of `reader` and opens the result.
    pub fn from_reader(mut reader: impl Read) -> Result<Self, Error> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::open(data)
    }
}

fn table_range(font: &FontRef, tag: Tag) -> Result<Range<usize>, ReadError> {
    font.table_range(tag).ok_or(ReadError::TableIsMissing(tag))
}
