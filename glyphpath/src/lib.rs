//! Glyph outline decoding for sfnt fonts.
//!
//! glyphpath turns the outlines stored in TrueType (`glyf`/`loca`) and CFF
//! (Type 2 charstring) fonts into sequences of [`Segment`]s in 26.6 fixed
//! point. It sits on top of the parsing crate, which is re-exported as
//! [`raw`].
//!
//! ```no_run
//! use glyphpath::{Font, GlyphBuffer, GlyphId, LoadOptions, Size};
//!
//! # fn main() -> Result<(), glyphpath::Error> {
//! let font = Font::from_reader(std::fs::File::open("font.otf")?)?;
//! let mut buffer = GlyphBuffer::new();
//! let options = LoadOptions::new(Size::new(16.0));
//! for gid in 0..font.num_glyphs() {
//!     font.load_glyph(&mut buffer, GlyphId::new(gid), &options)?;
//!     println!("{gid}: {} contours", buffer.contour_count());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Sharing a font between threads
//!
//! [`Font`] is immutable once opened and is `Sync` whenever its backing
//! storage is, so a single font can be used from many threads at once. All
//! per-glyph state lives in the [`GlyphBuffer`] passed to
//! [`Font::load_glyph`], which takes it by `&mut`: each thread owns its own
//! buffer.
//!
//! # Limits
//!
//! Work per glyph is bounded. Composite glyphs may nest at most 8 deep and
//! hold at most 65535 points, charstring subroutines may nest at most 10
//! deep and the charstring operand stack holds 48 values. Exceeding any of
//! these fails with [`Error::TooComplex`].

#![forbid(unsafe_code)]

/// Expose our "raw" underlying parser crate.
pub extern crate glyphpath_read as raw;

mod buffer;
mod error;
mod font;
mod options;
mod outline;
mod size;

pub use buffer::GlyphBuffer;
pub use error::{Error, Limit, MalformedKind};
pub use font::{Font, OutlineFormat};
pub use options::{Hinting, LoadOptions};
pub use size::Size;

pub use raw::types::{BoundingBox, F26Dot6, GlyphId, Point, Segment, Tag};

/// Limit for recursion when loading TrueType composite glyphs.
const GLYF_COMPOSITE_RECURSION_LIMIT: usize = 8;
