//! Scalar types and the outline vocabulary shared by the glyphpath crates.
//!
//! This crate holds the fixed point number formats found in font files
//! ([`Fixed`], [`F2Dot14`]) and the 26.6 format ([`F26Dot6`]) used for all
//! decoded outline coordinates, along with [`Segment`], the output unit of
//! glyph decoding, and the [`Pen`] trait that decoders emit into.

#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

#[cfg(all(not(feature = "std"), not(test)))]
#[macro_use]
extern crate core as std;

mod bbox;
mod fixed;
mod glyph_id;
mod pen;
mod point;
mod raw;
mod segment;
mod tag;

pub use bbox::BoundingBox;
pub use fixed::{F26Dot6, F2Dot14, Fixed};
pub use glyph_id::GlyphId;
pub use pen::Pen;
pub use point::Point;
pub use raw::{BigEndian, FixedSize, Scalar};
pub use segment::Segment;
pub use tag::Tag;

/// The header tag for a font collection file.
pub const TTC_HEADER_TAG: Tag = Tag::new(b"ttcf");

/// The SFNT version for fonts containing TrueType outlines.
pub const TT_SFNT_VERSION: u32 = 0x00010000;
/// The SFNT version for fonts containing CFF outlines.
pub const CFF_SFNT_VERSION: u32 = 0x4F54544F;
/// The SFNT version used by some legacy Apple TrueType fonts.
pub const TRUE_SFNT_VERSION: u32 = 0x74727565;
