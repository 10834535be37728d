//! Errors produced when opening fonts and loading glyphs.

pub use raw::{
    tables::{glyf::ToPathError, postscript::Error as CffError},
    ReadError,
};

use crate::{GlyphId, Tag};

/// Errors that may occur when opening a font or loading a glyph.
///
/// Every error other than [`Io`](Self::Io) concerns a single font or
/// glyph; see [`is_recoverable`](Self::is_recoverable).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The font data is truncated or structurally invalid.
    #[error("malformed font data: {0}")]
    Malformed(MalformedKind),
    /// The glyph exceeds a processing limit. Callers should treat this like
    /// [`Malformed`](Self::Malformed).
    #[error("glyph is too complex: {0} limit exceeded")]
    TooComplex(Limit),
    /// The data uses a feature that is not implemented.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
    /// The glyph identifier is not less than the glyph count.
    #[error("glyph {0} was not found in the font")]
    GlyphNotFound(GlyphId),
    /// Reading the font source failed.
    #[error("failed to read font data: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` when the error is confined to the font or glyph at
    /// hand, so that processing of other glyphs may continue.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// The kind of structural problem behind [`Error::Malformed`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MalformedKind {
    #[error("a read was out of bounds")]
    OutOfBounds,
    #[error("the {0} table is missing")]
    MissingTable(Tag),
    #[error("invalid sfnt version 0x{0:08X}")]
    InvalidSfnt(u32),
    #[error("invalid format {0}")]
    InvalidFormat(i64),
    #[error("units per em {0} is outside of 16..=16384")]
    UnitsPerEm(u16),
    #[error("the loca table holds {actual} offsets but {expected} are needed")]
    LocaTooShort { expected: usize, actual: usize },
    #[error("the CFF table has {charstrings} charstrings but maxp counts {num_glyphs} glyphs")]
    GlyphCountMismatch { num_glyphs: u16, charstrings: u32 },
    #[error("contour end point {0} is out of order or out of range")]
    ContourOrder(usize),
    #[error("{0}")]
    Data(&'static str),
    #[error("CFF: {0}")]
    Cff(CffError),
}

/// A processing limit that a glyph exceeded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Limit {
    /// Composite glyphs nested more than 8 deep.
    #[error("composite nesting depth")]
    CompositeDepth,
    /// A composite glyph held more than 65535 points or contours.
    #[error("composite point count")]
    CompositePoints,
    /// Charstring subroutines nested more than 10 deep.
    #[error("subroutine nesting depth")]
    SubroutineNesting,
    /// More than 48 charstring operands.
    #[error("operand stack depth")]
    OperandStack,
}

impl From<MalformedKind> for Error {
    fn from(value: MalformedKind) -> Self {
        Self::Malformed(value)
    }
}

impl From<Limit> for Error {
    fn from(value: Limit) -> Self {
        Self::TooComplex(value)
    }
}

impl From<ReadError> for Error {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::InvalidTtc => Self::Unsupported("font collections"),
            ReadError::OutOfBounds => MalformedKind::OutOfBounds.into(),
            ReadError::TableIsMissing(tag) => MalformedKind::MissingTable(tag).into(),
            ReadError::InvalidSfnt(version) => MalformedKind::InvalidSfnt(version).into(),
            ReadError::InvalidFormat(format) => MalformedKind::InvalidFormat(format).into(),
            ReadError::InvalidArrayLen => MalformedKind::Data("invalid array length").into(),
            ReadError::MalformedData(msg) => MalformedKind::Data(msg).into(),
        }
    }
}

impl From<ToPathError> for Error {
    fn from(value: ToPathError) -> Self {
        match value {
            ToPathError::ContourOrder(ix) => MalformedKind::ContourOrder(ix).into(),
            ToPathError::PointFlagMismatch { .. } => {
                MalformedKind::Data("point and flag counts differ").into()
            }
        }
    }
}

impl From<CffError> for Error {
    fn from(value: CffError) -> Self {
        match value {
            CffError::CharstringNestingDepthLimitExceeded => Limit::SubroutineNesting.into(),
            CffError::StackOverflow => Limit::OperandStack.into(),
            CffError::UnsupportedSeac => Self::Unsupported("seac accent composition"),
            CffError::Read(e) => e.into(),
            e => MalformedKind::Cff(e).into(),
        }
    }
}
