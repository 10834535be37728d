//! PostScript building blocks shared by the CFF table.
//!
//! This covers INDEX and DICT parsing, the operand stack, FDSelect and the
//! Type 2 charstring evaluator.

use std::fmt;

use crate::ReadError;

pub mod charstring;
pub mod dict;
mod fd_select;
mod index;
mod stack;

pub use fd_select::FdSelect;
pub use index::Index;
pub use stack::{Number, Stack};

/// Errors that are specific to PostScript processing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The `off_size` field in an INDEX contained an invalid value.
    InvalidIndexOffsetSize(u8),
    /// An INDEX contained a zero offset.
    ZeroOffsetInIndex,
    /// A DICT contained a number with an invalid encoding.
    InvalidNumber,
    /// More operands were pushed than the stack can hold.
    StackOverflow,
    /// An operator needed more operands than were on the stack.
    StackUnderflow,
    /// Tried to read past the top of the stack.
    InvalidStackAccess(usize),
    /// An operator expected an integer but found a fixed point value.
    ExpectedI32StackEntry(usize),
    /// Unknown or reserved DICT operator.
    InvalidDictOperator(u8),
    /// Unknown or unsupported charstring operator.
    InvalidCharstringOperator(u8),
    /// A subroutine call referenced an index outside of the subroutine INDEX.
    InvalidSubroutineIndex(i32),
    /// Subroutine calls were nested too deeply.
    CharstringNestingDepthLimitExceeded,
    /// A `put` or `get` operator referenced an element outside of the
    /// transient array.
    InvalidTransientArrayIndex(i32),
    /// A `callsubr` operator was used without a local subroutine INDEX.
    MissingSubroutines,
    /// An `endchar` operator carried the arguments of the Type 1 `seac`
    /// accent composition operator.
    UnsupportedSeac,
    /// Underlying parsing error.
    Read(ReadError),
}

impl From<ReadError> for Error {
    fn from(value: ReadError) -> Self {
        Self::Read(value)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIndexOffsetSize(size) => {
                write!(f, "invalid offset size of {size} for INDEX (expected 1-4)")
            }
            Self::ZeroOffsetInIndex => {
                write!(f, "invalid offset of 0 in INDEX (must be >= 1)")
            }
            Self::InvalidNumber => write!(f, "found an invalid number encoding"),
            Self::StackOverflow => write!(f, "maximum stack depth exceeded"),
            Self::StackUnderflow => write!(f, "stack underflow"),
            Self::InvalidStackAccess(index) => write!(f, "invalid stack access for index {index}"),
            Self::ExpectedI32StackEntry(index) => {
                write!(f, "attempted to read an integer at stack index {index}, but found a fixed point value")
            }
            Self::InvalidDictOperator(op) => write!(f, "dict operator {op} is invalid"),
            Self::InvalidCharstringOperator(op) => {
                write!(f, "charstring operator {op} is invalid")
            }
            Self::InvalidSubroutineIndex(index) => {
                write!(f, "subroutine index {index} is out of bounds")
            }
            Self::CharstringNestingDepthLimitExceeded => write!(
                f,
                "exceeded subroutine nesting depth limit {}",
                charstring::NESTING_DEPTH_LIMIT
            ),
            Self::InvalidTransientArrayIndex(index) => {
                write!(f, "transient array index {index} is out of bounds")
            }
            Self::MissingSubroutines => {
                write!(f, "encountered a callsubr operator but no subroutine index was provided")
            }
            Self::UnsupportedSeac => {
                write!(f, "the seac form of endchar is not supported")
            }
            Self::Read(err) => write!(f, "{err}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
