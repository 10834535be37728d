//! Parsing for PostScript DICTs.

use std::ops::Range;

use super::{Error, Number, Stack};
use crate::{types::Fixed, Cursor, ReadError};

/// PostScript DICT operator.
///
/// Only the operators needed to locate outlines and subroutines are named.
/// Every other valid operator is reported as [`Operator::Other`] and its
/// operands are discarded.
///
/// See "Table 9 Top DICT Operator Entries" and "Table 23 Private DICT
/// Operators" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf>
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Operator {
    FontBbox,
    CharstringsOffset,
    PrivateDictRange,
    CharstringType,
    Ros,
    FdArrayOffset,
    FdSelectOffset,
    SubrsOffset,
    DefaultWidthX,
    NominalWidthX,
    /// A one byte operator without special handling.
    Other(u8),
    /// An escaped (two byte) operator without special handling.
    OtherEscaped(u8),
}

impl Operator {
    fn from_opcode(opcode: u8) -> Option<Self> {
        use Operator::*;
        Some(match opcode {
            // Top DICT operators
            5 => FontBbox,
            17 => CharstringsOffset,
            18 => PrivateDictRange,
            // Private DICT operators
            19 => SubrsOffset,
            20 => DefaultWidthX,
            21 => NominalWidthX,
            0..=11 | 13..=16 => Other(opcode),
            // 22..=27, 31 and 255 are reserved
            _ => return None,
        })
    }

    fn from_extended_opcode(opcode: u8) -> Self {
        use Operator::*;
        match opcode {
            6 => CharstringType,
            30 => Ros,
            36 => FdArrayOffset,
            37 => FdSelectOffset,
            _ => OtherEscaped(opcode),
        }
    }
}

/// Either a PostScript DICT operator or a (numeric) operand.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Token {
    Operator(Operator),
    Operand(Number),
}

fn parse_token(cursor: &mut Cursor) -> Result<Token, Error> {
    // Escape opcode for accessing extensions.
    const ESCAPE: u8 = 12;
    let b0 = cursor.read::<u8>()?;
    Ok(if b0 == ESCAPE {
        let b1 = cursor.read::<u8>()?;
        Token::Operator(Operator::from_extended_opcode(b1))
    } else {
        // See "Table 3 Operand Encoding" in Adobe Technical Note #5176
        match b0 {
            28 | 29 | 32..=254 => Token::Operand(parse_int(cursor, b0)?.into()),
            30 => Token::Operand(parse_bcd(cursor)?.into()),
            _ => Token::Operator(Operator::from_opcode(b0).ok_or(Error::InvalidDictOperator(b0))?),
        }
    })
}

/// PostScript DICT Operator with its associated operands.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Entry {
    FontBbox([Fixed; 4]),
    CharstringsOffset(usize),
    PrivateDictRange(Range<usize>),
    CharstringType(i32),
    Ros {
        registry: i32,
        ordering: i32,
        supplement: Fixed,
    },
    FdArrayOffset(usize),
    FdSelectOffset(usize),
    SubrsOffset(usize),
    DefaultWidthX(Fixed),
    NominalWidthX(Fixed),
}

/// Given a byte slice containing DICT data, returns an iterator yielding
/// each operator with its associated operands.
///
/// Operators that are not represented by [`Entry`] are skipped along with
/// their operands.
pub fn entries(dict_data: &[u8]) -> impl Iterator<Item = Result<Entry, Error>> + '_ {
    let mut stack = Stack::new();
    let mut cursor = crate::FontData::new(dict_data).cursor();
    std::iter::from_fn(move || loop {
        if cursor.remaining_bytes() == 0 {
            return None;
        }
        let token = match parse_token(&mut cursor) {
            Ok(token) => token,
            Err(e) => return Some(Err(e)),
        };
        match token {
            Token::Operand(number) => match stack.push(number) {
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            },
            Token::Operator(op) => {
                let entry = parse_entry(op, &mut stack);
                stack.clear();
                match entry {
                    Ok(Some(entry)) => return Some(Ok(entry)),
                    Ok(None) => continue,
                    Err(e) => return Some(Err(e)),
                }
            }
        }
    })
}

fn parse_entry(op: Operator, stack: &mut Stack) -> Result<Option<Entry>, Error> {
    use Operator::*;
    Ok(Some(match op {
        FontBbox => Entry::FontBbox(stack.fixed_array::<4>(0)?),
        CharstringsOffset => Entry::CharstringsOffset(pop_offset(stack)?),
        PrivateDictRange => {
            let len = to_offset(stack.get_i32(0)?)?;
            let start = to_offset(stack.get_i32(1)?)?;
            let end = start.checked_add(len).ok_or(ReadError::OutOfBounds)?;
            Entry::PrivateDictRange(start..end)
        }
        CharstringType => Entry::CharstringType(stack.pop_i32()?),
        Ros => Entry::Ros {
            registry: stack.get_i32(0)?,
            ordering: stack.get_i32(1)?,
            supplement: stack.get_fixed(2)?,
        },
        FdArrayOffset => Entry::FdArrayOffset(pop_offset(stack)?),
        FdSelectOffset => Entry::FdSelectOffset(pop_offset(stack)?),
        SubrsOffset => Entry::SubrsOffset(pop_offset(stack)?),
        DefaultWidthX => Entry::DefaultWidthX(stack.pop_fixed()?),
        NominalWidthX => Entry::NominalWidthX(stack.pop_fixed()?),
        Other(_) | OtherEscaped(_) => return Ok(None),
    }))
}

fn pop_offset(stack: &mut Stack) -> Result<usize, Error> {
    to_offset(stack.pop_i32()?)
}

fn to_offset(value: i32) -> Result<usize, Error> {
    usize::try_from(value).map_err(|_| ReadError::OutOfBounds.into())
}

#[inline]
pub(crate) fn parse_int(cursor: &mut Cursor, b0: u8) -> Result<i32, Error> {
    // Size   b0 range     Value range              Value calculation
    //--------------------------------------------------------------------------------
    // 1      32 to 246    -107 to +107             b0 - 139
    // 2      247 to 250   +108 to +1131            (b0 - 247) * 256 + b1 + 108
    // 2      251 to 254   -1131 to -108            -(b0 - 251) * 256 - b1 - 108
    // 3      28           -32768 to +32767         b1 << 8 | b2
    // 5      29           -(2^31) to +(2^31 - 1)   b1 << 24 | b2 << 16 | b3 << 8 | b4
    Ok(match b0 {
        32..=246 => b0 as i32 - 139,
        247..=250 => (b0 as i32 - 247) * 256 + cursor.read::<u8>()? as i32 + 108,
        251..=254 => -(b0 as i32 - 251) * 256 - cursor.read::<u8>()? as i32 - 108,
        28 => cursor.read::<i16>()? as i32,
        29 => cursor.read::<i32>()?,
        _ => {
            return Err(Error::InvalidNumber);
        }
    })
}

// Digits past this are dropped from the mantissa.
const BCD_MAX_MANTISSA: i64 = 100_000_000_000_000_000;
// Exponents are clamped here; anything larger saturates or vanishes anyway.
const BCD_MAX_EXPONENT: i32 = 1000;

/// Parses a binary coded decimal real number, producing a 16.16 value.
///
/// Each nibble is a digit (0-9), a decimal point (a), a positive exponent
/// marker (b), a negative exponent marker (c), a minus sign (e) or the end
/// of the number (f). The nibble d is reserved. Out of range results
/// saturate.
///
/// See "Table 5 Nibble Definitions" in Adobe Technical Note #5176.
pub(crate) fn parse_bcd(cursor: &mut Cursor) -> Result<Fixed, Error> {
    #[derive(PartialEq)]
    enum Phase {
        Integer,
        Fraction,
        Exponent,
    }
    let mut phase = Phase::Integer;
    let mut negative = false;
    let mut exponent_negative = false;
    let mut mantissa = 0i64;
    // power of ten applied to the mantissa by digits
    let mut scale = 0i32;
    let mut exponent = 0i32;
    'outer: loop {
        let byte = cursor.read::<u8>()?;
        for nibble in [byte >> 4, byte & 0xF] {
            match nibble {
                0..=9 => {
                    let digit = nibble as i64;
                    match phase {
                        Phase::Integer | Phase::Fraction => {
                            if mantissa < BCD_MAX_MANTISSA {
                                mantissa = mantissa * 10 + digit;
                                if phase == Phase::Fraction {
                                    scale -= 1;
                                }
                            } else if phase == Phase::Integer {
                                scale += 1;
                            }
                        }
                        Phase::Exponent => {
                            exponent = (exponent * 10 + digit as i32).min(BCD_MAX_EXPONENT);
                        }
                    }
                }
                0xA if phase == Phase::Integer => phase = Phase::Fraction,
                0xB | 0xC if phase != Phase::Exponent => {
                    exponent_negative = nibble == 0xC;
                    phase = Phase::Exponent;
                }
                0xE if phase == Phase::Integer && mantissa == 0 && !negative => negative = true,
                0xF => break 'outer,
                _ => return Err(Error::InvalidNumber),
            }
        }
    }
    if exponent_negative {
        exponent = -exponent;
    }
    let power = scale + exponent;
    let mut bits = mantissa as i128 * 65536;
    if power >= 0 {
        for _ in 0..power.min(30) {
            bits *= 10;
            if bits > i32::MAX as i128 {
                break;
            }
        }
    } else {
        let mut divisor = 1i128;
        for _ in 0..(-power).min(30) {
            divisor *= 10;
        }
        // round half away from zero
        bits = (bits + divisor / 2) / divisor;
    }
    let bits = bits.min(i32::MAX as i128) as i32;
    Ok(Fixed::from_bits(if negative { -bits } else { bits }))
}

#[cfg(test)]
mod tests {
    use glyphpath_test_data::bebuffer::BeBuffer;

    use super::*;
    use crate::FontData;

    #[test]
    fn int_operands() {
        // Test the boundary conditions of the ranged int operators
        let empty = FontData::new(&[]);
        let min_byte = FontData::new(&[0]);
        let max_byte = FontData::new(&[255]);
        // 32..=246 => -107..=107
        assert_eq!(parse_int(&mut empty.cursor(), 32).unwrap(), -107);
        assert_eq!(parse_int(&mut empty.cursor(), 139).unwrap(), 0);
        assert_eq!(parse_int(&mut empty.cursor(), 246).unwrap(), 107);
        // 247..=250 => +108 to +1131
        assert_eq!(parse_int(&mut min_byte.cursor(), 247).unwrap(), 108);
        assert_eq!(parse_int(&mut max_byte.cursor(), 250).unwrap(), 1131);
        // 251..=254 => -1131 to -108
        assert_eq!(parse_int(&mut min_byte.cursor(), 251).unwrap(), -108);
        assert_eq!(parse_int(&mut max_byte.cursor(), 254).unwrap(), -1131);
        let short = FontData::new(&[0x80, 0x00]);
        assert_eq!(parse_int(&mut short.cursor(), 28).unwrap(), -32768);
        let long = FontData::new(&[0x00, 0x01, 0x00, 0x00]);
        assert_eq!(parse_int(&mut long.cursor(), 29).unwrap(), 65536);
        assert!(parse_int(&mut empty.cursor(), 29).is_err());
    }

    #[test]
    fn binary_coded_decimal_operands() {
        // "the value -2.25 is encoded by the byte sequence (1e e2 a2 5f)
        // and the value 0.140541E-3 by the sequence (1e 0a 14 05 41 c3 ff)."
        //
        // The leading 1e byte selects BCD parsing and is dropped here.
        let bytes = FontData::new(&[0xe2, 0xa2, 0x5f]);
        assert_eq!(
            parse_bcd(&mut bytes.cursor()).unwrap(),
            Fixed::from_f64(-2.25)
        );
        let bytes = FontData::new(&[0x0a, 0x14, 0x05, 0x41, 0xc3, 0xff]);
        assert_eq!(
            parse_bcd(&mut bytes.cursor()).unwrap(),
            Fixed::from_f64(0.140541E-3)
        );
        // 375e-4
        let bytes = FontData::new(&[0x37, 0x5c, 0x4f]);
        assert_eq!(
            parse_bcd(&mut bytes.cursor()).unwrap(),
            Fixed::from_f64(0.0375)
        );
        // 1.5e2
        let bytes = FontData::new(&[0x1a, 0x5b, 0x2f]);
        assert_eq!(
            parse_bcd(&mut bytes.cursor()).unwrap(),
            Fixed::from_i32(150)
        );
    }

    #[test]
    fn binary_coded_decimal_edge_cases() {
        // saturates
        let bytes = FontData::new(&[0x1b, 0x99, 0xff]);
        assert_eq!(parse_bcd(&mut bytes.cursor()).unwrap(), Fixed::MAX);
        // vanishes
        let bytes = FontData::new(&[0x1c, 0x99, 0xff]);
        assert_eq!(parse_bcd(&mut bytes.cursor()).unwrap(), Fixed::ZERO);
        // reserved nibble
        let bytes = FontData::new(&[0x1d, 0xff]);
        assert_eq!(parse_bcd(&mut bytes.cursor()), Err(Error::InvalidNumber));
        // unterminated
        let bytes = FontData::new(&[0x12, 0x34]);
        assert!(parse_bcd(&mut bytes.cursor()).is_err());
    }

    #[test]
    fn top_dict_entries() {
        use Entry::*;
        // version SID, FontBBox, CharStrings, Private, FDArray, FDSelect and
        // an unknown escaped operator
        let dict = BeBuffer::new()
            .extend([149u8, 0])
            .extend([139u8, 38, 28, 0x03, 0xE8, 247, 0x00, 5])
            .extend([29u8, 0x00, 0x00, 0x10, 0x00, 17])
            .extend([153u8, 195, 18])
            .extend([247u8, 0x00, 12, 36])
            .extend([247u8, 0x01, 12, 37])
            .extend([140u8, 12, 99]);
        let entries: Vec<_> = entries(&dict).map(|entry| entry.unwrap()).collect();
        let expected: &[Entry] = &[
            FontBbox([
                Fixed::ZERO,
                Fixed::from_i32(-101),
                Fixed::from_i32(1000),
                Fixed::from_i32(108),
            ]),
            CharstringsOffset(4096),
            PrivateDictRange(56..70),
            FdArrayOffset(108),
            FdSelectOffset(109),
        ];
        assert_eq!(&entries, expected);
    }

    #[test]
    fn private_dict_entries() {
        use Entry::*;
        // BlueValues (skipped), Subrs, defaultWidthX, nominalWidthX
        let dict = BeBuffer::new()
            .extend([139u8, 149, 6])
            .extend([159u8, 19])
            .extend([247u8, 0x1C, 20])
            .extend([30u8, 0x1a, 0x5f, 21]);
        let entries: Vec<_> = entries(&dict).map(|entry| entry.unwrap()).collect();
        let expected: &[Entry] = &[
            SubrsOffset(20),
            DefaultWidthX(Fixed::from_i32(136)),
            NominalWidthX(Fixed::from_f64(1.5)),
        ];
        assert_eq!(&entries, expected);
    }

    #[test]
    fn cid_font_entries() {
        // Adobe Identity 0 ROS, then CharstringType 2
        let dict = BeBuffer::new()
            .extend([248u8, 0x1B, 248, 0x1C, 139, 12, 30])
            .extend([141u8, 12, 6]);
        let entries: Vec<_> = entries(&dict).map(|entry| entry.unwrap()).collect();
        assert_eq!(
            entries,
            [
                Entry::Ros {
                    registry: 391,
                    ordering: 392,
                    supplement: Fixed::ZERO,
                },
                Entry::CharstringType(2)
            ]
        );
    }

    #[test]
    fn private_dict_range_avoid_overflow() {
        // A private DICT that tries to overflow when computing the end of
        // the range
        let private_dict = BeBuffer::new()
            .push(29u8) // integer operator
            .push(-1i32) // integer value
            .push(29u8) // integer operator
            .push(-1i32) // integer value
            .push(18u8) // PrivateDictRange operator
            .to_vec();
        // Just don't panic
        let _ = entries(&private_dict).count();
        let mut all = entries(&private_dict);
        assert!(all.next().unwrap().is_err());
    }

    #[test]
    fn reserved_operator_is_an_error() {
        let dict = [139u8, 22];
        let mut all = entries(&dict);
        assert_eq!(all.next(), Some(Err(Error::InvalidDictOperator(22))));
    }

    #[test]
    fn too_many_operands() {
        let dict = vec![139u8; 49];
        let mut all = entries(&dict);
        assert_eq!(all.next(), Some(Err(Error::StackOverflow)));
    }
}
