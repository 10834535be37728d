//! Parsing for PostScript charstrings.

use super::{Error, Index, Number, Stack};
use crate::{types::Fixed, Cursor};

/// Maximum nesting depth for subroutine calls.
///
/// See "Appendix B Type 2 Charstring Implementation Limits" at
/// <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=33>
pub const NESTING_DEPTH_LIMIT: u32 = 10;

/// Number of elements in the transient array used by `put` and `get`.
///
/// See "Appendix B Type 2 Charstring Implementation Limits" at
/// <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=33>
pub const TRANSIENT_ARRAY_LEN: usize = 32;

/// Seed for the `random` operator. It is the same for every charstring so
/// that evaluation is repeatable.
const RANDOM_SEED: u32 = 0x2545_F491;

/// Trait for processing commands resulting from charstring evaluation.
///
/// During processing, the path construction operators (see "4.1 Path
/// Construction Operators" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=15>)
/// are simplified into the basic move, line, curve and close commands.
///
/// This also has optional callbacks for the advance width and for processing
/// hint operators. See "4.3 Hint Operators" at
/// <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=21>
/// for more detail.
#[allow(unused_variables)]
pub trait CommandSink {
    // Path construction operators.
    fn move_to(&mut self, x: Fixed, y: Fixed);
    fn line_to(&mut self, x: Fixed, y: Fixed);
    fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed);
    fn close(&mut self);
    /// The advance width operand, relative to the nominal width of the
    /// Private DICT. Called at most once per charstring.
    fn width(&mut self, width: Fixed) {}
    // Hint operators.
    /// Horizontal stem hint at `y` with height `dy`.
    fn hstem(&mut self, y: Fixed, dy: Fixed) {}
    /// Vertical stem hint at `x` with width `dx`.
    fn vstem(&mut self, x: Fixed, dx: Fixed) {}
    /// Bitmask defining the hints that should be made active for the
    /// commands that follow.
    fn hint_mask(&mut self, mask: &[u8]) {}
    /// Bitmask defining the counter hints that should be made active for the
    /// commands that follow.
    fn counter_mask(&mut self, mask: &[u8]) {}
}

/// Evaluates the given charstring and emits the resulting commands to the
/// specified sink.
///
/// If the Private DICT associated with this charstring contains local
/// subroutines, then the `subrs` index must be provided, otherwise
/// `Error::MissingSubroutines` will be returned if a callsubr operator
/// is present.
///
/// An open contour is closed when evaluation finishes, whether or not the
/// charstring ends with `endchar`.
pub fn evaluate(
    charstring_data: &[u8],
    global_subrs: Index,
    subrs: Option<Index>,
    sink: &mut impl CommandSink,
) -> Result<(), Error> {
    let mut evaluator = Evaluator::new(global_subrs, subrs, sink);
    evaluator.evaluate(charstring_data, 0)?;
    if evaluator.is_open {
        evaluator.sink.close();
    }
    Ok(())
}

/// What the caller of a (sub)charstring should do next.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Flow {
    Continue,
    /// A `return` operator ended the current subroutine.
    Return,
    /// An `endchar` operator ended the glyph.
    EndChar,
}

/// Transient state for evaluating a charstring and handling recursive
/// subroutine calls.
struct Evaluator<'a, S> {
    global_subrs: Index<'a>,
    subrs: Option<Index<'a>>,
    sink: &'a mut S,
    is_open: bool,
    have_read_width: bool,
    stem_count: usize,
    x: Fixed,
    y: Fixed,
    stack: Stack,
    transient: [Number; TRANSIENT_ARRAY_LEN],
    random_state: u32,
}

impl<'a, S> Evaluator<'a, S>
where
    S: CommandSink,
{
    fn new(global_subrs: Index<'a>, subrs: Option<Index<'a>>, sink: &'a mut S) -> Self {
        Self {
            global_subrs,
            subrs,
            sink,
            is_open: false,
            have_read_width: false,
            stem_count: 0,
            stack: Stack::new(),
            x: Fixed::ZERO,
            y: Fixed::ZERO,
            transient: [Number::I32(0); TRANSIENT_ARRAY_LEN],
            random_state: RANDOM_SEED,
        }
    }

    /// Returns `Ok(true)` if the glyph was ended by `endchar`.
    fn evaluate(&mut self, charstring_data: &[u8], nesting_depth: u32) -> Result<bool, Error> {
        if nesting_depth > NESTING_DEPTH_LIMIT {
            return Err(Error::CharstringNestingDepthLimitExceeded);
        }
        let mut cursor = crate::FontData::new(charstring_data).cursor();
        while cursor.remaining_bytes() != 0 {
            let b0 = cursor.read::<u8>()?;
            match b0 {
                // See "3.2 Charstring Number Encoding" <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=12>
                //
                // Push an integer to the stack
                28 | 32..=254 => {
                    self.stack.push(super::dict::parse_int(&mut cursor, b0)?)?;
                }
                // Push a fixed point value to the stack
                255 => {
                    let num = Fixed::from_bits(cursor.read::<i32>()?);
                    self.stack.push(num)?;
                }
                _ => {
                    let operator = Operator::read(&mut cursor, b0)?;
                    match self.evaluate_operator(operator, &mut cursor, nesting_depth)? {
                        Flow::Continue => {}
                        Flow::Return => return Ok(false),
                        Flow::EndChar => return Ok(true),
                    }
                }
            }
        }
        Ok(false)
    }

    /// Consumes the advance width if this is the first stack clearing
    /// operator and `has_width` says the extra operand is present.
    ///
    /// Returns the stack index of the first real argument.
    fn take_width(&mut self, has_width: bool) -> Result<usize, Error> {
        if self.have_read_width {
            return Ok(0);
        }
        self.have_read_width = true;
        if has_width {
            let width = self.stack.get_fixed(0)?;
            self.sink.width(width);
            Ok(1)
        } else {
            Ok(0)
        }
    }

    fn move_to(&mut self, x: Fixed, y: Fixed) {
        if self.is_open {
            self.sink.close();
        }
        self.x = x;
        self.y = y;
        self.sink.move_to(x, y);
        self.is_open = true;
    }

    /// Starts a contour at the current point when a drawing operator comes
    /// before any moveto.
    fn ensure_open(&mut self) {
        if !self.is_open {
            self.sink.move_to(self.x, self.y);
            self.is_open = true;
        }
    }

    fn line_to(&mut self, x: Fixed, y: Fixed) {
        self.ensure_open();
        self.x = x;
        self.y = y;
        self.sink.line_to(x, y);
    }

    fn curve_to(&mut self, c0: (Fixed, Fixed), c1: (Fixed, Fixed), end: (Fixed, Fixed)) {
        self.ensure_open();
        self.x = end.0;
        self.y = end.1;
        self.sink.curve_to(c0.0, c0.1, c1.0, c1.1, end.0, end.1);
    }

    fn transient_index(index: i32) -> Result<usize, Error> {
        usize::try_from(index)
            .ok()
            .filter(|ix| *ix < TRANSIENT_ARRAY_LEN)
            .ok_or(Error::InvalidTransientArrayIndex(index))
    }

    /// Returns a pseudo random value in the range (0, 1].
    fn next_random(&mut self) -> Fixed {
        // xorshift32
        let mut x = self.random_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.random_state = x;
        Fixed::from_bits((x & 0xFFFF) as i32 + 1)
    }

    /// Emits stem hints from pairs of stack values and returns the number of
    /// stems read.
    fn stems(&mut self, first: usize, horizontal: bool) -> Result<usize, Error> {
        let mut pos = Fixed::ZERO;
        let mut i = first;
        while i + 2 <= self.stack.len() {
            let [a, b] = self.stack.fixed_array::<2>(i)?;
            let start = pos + a;
            if horizontal {
                self.sink.hstem(start, b);
            } else {
                self.sink.vstem(start, b);
            }
            pos = start + b;
            i += 2;
        }
        Ok((i - first) / 2)
    }

    /// Evaluates a single charstring operator.
    fn evaluate_operator(
        &mut self,
        operator: Operator,
        cursor: &mut Cursor,
        nesting_depth: u32,
    ) -> Result<Flow, Error> {
        use Operator::*;
        match operator {
            // Stem hints. The pairs of arguments are relative to each other.
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=21>
            HStem | VStem | HStemHm | VStemHm => {
                let first = self.take_width(self.stack.len_is_odd())?;
                let horizontal = matches!(operator, HStem | HStemHm);
                self.stem_count += self.stems(first, horizontal)?;
                self.stack.clear();
            }
            // Arguments on the stack are an implied vstem.
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=24>
            HintMask | CntrMask => {
                let first = self.take_width(self.stack.len_is_odd())?;
                self.stem_count += self.stems(first, false)?;
                self.stack.clear();
                let mask_len = (self.stem_count + 7) / 8;
                let mask = cursor.read_bytes(mask_len)?;
                if operator == HintMask {
                    self.sink.hint_mask(mask);
                } else {
                    self.sink.counter_mask(mask);
                }
            }
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=16>
            RMoveTo => {
                let first = self.take_width(self.stack.len() == 3)?;
                let [dx, dy] = self.stack.fixed_array::<2>(first)?;
                self.move_to(self.x + dx, self.y + dy);
                self.stack.clear();
            }
            HMoveTo | VMoveTo => {
                let first = self.take_width(self.stack.len() == 2)?;
                let delta = self.stack.get_fixed(first)?;
                if operator == HMoveTo {
                    self.move_to(self.x + delta, self.y);
                } else {
                    self.move_to(self.x, self.y + delta);
                }
                self.stack.clear();
            }
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=16>
            RLineTo => {
                let mut i = 0;
                while i + 2 <= self.stack.len() {
                    let [dx, dy] = self.stack.fixed_array::<2>(i)?;
                    self.line_to(self.x + dx, self.y + dy);
                    i += 2;
                }
                self.stack.clear();
            }
            // Alternating horizontal and vertical lines.
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=17>
            HLineTo | VLineTo => {
                let mut horizontal = operator == HLineTo;
                for i in 0..self.stack.len() {
                    let delta = self.stack.get_fixed(i)?;
                    if horizontal {
                        self.line_to(self.x + delta, self.y);
                    } else {
                        self.line_to(self.x, self.y + delta);
                    }
                    horizontal = !horizontal;
                }
                self.stack.clear();
            }
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=17>
            RrCurveTo => {
                let mut i = 0;
                while i + 6 <= self.stack.len() {
                    self.rr_curve(i)?;
                    i += 6;
                }
                self.stack.clear();
            }
            // One or more curves followed by a line.
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=20>
            RCurveLine => {
                let len = self.stack.len();
                let mut i = 0;
                while i + 8 <= len {
                    self.rr_curve(i)?;
                    i += 6;
                }
                if i + 2 <= len {
                    let [dx, dy] = self.stack.fixed_array::<2>(i)?;
                    self.line_to(self.x + dx, self.y + dy);
                }
                self.stack.clear();
            }
            // One or more lines followed by a curve.
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=20>
            RLineCurve => {
                let len = self.stack.len();
                let mut i = 0;
                while i + 8 <= len {
                    let [dx, dy] = self.stack.fixed_array::<2>(i)?;
                    self.line_to(self.x + dx, self.y + dy);
                    i += 2;
                }
                if i + 6 <= len {
                    self.rr_curve(i)?;
                }
                self.stack.clear();
            }
            // Curves that start and end horizontal. An odd count carries a
            // leading dy1 for the first curve.
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=18>
            HhCurveTo => {
                let mut i = 0;
                let mut dy1 = Fixed::ZERO;
                if self.stack.len_is_odd() {
                    dy1 = self.stack.get_fixed(0)?;
                    i += 1;
                }
                while i + 4 <= self.stack.len() {
                    let [dxa, dxb, dyb, dxc] = self.stack.fixed_array::<4>(i)?;
                    let c0 = (self.x + dxa, self.y + dy1);
                    let c1 = (c0.0 + dxb, c0.1 + dyb);
                    let end = (c1.0 + dxc, c1.1);
                    self.curve_to(c0, c1, end);
                    dy1 = Fixed::ZERO;
                    i += 4;
                }
                self.stack.clear();
            }
            // Curves that start and end vertical. An odd count carries a
            // leading dx1 for the first curve.
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=18>
            VvCurveTo => {
                let mut i = 0;
                let mut dx1 = Fixed::ZERO;
                if self.stack.len_is_odd() {
                    dx1 = self.stack.get_fixed(0)?;
                    i += 1;
                }
                while i + 4 <= self.stack.len() {
                    let [dya, dxb, dyb, dyc] = self.stack.fixed_array::<4>(i)?;
                    let c0 = (self.x + dx1, self.y + dya);
                    let c1 = (c0.0 + dxb, c0.1 + dyb);
                    let end = (c1.0, c1.1 + dyc);
                    self.curve_to(c0, c1, end);
                    dx1 = Fixed::ZERO;
                    i += 4;
                }
                self.stack.clear();
            }
            // Curves alternating between horizontal and vertical tangents.
            // When exactly 5 arguments remain, the last one is the final
            // off-axis delta of the last curve.
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=18>
            HvCurveTo | VhCurveTo => {
                let len = self.stack.len();
                let mut horizontal = operator == HvCurveTo;
                let mut i = 0;
                while i + 4 <= len {
                    let [a, b, c, d] = self.stack.fixed_array::<4>(i)?;
                    let last = if len - i == 5 {
                        self.stack.get_fixed(i + 4)?
                    } else {
                        Fixed::ZERO
                    };
                    if horizontal {
                        let c0 = (self.x + a, self.y);
                        let c1 = (c0.0 + b, c0.1 + c);
                        let end = (c1.0 + last, c1.1 + d);
                        self.curve_to(c0, c1, end);
                    } else {
                        let c0 = (self.x, self.y + a);
                        let c1 = (c0.0 + b, c0.1 + c);
                        let end = (c1.0 + d, c1.1 + last);
                        self.curve_to(c0, c1, end);
                    }
                    horizontal = !horizontal;
                    i += 4;
                }
                self.stack.clear();
            }
            // The flex operators are intended to emit either two curves or
            // a straight line depending on a "flex depth" parameter. We
            // always emit the two curves, as FreeType does.
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=18>
            Flex => {
                let args = self.stack.fixed_array::<12>(0)?;
                let c0 = (self.x + args[0], self.y + args[1]);
                let c1 = (c0.0 + args[2], c0.1 + args[3]);
                let mid = (c1.0 + args[4], c1.1 + args[5]);
                let c2 = (mid.0 + args[6], mid.1 + args[7]);
                let c3 = (c2.0 + args[8], c2.1 + args[9]);
                let end = (c3.0 + args[10], c3.1 + args[11]);
                self.curve_to(c0, c1, mid);
                self.curve_to(c2, c3, end);
                self.stack.clear();
            }
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=19>
            HFlex => {
                let args = self.stack.fixed_array::<7>(0)?;
                let y = self.y;
                let c0 = (self.x + args[0], y);
                let c1 = (c0.0 + args[1], y + args[2]);
                let mid = (c1.0 + args[3], c1.1);
                let c2 = (mid.0 + args[4], c1.1);
                let c3 = (c2.0 + args[5], y);
                let end = (c3.0 + args[6], y);
                self.curve_to(c0, c1, mid);
                self.curve_to(c2, c3, end);
                self.stack.clear();
            }
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=19>
            HFlex1 => {
                let args = self.stack.fixed_array::<9>(0)?;
                let y = self.y;
                let c0 = (self.x + args[0], y + args[1]);
                let c1 = (c0.0 + args[2], c0.1 + args[3]);
                let mid = (c1.0 + args[4], c1.1);
                let c2 = (mid.0 + args[5], c1.1);
                let c3 = (c2.0 + args[6], c2.1 + args[7]);
                let end = (c3.0 + args[8], y);
                self.curve_to(c0, c1, mid);
                self.curve_to(c2, c3, end);
                self.stack.clear();
            }
            // The final argument is dx or dy depending on which direction
            // moved further over the first five control points. The other
            // coordinate returns to its starting value.
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=20>
            Flex1 => {
                let args = self.stack.fixed_array::<11>(0)?;
                let (x, y) = (self.x, self.y);
                let c0 = (x + args[0], y + args[1]);
                let c1 = (c0.0 + args[2], c0.1 + args[3]);
                let mid = (c1.0 + args[4], c1.1 + args[5]);
                let c2 = (mid.0 + args[6], mid.1 + args[7]);
                let c3 = (c2.0 + args[8], c2.1 + args[9]);
                let dx = (c3.0 - x).abs();
                let dy = (c3.1 - y).abs();
                let end = if dx > dy {
                    (c3.0 + args[10], y)
                } else {
                    (x, c3.1 + args[10])
                };
                self.curve_to(c0, c1, mid);
                self.curve_to(c2, c3, end);
                self.stack.clear();
            }
            // Deprecated and ignored.
            DotSection => self.stack.clear(),
            // Arithmetic, storage and conditional operators only touch the
            // operand stack and the transient array.
            // See "4.4 Arithmetic Operators" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=25>
            And | Or | Eq => {
                let b = self.stack.pop_number()?;
                let a = self.stack.pop_number()?;
                let result = match operator {
                    And => !a.is_zero() && !b.is_zero(),
                    Or => !a.is_zero() || !b.is_zero(),
                    _ => a.to_fixed() == b.to_fixed(),
                };
                self.stack.push(result as i32)?;
            }
            Not => {
                let a = self.stack.pop_number()?;
                self.stack.push(a.is_zero() as i32)?;
            }
            Abs | Neg | Sqrt => {
                let a = self.stack.pop_number()?;
                self.stack.push(unary(operator, a))?;
            }
            Add | Sub | Mul | Div => {
                let b = self.stack.pop_number()?;
                let a = self.stack.pop_number()?;
                self.stack.push(binary(operator, a, b))?;
            }
            Random => {
                let value = self.next_random();
                self.stack.push(value)?;
            }
            Drop => {
                self.stack.pop_number()?;
            }
            Dup => {
                let a = self.stack.pop_number()?;
                self.stack.push(a)?;
                self.stack.push(a)?;
            }
            Exch => {
                let b = self.stack.pop_number()?;
                let a = self.stack.pop_number()?;
                self.stack.push(b)?;
                self.stack.push(a)?;
            }
            // Copies the element `i` below the top. Negative indices copy
            // the top element.
            Operator::Index => {
                let i = self.stack.pop_i32()?.max(0) as usize;
                let len = self.stack.len();
                if i >= len {
                    return Err(Error::StackUnderflow);
                }
                let value = self.stack.get_number(len - 1 - i)?;
                self.stack.push(value)?;
            }
            Roll => {
                let shift = self.stack.pop_i32()?;
                let count = self.stack.pop_i32()?;
                let count = usize::try_from(count).map_err(|_| Error::StackUnderflow)?;
                self.stack.roll(count, shift)?;
            }
            // s1 s2 v1 v2 ifelse: pushes s1 if v1 <= v2, otherwise s2
            IfElse => {
                let v2 = self.stack.pop_number()?;
                let v1 = self.stack.pop_number()?;
                let s2 = self.stack.pop_number()?;
                let s1 = self.stack.pop_number()?;
                let result = if v1.to_fixed() <= v2.to_fixed() { s1 } else { s2 };
                self.stack.push(result)?;
            }
            Put => {
                let index = Self::transient_index(self.stack.pop_i32()?)?;
                self.transient[index] = self.stack.pop_number()?;
            }
            Get => {
                let index = Self::transient_index(self.stack.pop_i32()?)?;
                self.stack.push(self.transient[index])?;
            }
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=23>
            EndChar => {
                let len = self.stack.len();
                let first = self.take_width(len == 1 || len == 5)?;
                // The remaining four arguments are the Type 1 seac operator:
                // adx ady bchar achar
                if len - first == 4 {
                    return Err(Error::UnsupportedSeac);
                }
                self.stack.clear();
                if self.is_open {
                    self.sink.close();
                    self.is_open = false;
                }
                return Ok(Flow::EndChar);
            }
            Return => return Ok(Flow::Return),
            // Call local or global subroutine
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=29>
            CallSubr | CallGsubr => {
                let subrs_index = if operator == CallSubr {
                    self.subrs.clone().ok_or(Error::MissingSubroutines)?
                } else {
                    self.global_subrs.clone()
                };
                let index = self.stack.pop_i32()?;
                let biased_index = usize::try_from(index.wrapping_add(subrs_index.subr_bias()))
                    .map_err(|_| Error::InvalidSubroutineIndex(index))?;
                if biased_index >= subrs_index.count() as usize {
                    return Err(Error::InvalidSubroutineIndex(index));
                }
                let subr_charstring_data = subrs_index.get(biased_index)?;
                if self.evaluate(subr_charstring_data, nesting_depth + 1)? {
                    return Ok(Flow::EndChar);
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Emits a curve from the six deltas starting at stack index `i`.
    fn rr_curve(&mut self, i: usize) -> Result<(), Error> {
        let args = self.stack.fixed_array::<6>(i)?;
        let c0 = (self.x + args[0], self.y + args[1]);
        let c1 = (c0.0 + args[2], c0.1 + args[3]);
        let end = (c1.0 + args[4], c1.1 + args[5]);
        self.curve_to(c0, c1, end);
        Ok(())
    }
}

/// Applies `abs`, `neg` or `sqrt`.
fn unary(operator: Operator, a: Number) -> Number {
    match (operator, a) {
        (Operator::Abs, Number::I32(a)) => Number::I32(a.wrapping_abs()),
        (Operator::Abs, Number::Fixed(a)) => Number::Fixed(a.abs()),
        (Operator::Neg, Number::I32(a)) => Number::I32(a.wrapping_neg()),
        (Operator::Neg, Number::Fixed(a)) => Number::Fixed(-a),
        // the square root of a negative number is undefined; use zero
        (_, a) => {
            let bits = a.to_fixed().to_bits();
            if bits <= 0 {
                return Number::I32(0);
            }
            // sqrt(v / 2^16) * 2^16 == sqrt(v * 2^16)
            let root = ((bits as u64) << 16).isqrt();
            Number::Fixed(Fixed::from_bits(root as i32))
        }
    }
}

/// Applies `add`, `sub`, `mul` or `div`.
///
/// Integer operands produce an integer unless a division has a remainder.
fn binary(operator: Operator, a: Number, b: Number) -> Number {
    match (operator, a, b) {
        (Operator::Add, Number::I32(a), Number::I32(b)) => Number::I32(a.wrapping_add(b)),
        (Operator::Sub, Number::I32(a), Number::I32(b)) => Number::I32(a.wrapping_sub(b)),
        (Operator::Mul, Number::I32(a), Number::I32(b)) => Number::I32(a.wrapping_mul(b)),
        (Operator::Div, Number::I32(a), Number::I32(b)) if a.checked_rem(b) == Some(0) => {
            Number::I32(a / b)
        }
        (Operator::Add, a, b) => Number::Fixed(a.to_fixed() + b.to_fixed()),
        (Operator::Sub, a, b) => Number::Fixed(a.to_fixed() - b.to_fixed()),
        (Operator::Mul, a, b) => Number::Fixed(a.to_fixed() * b.to_fixed()),
        // saturates on a zero divisor
        (_, a, b) => Number::Fixed(a.to_fixed() / b.to_fixed()),
    }
}

/// Type 2 charstring operator.
///
/// See "Appendix A Type 2 Charstring Command Codes" at
/// <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=31>
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Operator {
    HStem,
    VStem,
    VMoveTo,
    RLineTo,
    HLineTo,
    VLineTo,
    RrCurveTo,
    CallSubr,
    Return,
    EndChar,
    HStemHm,
    HintMask,
    CntrMask,
    RMoveTo,
    HMoveTo,
    VStemHm,
    RCurveLine,
    RLineCurve,
    VvCurveTo,
    HhCurveTo,
    CallGsubr,
    VhCurveTo,
    HvCurveTo,
    DotSection,
    HFlex,
    Flex,
    HFlex1,
    Flex1,
    And,
    Or,
    Not,
    Abs,
    Add,
    Sub,
    Div,
    Neg,
    Eq,
    Drop,
    Put,
    Get,
    IfElse,
    Random,
    Mul,
    Sqrt,
    Dup,
    Exch,
    Index,
    Roll,
}

impl Operator {
    fn read(cursor: &mut Cursor, b0: u8) -> Result<Self, Error> {
        // Escape opcode for accessing two byte operators
        const ESCAPE: u8 = 12;
        let (opcode, operator) = if b0 == ESCAPE {
            let b1 = cursor.read::<u8>()?;
            (b1, Self::from_two_byte_opcode(b1))
        } else {
            (b0, Self::from_opcode(b0))
        };
        operator.ok_or(Error::InvalidCharstringOperator(opcode))
    }

    /// Creates an operator from the given opcode.
    fn from_opcode(opcode: u8) -> Option<Self> {
        use Operator::*;
        Some(match opcode {
            1 => HStem,
            3 => VStem,
            4 => VMoveTo,
            5 => RLineTo,
            6 => HLineTo,
            7 => VLineTo,
            8 => RrCurveTo,
            10 => CallSubr,
            11 => Return,
            14 => EndChar,
            18 => HStemHm,
            19 => HintMask,
            20 => CntrMask,
            21 => RMoveTo,
            22 => HMoveTo,
            23 => VStemHm,
            24 => RCurveLine,
            25 => RLineCurve,
            26 => VvCurveTo,
            27 => HhCurveTo,
            29 => CallGsubr,
            30 => VhCurveTo,
            31 => HvCurveTo,
            _ => return None,
        })
    }

    /// Creates an operator from the given extended opcode.
    ///
    /// These are preceded by a byte containing the escape value of 12.
    fn from_two_byte_opcode(opcode: u8) -> Option<Self> {
        use Operator::*;
        Some(match opcode {
            0 => DotSection,
            3 => And,
            4 => Or,
            5 => Not,
            9 => Abs,
            10 => Add,
            11 => Sub,
            12 => Div,
            14 => Neg,
            15 => Eq,
            18 => Drop,
            20 => Put,
            21 => Get,
            22 => IfElse,
            23 => Random,
            24 => Mul,
            26 => Sqrt,
            27 => Dup,
            28 => Exch,
            29 => Operator::Index,
            30 => Roll,
            34 => HFlex,
            35 => Flex,
            36 => HFlex1,
            37 => Flex1,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use glyphpath_test_data::bebuffer::BeBuffer;

    use super::*;

    #[derive(Copy, Clone, PartialEq, Debug)]
    enum Command {
        MoveTo(Fixed, Fixed),
        LineTo(Fixed, Fixed),
        CurveTo(Fixed, Fixed, Fixed, Fixed, Fixed, Fixed),
        Close,
    }

    #[derive(PartialEq, Default, Debug)]
    struct CaptureCommandSink {
        commands: Vec<Command>,
        widths: Vec<Fixed>,
        hstems: Vec<(Fixed, Fixed)>,
        vstems: Vec<(Fixed, Fixed)>,
        masks: Vec<Vec<u8>>,
    }

    impl CommandSink for CaptureCommandSink {
        fn move_to(&mut self, x: Fixed, y: Fixed) {
            self.commands.push(Command::MoveTo(x, y))
        }

        fn line_to(&mut self, x: Fixed, y: Fixed) {
            self.commands.push(Command::LineTo(x, y))
        }

        fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed) {
            self.commands
                .push(Command::CurveTo(cx0, cy0, cx1, cy1, x, y))
        }

        fn close(&mut self) {
            self.commands.push(Command::Close)
        }

        fn width(&mut self, width: Fixed) {
            self.widths.push(width)
        }

        fn hstem(&mut self, y: Fixed, dy: Fixed) {
            self.hstems.push((y, dy))
        }

        fn vstem(&mut self, x: Fixed, dx: Fixed) {
            self.vstems.push((x, dx))
        }

        fn hint_mask(&mut self, mask: &[u8]) {
            self.masks.push(mask.to_vec())
        }
    }

    /// Charstring tokens for building test programs.
    #[derive(Copy, Clone)]
    enum Tok {
        N(i32),
        F(Fixed),
        Op(u8),
        Esc(u8),
        Byte(u8),
    }

    use Tok::*;

    const HSTEM: Tok = Op(1);
    const VMOVETO: Tok = Op(4);
    const RLINETO: Tok = Op(5);
    const HLINETO: Tok = Op(6);
    const RRCURVETO: Tok = Op(8);
    const CALLSUBR: Tok = Op(10);
    const RETURN: Tok = Op(11);
    const ENDCHAR: Tok = Op(14);
    const HSTEMHM: Tok = Op(18);
    const HINTMASK: Tok = Op(19);
    const RMOVETO: Tok = Op(21);
    const HMOVETO: Tok = Op(22);
    const RCURVELINE: Tok = Op(24);
    const RLINECURVE: Tok = Op(25);
    const VVCURVETO: Tok = Op(26);
    const HHCURVETO: Tok = Op(27);
    const CALLGSUBR: Tok = Op(29);
    const VHCURVETO: Tok = Op(30);
    const HVCURVETO: Tok = Op(31);
    const HFLEX: Tok = Esc(34);
    const FLEX: Tok = Esc(35);
    const FLEX1: Tok = Esc(37);
    const AND: Tok = Esc(3);
    const OR: Tok = Esc(4);
    const NOT: Tok = Esc(5);
    const ABS: Tok = Esc(9);
    const ADD: Tok = Esc(10);
    const SUB: Tok = Esc(11);
    const DIV: Tok = Esc(12);
    const NEG: Tok = Esc(14);
    const EQ: Tok = Esc(15);
    const DROP: Tok = Esc(18);
    const PUT: Tok = Esc(20);
    const GET: Tok = Esc(21);
    const IFELSE: Tok = Esc(22);
    const RANDOM: Tok = Esc(23);
    const MUL: Tok = Esc(24);
    const SQRT: Tok = Esc(26);
    const DUP: Tok = Esc(27);
    const EXCH: Tok = Esc(28);
    const INDEX: Tok = Esc(29);
    const ROLL: Tok = Esc(30);

    fn encode(tokens: &[Tok]) -> Vec<u8> {
        let mut buf = BeBuffer::new();
        for token in tokens {
            buf = match *token {
                N(value) if (-107..=107).contains(&value) => buf.push((value + 139) as u8),
                N(value) => buf.push(28u8).push(value as i16),
                F(value) => buf.push(255u8).push(value.to_bits()),
                Op(op) => buf.push(op),
                Esc(op) => buf.push(12u8).push(op),
                Byte(byte) => buf.push(byte),
            };
        }
        buf.to_vec()
    }

    fn make_index(objects: &[Vec<u8>]) -> Vec<u8> {
        let mut buf = BeBuffer::new().push(objects.len() as u16).push(4u8);
        let mut offset = 1u32;
        buf = buf.push(offset);
        for object in objects {
            offset += object.len() as u32;
            buf = buf.push(offset);
        }
        for object in objects {
            buf = buf.extend(object.iter().copied());
        }
        buf.to_vec()
    }

    fn run(tokens: &[Tok]) -> Result<CaptureCommandSink, Error> {
        run_with_subrs(tokens, &[], None)
    }

    fn run_with_subrs(
        tokens: &[Tok],
        global_subrs: &[Vec<u8>],
        subrs: Option<&[Vec<u8>]>,
    ) -> Result<CaptureCommandSink, Error> {
        let global_data = make_index(global_subrs);
        let local_data = subrs.map(make_index);
        let global = Index::new(&global_data)?;
        let local = local_data.as_deref().map(Index::new).transpose()?;
        let mut sink = CaptureCommandSink::default();
        evaluate(&encode(tokens), global, local, &mut sink)?;
        Ok(sink)
    }

    fn pt(x: i32, y: i32) -> (Fixed, Fixed) {
        (Fixed::from_i32(x), Fixed::from_i32(y))
    }

    fn move_to(x: i32, y: i32) -> Command {
        let (x, y) = pt(x, y);
        Command::MoveTo(x, y)
    }

    fn line_to(x: i32, y: i32) -> Command {
        let (x, y) = pt(x, y);
        Command::LineTo(x, y)
    }

    fn curve_to(c0: (i32, i32), c1: (i32, i32), end: (i32, i32)) -> Command {
        let (a, b) = pt(c0.0, c0.1);
        let (c, d) = pt(c1.0, c1.1);
        let (e, f) = pt(end.0, end.1);
        Command::CurveTo(a, b, c, d, e, f)
    }

    #[test]
    fn lines_and_close() {
        let sink = run(&[
            N(10),
            N(20),
            RMOVETO,
            N(30),
            N(0),
            N(0),
            N(30),
            RLINETO,
            N(-30),
            HLINETO,
            ENDCHAR,
        ])
        .unwrap();
        assert_eq!(
            sink.commands,
            [
                move_to(10, 20),
                line_to(40, 20),
                line_to(40, 50),
                line_to(10, 50),
                Command::Close
            ]
        );
        assert!(sink.widths.is_empty());
    }

    #[test]
    fn moveto_closes_open_contour() {
        let sink = run(&[N(1), HMOVETO, N(5), HLINETO, N(10), VMOVETO, ENDCHAR]).unwrap();
        assert_eq!(
            sink.commands,
            [
                move_to(1, 0),
                line_to(6, 0),
                Command::Close,
                move_to(6, 10),
                Command::Close
            ]
        );
    }

    #[test]
    fn width_on_rmoveto() {
        let sink = run(&[N(500), N(10), N(20), RMOVETO, ENDCHAR]).unwrap();
        assert_eq!(sink.widths, [Fixed::from_i32(500)]);
        assert_eq!(sink.commands, [move_to(10, 20), Command::Close]);
    }

    #[test]
    fn width_on_hmoveto() {
        let sink = run(&[N(-20), N(10), HMOVETO, ENDCHAR]).unwrap();
        assert_eq!(sink.widths, [Fixed::from_i32(-20)]);
        assert_eq!(sink.commands, [move_to(10, 0), Command::Close]);
    }

    #[test]
    fn width_on_stems() {
        let sink = run(&[N(500), N(10), N(20), HSTEM, N(5), VMOVETO, ENDCHAR]).unwrap();
        assert_eq!(sink.widths, [Fixed::from_i32(500)]);
        assert_eq!(sink.hstems, [pt(10, 20)]);
        assert_eq!(sink.commands, [move_to(0, 5), Command::Close]);
    }

    #[test]
    fn width_on_endchar() {
        let sink = run(&[N(250), ENDCHAR]).unwrap();
        assert_eq!(sink.widths, [Fixed::from_i32(250)]);
        assert!(sink.commands.is_empty());
    }

    #[test]
    fn width_is_read_only_once() {
        // the second rmoveto has an odd count but the width is already gone
        let sink = run(&[N(10), N(20), RMOVETO, N(1), N(2), N(3), RMOVETO, ENDCHAR]).unwrap();
        assert!(sink.widths.is_empty());
        assert_eq!(
            sink.commands,
            [
                move_to(10, 20),
                Command::Close,
                move_to(11, 22),
                Command::Close
            ]
        );
    }

    #[test]
    fn seac_is_unsupported() {
        assert_eq!(
            run(&[N(0), N(0), N(65), N(97), ENDCHAR]).err(),
            Some(Error::UnsupportedSeac)
        );
        assert_eq!(
            run(&[N(500), N(0), N(0), N(65), N(97), ENDCHAR]).err(),
            Some(Error::UnsupportedSeac)
        );
    }

    #[test]
    fn curves() {
        let sink = run(&[
            N(0),
            N(0),
            RMOVETO,
            N(10),
            N(0),
            N(10),
            N(10),
            N(0),
            N(10),
            RRCURVETO,
            // hvcurveto with 8 args: horizontal start then vertical start
            N(5),
            N(5),
            N(5),
            N(5),
            N(6),
            N(6),
            N(6),
            N(6),
            HVCURVETO,
            ENDCHAR,
        ])
        .unwrap();
        assert_eq!(
            sink.commands,
            [
                move_to(0, 0),
                curve_to((10, 0), (20, 10), (20, 20)),
                curve_to((25, 20), (30, 25), (30, 30)),
                curve_to((30, 36), (36, 42), (42, 42)),
                Command::Close,
            ]
        );
    }

    #[test]
    fn vhcurveto_with_final_delta() {
        let sink = run(&[N(0), VMOVETO, N(10), N(5), N(5), N(10), N(3), VHCURVETO]).unwrap();
        assert_eq!(
            sink.commands,
            [
                move_to(0, 0),
                curve_to((0, 10), (5, 15), (15, 18)),
                Command::Close
            ]
        );
    }

    #[test]
    fn hvcurveto_with_final_delta() {
        let sink = run(&[
            N(0),
            HMOVETO,
            N(10),
            N(5),
            N(5),
            N(10),
            N(2),
            N(2),
            N(2),
            N(2),
            N(7),
            HVCURVETO,
        ])
        .unwrap();
        assert_eq!(
            sink.commands,
            [
                move_to(0, 0),
                curve_to((10, 0), (15, 5), (15, 15)),
                curve_to((15, 17), (17, 19), (19, 26)),
                Command::Close
            ]
        );
    }

    #[test]
    fn hh_and_vv_curves_with_odd_counts() {
        let sink = run(&[
            N(0),
            HMOVETO,
            N(3),
            N(10),
            N(5),
            N(5),
            N(10),
            HHCURVETO,
            N(4),
            N(10),
            N(5),
            N(5),
            N(10),
            VVCURVETO,
        ])
        .unwrap();
        assert_eq!(
            sink.commands,
            [
                move_to(0, 0),
                curve_to((10, 3), (15, 8), (25, 8)),
                curve_to((29, 18), (34, 23), (34, 33)),
                Command::Close
            ]
        );
    }

    #[test]
    fn curve_line_combinations() {
        let sink = run(&[
            N(0),
            HMOVETO,
            N(1),
            N(1),
            N(1),
            N(1),
            N(1),
            N(1),
            N(5),
            N(0),
            RCURVELINE,
            N(0),
            N(5),
            N(2),
            N(2),
            N(2),
            N(2),
            N(2),
            N(2),
            RLINECURVE,
        ])
        .unwrap();
        assert_eq!(
            sink.commands,
            [
                move_to(0, 0),
                curve_to((1, 1), (2, 2), (3, 3)),
                line_to(8, 3),
                line_to(8, 8),
                curve_to((10, 10), (12, 12), (14, 14)),
                Command::Close
            ]
        );
    }

    #[test]
    fn flex_family() {
        let sink = run(&[
            N(0),
            HMOVETO,
            N(1),
            N(2),
            N(3),
            N(4),
            N(5),
            N(6),
            N(7),
            N(8),
            N(9),
            N(10),
            N(11),
            N(12),
            N(50),
            FLEX,
            N(1),
            N(2),
            N(3),
            N(4),
            N(5),
            N(6),
            N(7),
            HFLEX,
            // flex1 where dx dominates, so the last arg is dx
            N(10),
            N(1),
            N(10),
            N(1),
            N(10),
            N(1),
            N(10),
            N(-1),
            N(10),
            N(-1),
            N(10),
            FLEX1,
        ])
        .unwrap();
        assert_eq!(
            sink.commands,
            [
                move_to(0, 0),
                curve_to((1, 2), (4, 6), (9, 12)),
                curve_to((16, 20), (25, 30), (36, 42)),
                curve_to((37, 42), (39, 45), (43, 45)),
                curve_to((48, 45), (54, 42), (61, 42)),
                curve_to((71, 43), (81, 44), (91, 45)),
                curve_to((101, 44), (111, 43), (121, 42)),
                Command::Close
            ]
        );
    }

    #[test]
    fn hint_mask_bytes_are_skipped() {
        // two stems from hstemhm, one implied vstem: 3 stems, one mask byte
        let sink = run(&[
            N(1),
            N(2),
            N(3),
            N(4),
            HSTEMHM,
            N(10),
            N(5),
            HINTMASK,
            Byte(0xE0),
            N(7),
            N(8),
            RMOVETO,
            ENDCHAR,
        ])
        .unwrap();
        assert_eq!(sink.hstems, [pt(1, 2), pt(6, 4)]);
        assert_eq!(sink.vstems, [pt(10, 5)]);
        assert_eq!(sink.masks, [vec![0xE0]]);
        assert_eq!(sink.commands, [move_to(7, 8), Command::Close]);
    }

    #[test]
    fn subroutines() {
        // local subr 0 draws a line, global subr 0 calls local subr 0
        let local = vec![encode(&[N(10), N(0), RLINETO, RETURN])];
        let global = vec![encode(&[N(-107), CALLSUBR, N(0), N(10), RLINETO, RETURN])];
        let sink = run_with_subrs(
            &[N(0), HMOVETO, N(-107), CALLGSUBR, ENDCHAR],
            &global,
            Some(&local),
        )
        .unwrap();
        assert_eq!(
            sink.commands,
            [
                move_to(0, 0),
                line_to(10, 0),
                line_to(10, 10),
                Command::Close
            ]
        );
    }

    #[test]
    fn endchar_in_subroutine_ends_glyph() {
        let local = vec![encode(&[N(10), N(0), RLINETO, ENDCHAR])];
        let sink = run_with_subrs(
            &[N(0), HMOVETO, N(-107), CALLSUBR, N(0), N(10), RLINETO],
            &[],
            Some(&local),
        )
        .unwrap();
        assert_eq!(
            sink.commands,
            [move_to(0, 0), line_to(10, 0), Command::Close]
        );
    }

    #[test]
    fn recursion_hits_nesting_limit() {
        let global = vec![encode(&[N(-107), CALLGSUBR])];
        assert_eq!(
            run_with_subrs(&[N(-107), CALLGSUBR], &global, None).err(),
            Some(Error::CharstringNestingDepthLimitExceeded)
        );
    }

    /// Global subrs where subr i calls subr i + 1 and the last one draws.
    fn subr_chain(len: i32) -> Vec<Vec<u8>> {
        let mut global = (0..len - 1)
            .map(|i| encode(&[N(i + 1 - 107), CALLGSUBR, RETURN]))
            .collect::<Vec<_>>();
        global.push(encode(&[N(10), N(0), RLINETO, RETURN]));
        global
    }

    #[test]
    fn chain_within_nesting_limit() {
        let charstring = [N(0), HMOVETO, N(-107), CALLGSUBR];
        let sink = run_with_subrs(&charstring, &subr_chain(10), None).unwrap();
        assert_eq!(
            sink.commands,
            [move_to(0, 0), line_to(10, 0), Command::Close]
        );
        assert_eq!(
            run_with_subrs(&charstring, &subr_chain(11), None).err(),
            Some(Error::CharstringNestingDepthLimitExceeded)
        );
    }

    #[test]
    fn missing_and_invalid_subroutines() {
        assert_eq!(
            run(&[N(0), CALLSUBR]).err(),
            Some(Error::MissingSubroutines)
        );
        assert_eq!(
            run(&[N(0), CALLGSUBR]).err(),
            Some(Error::InvalidSubroutineIndex(0))
        );
    }

    #[test]
    fn invalid_operators() {
        assert_eq!(
            run(&[Op(2)]).err(),
            Some(Error::InvalidCharstringOperator(2))
        );
        // reserved escaped operator
        assert_eq!(
            run(&[N(1), N(2), Esc(1)]).err(),
            Some(Error::InvalidCharstringOperator(1))
        );
    }

    #[test]
    fn arithmetic_before_path_leaves_stack_consistent() {
        // the two leftover operands must not be mistaken for a width
        let sink = run(&[
            N(1),
            N(2),
            ADD,
            DROP,
            N(10),
            N(20),
            RMOVETO,
            N(5),
            HLINETO,
            ENDCHAR,
        ])
        .unwrap();
        assert!(sink.widths.is_empty());
        assert_eq!(
            sink.commands,
            [move_to(10, 20), line_to(15, 20), Command::Close]
        );
    }

    #[test]
    fn arithmetic_operators() {
        let sink = run(&[
            N(7),
            N(3),
            SUB,
            N(2),
            N(3),
            MUL,
            RMOVETO,
            N(10),
            N(4),
            DIV,
            N(-3),
            ABS,
            RLINETO,
            N(16),
            SQRT,
            N(5),
            NEG,
            RLINETO,
            ENDCHAR,
        ])
        .unwrap();
        assert_eq!(
            sink.commands,
            [
                move_to(4, 6),
                Command::LineTo(Fixed::from_f64(6.5), Fixed::from_i32(9)),
                Command::LineTo(Fixed::from_f64(10.5), Fixed::from_i32(4)),
                Command::Close
            ]
        );
    }

    #[test]
    fn integer_results_stay_integers() {
        // an exact division still works as a subroutine index
        let global = vec![encode(&[N(10), N(0), RLINETO, RETURN])];
        let sink = run_with_subrs(
            &[N(0), HMOVETO, N(-214), N(2), DIV, CALLGSUBR, ENDCHAR],
            &global,
            None,
        )
        .unwrap();
        assert_eq!(
            sink.commands,
            [move_to(0, 0), line_to(10, 0), Command::Close]
        );
    }

    #[test]
    fn stack_manipulation_and_storage() {
        let sink = run(&[
            // transient[3] = 10, then read it back
            N(10),
            N(3),
            PUT,
            N(3),
            GET,
            N(20),
            EXCH,
            RMOVETO,
            // 1 2 3 rolled up by one is 3 1 2
            N(1),
            N(2),
            N(3),
            N(3),
            N(1),
            ROLL,
            DROP,
            RLINETO,
            N(5),
            DUP,
            RLINETO,
            // copies the 7 below the 8
            N(7),
            N(8),
            N(1),
            INDEX,
            HLINETO,
            ENDCHAR,
        ])
        .unwrap();
        assert_eq!(
            sink.commands,
            [
                move_to(20, 10),
                line_to(23, 11),
                line_to(28, 16),
                line_to(35, 16),
                line_to(35, 24),
                line_to(42, 24),
                Command::Close
            ]
        );
    }

    #[test]
    fn conditional_operators() {
        let sink = run(&[
            N(1),
            N(2),
            N(3),
            N(4),
            IFELSE,
            N(1),
            N(2),
            N(5),
            N(4),
            IFELSE,
            RMOVETO,
            N(1),
            N(0),
            AND,
            N(1),
            N(0),
            OR,
            RLINETO,
            N(0),
            NOT,
            N(3),
            N(3),
            EQ,
            RLINETO,
            ENDCHAR,
        ])
        .unwrap();
        assert_eq!(
            sink.commands,
            [
                move_to(1, 2),
                line_to(1, 3),
                line_to(2, 4),
                Command::Close
            ]
        );
    }

    #[test]
    fn transient_array_bounds() {
        assert_eq!(
            run(&[N(1), N(32), PUT]).err(),
            Some(Error::InvalidTransientArrayIndex(32))
        );
        assert_eq!(
            run(&[N(-1), GET]).err(),
            Some(Error::InvalidTransientArrayIndex(-1))
        );
        assert_eq!(run(&[N(1), DROP, DROP]).err(), Some(Error::StackUnderflow));
        assert_eq!(run(&[N(1), N(1), INDEX]).err(), Some(Error::StackUnderflow));
    }

    #[test]
    fn random_is_repeatable() {
        let tokens = [RANDOM, N(0), RMOVETO, ENDCHAR];
        let first = run(&tokens).unwrap();
        assert_eq!(first, run(&tokens).unwrap());
        let Command::MoveTo(x, _) = first.commands[0] else {
            panic!("expected a move");
        };
        assert!(x > Fixed::ZERO && x <= Fixed::ONE);
    }

    #[test]
    fn drawing_before_moveto_starts_contour() {
        let sink = run(&[
            N(5),
            N(5),
            RLINETO,
            N(10),
            N(20),
            RMOVETO,
            N(5),
            HLINETO,
            ENDCHAR,
        ])
        .unwrap();
        assert_eq!(
            sink.commands,
            [
                move_to(0, 0),
                line_to(5, 5),
                Command::Close,
                move_to(15, 25),
                line_to(20, 25),
                Command::Close
            ]
        );
        let sink = run(&[N(1), N(2), N(3), N(4), VHCURVETO, ENDCHAR]).unwrap();
        assert_eq!(
            sink.commands,
            [
                move_to(0, 0),
                curve_to((0, 1), (2, 4), (6, 4)),
                Command::Close
            ]
        );
    }

    #[test]
    fn stack_limits() {
        let tokens = vec![N(1); 49];
        assert_eq!(run(&tokens).err(), Some(Error::StackOverflow));
        assert_eq!(run(&[N(1), RMOVETO]).err(), Some(Error::InvalidStackAccess(1)));
    }

    #[test]
    fn fixed_operands_and_wrapping() {
        let sink = run(&[
            F(Fixed::from_f64(1.5)),
            F(Fixed::MAX),
            RMOVETO,
            N(0),
            F(Fixed::MAX),
            RLINETO,
            ENDCHAR,
        ])
        .unwrap();
        let wrapped = Fixed::MAX.wrapping_add(Fixed::MAX);
        assert_eq!(
            sink.commands,
            [
                Command::MoveTo(Fixed::from_f64(1.5), Fixed::MAX),
                Command::LineTo(Fixed::from_f64(1.5), wrapped),
                Command::Close
            ]
        );
    }
}
