//! Operand stack for CFF parsing.

use types::Fixed;

use super::Error;

/// Maximum size of the operand stack.
///
/// "The Type 2 argument stack can hold up to 48 entries." The same bound is
/// applied to DICT operands.
///
/// <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=34>
pub const MAX_STACK: usize = 48;

/// Operand stack for DICTs and charstrings.
///
/// The operand stack can contain either 32-bit integers or 16.16 fixed point
/// values. The type is known when pushing to the stack and the expected type
/// is also known (based on the operator) when reading from the stack, so the
/// conversion is performed on demand at read time.
///
/// Entries are kept in parallel arrays holding the raw 32-bit value and a
/// flag that tracks which values are fixed point.
pub struct Stack {
    values: [i32; MAX_STACK],
    value_is_fixed: [bool; MAX_STACK],
    top: usize,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            values: [0; MAX_STACK],
            value_is_fixed: [false; MAX_STACK],
            top: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top == 0
    }

    pub fn len(&self) -> usize {
        self.top
    }

    /// Returns true if the number of elements on the stack is odd.
    ///
    /// Used for processing some charstring operators where an odd
    /// count represents the presence of the glyph advance width at the
    /// bottom of the stack.
    pub fn len_is_odd(&self) -> bool {
        self.top & 1 != 0
    }

    pub fn clear(&mut self) {
        self.top = 0;
    }

    pub fn push(&mut self, number: impl Into<Number>) -> Result<(), Error> {
        match number.into() {
            Number::I32(value) => self.push_impl(value, false),
            Number::Fixed(value) => self.push_impl(value.to_bits(), true),
        }
    }

    /// Returns the 32-bit integer at the given index on the stack.
    ///
    /// Will return an error if the value at that index was not pushed as an
    /// integer.
    pub fn get_i32(&self, index: usize) -> Result<i32, Error> {
        self.check_index(index)?;
        if self.value_is_fixed[index] {
            Err(Error::ExpectedI32StackEntry(index))
        } else {
            Ok(self.values[index])
        }
    }

    /// Returns the 16.16 fixed point value at the given index on the stack.
    ///
    /// If the value was pushed as an integer, it will be automatically
    /// converted to 16.16 fixed point.
    pub fn get_fixed(&self, index: usize) -> Result<Fixed, Error> {
        self.check_index(index)?;
        Ok(to_fixed(self.values[index], self.value_is_fixed[index]))
    }

    /// Pops a 32-bit integer from the top of stack.
    ///
    /// Will return an error if the top value on the stack was not pushed as an
    /// integer.
    pub fn pop_i32(&mut self) -> Result<i32, Error> {
        let i = self.pop()?;
        if self.value_is_fixed[i] {
            Err(Error::ExpectedI32StackEntry(i))
        } else {
            Ok(self.values[i])
        }
    }

    /// Pops a 16.16 fixed point value from the top of the stack.
    pub fn pop_fixed(&mut self) -> Result<Fixed, Error> {
        let i = self.pop()?;
        Ok(to_fixed(self.values[i], self.value_is_fixed[i]))
    }

    /// Returns an array of `N` 16.16 fixed point values starting at
    /// `first_index`.
    pub fn fixed_array<const N: usize>(&self, first_index: usize) -> Result<[Fixed; N], Error> {
        let mut result = [Fixed::ZERO; N];
        if first_index >= self.top {
            return Err(Error::InvalidStackAccess(first_index));
        }
        let end = first_index + N;
        if end > self.top {
            return Err(Error::InvalidStackAccess(end - 1));
        }
        let range = first_index..end;
        for ((src, is_fixed), dest) in self.values[range.clone()]
            .iter()
            .zip(&self.value_is_fixed[range])
            .zip(&mut result)
        {
            *dest = to_fixed(*src, *is_fixed);
        }
        Ok(result)
    }

    /// Returns the value at the given index, keeping the type it was
    /// pushed with.
    pub fn get_number(&self, index: usize) -> Result<Number, Error> {
        self.check_index(index)?;
        Ok(Number::from_stack(
            self.values[index],
            self.value_is_fixed[index],
        ))
    }

    /// Pops the top value, keeping the type it was pushed with.
    pub fn pop_number(&mut self) -> Result<Number, Error> {
        let i = self.pop()?;
        Ok(Number::from_stack(self.values[i], self.value_is_fixed[i]))
    }

    /// Circular shift of the top `count` entries by `shift` positions.
    ///
    /// Positive shifts move entries toward the top of the stack.
    pub fn roll(&mut self, count: usize, shift: i32) -> Result<(), Error> {
        if count > self.top {
            return Err(Error::StackUnderflow);
        }
        if count == 0 {
            return Ok(());
        }
        let start = self.top - count;
        // count is at most MAX_STACK
        let shift = shift.rem_euclid(count as i32) as usize;
        self.values[start..self.top].rotate_right(shift);
        self.value_is_fixed[start..self.top].rotate_right(shift);
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), Error> {
        if index < self.top {
            Ok(())
        } else {
            Err(Error::InvalidStackAccess(index))
        }
    }

    fn push_impl(&mut self, value: i32, is_fixed: bool) -> Result<(), Error> {
        if self.top == MAX_STACK {
            return Err(Error::StackOverflow);
        }
        self.values[self.top] = value;
        self.value_is_fixed[self.top] = is_fixed;
        self.top += 1;
        Ok(())
    }

    fn pop(&mut self) -> Result<usize, Error> {
        if self.top > 0 {
            self.top -= 1;
            Ok(self.top)
        } else {
            Err(Error::StackUnderflow)
        }
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

fn to_fixed(raw: i32, is_fixed: bool) -> Fixed {
    if is_fixed {
        Fixed::from_bits(raw)
    } else {
        Fixed::from_i32(raw)
    }
}

/// Either a signed 32-bit integer or a 16.16 fixed point number.
///
/// This represents the CFF "number" operand type.
/// See "Table 6 Operand Types" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf>
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Number {
    I32(i32),
    Fixed(Fixed),
}

impl Number {
    fn from_stack(raw: i32, is_fixed: bool) -> Self {
        if is_fixed {
            Self::Fixed(Fixed::from_bits(raw))
        } else {
            Self::I32(raw)
        }
    }

    /// Returns the value as 16.16 fixed point.
    pub fn to_fixed(self) -> Fixed {
        match self {
            Self::I32(value) => Fixed::from_i32(value),
            Self::Fixed(value) => value,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Self::I32(value) => value == 0,
            Self::Fixed(value) => value == Fixed::ZERO,
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::I32(value)
    }
}

impl From<Fixed> for Number {
    fn from(value: Fixed) -> Self {
        Self::Fixed(value)
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I32(value) => value.fmt(f),
            Self::Fixed(value) => value.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use types::Fixed;

    use super::{Number, Stack, MAX_STACK};
    use crate::tables::postscript::Error;

    #[test]
    fn push_pop() {
        let mut stack = Stack::new();
        stack.push(20).unwrap();
        stack.push(Fixed::from_f64(42.42)).unwrap();
        assert!(!stack.len_is_odd());
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop_fixed().unwrap(), Fixed::from_f64(42.42));
        assert_eq!(stack.pop_i32().unwrap(), 20);
        assert_eq!(stack.pop_i32(), Err(Error::StackUnderflow));
    }

    #[test]
    fn push_fixed_pop_i32() {
        let mut stack = Stack::new();
        stack.push(Fixed::from_f64(42.42)).unwrap();
        assert_eq!(stack.pop_i32(), Err(Error::ExpectedI32StackEntry(0)));
    }

    #[test]
    fn push_i32_pop_fixed() {
        let mut stack = Stack::new();
        stack.push(123).unwrap();
        assert_eq!(stack.pop_fixed().unwrap(), Fixed::from_f64(123.0));
    }

    #[test]
    fn overflow() {
        let mut stack = Stack::new();
        for i in 0..MAX_STACK {
            stack.push(i as i32).unwrap();
        }
        assert_eq!(stack.push(0), Err(Error::StackOverflow));
        assert_eq!(stack.len(), MAX_STACK);
    }

    #[test]
    fn access_above_top_fails() {
        let mut stack = Stack::new();
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        stack.clear();
        // stale values must not be visible after a clear
        assert_eq!(stack.get_i32(0), Err(Error::InvalidStackAccess(0)));
        assert_eq!(stack.get_fixed(1), Err(Error::InvalidStackAccess(1)));
        stack.push(5).unwrap();
        assert_eq!(
            stack.fixed_array::<2>(0),
            Err(Error::InvalidStackAccess(1))
        );
    }

    #[test]
    fn numbers_keep_their_type() {
        let mut stack = Stack::new();
        stack.push(3).unwrap();
        stack.push(Fixed::from_f64(0.5)).unwrap();
        assert_eq!(stack.get_number(0).unwrap(), Number::I32(3));
        assert_eq!(
            stack.pop_number().unwrap(),
            Number::Fixed(Fixed::from_f64(0.5))
        );
        assert_eq!(stack.pop_number().unwrap().to_fixed(), Fixed::from_i32(3));
        assert_eq!(stack.pop_number(), Err(Error::StackUnderflow));
    }

    #[test]
    fn roll() {
        let mut stack = Stack::new();
        for value in 1..=5 {
            stack.push(value).unwrap();
        }
        // rolling the top three up by one: 1 2 3 4 5 -> 1 2 5 3 4
        stack.roll(3, 1).unwrap();
        let values: Vec<_> = (0..5).map(|i| stack.get_i32(i).unwrap()).collect();
        assert_eq!(values, [1, 2, 5, 3, 4]);
        // and back down again, with a shift larger than the count
        stack.roll(3, -4).unwrap();
        let values: Vec<_> = (0..5).map(|i| stack.get_i32(i).unwrap()).collect();
        assert_eq!(values, [1, 2, 3, 4, 5]);
        assert_eq!(stack.roll(6, 1), Err(Error::StackUnderflow));
    }
}
