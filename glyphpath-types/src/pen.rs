use crate::{F26Dot6, Point};

#[cfg(any(feature = "std", test))]
use crate::Segment;

/// Interface for accepting a sequence of path commands.
///
/// Both the TrueType and CFF decoders emit their outlines through this
/// trait. Coordinates are 26.6 fixed point values. Contours are implicitly
/// closed, so there is no `close` command: a contour ends at the next
/// `move_to` or at the end of the glyph.
pub trait Pen {
    /// Begin a new contour at `p`.
    fn move_to(&mut self, p: Point<F26Dot6>);

    /// Emit a line segment from the current point to `p`.
    fn line_to(&mut self, p: Point<F26Dot6>);

    /// Emit a quadratic bezier segment from the current point with a control
    /// point at `c0` and ending at `p`.
    fn quad_to(&mut self, c0: Point<F26Dot6>, p: Point<F26Dot6>);

    /// Emit a cubic bezier segment from the current point with control
    /// points at `c0` and `c1` and ending at `p`.
    fn curve_to(&mut self, c0: Point<F26Dot6>, c1: Point<F26Dot6>, p: Point<F26Dot6>);
}

impl<P: Pen + ?Sized> Pen for &mut P {
    fn move_to(&mut self, p: Point<F26Dot6>) {
        (**self).move_to(p)
    }

    fn line_to(&mut self, p: Point<F26Dot6>) {
        (**self).line_to(p)
    }

    fn quad_to(&mut self, c0: Point<F26Dot6>, p: Point<F26Dot6>) {
        (**self).quad_to(c0, p)
    }

    fn curve_to(&mut self, c0: Point<F26Dot6>, c1: Point<F26Dot6>, p: Point<F26Dot6>) {
        (**self).curve_to(c0, c1, p)
    }
}

#[cfg(any(feature = "std", test))]
impl Pen for std::vec::Vec<Segment> {
    fn move_to(&mut self, p: Point<F26Dot6>) {
        self.push(Segment::MoveTo(p));
    }

    fn line_to(&mut self, p: Point<F26Dot6>) {
        self.push(Segment::LineTo(p));
    }

    fn quad_to(&mut self, c0: Point<F26Dot6>, p: Point<F26Dot6>) {
        self.push(Segment::QuadTo(c0, p));
    }

    fn curve_to(&mut self, c0: Point<F26Dot6>, c1: Point<F26Dot6>, p: Point<F26Dot6>) {
        self.push(Segment::CubeTo(c0, c1, p));
    }
}
