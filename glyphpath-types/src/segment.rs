//! The output unit of glyph decoding.

use crate::{F26Dot6, Pen, Point};

/// One element of a glyph outline.
///
/// Every contour begins with exactly one [`MoveTo`](Self::MoveTo) and is
/// implicitly closed back to that point when the next `MoveTo` or the end of
/// the outline is reached.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Segment {
    /// Begins a new contour at the given point.
    MoveTo(Point<F26Dot6>),
    /// Straight line to the given point.
    LineTo(Point<F26Dot6>),
    /// Quadratic bezier with one control point and an end point.
    QuadTo(Point<F26Dot6>, Point<F26Dot6>),
    /// Cubic bezier with two control points and an end point.
    CubeTo(Point<F26Dot6>, Point<F26Dot6>, Point<F26Dot6>),
}

impl Segment {
    /// Returns the final point of the segment.
    pub fn end_point(&self) -> Point<F26Dot6> {
        match *self {
            Self::MoveTo(p) | Self::LineTo(p) | Self::QuadTo(_, p) | Self::CubeTo(_, _, p) => p,
        }
    }

    /// Returns an iterator over the control and end points of the segment,
    /// in order.
    pub fn points(&self) -> impl Iterator<Item = Point<F26Dot6>> {
        let points = match *self {
            Self::MoveTo(p) | Self::LineTo(p) => [Some(p), None, None],
            Self::QuadTo(c0, p) => [Some(c0), Some(p), None],
            Self::CubeTo(c0, c1, p) => [Some(c0), Some(c1), Some(p)],
        };
        points.into_iter().flatten()
    }

    /// Returns a new segment of the same kind with `f` applied to each point.
    pub fn map(self, mut f: impl FnMut(Point<F26Dot6>) -> Point<F26Dot6>) -> Self {
        match self {
            Self::MoveTo(p) => Self::MoveTo(f(p)),
            Self::LineTo(p) => Self::LineTo(f(p)),
            Self::QuadTo(c0, p) => Self::QuadTo(f(c0), f(p)),
            Self::CubeTo(c0, c1, p) => Self::CubeTo(f(c0), f(c1), f(p)),
        }
    }

    /// Sends this segment to the given pen.
    pub fn draw(&self, pen: &mut impl Pen) {
        match *self {
            Self::MoveTo(p) => pen.move_to(p),
            Self::LineTo(p) => pen.line_to(p),
            Self::QuadTo(c0, p) => pen.quad_to(c0, p),
            Self::CubeTo(c0, c1, p) => pen.curve_to(c0, c1, p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    fn pt(x: i32, y: i32) -> Point<F26Dot6> {
        Point::from_units(x, y)
    }

    #[test]
    fn points_in_order() {
        let seg = Segment::CubeTo(pt(1, 2), pt(3, 4), pt(5, 6));
        assert_eq!(seg.points().collect::<Vec<_>>(), [pt(1, 2), pt(3, 4), pt(5, 6)]);
        assert_eq!(seg.end_point(), pt(5, 6));
        assert_eq!(Segment::LineTo(pt(7, 8)).points().count(), 1);
    }

    #[test]
    fn map_translates_every_point() {
        let delta = pt(10, -10);
        let seg = Segment::QuadTo(pt(1, 1), pt(2, 2)).map(|p| p + delta);
        assert_eq!(seg, Segment::QuadTo(pt(11, -9), pt(12, -8)));
    }

    #[test]
    fn draw_into_vec_pen() {
        let segments = [
            Segment::MoveTo(pt(0, 0)),
            Segment::LineTo(pt(1, 0)),
            Segment::QuadTo(pt(1, 1), pt(0, 1)),
        ];
        let mut out: Vec<Segment> = Vec::new();
        for seg in &segments {
            seg.draw(&mut out);
        }
        assert_eq!(out, segments);
    }
}
