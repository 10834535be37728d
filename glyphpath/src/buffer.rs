//! Caller owned storage for decoded outlines.

use raw::{
    tables::glyf::PointFlags,
    types::{BoundingBox, F26Dot6, Point, Segment},
};

/// Reusable storage for the outline of one glyph.
///
/// [`Font::load_glyph`](crate::Font::load_glyph) clears the buffer and
/// fills it with the segments of the requested glyph. The buffer also holds
/// scratch space for TrueType point data so that loading many glyphs into
/// the same buffer does not allocate once it has grown large enough.
///
/// A buffer must not be shared between threads; give each thread its own.
#[derive(Clone, Debug, Default)]
pub struct GlyphBuffer {
    pub(crate) segments: Vec<Segment>,
    pub(crate) points: Vec<Point<F26Dot6>>,
    pub(crate) flags: Vec<PointFlags>,
    pub(crate) contours: Vec<u16>,
    // raw coordinates of the simple glyph being read
    pub(crate) unscaled: Vec<Point<i32>>,
}

impl GlyphBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer with room for `segments` segments.
    pub fn with_capacity(segments: usize) -> Self {
        Self {
            segments: Vec::with_capacity(segments),
            ..Default::default()
        }
    }

    /// Removes all segments and scratch data, keeping the allocations.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.points.clear();
        self.flags.clear();
        self.contours.clear();
        self.unscaled.clear();
    }

    /// The segments of the most recently loaded glyph.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The number of contours, which is the number of
    /// [`MoveTo`](Segment::MoveTo) segments.
    pub fn contour_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::MoveTo(_)))
            .count()
    }

    /// The control box: the bounds of every end and control point.
    ///
    /// Returns `None` for an empty outline.
    pub fn bounds(&self) -> Option<BoundingBox<F26Dot6>> {
        let mut points = self.segments.iter().flat_map(Segment::points);
        let first = points.next()?;
        let mut bounds = BoundingBox::from_point(first.x, first.y);
        for p in points {
            bounds.include(p.x, p.y);
        }
        Some(bounds)
    }

    /// Converts the outline to a [`kurbo::BezPath`] with coordinates in
    /// the same units as the segments.
    ///
    /// Each contour is explicitly closed.
    #[cfg(feature = "kurbo")]
    pub fn to_bez_path(&self) -> kurbo::BezPath {
        let to_kurbo = |p: Point<F26Dot6>| kurbo::Point::new(p.x.to_f64(), p.y.to_f64());
        let mut path = kurbo::BezPath::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match *segment {
                Segment::MoveTo(p) => {
                    if i != 0 {
                        path.close_path();
                    }
                    path.move_to(to_kurbo(p));
                }
                Segment::LineTo(p) => path.line_to(to_kurbo(p)),
                Segment::QuadTo(c0, p) => path.quad_to(to_kurbo(c0), to_kurbo(p)),
                Segment::CubeTo(c0, c1, p) => {
                    path.curve_to(to_kurbo(c0), to_kurbo(c1), to_kurbo(p))
                }
            }
        }
        if !self.segments.is_empty() {
            path.close_path();
        }
        path
    }
}
