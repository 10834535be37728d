//! The [glyf (Glyph Data)](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) table

use std::fmt;

use types::{BigEndian, F26Dot6, F2Dot14, GlyphId, Pen, Point, Tag};

use crate::{Cursor, FontData, FontRead, ReadError, TopLevelTable};

/// The [glyf (Glyph Data)](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) table.
///
/// Individual glyphs are located with the [`Loca`](super::loca::Loca) table.
#[derive(Clone, Copy, Debug)]
pub struct Glyf<'a> {
    data: FontData<'a>,
}

impl TopLevelTable for Glyf<'_> {
    const TAG: Tag = Tag::new(b"glyf");
}

impl<'a> Glyf<'a> {
    pub fn new(data: FontData<'a>) -> Self {
        Self { data }
    }

    /// The raw table data, which `loca` offsets are relative to.
    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }
}

impl<'a> FontRead<'a> for Glyf<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Ok(Self::new(data))
    }
}

/// Flags used in a simple glyph's flag array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SimpleGlyphFlags(u8);

impl SimpleGlyphFlags {
    pub const ON_CURVE_POINT: Self = Self(0x01);
    pub const X_SHORT_VECTOR: Self = Self(0x02);
    pub const Y_SHORT_VECTOR: Self = Self(0x04);
    pub const REPEAT_FLAG: Self = Self(0x08);
    pub const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR: Self = Self(0x10);
    pub const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR: Self = Self(0x20);
    pub const OVERLAP_SIMPLE: Self = Self(0x40);

    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & 0x7F)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Flags for a component of a composite glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CompositeGlyphFlags(u16);

impl CompositeGlyphFlags {
    pub const ARG_1_AND_2_ARE_WORDS: Self = Self(0x0001);
    pub const ARGS_ARE_XY_VALUES: Self = Self(0x0002);
    pub const ROUND_XY_TO_GRID: Self = Self(0x0004);
    pub const WE_HAVE_A_SCALE: Self = Self(0x0008);
    pub const MORE_COMPONENTS: Self = Self(0x0020);
    pub const WE_HAVE_AN_X_AND_Y_SCALE: Self = Self(0x0040);
    pub const WE_HAVE_A_TWO_BY_TWO: Self = Self(0x0080);
    pub const WE_HAVE_INSTRUCTIONS: Self = Self(0x0100);
    pub const USE_MY_METRICS: Self = Self(0x0200);
    pub const OVERLAP_COMPOUND: Self = Self(0x0400);
    pub const SCALED_COMPONENT_OFFSET: Self = Self(0x0800);
    pub const UNSCALED_COMPONENT_OFFSET: Self = Self(0x1000);

    pub const fn from_bits_truncate(bits: u16) -> Self {
        Self(bits & 0x1FFF)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any of the three scale/transform flags is set.
    pub const fn has_transform(self) -> bool {
        self.0
            & (Self::WE_HAVE_A_SCALE.0
                | Self::WE_HAVE_AN_X_AND_Y_SCALE.0
                | Self::WE_HAVE_A_TWO_BY_TWO.0)
            != 0
    }
}

impl types::Scalar for SimpleGlyphFlags {
    type Raw = [u8; 1];

    fn to_raw(self) -> [u8; 1] {
        [self.0]
    }

    fn from_raw(raw: [u8; 1]) -> Self {
        Self::from_bits_truncate(raw[0])
    }
}

impl types::Scalar for CompositeGlyphFlags {
    type Raw = [u8; 2];

    fn to_raw(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    fn from_raw(raw: [u8; 2]) -> Self {
        Self::from_bits_truncate(u16::from_be_bytes(raw))
    }
}

/// Per-point flags retained after decoding a simple glyph.
///
/// Only the on-curve bit survives decoding; everything else in
/// [`SimpleGlyphFlags`] describes the encoding of the coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PointFlags(u8);

impl PointFlags {
    const ON_CURVE: u8 = SimpleGlyphFlags::ON_CURVE_POINT.bits();

    /// Creates flags for an on-curve point.
    pub const fn on_curve() -> Self {
        Self(Self::ON_CURVE)
    }

    /// Creates flags for an off-curve quadratic control point.
    pub const fn off_curve() -> Self {
        Self(0)
    }

    pub const fn is_on_curve(self) -> bool {
        self.0 & Self::ON_CURVE != 0
    }
}

/// A glyph in the `glyf` table: either a simple outline or a composite of
/// other glyphs.
#[derive(Clone, Debug)]
pub enum Glyph<'a> {
    Simple(SimpleGlyph<'a>),
    Composite(CompositeGlyph<'a>),
}

/// The fields common to every glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphHeader {
    /// Non-negative for simple glyphs, negative for composites.
    pub number_of_contours: i16,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

impl GlyphHeader {
    const RAW_BYTE_LEN: usize = 10;

    fn read(cursor: &mut Cursor) -> Result<Self, ReadError> {
        Ok(Self {
            number_of_contours: cursor.read()?,
            x_min: cursor.read()?,
            y_min: cursor.read()?,
            x_max: cursor.read()?,
            y_max: cursor.read()?,
        })
    }
}

macro_rules! field_getter {
    ($field:ident, $ty:ty) => {
        pub fn $field(&self) -> $ty {
            match self {
                Self::Simple(table) => table.header.$field,
                Self::Composite(table) => table.header.$field,
            }
        }
    };
}

impl<'a> Glyph<'a> {
    field_getter!(number_of_contours, i16);
    field_getter!(x_min, i16);
    field_getter!(x_max, i16);
    field_getter!(y_min, i16);
    field_getter!(y_max, i16);
}

impl<'a> FontRead<'a> for Glyph<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let header = GlyphHeader::read(&mut cursor)?;
        if header.number_of_contours >= 0 {
            let end_pts_of_contours =
                cursor.read_array::<u16>(header.number_of_contours as usize)?;
            let instruction_length = cursor.read::<u16>()? as usize;
            let instructions = cursor.read_bytes(instruction_length)?;
            let glyph_data = cursor
                .remaining()
                .ok_or(ReadError::OutOfBounds)?
                .as_bytes();
            Ok(Self::Simple(SimpleGlyph {
                header,
                end_pts_of_contours,
                instructions,
                glyph_data,
            }))
        } else {
            let component_data = data
                .split_off(GlyphHeader::RAW_BYTE_LEN)
                .ok_or(ReadError::OutOfBounds)?
                .as_bytes();
            Ok(Self::Composite(CompositeGlyph {
                header,
                component_data,
            }))
        }
    }
}

/// A glyph defined by a sequence of contours.
#[derive(Clone, Debug)]
pub struct SimpleGlyph<'a> {
    header: GlyphHeader,
    end_pts_of_contours: &'a [BigEndian<u16>],
    instructions: &'a [u8],
    glyph_data: &'a [u8],
}

impl<'a> SimpleGlyph<'a> {
    pub fn header(&self) -> &GlyphHeader {
        &self.header
    }

    /// Index of the last point of each contour.
    pub fn end_pts_of_contours(&self) -> &'a [BigEndian<u16>] {
        self.end_pts_of_contours
    }

    /// TrueType hinting bytecode for the glyph.
    pub fn instructions(&self) -> &'a [u8] {
        self.instructions
    }

    /// Returns the total number of points.
    pub fn num_points(&self) -> usize {
        self.end_pts_of_contours
            .last()
            .map(|last| last.get() as usize + 1)
            .unwrap_or(0)
    }

    /// Decodes points and flags into the provided buffers.
    ///
    /// Coordinates are absolute values in font units, accumulated from the
    /// stored deltas. Only the on-curve bit of each flag is retained. The
    /// lengths of both buffers must be equal to the value returned by
    /// [num_points](Self::num_points).
    pub fn read_points(
        &self,
        points: &mut [Point<i32>],
        flags: &mut [PointFlags],
    ) -> Result<(), ReadError> {
        let n_points = self.num_points();
        if points.len() != n_points || flags.len() != n_points {
            return Err(ReadError::InvalidArrayLen);
        }
        let mut cursor = FontData::new(self.glyph_data).cursor();
        // the full flag bytes are needed to decode the coordinates, so they
        // are parked in the caller's buffer and reduced afterwards
        let mut raw_flags = |flags: &mut [PointFlags]| -> Result<(), ReadError> {
            let mut i = 0;
            while i < n_points {
                let flag = cursor.read::<SimpleGlyphFlags>()?;
                let count = if flag.contains(SimpleGlyphFlags::REPEAT_FLAG) {
                    cursor.read::<u8>()? as usize + 1
                } else {
                    1
                };
                if count > n_points - i {
                    return Err(ReadError::MalformedData("repeat count too large in glyf"));
                }
                for f in &mut flags[i..i + count] {
                    *f = PointFlags(flag.bits());
                }
                i += count;
            }
            Ok(())
        };
        raw_flags(flags)?;
        let mut x = 0i32;
        for (flag, point) in flags.iter().zip(points.iter_mut()) {
            let flag = SimpleGlyphFlags::from_bits_truncate(flag.0);
            x = x.wrapping_add(read_delta(
                &mut cursor,
                flag,
                SimpleGlyphFlags::X_SHORT_VECTOR,
                SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
            )?);
            point.x = x;
        }
        let mut y = 0i32;
        for (flag, point) in flags.iter_mut().zip(points.iter_mut()) {
            let bits = SimpleGlyphFlags::from_bits_truncate(flag.0);
            y = y.wrapping_add(read_delta(
                &mut cursor,
                bits,
                SimpleGlyphFlags::Y_SHORT_VECTOR,
                SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
            )?);
            point.y = y;
            *flag = PointFlags(flag.0 & PointFlags::ON_CURVE);
        }
        Ok(())
    }
}

fn read_delta(
    cursor: &mut Cursor,
    flag: SimpleGlyphFlags,
    short: SimpleGlyphFlags,
    same_or_positive: SimpleGlyphFlags,
) -> Result<i32, ReadError> {
    match (flag.contains(short), flag.contains(same_or_positive)) {
        (true, true) => Ok(cursor.read::<u8>()? as i32),
        (true, false) => Ok(-(cursor.read::<u8>()? as i32)),
        (false, false) => Ok(cursor.read::<i16>()? as i32),
        (false, true) => Ok(0),
    }
}

/// Transform for a composite component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transform {
    /// X scale factor.
    pub xx: F2Dot14,
    /// YX skew factor.
    pub yx: F2Dot14,
    /// XY skew factor.
    pub xy: F2Dot14,
    /// Y scale factor.
    pub yy: F2Dot14,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            xx: F2Dot14::ONE,
            yx: F2Dot14::ZERO,
            xy: F2Dot14::ZERO,
            yy: F2Dot14::ONE,
        }
    }
}

impl Transform {
    /// Applies the transform to a point.
    ///
    /// Each product is rounded individually, matching FreeType.
    pub fn apply(&self, p: Point<F26Dot6>) -> Point<F26Dot6> {
        Point::new(
            self.xx.mul_f26dot6(p.x) + self.xy.mul_f26dot6(p.y),
            self.yx.mul_f26dot6(p.x) + self.yy.mul_f26dot6(p.y),
        )
    }
}

/// Anchor position for a composite component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Translate the component by this offset.
    Offset { x: i16, y: i16 },
    /// Align point `component` of the child with point `base` of the parent.
    Point { base: u16, component: u16 },
}

/// A reference to another glyph. Part of [CompositeGlyph].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Component {
    /// Component flags.
    pub flags: CompositeGlyphFlags,
    /// Glyph identifier.
    pub glyph: GlyphId,
    /// Anchor for component placement.
    pub anchor: Anchor,
    /// Component transformation matrix.
    pub transform: Transform,
}

/// A glyph built from transformed references to other glyphs.
#[derive(Clone, Debug)]
pub struct CompositeGlyph<'a> {
    header: GlyphHeader,
    component_data: &'a [u8],
}

impl<'a> CompositeGlyph<'a> {
    pub fn header(&self) -> &GlyphHeader {
        &self.header
    }

    /// Returns an iterator over the components of the composite glyph.
    ///
    /// A truncated component record yields an error and ends iteration.
    pub fn components(&self) -> impl Iterator<Item = Result<Component, ReadError>> + 'a + Clone {
        self.iter()
    }

    /// Returns the TrueType interpreter instructions.
    pub fn instructions(&self) -> Option<&'a [u8]> {
        self.iter().instructions()
    }

    fn iter(&self) -> ComponentIter<'a> {
        ComponentIter {
            cur_flags: CompositeGlyphFlags::default(),
            done: false,
            cursor: FontData::new(self.component_data).cursor(),
        }
    }
}

#[derive(Clone)]
struct ComponentIter<'a> {
    cur_flags: CompositeGlyphFlags,
    done: bool,
    cursor: Cursor<'a>,
}

impl<'a> ComponentIter<'a> {
    fn instructions(&mut self) -> Option<&'a [u8]> {
        for component in self.by_ref() {
            component.ok()?;
        }
        if self
            .cur_flags
            .contains(CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS)
        {
            let len = self.cursor.read::<u16>().ok()? as usize;
            self.cursor.read_bytes(len).ok()
        } else {
            None
        }
    }

    fn read_component(&mut self) -> Result<Component, ReadError> {
        let flags: CompositeGlyphFlags = self.cursor.read()?;
        self.cur_flags = flags;
        let glyph = self.cursor.read::<GlyphId>()?;
        let args_are_words = flags.contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS);
        let args_are_xy_values = flags.contains(CompositeGlyphFlags::ARGS_ARE_XY_VALUES);
        let anchor = match (args_are_xy_values, args_are_words) {
            (true, true) => Anchor::Offset {
                x: self.cursor.read()?,
                y: self.cursor.read()?,
            },
            (true, false) => Anchor::Offset {
                x: self.cursor.read::<i8>()? as _,
                y: self.cursor.read::<i8>()? as _,
            },
            (false, true) => Anchor::Point {
                base: self.cursor.read()?,
                component: self.cursor.read()?,
            },
            (false, false) => Anchor::Point {
                base: self.cursor.read::<u8>()? as _,
                component: self.cursor.read::<u8>()? as _,
            },
        };
        let mut transform = Transform::default();
        if flags.contains(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
            transform.xx = self.cursor.read()?;
            transform.yy = transform.xx;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            transform.xx = self.cursor.read()?;
            transform.yy = self.cursor.read()?;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
            transform.xx = self.cursor.read()?;
            transform.yx = self.cursor.read()?;
            transform.xy = self.cursor.read()?;
            transform.yy = self.cursor.read()?;
        }
        Ok(Component {
            flags,
            glyph,
            anchor,
            transform,
        })
    }
}

impl Iterator for ComponentIter<'_> {
    type Item = Result<Component, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let component = self.read_component();
        self.done = match &component {
            Ok(component) => !component
                .flags
                .contains(CompositeGlyphFlags::MORE_COMPONENTS),
            Err(_) => true,
        };
        Some(component)
    }
}

/// Errors that can occur when converting an outline to a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToPathError {
    /// Contour end point at this index was not greater than its preceding
    /// end point, or was beyond the last point.
    ContourOrder(usize),
    /// The point and flag arrays have different lengths.
    PointFlagMismatch { num_points: usize, num_flags: usize },
}

impl fmt::Display for ToPathError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ContourOrder(ix) => write!(
                f,
                "Contour end point at index {ix} was out of order or out of range"
            ),
            Self::PointFlagMismatch {
                num_points,
                num_flags,
            } => write!(f, "Number of points ({num_points}) and flags ({num_flags}) must match"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ToPathError {}

/// Converts a `glyf` outline described by points, flags and contour end points
/// to a sequence of path commands and invokes the matching callback on `pen`
/// for each.
///
/// Implied on-curve points are inserted halfway between consecutive
/// off-curve points. A contour that begins with an off-curve point starts at
/// its last point when that is on-curve, otherwise at the midpoint of its
/// first and last points. Contours are not explicitly closed.
pub fn to_path(
    points: &[Point<F26Dot6>],
    flags: &[PointFlags],
    contours: &[u16],
    pen: &mut impl Pen,
) -> Result<(), ToPathError> {
    if points.len() != flags.len() {
        return Err(ToPathError::PointFlagMismatch {
            num_points: points.len(),
            num_flags: flags.len(),
        });
    }
    let mut start_ix = 0usize;
    for (contour_ix, &end_ix) in contours.iter().enumerate() {
        let end_ix = end_ix as usize;
        if end_ix < start_ix || end_ix >= points.len() {
            return Err(ToPathError::ContourOrder(contour_ix));
        }
        let pts = &points[start_ix..=end_ix];
        let fls = &flags[start_ix..=end_ix];
        start_ix = end_ix + 1;
        let last = pts.len() - 1;
        let (start, rest) = if fls[0].is_on_curve() {
            (pts[0], 1..pts.len())
        } else if fls[last].is_on_curve() {
            (pts[last], 0..last)
        } else {
            (pts[0].midpoint(pts[last]), 0..pts.len())
        };
        pen.move_to(start);
        let mut control: Option<Point<F26Dot6>> = None;
        for (&p, flag) in pts[rest.clone()].iter().zip(&fls[rest]) {
            if flag.is_on_curve() {
                match control.take() {
                    Some(c) => pen.quad_to(c, p),
                    None => pen.line_to(p),
                }
            } else {
                if let Some(c) = control {
                    pen.quad_to(c, c.midpoint(p));
                }
                control = Some(p);
            }
        }
        if let Some(c) = control {
            pen.quad_to(c, start);
        }
    }
    Ok(())
}
