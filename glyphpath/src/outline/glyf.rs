//! Loading TrueType outlines.

use raw::{
    tables::glyf::{self, Anchor, CompositeGlyph, Glyf, Glyph, PointFlags, SimpleGlyph},
    tables::loca::Loca,
    types::{F26Dot6, Fixed, GlyphId, Point},
};

use super::scale_point;
use crate::{
    error::{Limit, MalformedKind},
    Error, GlyphBuffer, GLYF_COMPOSITE_RECURSION_LIMIT,
};

/// Maximum number of points, contours and component references in one
/// glyph tree.
const MAX_POINTS: usize = 0xFFFF;

/// The `glyf` and `loca` tables of a font.
#[derive(Clone)]
pub(crate) struct Outlines<'a> {
    loca: Loca<'a>,
    glyf: Glyf<'a>,
}

impl<'a> Outlines<'a> {
    pub fn new(loca: Loca<'a>, glyf: Glyf<'a>) -> Self {
        Self { loca, glyf }
    }

    /// Loads the glyph into `buffer`, which must be empty.
    ///
    /// Points are collected for the whole glyph tree, scaled, and then
    /// converted to segments.
    pub fn load(
        &self,
        buffer: &mut GlyphBuffer,
        glyph_id: GlyphId,
        scale: Option<Fixed>,
    ) -> Result<(), Error> {
        let mut loader = Loader {
            outlines: self,
            buffer: &mut *buffer,
            component_count: 0,
        };
        loader.load(glyph_id, 0)?;
        if let Some(scale) = scale {
            for point in buffer.points.iter_mut() {
                *point = scale_point(*point, scale);
            }
        }
        glyf::to_path(
            &buffer.points,
            &buffer.flags,
            &buffer.contours,
            &mut buffer.segments,
        )?;
        Ok(())
    }
}

struct Loader<'a, 'b> {
    outlines: &'b Outlines<'a>,
    buffer: &'b mut GlyphBuffer,
    component_count: usize,
}

impl Loader<'_, '_> {
    fn load(&mut self, glyph_id: GlyphId, recurse_depth: usize) -> Result<(), Error> {
        if recurse_depth > GLYF_COMPOSITE_RECURSION_LIMIT {
            return Err(Limit::CompositeDepth.into());
        }
        let glyph = self
            .outlines
            .loca
            .get_glyf(glyph_id, &self.outlines.glyf)?;
        match glyph {
            Some(Glyph::Simple(simple)) => self.load_simple(&simple),
            Some(Glyph::Composite(composite)) => {
                self.load_composite(&composite, glyph_id, recurse_depth)
            }
            None => Ok(()),
        }
    }

    fn load_simple(&mut self, glyph: &SimpleGlyph) -> Result<(), Error> {
        let buffer = &mut *self.buffer;
        let point_count = glyph.num_points();
        let point_base = buffer.points.len();
        let end_pts = glyph.end_pts_of_contours();
        if point_base + point_count > MAX_POINTS
            || buffer.contours.len() + end_pts.len() > MAX_POINTS
        {
            return Err(Limit::CompositePoints.into());
        }
        let mut prev_end: Option<usize> = None;
        for (ix, end) in end_pts.iter().enumerate() {
            let end = end.get() as usize;
            if prev_end.is_some_and(|prev| end <= prev) {
                return Err(MalformedKind::ContourOrder(buffer.contours.len() + ix).into());
            }
            prev_end = Some(end);
        }
        buffer.unscaled.clear();
        buffer.unscaled.resize(point_count, Point::default());
        let flags_end = point_base + point_count;
        buffer.flags.resize(flags_end, PointFlags::default());
        glyph.read_points(&mut buffer.unscaled, &mut buffer.flags[point_base..])?;
        buffer.points.extend(
            buffer
                .unscaled
                .iter()
                .map(|p| Point::new(F26Dot6::from_i32(p.x), F26Dot6::from_i32(p.y))),
        );
        // bounded by MAX_POINTS above
        buffer.contours.extend(
            end_pts
                .iter()
                .map(|end| (point_base + end.get() as usize) as u16),
        );
        Ok(())
    }

    fn load_composite(
        &mut self,
        glyph: &CompositeGlyph,
        glyph_id: GlyphId,
        recurse_depth: usize,
    ) -> Result<(), Error> {
        for component in glyph.components() {
            let component = component?;
            self.component_count += 1;
            if self.component_count > MAX_POINTS {
                return Err(Limit::CompositePoints.into());
            }
            let Anchor::Offset { x, y } = component.anchor else {
                log::debug!("{glyph_id} uses a point matching anchor");
                return Err(Error::Unsupported("point matching composite anchors"));
            };
            let start_point = self.buffer.points.len();
            self.load(component.glyph, recurse_depth + 1)?;
            let has_transform = component.flags.has_transform();
            let offset = Point::from_units(x as i32, y as i32);
            for point in &mut self.buffer.points[start_point..] {
                if has_transform {
                    *point = component.transform.apply(*point);
                }
                *point += offset;
            }
        }
        Ok(())
    }
}
