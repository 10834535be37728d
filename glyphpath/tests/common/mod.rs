//! Helpers shared by the integration tests.

#![allow(dead_code)]

use glyphpath::{Error, Font, GlyphBuffer, GlyphId, LoadOptions, Point, Segment};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Parses an outline written as `M(x,y) L(x,y) Q(x,y,x,y) C(x,y,x,y,x,y)`
/// with coordinates in font units.
pub fn parse_path(path: &str) -> Vec<Segment> {
    path.split_whitespace()
        .map(|token| {
            let (verb, args) = token.split_at(1);
            let coords: Vec<i32> = args
                .trim_start_matches('(')
                .trim_end_matches(')')
                .split(',')
                .map(|n| n.parse().unwrap())
                .collect();
            let points: Vec<_> = coords
                .chunks(2)
                .map(|xy| Point::from_units(xy[0], xy[1]))
                .collect();
            match (verb, points.as_slice()) {
                ("M", [p]) => Segment::MoveTo(*p),
                ("L", [p]) => Segment::LineTo(*p),
                ("Q", [c, p]) => Segment::QuadTo(*c, *p),
                ("C", [c0, c1, p]) => Segment::CubeTo(*c0, *c1, *p),
                _ => panic!("bad path token {token}"),
            }
        })
        .collect()
}

pub fn load(
    font: &Font<impl AsRef<[u8]>>,
    glyph_id: u16,
    options: &LoadOptions,
) -> Result<Vec<Segment>, Error> {
    let mut buffer = GlyphBuffer::new();
    font.load_glyph(&mut buffer, GlyphId::new(glyph_id), options)?;
    Ok(buffer.segments().to_vec())
}

pub fn load_unscaled(font: &Font<impl AsRef<[u8]>>, glyph_id: u16) -> Vec<Segment> {
    load(font, glyph_id, &LoadOptions::default()).unwrap()
}
