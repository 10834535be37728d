//! Outlines loaded at a pixel size.

mod common;

use common::{load, load_unscaled};
use glyphpath::{F26Dot6, Font, LoadOptions, Point, Size};
use glyphpath_test_data::{cff, truetype};
use pretty_assertions::assert_eq;

fn check_scaling(data: Vec<u8>) {
    let font = Font::open(data).unwrap();
    let upem = font.units_per_em() as f32;
    let full = LoadOptions::new(Size::new(upem));
    let half = LoadOptions::new(Size::new(upem / 2.0));
    for gid in 0..font.num_glyphs() {
        let unscaled = load_unscaled(&font, gid);
        assert_eq!(load(&font, gid, &full).unwrap(), unscaled, "glyph {gid}");
        let halved: Vec<_> = unscaled
            .iter()
            .map(|segment| {
                segment.map(|p| {
                    // 26.6 halving rounds half away from zero
                    let half = |c: F26Dot6| {
                        let bits = c.to_bits();
                        F26Dot6::from_bits((bits + bits.signum()) / 2)
                    };
                    Point::new(half(p.x), half(p.y))
                })
            })
            .collect();
        assert_eq!(load(&font, gid, &half).unwrap(), halved, "glyph {gid}");
    }
}

#[test]
fn truetype_scaling() {
    check_scaling(truetype::font());
}

#[test]
fn cff_scaling() {
    check_scaling(cff::font());
}

#[test]
fn pixel_size() {
    let font = Font::open(cff::font()).unwrap();
    // 1000 units per em at 16 ppem: 300 units is 4.8 pixels
    let segments = load(
        &font,
        cff::glyph_ids::ZERO,
        &LoadOptions::new(Size::new(16.0)),
    )
    .unwrap();
    assert_eq!(
        segments[0].end_point(),
        Point::new(F26Dot6::from_bits(307), F26Dot6::from_bits(717))
    );
}
