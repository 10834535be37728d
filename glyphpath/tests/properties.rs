//! Structural properties that hold for every glyph.

mod common;

use common::{init_logger, load, load_unscaled};
use glyphpath::{
    raw::{FontRef, TableProvider},
    Error, F26Dot6, Font, GlyphBuffer, GlyphId, Limit, LoadOptions, MalformedKind, Point,
    Segment, Size,
};
use glyphpath_test_data::{
    cff,
    truetype::{self, on, ComponentDef, FontBuilder, GlyphDef},
};
use pretty_assertions::assert_eq;

/// Loads every glyph and checks that each contour starts with a single
/// `MoveTo` and that the contour count matches the source.
fn check_contour_structure(font: &Font<Vec<u8>>, contour_counts: impl Fn(u16) -> usize) {
    let mut buffer = GlyphBuffer::new();
    for gid in 0..font.num_glyphs() {
        font.load_glyph(&mut buffer, GlyphId::new(gid), &LoadOptions::default())
            .unwrap();
        if let Some(first) = buffer.segments().first() {
            assert!(matches!(first, Segment::MoveTo(_)), "glyph {gid}");
        }
        assert_eq!(buffer.contour_count(), contour_counts(gid), "glyph {gid}");
    }
}

#[test]
fn truetype_contours() {
    init_logger();
    let font = Font::open(truetype::font()).unwrap();
    let data = truetype::font();
    let raw = FontRef::new(&data).unwrap();
    let loca = raw.loca(None).unwrap();
    let glyf = raw.glyf().unwrap();
    check_contour_structure(&font, |gid| {
        use glyphpath::raw::tables::glyf::Glyph;
        match loca.get_glyf(GlyphId::new(gid), &glyf).unwrap() {
            Some(Glyph::Simple(simple)) => simple.end_pts_of_contours().len(),
            Some(Glyph::Composite(_)) if gid == truetype::glyph_ids::OFFSET_COMPOSITE => 1,
            Some(Glyph::Composite(_)) => 3,
            None => 0,
        }
    });
}

#[test]
fn cff_contours() {
    init_logger();
    let font = Font::open(cff::font()).unwrap();
    let contours = [2, 2, 1, 2, 1];
    check_contour_structure(&font, |gid| contours[gid as usize]);
}

#[test]
fn font_metrics() {
    let font = Font::open(truetype::font()).unwrap();
    assert_eq!(font.units_per_em(), 2048);
    assert!(font.num_glyphs() > 650);
}

#[test]
fn advances_repeat_past_last_long_metric() {
    let font = Font::open(truetype::font()).unwrap();
    let options = LoadOptions::default();
    let advance = |gid: u16| {
        font.advance_width(GlyphId::new(gid), &options)
            .unwrap()
            .unwrap()
    };
    let last_long = truetype::NUMBER_OF_H_METRICS - 1;
    assert_eq!(advance(10), F26Dot6::from_i32(truetype::advance_for(10) as i32));
    let repeated = F26Dot6::from_i32(truetype::advance_for(last_long) as i32);
    assert_eq!(advance(last_long), repeated);
    assert_eq!(advance(last_long + 1), repeated);
    assert_eq!(advance(truetype::NUM_GLYPHS - 1), repeated);
}

#[test]
fn offset_composite_translates_child() {
    init_logger();
    let font = Font::open(truetype::font()).unwrap();
    let child = load_unscaled(&font, truetype::glyph_ids::CURVES);
    let composite = load_unscaled(&font, truetype::glyph_ids::OFFSET_COMPOSITE);
    let offset = Point::from_units(300, -50);
    let translated: Vec<_> = child
        .into_iter()
        .map(|segment| segment.map(|p| p + offset))
        .collect();
    assert_eq!(composite, translated);
}

#[test]
fn composite_depth_limit() {
    init_logger();
    let font = Font::open(truetype::composite_chain_font(8)).unwrap();
    let segments = load_unscaled(&font, 0);
    // eight nested offsets of (1, 0)
    assert_eq!(segments[0], Segment::MoveTo(Point::from_units(8, 0)));
    let font = Font::open(truetype::composite_chain_font(9)).unwrap();
    assert!(matches!(
        load(&font, 0, &LoadOptions::default()),
        Err(Error::TooComplex(Limit::CompositeDepth))
    ));
    // the inner part of the chain is still shallow enough
    assert!(load(&font, 1, &LoadOptions::default()).is_ok());
}

#[test]
fn self_referencing_composite() {
    init_logger();
    let data = FontBuilder::new(1000)
        .glyph(GlyphDef::Composite(vec![ComponentDef::offset(0, 0, 0)]))
        .build();
    let font = Font::open(data).unwrap();
    assert!(matches!(
        load(&font, 0, &LoadOptions::default()),
        Err(Error::TooComplex(Limit::CompositeDepth))
    ));
}

#[test]
fn empty_glyph() {
    let font = Font::open(truetype::font()).unwrap();
    assert!(load_unscaled(&font, truetype::glyph_ids::SPACE).is_empty());
}

#[test]
fn out_of_range_contour_end() {
    let glyph = GlyphDef::simple(vec![vec![on(0, 0), on(10, 0), on(10, 10)]]);
    let mut data = glyph.encode();
    // end point 2 becomes 200; the flag and coordinate arrays run out
    data[10..12].copy_from_slice(&200u16.to_be_bytes());
    let font = Font::open(FontBuilder::new(1000).glyph(GlyphDef::Raw(data)).build()).unwrap();
    assert!(matches!(
        load(&font, 0, &LoadOptions::default()),
        Err(Error::Malformed(_))
    ));
}

#[test]
fn subroutine_depth_limit() {
    init_logger();
    let font = Font::open(cff::subr_chain_font(10)).unwrap();
    assert_eq!(
        load_unscaled(&font, 0),
        vec![
            Segment::MoveTo(Point::from_units(0, 0)),
            Segment::LineTo(Point::from_units(10, 0)),
        ]
    );
    let font = Font::open(cff::subr_chain_font(11)).unwrap();
    assert!(matches!(
        load(&font, 0, &LoadOptions::default()),
        Err(Error::TooComplex(Limit::SubroutineNesting))
    ));
}

#[test]
fn seac_is_unsupported() {
    let font = Font::open(cff::seac_font()).unwrap();
    assert!(matches!(
        load(&font, 0, &LoadOptions::default()),
        Err(Error::Unsupported(_))
    ));
}

#[test]
fn operand_stack_limit() {
    let font = Font::open(cff::stack_font(48)).unwrap();
    assert_eq!(load_unscaled(&font, 0).len(), 25);
    let font = Font::open(cff::stack_font(49)).unwrap();
    assert!(matches!(
        load(&font, 0, &LoadOptions::default()),
        Err(Error::TooComplex(Limit::OperandStack))
    ));
}

/// A one glyph CFF font.
fn single_glyph_cff(charstring: cff::Charstring) -> Font<Vec<u8>> {
    let table = cff::CffBuilder::new(vec![charstring.build()]).build();
    Font::open(cff::cff_font(table, 1, cff::UNITS_PER_EM, &[])).unwrap()
}

#[test]
fn cff_drawing_before_moveto_starts_at_origin() {
    init_logger();
    let font = single_glyph_cff(
        cff::Charstring::new()
            .op_with(&[5, 5], cff::op::RLINETO)
            .op_with(&[10, 20], cff::op::RMOVETO)
            .op_with(&[5], cff::op::HLINETO)
            .op(cff::op::ENDCHAR),
    );
    assert_eq!(
        load_unscaled(&font, 0),
        vec![
            Segment::MoveTo(Point::from_units(0, 0)),
            Segment::LineTo(Point::from_units(5, 5)),
            Segment::MoveTo(Point::from_units(15, 25)),
            Segment::LineTo(Point::from_units(20, 25)),
        ]
    );
}

#[test]
fn cff_arithmetic_operators_are_evaluated() {
    init_logger();
    // 1 2 add drop, then 10 * 2 and 45 / 3 as the moveto operands
    let font = single_glyph_cff(
        cff::Charstring::new()
            .int(1)
            .int(2)
            .escaped(10)
            .escaped(18)
            .int(10)
            .int(2)
            .escaped(24)
            .int(45)
            .int(3)
            .escaped(12)
            .op(cff::op::RMOVETO)
            .op_with(&[5], cff::op::HLINETO)
            .op(cff::op::ENDCHAR),
    );
    assert_eq!(
        load_unscaled(&font, 0),
        vec![
            Segment::MoveTo(Point::from_units(20, 15)),
            Segment::LineTo(Point::from_units(25, 15)),
        ]
    );
}

#[test]
fn cff_glyph_count_must_match_maxp() {
    let data = cff::cff_font(cff::table(), 4, cff::UNITS_PER_EM, &[]);
    assert!(matches!(
        Font::open(data),
        Err(Error::Malformed(MalformedKind::GlyphCountMismatch { .. }))
    ));
}

#[test]
fn glyph_not_found() {
    let font = Font::open(truetype::font()).unwrap();
    let gid = GlyphId::new(truetype::NUM_GLYPHS);
    assert!(matches!(
        load(&font, gid.to_u16(), &LoadOptions::default()),
        Err(Error::GlyphNotFound(g)) if g == gid
    ));
}

/// Loads every glyph twice into the same buffer and compares the results.
fn check_idempotent(font: &Font<Vec<u8>>, options: &LoadOptions) {
    let mut buffer = GlyphBuffer::new();
    for gid in 0..font.num_glyphs() {
        let gid = GlyphId::new(gid);
        font.load_glyph(&mut buffer, gid, options).unwrap();
        let first = buffer.segments().to_vec();
        font.load_glyph(&mut buffer, gid, options).unwrap();
        assert_eq!(buffer.segments(), first.as_slice(), "{gid}");
    }
}

#[test]
fn loading_is_idempotent() {
    let options = [LoadOptions::default(), LoadOptions::new(Size::new(17.0))];
    for options in &options {
        check_idempotent(&Font::open(cff::font()).unwrap(), options);
        check_idempotent(&Font::open(cff::cid_font()).unwrap(), options);
        check_idempotent(&Font::open(truetype::font()).unwrap(), options);
    }
}

#[test]
fn composite_loads_are_independent_of_buffer_history() {
    // the composites use the buffer's scratch space, so a load that follows
    // a different composite must match one into a fresh buffer
    let font = Font::open(truetype::font()).unwrap();
    let options = LoadOptions::default();
    let composites = [
        truetype::glyph_ids::OFFSET_COMPOSITE,
        truetype::glyph_ids::SCALED_COMPOSITE,
    ];
    let mut shared = GlyphBuffer::new();
    for _ in 0..2 {
        for gid in composites {
            let gid = GlyphId::new(gid);
            let mut fresh = GlyphBuffer::new();
            font.load_glyph(&mut fresh, gid, &options).unwrap();
            font.load_glyph(&mut shared, gid, &options).unwrap();
            assert_eq!(shared.segments(), fresh.segments(), "{gid}");
        }
    }
}

#[test]
fn buffer_reuse_across_formats() {
    let tt_font = Font::open(truetype::font()).unwrap();
    let cff_font = Font::open(cff::font()).unwrap();
    let mut buffer = GlyphBuffer::new();
    let options = LoadOptions::default();
    let composite = GlyphId::new(truetype::glyph_ids::SCALED_COMPOSITE);
    tt_font.load_glyph(&mut buffer, composite, &options).unwrap();
    let one = GlyphId::new(cff::glyph_ids::ONE);
    cff_font.load_glyph(&mut buffer, one, &options).unwrap();
    assert_eq!(buffer.segments().len(), 4);
    assert_eq!(buffer.contour_count(), 1);
}
