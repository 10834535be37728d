//! Encoding `glyf` and `loca`, and the TrueType test font.

use glyphpath_types::{F2Dot14, Tag, TT_SFNT_VERSION};

use crate::{bebuffer::BeBuffer, sfnt};

/// Units per em of [`font`].
pub const UNITS_PER_EM: u16 = 2048;
/// Glyph count of [`font`].
pub const NUM_GLYPHS: u16 = 700;
/// `numberOfHMetrics` of [`font`]. Later glyphs repeat the last advance.
pub const NUMBER_OF_H_METRICS: u16 = 600;

/// Glyph ids with known content in [`font`].
pub mod glyph_ids {
    /// Rectangle with a rectangular hole.
    pub const NOTDEF: u16 = 0;
    /// No outline.
    pub const SPACE: u16 = 1;
    /// One contour mixing on and off curve points.
    pub const CURVES: u16 = 2;
    /// [`CURVES`] translated by (300, -50).
    pub const OFFSET_COMPOSITE: u16 = 3;
    /// [`NOTDEF`] at half scale followed by [`CURVES`] under a 2x2
    /// transform and a word sized offset.
    pub const SCALED_COMPOSITE: u16 = 4;
    /// Simple glyph carrying hinting instructions.
    pub const INSTRUCTED: u16 = 5;
    /// First of the generated simple glyphs.
    pub const FIRST_GENERATED: u16 = 6;
}

/// A point in a simple glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphPoint {
    pub x: i16,
    pub y: i16,
    pub on_curve: bool,
}

/// An on-curve point.
pub const fn on(x: i16, y: i16) -> GlyphPoint {
    GlyphPoint {
        x,
        y,
        on_curve: true,
    }
}

/// An off-curve point.
pub const fn off(x: i16, y: i16) -> GlyphPoint {
    GlyphPoint {
        x,
        y,
        on_curve: false,
    }
}

/// How a component is positioned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ComponentAnchor {
    Offset(i16, i16),
    /// Parent point, child point.
    Points(u16, u16),
}

/// The transform stored with a component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ComponentTransform {
    Identity,
    Scale(f32),
    XyScale(f32, f32),
    /// xx, yx, xy, yy
    TwoByTwo([f32; 4]),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComponentDef {
    pub glyph: u16,
    pub anchor: ComponentAnchor,
    pub transform: ComponentTransform,
}

impl ComponentDef {
    /// A component translated by `(dx, dy)`.
    pub fn offset(glyph: u16, dx: i16, dy: i16) -> Self {
        Self {
            glyph,
            anchor: ComponentAnchor::Offset(dx, dy),
            transform: ComponentTransform::Identity,
        }
    }
}

/// The content of one glyph.
#[derive(Clone, Debug, PartialEq)]
pub enum GlyphDef {
    Empty,
    Simple {
        contours: Vec<Vec<GlyphPoint>>,
        instructions: Vec<u8>,
    },
    Composite(Vec<ComponentDef>),
    /// Bytes stored as is.
    Raw(Vec<u8>),
}

impl GlyphDef {
    /// A simple glyph without instructions.
    pub fn simple(contours: Vec<Vec<GlyphPoint>>) -> Self {
        Self::Simple {
            contours,
            instructions: Vec::new(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Empty => Vec::new(),
            Self::Simple {
                contours,
                instructions,
            } => encode_simple(contours, instructions),
            Self::Composite(components) => encode_composite(components),
            Self::Raw(data) => data.clone(),
        }
    }
}

const ON_CURVE: u8 = 0x01;
const X_SHORT: u8 = 0x02;
const Y_SHORT: u8 = 0x04;
const REPEAT: u8 = 0x08;
const X_SAME_OR_POSITIVE: u8 = 0x10;
const Y_SAME_OR_POSITIVE: u8 = 0x20;

fn delta_flags(delta: i32, short: u8, same_or_positive: u8) -> u8 {
    if delta == 0 {
        same_or_positive
    } else if delta.unsigned_abs() < 256 {
        if delta > 0 {
            short | same_or_positive
        } else {
            short
        }
    } else {
        0
    }
}

fn push_delta(buf: BeBuffer, delta: i32, flag: u8, short: u8, same_or_positive: u8) -> BeBuffer {
    if flag & short != 0 {
        buf.push(delta.unsigned_abs() as u8)
    } else if flag & same_or_positive == 0 {
        buf.push(delta as i16)
    } else {
        buf
    }
}

/// Encodes a simple glyph, compressing runs of equal flags.
pub fn encode_simple(contours: &[Vec<GlyphPoint>], instructions: &[u8]) -> Vec<u8> {
    let points: Vec<GlyphPoint> = contours.iter().flatten().copied().collect();
    let (mut x_min, mut y_min, mut x_max, mut y_max) = (0i16, 0i16, 0i16, 0i16);
    if let Some(first) = points.first() {
        (x_min, y_min, x_max, y_max) = (first.x, first.y, first.x, first.y);
    }
    for p in &points {
        x_min = x_min.min(p.x);
        y_min = y_min.min(p.y);
        x_max = x_max.max(p.x);
        y_max = y_max.max(p.y);
    }
    let mut buf = BeBuffer::new()
        .push(contours.len() as i16)
        .push(x_min)
        .push(y_min)
        .push(x_max)
        .push(y_max);
    let mut end = 0usize;
    for contour in contours {
        end += contour.len();
        buf = buf.push((end as u16).wrapping_sub(1));
    }
    buf = buf
        .push(instructions.len() as u16)
        .extend(instructions.iter().copied());
    let mut deltas = Vec::with_capacity(points.len());
    let (mut x, mut y) = (0i32, 0i32);
    for p in &points {
        let (dx, dy) = (p.x as i32 - x, p.y as i32 - y);
        (x, y) = (p.x as i32, p.y as i32);
        let flag = (if p.on_curve { ON_CURVE } else { 0 })
            | delta_flags(dx, X_SHORT, X_SAME_OR_POSITIVE)
            | delta_flags(dy, Y_SHORT, Y_SAME_OR_POSITIVE);
        deltas.push((flag, dx, dy));
    }
    let mut i = 0;
    while i < deltas.len() {
        let flag = deltas[i].0;
        let run = deltas[i + 1..]
            .iter()
            .take(255)
            .take_while(|(f, _, _)| *f == flag)
            .count();
        if run > 0 {
            buf = buf.push(flag | REPEAT).push(run as u8);
        } else {
            buf = buf.push(flag);
        }
        i += run + 1;
    }
    for (flag, dx, _) in &deltas {
        buf = push_delta(buf, *dx, *flag, X_SHORT, X_SAME_OR_POSITIVE);
    }
    for (flag, _, dy) in &deltas {
        buf = push_delta(buf, *dy, *flag, Y_SHORT, Y_SAME_OR_POSITIVE);
    }
    buf.into_vec()
}

const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const ARGS_ARE_XY_VALUES: u16 = 0x0002;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;

/// Encodes a composite glyph. The bounding box is left empty.
pub fn encode_composite(components: &[ComponentDef]) -> Vec<u8> {
    let mut buf = BeBuffer::new().push(-1i16).extend([0i16; 4]);
    for (i, component) in components.iter().enumerate() {
        let mut flags = 0u16;
        if i + 1 < components.len() {
            flags |= MORE_COMPONENTS;
        }
        let (a, b, words) = match component.anchor {
            ComponentAnchor::Offset(dx, dy) => {
                flags |= ARGS_ARE_XY_VALUES;
                let fits = i8::try_from(dx).is_ok() && i8::try_from(dy).is_ok();
                (dx as i32, dy as i32, !fits)
            }
            ComponentAnchor::Points(base, child) => {
                let fits = base < 256 && child < 256;
                (base as i32, child as i32, !fits)
            }
        };
        if words {
            flags |= ARG_1_AND_2_ARE_WORDS;
        }
        flags |= match component.transform {
            ComponentTransform::Identity => 0,
            ComponentTransform::Scale(_) => WE_HAVE_A_SCALE,
            ComponentTransform::XyScale(..) => WE_HAVE_AN_X_AND_Y_SCALE,
            ComponentTransform::TwoByTwo(_) => WE_HAVE_A_TWO_BY_TWO,
        };
        buf = buf.push(flags).push(component.glyph);
        buf = if words {
            buf.push(a as u16).push(b as u16)
        } else {
            buf.push(a as u8).push(b as u8)
        };
        let scales: Vec<f32> = match component.transform {
            ComponentTransform::Identity => vec![],
            ComponentTransform::Scale(s) => vec![s],
            ComponentTransform::XyScale(x, y) => vec![x, y],
            ComponentTransform::TwoByTwo(m) => m.to_vec(),
        };
        buf = buf.extend(scales.into_iter().map(F2Dot14::from_f32));
    }
    buf.into_vec()
}

/// Builds a TrueType font from a list of glyphs.
#[derive(Clone, Debug)]
pub struct FontBuilder {
    units_per_em: u16,
    glyphs: Vec<GlyphDef>,
    long_loca: bool,
    advances: Vec<u16>,
    number_of_h_metrics: Option<u16>,
}

impl FontBuilder {
    pub fn new(units_per_em: u16) -> Self {
        Self {
            units_per_em,
            glyphs: Vec::new(),
            long_loca: false,
            advances: Vec::new(),
            number_of_h_metrics: None,
        }
    }

    pub fn glyph(mut self, glyph: GlyphDef) -> Self {
        self.glyphs.push(glyph);
        self
    }

    pub fn glyphs(mut self, glyphs: impl IntoIterator<Item = GlyphDef>) -> Self {
        self.glyphs.extend(glyphs);
        self
    }

    /// Use 32-bit `loca` offsets.
    pub fn long_loca(mut self, long: bool) -> Self {
        self.long_loca = long;
        self
    }

    /// Adds `hhea` and `hmtx` tables with these advances.
    ///
    /// Only the first `number_of_h_metrics` advances are stored.
    pub fn metrics(mut self, advances: Vec<u16>, number_of_h_metrics: u16) -> Self {
        self.advances = advances;
        self.number_of_h_metrics = Some(number_of_h_metrics);
        self
    }

    /// The `glyf` and `loca` tables.
    pub fn glyf_and_loca(&self) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Vec::new();
        let mut offsets = vec![0usize];
        for glyph in &self.glyphs {
            glyf.extend(glyph.encode());
            // short offsets are stored halved
            while glyf.len() % 2 != 0 {
                glyf.push(0);
            }
            offsets.push(glyf.len());
        }
        let loca = if self.long_loca {
            BeBuffer::new().extend(offsets.iter().map(|o| *o as u32))
        } else {
            BeBuffer::new().extend(offsets.iter().map(|o| (*o / 2) as u16))
        };
        (glyf, loca.into_vec())
    }

    pub fn build(&self) -> Vec<u8> {
        let (glyf, loca) = self.glyf_and_loca();
        let num_glyphs = self.glyphs.len() as u16;
        let mut tables = vec![
            (
                Tag::new(b"head"),
                sfnt::head(self.units_per_em, self.long_loca as i16, [0, 0, 1000, 1000]),
            ),
            (Tag::new(b"maxp"), sfnt::maxp(0x00010000, num_glyphs)),
            (Tag::new(b"glyf"), glyf),
            (Tag::new(b"loca"), loca),
        ];
        if let Some(n_long) = self.number_of_h_metrics {
            let n_long = n_long as usize;
            let metrics: Vec<(u16, i16)> = self.advances[..n_long]
                .iter()
                .map(|advance| (*advance, 0))
                .collect();
            let lsbs = vec![0i16; self.glyphs.len().saturating_sub(n_long)];
            tables.push((Tag::new(b"hhea"), sfnt::hhea(n_long as u16)));
            tables.push((Tag::new(b"hmtx"), sfnt::hmtx(&metrics, &lsbs)));
        }
        sfnt::build_sfnt(TT_SFNT_VERSION, &tables)
    }
}

/// Contours of [`glyph_ids::NOTDEF`].
pub fn notdef_contours() -> Vec<Vec<GlyphPoint>> {
    vec![
        vec![on(100, 0), on(900, 0), on(900, 1400), on(100, 1400)],
        vec![on(200, 100), on(200, 1300), on(800, 1300), on(800, 100)],
    ]
}

/// Contours of [`glyph_ids::CURVES`].
pub fn curves_contours() -> Vec<Vec<GlyphPoint>> {
    vec![vec![
        off(100, 100),
        on(500, 0),
        off(900, 100),
        off(1000, 500),
        on(900, 900),
        off(500, 1000),
        off(100, 900),
    ]]
}

/// The contours of the generated glyph `gid`.
///
/// Each is a rectangle that grows with the glyph id. Every third glyph
/// adds a curved triangle.
pub fn generated_contours(gid: u16) -> Vec<Vec<GlyphPoint>> {
    let w = 100 + gid as i16;
    let h = 200 + (gid % 50) as i16 * 10;
    let mut contours = vec![vec![on(0, 0), on(w, 0), on(w, h), on(0, h)]];
    if gid % 3 == 0 {
        contours.push(vec![on(10, 10), off(w / 2, h + 300), on(w - 10, 10)]);
    }
    contours
}

/// The advance of glyph `gid` in [`font`], before the `hmtx` repeat rule.
pub fn advance_for(gid: u16) -> u16 {
    500 + gid
}

/// The TrueType test font.
///
/// 700 glyphs at 2048 units per em with short `loca` offsets. See
/// [`glyph_ids`] for the glyphs with known content. Glyphs 600 and later
/// share the advance of glyph 599.
pub fn font() -> Vec<u8> {
    let mut glyphs = vec![
        GlyphDef::simple(notdef_contours()),
        GlyphDef::Empty,
        GlyphDef::simple(curves_contours()),
        GlyphDef::Composite(vec![ComponentDef::offset(glyph_ids::CURVES, 300, -50)]),
        GlyphDef::Composite(vec![
            ComponentDef {
                glyph: glyph_ids::NOTDEF,
                anchor: ComponentAnchor::Offset(0, 0),
                transform: ComponentTransform::Scale(0.5),
            },
            ComponentDef {
                glyph: glyph_ids::CURVES,
                anchor: ComponentAnchor::Offset(1000, 0),
                transform: ComponentTransform::TwoByTwo([1.0, 0.0, 0.25, 1.0]),
            },
        ]),
        GlyphDef::Simple {
            contours: vec![vec![on(0, 0), on(0, 700), on(400, 700)]],
            // PUSHB[0] 1, SRP0
            instructions: vec![0xB0, 0x01, 0x10],
        },
    ];
    for gid in glyph_ids::FIRST_GENERATED..NUM_GLYPHS {
        glyphs.push(GlyphDef::simple(generated_contours(gid)));
    }
    FontBuilder::new(UNITS_PER_EM)
        .glyphs(glyphs)
        .metrics(
            (0..NUM_GLYPHS).map(advance_for).collect(),
            NUMBER_OF_H_METRICS,
        )
        .build()
}

/// A font whose glyph `i` is a composite of glyph `i + 1`, for `depth`
/// levels, ending in a simple triangle.
///
/// Loading glyph 0 therefore nests `depth` composites.
pub fn composite_chain_font(depth: u16) -> Vec<u8> {
    let mut builder = FontBuilder::new(1000);
    for i in 0..depth {
        builder = builder.glyph(GlyphDef::Composite(vec![ComponentDef::offset(
            i + 1,
            1,
            0,
        )]));
    }
    builder
        .glyph(GlyphDef::simple(vec![vec![
            on(0, 0),
            on(100, 0),
            on(50, 100),
        ]]))
        .build()
}
