//! Encoding charstrings and `CFF ` tables, and the CFF test fonts.

use glyphpath_types::{Fixed, Tag, CFF_SFNT_VERSION};

use crate::{bebuffer::BeBuffer, sfnt};

/// Type 2 charstring operators.
pub mod op {
    pub const HSTEM: u8 = 1;
    pub const VSTEM: u8 = 3;
    pub const VMOVETO: u8 = 4;
    pub const RLINETO: u8 = 5;
    pub const HLINETO: u8 = 6;
    pub const VLINETO: u8 = 7;
    pub const RRCURVETO: u8 = 8;
    pub const CALLSUBR: u8 = 10;
    pub const RETURN: u8 = 11;
    pub const ESCAPE: u8 = 12;
    pub const ENDCHAR: u8 = 14;
    pub const HSTEMHM: u8 = 18;
    pub const HINTMASK: u8 = 19;
    pub const CNTRMASK: u8 = 20;
    pub const RMOVETO: u8 = 21;
    pub const HMOVETO: u8 = 22;
    pub const VSTEMHM: u8 = 23;
    pub const RCURVELINE: u8 = 24;
    pub const RLINECURVE: u8 = 25;
    pub const VVCURVETO: u8 = 26;
    pub const HHCURVETO: u8 = 27;
    pub const CALLGSUBR: u8 = 29;
    pub const VHCURVETO: u8 = 30;
    pub const HVCURVETO: u8 = 31;
    // escaped
    pub const HFLEX: u8 = 34;
    pub const FLEX: u8 = 35;
    pub const HFLEX1: u8 = 36;
    pub const FLEX1: u8 = 37;
}

/// Builds a Type 2 charstring.
#[derive(Clone, Debug, Default)]
pub struct Charstring(Vec<u8>);

impl Charstring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes an integer operand in its shortest encoding.
    pub fn int(mut self, value: i32) -> Self {
        match value {
            -107..=107 => self.0.push((value + 139) as u8),
            108..=1131 => {
                let v = value - 108;
                self.0.extend([(v >> 8) as u8 + 247, v as u8]);
            }
            -1131..=-108 => {
                let v = -value - 108;
                self.0.extend([(v >> 8) as u8 + 251, v as u8]);
            }
            -32768..=32767 => {
                self.0.push(28);
                self.0.extend((value as i16).to_be_bytes());
            }
            _ => return self.fixed(Fixed::from_i32(value)),
        }
        self
    }

    /// Pushes a 16.16 operand.
    pub fn fixed(mut self, value: Fixed) -> Self {
        self.0.push(255);
        self.0.extend(value.to_bits().to_be_bytes());
        self
    }

    /// Pushes `args` followed by `op`.
    pub fn op_with(self, args: &[i32], op: u8) -> Self {
        args.iter().fold(self, |cs, arg| cs.int(*arg)).op(op)
    }

    pub fn op(mut self, op: u8) -> Self {
        self.0.push(op);
        self
    }

    /// Pushes an escaped (two byte) operator.
    pub fn escaped(mut self, op: u8) -> Self {
        self.0.extend([op::ESCAPE, op]);
        self
    }

    /// Appends raw bytes, such as hint mask data.
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

/// Encodes a CFF INDEX with the smallest offset size that fits.
pub fn index(objects: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = BeBuffer::new().push(objects.len() as u16);
    if objects.is_empty() {
        return buf.into_vec();
    }
    let last_offset = 1 + objects.iter().map(Vec::len).sum::<usize>();
    let off_size: u8 = match last_offset {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x10000..=0xFFFFFF => 3,
        _ => 4,
    };
    buf = buf.push(off_size);
    let mut offset = 1usize;
    let push_offset = |buf: BeBuffer, offset: usize| {
        let bytes = (offset as u32).to_be_bytes();
        buf.extend(bytes[4 - off_size as usize..].iter().copied())
    };
    buf = push_offset(buf, offset);
    for object in objects {
        offset += object.len();
        buf = push_offset(buf, offset);
    }
    for object in objects {
        buf = buf.extend(object.iter().copied());
    }
    buf.into_vec()
}

/// Builds a DICT.
#[derive(Clone, Debug, Default)]
pub struct Dict(Vec<u8>);

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes an integer operand in its shortest encoding.
    pub fn int(mut self, value: i32) -> Self {
        match value {
            -107..=107 => self.0.push((value + 139) as u8),
            108..=1131 => {
                let v = value - 108;
                self.0.extend([(v >> 8) as u8 + 247, v as u8]);
            }
            -1131..=-108 => {
                let v = -value - 108;
                self.0.extend([(v >> 8) as u8 + 251, v as u8]);
            }
            -32768..=32767 => {
                self.0.push(28);
                self.0.extend((value as i16).to_be_bytes());
            }
            _ => return self.long(value),
        }
        self
    }

    /// Pushes a five byte integer operand.
    ///
    /// Offsets use this form so that a DICT's size does not depend on them.
    pub fn long(mut self, value: i32) -> Self {
        self.0.push(29);
        self.0.extend(value.to_be_bytes());
        self
    }

    pub fn op(mut self, op: u8) -> Self {
        self.0.push(op);
        self
    }

    pub fn escaped(mut self, op: u8) -> Self {
        self.0.extend([12, op]);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

/// Builds a `CFF ` table.
///
/// The font is name-keyed unless [`font_dicts`](Self::font_dicts) is used.
#[derive(Clone, Debug)]
pub struct CffBuilder {
    names: Vec<Vec<u8>>,
    charstrings: Vec<Vec<u8>>,
    global_subrs: Vec<Vec<u8>>,
    local_subrs: Vec<Vec<u8>>,
    charstring_type: Option<i32>,
    widths: Option<(i32, i32)>,
    // local subrs of each font DICT and the FDSelect map
    cid: Option<(Vec<Vec<Vec<u8>>>, Vec<u8>)>,
}

impl CffBuilder {
    pub fn new(charstrings: Vec<Vec<u8>>) -> Self {
        Self {
            names: vec![b"GlyphpathTest".to_vec()],
            charstrings,
            global_subrs: Vec::new(),
            local_subrs: Vec::new(),
            charstring_type: None,
            widths: None,
            cid: None,
        }
    }

    /// Replaces the Name INDEX entries.
    pub fn names(mut self, names: Vec<Vec<u8>>) -> Self {
        self.names = names;
        self
    }

    pub fn global_subrs(mut self, subrs: Vec<Vec<u8>>) -> Self {
        self.global_subrs = subrs;
        self
    }

    pub fn local_subrs(mut self, subrs: Vec<Vec<u8>>) -> Self {
        self.local_subrs = subrs;
        self
    }

    /// Writes an explicit CharstringType entry.
    pub fn charstring_type(mut self, charstring_type: i32) -> Self {
        self.charstring_type = Some(charstring_type);
        self
    }

    /// Writes defaultWidthX and nominalWidthX.
    pub fn widths(mut self, default_width: i32, nominal_width: i32) -> Self {
        self.widths = Some((default_width, nominal_width));
        self
    }

    /// Makes the font CID-keyed.
    ///
    /// `local_subrs` holds the Subrs of each font DICT and `fd_select`
    /// maps each glyph to one of them. FDSelect is written in format 0.
    pub fn font_dicts(mut self, local_subrs: Vec<Vec<Vec<u8>>>, fd_select: Vec<u8>) -> Self {
        self.cid = Some((local_subrs, fd_select));
        self
    }

    fn top_dict(&self, charstrings: i32, private: (i32, i32), fd: (i32, i32)) -> Vec<u8> {
        let mut dict = Dict::new();
        if self.cid.is_some() {
            // "Adobe" "Identity" 0
            dict = dict.long(391).long(392).long(0).escaped(30);
        }
        if let Some(charstring_type) = self.charstring_type {
            dict = dict.int(charstring_type).escaped(6);
        }
        dict = dict.long(charstrings).op(17);
        if self.cid.is_some() {
            dict = dict.long(fd.0).escaped(36).long(fd.1).escaped(37);
        } else {
            dict = dict.long(private.0).long(private.1).op(18);
        }
        dict.build()
    }

    fn private_dict(&self, has_subrs: bool, subrs_offset: i32) -> Vec<u8> {
        let mut dict = Dict::new();
        match self.widths {
            Some((default_width, nominal_width)) => {
                dict = dict.int(default_width).op(20).int(nominal_width).op(21);
            }
            None => dict = dict.int(0).op(20),
        }
        if has_subrs {
            dict = dict.long(subrs_offset).op(19);
        }
        dict.build()
    }

    /// A Private DICT followed by its Subrs INDEX.
    fn private_with_subrs(&self, subrs: &[Vec<u8>]) -> (Vec<u8>, usize) {
        let len = self.private_dict(!subrs.is_empty(), 0).len();
        let mut data = self.private_dict(!subrs.is_empty(), len as i32);
        if !subrs.is_empty() {
            data.extend(index(subrs));
        }
        (data, len)
    }

    pub fn build(&self) -> Vec<u8> {
        let header = [1u8, 0, 4, 4];
        let names = index(&self.names);
        let top_len = index(&[self.top_dict(0, (0, 0), (0, 0))]).len();
        let strings = index(&[b"Adobe".to_vec(), b"Identity".to_vec()]);
        let global_subrs = index(&self.global_subrs);
        let charstrings = index(&self.charstrings);
        let charstrings_offset =
            header.len() + names.len() + top_len + strings.len() + global_subrs.len();
        let after_charstrings = charstrings_offset + charstrings.len();
        let mut tail = Vec::new();
        let top = match &self.cid {
            None => {
                let (private, private_len) = self.private_with_subrs(&self.local_subrs);
                tail.extend(private);
                self.top_dict(
                    charstrings_offset as i32,
                    (private_len as i32, after_charstrings as i32),
                    (0, 0),
                )
            }
            Some((fd_subrs, fd_select)) => {
                let fd_select_offset = after_charstrings;
                tail.push(0);
                tail.extend(fd_select);
                let fd_array_offset = fd_select_offset + tail.len();
                let privates: Vec<(Vec<u8>, usize)> = fd_subrs
                    .iter()
                    .map(|subrs| self.private_with_subrs(subrs))
                    .collect();
                let font_dict_len = Dict::new().long(0).long(0).op(18).build().len();
                let fd_array_len = index(&vec![vec![0u8; font_dict_len]; privates.len()]).len();
                let mut private_offset = fd_array_offset + fd_array_len;
                let mut font_dicts = Vec::new();
                for (data, len) in &privates {
                    font_dicts.push(
                        Dict::new()
                            .long(*len as i32)
                            .long(private_offset as i32)
                            .op(18)
                            .build(),
                    );
                    private_offset += data.len();
                }
                tail.extend(index(&font_dicts));
                for (data, _) in privates {
                    tail.extend(data);
                }
                self.top_dict(
                    charstrings_offset as i32,
                    (0, 0),
                    (fd_array_offset as i32, fd_select_offset as i32),
                )
            }
        };
        let mut data = header.to_vec();
        data.extend(names);
        data.extend(index(&[top]));
        data.extend(strings);
        data.extend(global_subrs);
        data.extend(charstrings);
        data.extend(tail);
        data
    }
}

/// Wraps a `CFF ` table in an `OTTO` sfnt.
///
/// `advances`, when given, produces `hhea` and `hmtx` with one long metric
/// per glyph.
pub fn cff_font(cff: Vec<u8>, num_glyphs: u16, units_per_em: u16, advances: &[u16]) -> Vec<u8> {
    let mut tables = vec![
        (
            Tag::new(b"head"),
            sfnt::head(units_per_em, 0, [50, -39, 926, 840]),
        ),
        (Tag::new(b"maxp"), sfnt::maxp(0x00005000, num_glyphs)),
        (Tag::new(b"CFF "), cff),
    ];
    if !advances.is_empty() {
        let metrics: Vec<(u16, i16)> = advances.iter().map(|a| (*a, 0)).collect();
        tables.push((Tag::new(b"hhea"), sfnt::hhea(advances.len() as u16)));
        tables.push((Tag::new(b"hmtx"), sfnt::hmtx(&metrics, &[])));
    }
    sfnt::build_sfnt(CFF_SFNT_VERSION, &tables)
}

/// Glyph ids of [`font`].
pub mod glyph_ids {
    pub const NOTDEF: u16 = 0;
    pub const ZERO: u16 = 1;
    pub const ONE: u16 = 2;
    pub const Q: u16 = 3;
    pub const UNI4E2D: u16 = 4;
}

/// Glyph names of [`font`] in glyph id order.
pub const GLYPH_NAMES: [&str; 5] = [".notdef", "zero", "one", "Q", "uni4E2D"];

/// Advances of [`font`] in glyph id order.
pub const ADVANCES: [u16; 5] = [500, 600, 400, 1000, 1000];

/// Units per em of [`font`].
pub const UNITS_PER_EM: u16 = 1000;

/// The second contour of `zero`, four curves.
fn zero_inner_subr() -> Vec<u8> {
    Charstring::new()
        .op_with(
            &[
                -100, -100, -220, -180, -180, 100, -220, 100, 100, 100, 220, 180, 180, -100, 220,
                -100,
            ],
            op::HVCURVETO,
        )
        .op(op::RETURN)
        .build()
}

/// The `hlineto` shared by `one`.
fn one_stem_gsubr() -> Vec<u8> {
    Charstring::new()
        .op_with(&[200, 800, -200], op::HLINETO)
        .op(op::RETURN)
        .build()
}

/// Charstrings of [`font`] in glyph id order.
pub fn charstrings() -> Vec<Vec<u8>> {
    let notdef = Charstring::new()
        .op_with(&[36, 50, 0], op::RMOVETO)
        .op_with(&[400, 533, -400], op::HLINETO)
        .op_with(&[50, -483], op::RMOVETO)
        .op_with(&[433, 300, -433], op::VLINETO)
        .op(op::ENDCHAR)
        .build();
    let zero = Charstring::new()
        .op_with(&[300, 700], op::RMOVETO)
        .op_with(
            &[
                80, 0, 40, -120, 0, -80, 0, -150, -30, -250, -90, 0, -80, 0, -40, 120, 0, 80, 0,
                150, 30, 250, 90, 0,
            ],
            op::RRCURVETO,
        )
        .op_with(&[100], op::VMOVETO)
        .op_with(&[-107], op::CALLSUBR)
        .op(op::ENDCHAR)
        .build();
    let one = Charstring::new()
        .op_with(&[12, 0, 800], op::HSTEMHM)
        .op_with(&[100, 200], op::HINTMASK)
        .bytes(&[0xC0])
        .op_with(&[100], op::HMOVETO)
        .op_with(&[-107], op::CALLGSUBR)
        .op(op::ENDCHAR)
        .build();
    let q = Charstring::new()
        .op_with(&[657, 237], op::RMOVETO)
        .op_with(&[-368, 150, 230, 228], op::RLINETO)
        .fixed(Fixed::from_i32(273))
        .op_with(&[-446], op::RMOVETO)
        .op_with(
            &[
                75, 94, 59, 239, -135, 163, -146, 175, -265, -9, -152, -158, -157, -164, 39,
                -278, 132, -138, 127, -132, 272, 57, 81, 75, 80, -90,
            ],
            op::RCURVELINE,
        )
        .op_with(&[62, 80], op::RLINETO)
        .op(op::ENDCHAR)
        .build();
    let uni4e2d = Charstring::new()
        .op_with(&[-50, 141, 520], op::RMOVETO)
        .op_with(
            &[
                -4, -164, 108, 44, 86, -374, 24, 388, 108, 20, -10, 186, -112, -28, -10, 166,
                -88, -6, -8, -190,
            ],
            op::RLINETO,
        )
        .op(op::ENDCHAR)
        .build();
    vec![notdef, zero, one, q, uni4e2d]
}

/// The `CFF ` table of [`font`].
pub fn table() -> Vec<u8> {
    CffBuilder::new(charstrings())
        .global_subrs(vec![one_stem_gsubr()])
        .local_subrs(vec![zero_inner_subr()])
        .widths(520, 500)
        .build()
}

/// The five glyph CFF test font: `.notdef`, `zero`, `one`, `Q` and
/// `uni4E2D` at 1000 units per em.
pub fn font() -> Vec<u8> {
    cff_font(table(), GLYPH_NAMES.len() as u16, UNITS_PER_EM, &ADVANCES)
}

/// [`font`] as a CID-keyed font.
///
/// Glyphs 0 to 2 use font DICT 0 and glyphs 3 and 4 use font DICT 1. Only
/// font DICT 0 holds the subroutine used by `zero`, so each glyph must be
/// evaluated with the local subrs of its own font DICT.
pub fn cid_font() -> Vec<u8> {
    let decoy = Charstring::new()
        .op_with(&[1, 1], op::RLINETO)
        .op(op::RETURN)
        .build();
    let cff = CffBuilder::new(charstrings())
        .global_subrs(vec![one_stem_gsubr()])
        .widths(520, 500)
        .font_dicts(
            vec![vec![zero_inner_subr()], vec![decoy]],
            vec![0, 0, 0, 1, 1],
        )
        .build();
    cff_font(cff, GLYPH_NAMES.len() as u16, UNITS_PER_EM, &ADVANCES)
}

/// A one glyph font whose charstring enters a chain of `depth` nested
/// local subroutines.
pub fn subr_chain_font(depth: i32) -> Vec<u8> {
    let mut subrs: Vec<Vec<u8>> = (0..depth - 1)
        .map(|i| {
            Charstring::new()
                .op_with(&[i + 1 - 107], op::CALLSUBR)
                .op(op::RETURN)
                .build()
        })
        .collect();
    subrs.push(
        Charstring::new()
            .op_with(&[10, 0], op::RLINETO)
            .op(op::RETURN)
            .build(),
    );
    let charstring = Charstring::new()
        .op_with(&[0], op::HMOVETO)
        .op_with(&[-107], op::CALLSUBR)
        .op(op::ENDCHAR)
        .build();
    let cff = CffBuilder::new(vec![charstring]).local_subrs(subrs).build();
    cff_font(cff, 1, UNITS_PER_EM, &[])
}

/// A one glyph font using the seac form of `endchar`.
pub fn seac_font() -> Vec<u8> {
    let charstring = Charstring::new()
        .op_with(&[0, 0, 0, 65, 194], op::ENDCHAR)
        .build();
    cff_font(CffBuilder::new(vec![charstring]).build(), 1, UNITS_PER_EM, &[])
}

/// A one glyph font that pushes `count` operands before `rlineto`.
pub fn stack_font(count: usize) -> Vec<u8> {
    let charstring = Charstring::new()
        .op_with(&[0], op::HMOVETO)
        .op_with(&vec![1; count], op::RLINETO)
        .op(op::ENDCHAR)
        .build();
    cff_font(CffBuilder::new(vec![charstring]).build(), 1, UNITS_PER_EM, &[])
}
