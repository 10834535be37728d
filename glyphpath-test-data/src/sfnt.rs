//! Building sfnt containers and the small metric tables.

use glyphpath_types::Tag;

use crate::bebuffer::BeBuffer;

/// Builds an sfnt from a set of tables.
///
/// Tables are sorted by tag and each one starts on a four byte boundary.
/// Checksums are left as zero.
pub fn build_sfnt(sfnt_version: u32, tables: &[(Tag, Vec<u8>)]) -> Vec<u8> {
    let mut tables = tables.to_vec();
    tables.sort_by_key(|(tag, _)| *tag);
    let num_tables = tables.len() as u16;
    let entry_selector = if num_tables == 0 {
        0
    } else {
        15 - num_tables.leading_zeros() as u16
    };
    let search_range = (1u16 << entry_selector) * 16;
    let range_shift = (num_tables * 16).saturating_sub(search_range);
    let mut buf = BeBuffer::new()
        .push(sfnt_version)
        .push(num_tables)
        .push(search_range)
        .push(entry_selector)
        .push(range_shift);
    let mut offset = 12 + tables.len() * 16;
    for (tag, data) in &tables {
        buf = buf
            .push(*tag)
            .push(0u32)
            .push(offset as u32)
            .push(data.len() as u32);
        offset += data.len().next_multiple_of(4);
    }
    for (_, data) in &tables {
        buf = buf.extend(data.iter().copied()).align(4);
    }
    buf.into_vec()
}

/// The `head` table.
pub fn head(units_per_em: u16, index_to_loc_format: i16, bbox: [i16; 4]) -> Vec<u8> {
    BeBuffer::new()
        // version, fontRevision, checksumAdjustment
        .push(0x00010000u32)
        .push(0x00010000u32)
        .push(0u32)
        .push(0x5F0F3CF5u32)
        .push(0u16)
        .push(units_per_em)
        // created, modified
        .extend([0u32; 4])
        .extend(bbox)
        // macStyle, lowestRecPPEM, fontDirectionHint
        .push(0u16)
        .push(8u16)
        .push(2i16)
        .push(index_to_loc_format)
        .push(0i16)
        .into_vec()
}

/// The `maxp` table.
///
/// Version 0.5 carries only the glyph count. Version 1.0 is zero filled
/// past it.
pub fn maxp(version: u32, num_glyphs: u16) -> Vec<u8> {
    let buf = BeBuffer::new().push(version).push(num_glyphs);
    if version == 0x00010000 {
        buf.extend([0u16; 13]).into_vec()
    } else {
        buf.into_vec()
    }
}

/// The `hhea` table.
pub fn hhea(number_of_h_metrics: u16) -> Vec<u8> {
    BeBuffer::new()
        .push(0x00010000u32)
        // ascender, descender, lineGap
        .push(800i16)
        .push(-200i16)
        .push(0i16)
        .push(0u16)
        // min bearings, max extent, caret
        .extend([0i16; 3])
        .push(1i16)
        .push(0i16)
        .push(0i16)
        .extend([0i16; 4])
        .push(0i16)
        .push(number_of_h_metrics)
        .into_vec()
}

/// The `hmtx` table from `(advance, lsb)` pairs and trailing side bearings.
pub fn hmtx(metrics: &[(u16, i16)], left_side_bearings: &[i16]) -> Vec<u8> {
    let mut buf = BeBuffer::new();
    for (advance, lsb) in metrics {
        buf = buf.push(*advance).push(*lsb);
    }
    buf.extend(left_side_bearings.iter().copied()).into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_layout() {
        let font = build_sfnt(
            0x00010000,
            &[
                (Tag::new(b"zzzz"), vec![1, 2, 3]),
                (Tag::new(b"aaaa"), vec![4; 5]),
            ],
        );
        // search range, entry selector, range shift
        assert_eq!(&font[6..12], &[0, 32, 0, 1, 0, 0]);
        // sorted by tag
        assert_eq!(&font[12..16], b"aaaa");
        assert_eq!(&font[28..32], b"zzzz");
        // offsets are four byte aligned
        assert_eq!(&font[20..24], &[0, 0, 0, 44]);
        assert_eq!(&font[36..40], &[0, 0, 0, 52]);
        assert_eq!(font.len(), 56);
    }

    #[test]
    fn table_sizes() {
        assert_eq!(head(1000, 0, [0; 4]).len(), 54);
        assert_eq!(maxp(0x00005000, 3).len(), 6);
        assert_eq!(maxp(0x00010000, 3).len(), 32);
        assert_eq!(hhea(1).len(), 36);
    }
}
