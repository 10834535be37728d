#![no_main]
//! Opens arbitrary bytes as a font and loads every glyph.

use libfuzzer_sys::fuzz_target;

use glyphpath::{Font, GlyphBuffer, GlyphId};

mod helpers;
use helpers::*;

fuzz_target!(|data: &[u8]| {
    let Ok(font) = Font::open(data) else {
        return;
    };
    let mut buffer = GlyphBuffer::new();
    for options in fuzz_options() {
        for gid in 0..font.num_glyphs() {
            let gid = GlyphId::new(gid);
            if font.load_glyph(&mut buffer, gid, &options).is_err() {
                assert!(buffer.is_empty());
            }
            let _ = font.advance_width(gid, &options);
        }
    }
});
