//! The font tables needed to decode glyph outlines

pub mod cff;
pub mod glyf;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod loca;
pub mod maxp;
pub mod postscript;
