//! Test fonts for the glyphpath crates.
//!
//! Everything here is built in code from big-endian primitives with
//! [`BeBuffer`](bebuffer::BeBuffer) rather than checked in as binary files.
//! [`truetype::font`] and [`cff::font`] are the two main test fonts; the
//! builders they are made with are public so that tests can construct
//! malformed or unusual variants.

pub mod bebuffer;
pub mod cff;
pub mod sfnt;
pub mod truetype;
