//! Common helpers

use glyphpath::{Hinting, LoadOptions, Size};

pub(crate) fn fuzz_sizes() -> Vec<Size> {
    vec![Size::unscaled(), Size::new(16.0), Size::new(512.0)]
}

/// Every size, with and without a hinting request.
pub(crate) fn fuzz_options() -> Vec<LoadOptions> {
    fuzz_sizes()
        .into_iter()
        .flat_map(|size| {
            [Hinting::None, Hinting::Full].map(|hinting| LoadOptions::new(size).hinting(hinting))
        })
        .collect()
}
