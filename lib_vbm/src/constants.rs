use crate::palette::Rgb;

pub const FILE_EXT: &str = "vbm";

/// Flat palette files, full-depth RGB triplets in index order.
pub const PALETTE_EXT: &str = "act";

/// Side-band color-index-map files written next to converted images.
pub const COLOR_MAP_EXT: &str = "mct";

/// The engine composes every asset onto a fixed 320x200 surface; an
/// asset's own width/height only crop the usable region out of it.
pub const VIRTUAL_WIDTH: usize = 320;
pub const VIRTUAL_HEIGHT: usize = 200;

/// Reserved "not drawn" color.
pub const TRANSPARENCY: Rgb = [255, 0, 255];
