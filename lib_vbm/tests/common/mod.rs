use lib_vbm::constants::TRANSPARENCY;
use lib_vbm::palette::PALETTE_SIZE;
use lib_vbm::{ColorIndexMap, Palette, PixelGrid, Rgb};

/// A palette with a distinct color per index, none of which collides
/// with the transparency sentinel.
pub fn indexed_palette() -> Palette {
    let mut colors = [[0u8; 3]; PALETTE_SIZE];
    for (i, slot) in colors.iter_mut().enumerate() {
        *slot = color(i as u8);
    }
    Palette::from_colors(colors)
}

/// The color `indexed_palette` assigns to `index`.
pub fn color(index: u8) -> Rgb {
    [index, 255 - index, 128]
}

/// A color map covering every entry of `indexed_palette`.
pub fn full_color_map() -> ColorIndexMap {
    let mut map = ColorIndexMap::new();
    for index in 0..=255u8 {
        map.record(index, color(index));
    }
    map
}

/// A width x height grid of transparency with the given opaque pixels.
pub fn sparse_grid(width: usize, height: usize, opaque: &[(usize, usize, u8)]) -> PixelGrid {
    let mut grid = PixelGrid::filled(width, height, TRANSPARENCY);
    for &(x, y, index) in opaque {
        grid.set(x, y, color(index));
    }
    grid
}
