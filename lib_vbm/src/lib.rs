pub mod constants;
pub mod palette;
pub mod vbm;

pub use crate::palette::color_map::ColorIndexMap;
pub use crate::palette::{Palette, Rgb};
pub use crate::vbm::format::{PixelGrid, VbmFile};
pub use crate::vbm::{decode, encode, parse};
