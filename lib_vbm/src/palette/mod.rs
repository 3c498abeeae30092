pub mod color_map;
pub mod system_colors;

use thiserror::Error;

/// 24-bit color as it appears in interchange images, `[r, g, b]`.
pub type Rgb = [u8; 3];

pub const PALETTE_SIZE: usize = 256;

#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Expected exactly {PALETTE_SIZE} colors, got {0}")]
    ColorCountMismatch(usize),
    #[error("Palette index {0} outside of 0..{PALETTE_SIZE}")]
    IndexOutOfRange(usize),
    #[error("Palette file length {0} is not a multiple of 3")]
    UnalignedTriplets(usize),
    #[error("Palette file holds {0} triplets, at most {PALETTE_SIZE} fit")]
    TooManyTriplets(usize),
}

/// Promotes a 6-bit DAC color to full depth. The low two bits of the
/// original full-depth value are gone for good, like on the hardware.
pub fn color_from_dac([r, g, b]: Rgb) -> Rgb {
    [r << 2, g << 2, b << 2]
}

/// Reduces a full-depth color to the 6-bit DAC range.
pub fn color_to_dac([r, g, b]: Rgb) -> Rgb {
    [r >> 2, g >> 2, b >> 2]
}

/// Fixed 256-entry color table, in full depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; PALETTE_SIZE],
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Result<Self, PaletteError> {
        let colors: [Rgb; PALETTE_SIZE] = colors
            .try_into()
            .map_err(|v: Vec<Rgb>| PaletteError::ColorCountMismatch(v.len()))?;
        Ok(Self { colors })
    }

    pub fn from_colors(colors: [Rgb; PALETTE_SIZE]) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> [Rgb; PALETTE_SIZE] {
        self.colors
    }

    pub fn get(&self, index: usize) -> Result<Rgb, PaletteError> {
        self.colors
            .get(index)
            .copied()
            .ok_or(PaletteError::IndexOutOfRange(index))
    }

    pub fn set(&mut self, index: usize, color: Rgb) -> Result<(), PaletteError> {
        *self
            .colors
            .get_mut(index)
            .ok_or(PaletteError::IndexOutOfRange(index))? = color;
        Ok(())
    }

    /// Resolves a stored pixel index. Always in range, the stream carries
    /// single bytes.
    pub fn lookup(&self, index: u8) -> Rgb {
        self.colors[usize::from(index)]
    }

    /// Serializes to the flat `.act` layout, 256 full-depth triplets.
    pub fn to_act_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PALETTE_SIZE * 3);
        for color in &self.colors {
            bytes.extend_from_slice(color);
        }
        bytes
    }

    /// Parses a flat `.act` file. Files may carry fewer than 256 triplets;
    /// the remaining entries stay black.
    pub fn from_act_bytes(bytes: &[u8]) -> Result<Self, PaletteError> {
        if bytes.len() % 3 != 0 {
            return Err(PaletteError::UnalignedTriplets(bytes.len()));
        }
        if bytes.len() > PALETTE_SIZE * 3 {
            return Err(PaletteError::TooManyTriplets(bytes.len() / 3));
        }

        let mut colors = [[0u8; 3]; PALETTE_SIZE];
        for (slot, triplet) in colors.iter_mut().zip(bytes.chunks_exact(3)) {
            *slot = [triplet[0], triplet[1], triplet[2]];
        }
        Ok(Self { colors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_exactly_256_colors() {
        assert!(Palette::new(vec![[0, 0, 0]; 256]).is_ok());
        assert!(matches!(
            Palette::new(vec![[0, 0, 0]; 255]),
            Err(PaletteError::ColorCountMismatch(255))
        ));
        assert!(matches!(
            Palette::new(vec![[0, 0, 0]; 257]),
            Err(PaletteError::ColorCountMismatch(257))
        ));
    }

    #[test]
    fn test_get_set_range() {
        let mut palette = Palette::from_colors([[0, 0, 0]; PALETTE_SIZE]);
        palette.set(7, [1, 2, 3]).unwrap();
        assert_eq!(palette.get(7).unwrap(), [1, 2, 3]);
        assert!(matches!(
            palette.get(256),
            Err(PaletteError::IndexOutOfRange(256))
        ));
        assert!(matches!(
            palette.set(300, [0, 0, 0]),
            Err(PaletteError::IndexOutOfRange(300))
        ));
    }

    #[test]
    fn test_dac_conversion_is_idempotent_after_first_pass() {
        for value in 0..=255u8 {
            let color = [value, value, value];
            let once = color_from_dac(color_to_dac(color));
            let twice = color_from_dac(color_to_dac(once));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_act_short_file_zero_fills() {
        let palette = Palette::from_act_bytes(&[10, 20, 30, 40, 50, 60]).unwrap();
        assert_eq!(palette.get(0).unwrap(), [10, 20, 30]);
        assert_eq!(palette.get(1).unwrap(), [40, 50, 60]);
        assert_eq!(palette.get(2).unwrap(), [0, 0, 0]);
        assert_eq!(palette.get(255).unwrap(), [0, 0, 0]);
    }

    #[test]
    fn test_act_rejects_unaligned_and_oversized_files() {
        assert!(matches!(
            Palette::from_act_bytes(&[1, 2]),
            Err(PaletteError::UnalignedTriplets(2))
        ));
        let oversized = vec![0u8; 257 * 3];
        assert!(matches!(
            Palette::from_act_bytes(&oversized),
            Err(PaletteError::TooManyTriplets(257))
        ));
    }

    #[test]
    fn test_act_round_trip() {
        let mut colors = [[0u8; 3]; PALETTE_SIZE];
        for (i, slot) in colors.iter_mut().enumerate() {
            *slot = [i as u8, (255 - i) as u8, (i / 2) as u8];
        }
        let palette = Palette::from_colors(colors);
        let bytes = palette.to_act_bytes();
        assert_eq!(bytes.len(), PALETTE_SIZE * 3);
        assert_eq!(Palette::from_act_bytes(&bytes).unwrap(), palette);
    }
}
