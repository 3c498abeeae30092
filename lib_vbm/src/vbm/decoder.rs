use log::{debug, info};
use thiserror::Error;

use super::format::{
    read_u16le, Command, PixelGrid, StreamError, VbmFile, EMBEDDED_PALETTE_SIZE, HEADER_SIZE,
    PLANES,
};
use crate::constants::{VIRTUAL_HEIGHT, VIRTUAL_WIDTH};
use crate::palette::color_map::ColorIndexMap;
use crate::palette::{color_from_dac, Palette, PALETTE_SIZE};

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("File is {0} bytes, shorter than the {HEADER_SIZE}-byte header")]
    TruncatedHeader(usize),
    #[error("Embedded palette is truncated")]
    TruncatedPalette,
    #[error("Header declares a {declared}-byte command region, file carries {available}")]
    TruncatedCommandRegion { declared: usize, available: usize },
    #[error("No palette embedded and none supplied")]
    MissingPalette,
    #[error("Plane {plane} writes past the virtual canvas at position {position}")]
    CanvasOverflow { plane: usize, position: usize },
    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// Image produced by a full decode: the cropped pixel grid and the
/// (index, color) pairs observed while resolving the plane streams.
#[derive(Debug)]
pub struct DecodedImage {
    pub image: PixelGrid,
    pub color_map: ColorIndexMap,
}

/// Splits a file into its header fields, the optional embedded palette
/// (promoted from DAC to full depth), and the raw command region.
pub fn parse(data: &[u8]) -> Result<VbmFile, DecodeError> {
    if data.len() < HEADER_SIZE {
        return Err(DecodeError::TruncatedHeader(data.len()));
    }

    let has_palette = read_u16le(data, 0) == 1;
    let region_len = usize::from(read_u16le(data, 2));
    let width = read_u16le(data, 4);
    let height = read_u16le(data, 6);

    let mut pos = HEADER_SIZE;
    let palette = if has_palette {
        let block = data
            .get(pos..pos + EMBEDDED_PALETTE_SIZE)
            .ok_or(DecodeError::TruncatedPalette)?;
        pos += EMBEDDED_PALETTE_SIZE;
        Some(parse_embedded_palette(block))
    } else {
        None
    };

    let region = data
        .get(pos..pos + region_len)
        .ok_or(DecodeError::TruncatedCommandRegion {
            declared: region_len,
            available: data.len().saturating_sub(pos),
        })?;

    debug!(
        "header: {}x{}, palette {}, {} region bytes",
        width,
        height,
        if has_palette { "embedded" } else { "none" },
        region_len
    );

    Ok(VbmFile {
        width,
        height,
        palette,
        data: region.to_vec(),
    })
}

fn parse_embedded_palette(block: &[u8]) -> Palette {
    let mut colors = [[0u8; 3]; PALETTE_SIZE];
    for (slot, dac) in colors.iter_mut().zip(block.chunks_exact(3)) {
        *slot = color_from_dac([dac[0], dac[1], dac[2]]);
    }
    Palette::from_colors(colors)
}

impl VbmFile {
    /// Expands the four plane streams onto the virtual canvas, resolving
    /// every written index through `palette`, then crops to the asset's
    /// actual bounds.
    pub fn rasterize(&self, palette: &Palette) -> Result<DecodedImage, DecodeError> {
        let mut canvas = PixelGrid::virtual_canvas();
        let mut color_map = ColorIndexMap::new();
        let mut pos = 0;

        for plane in 0..PLANES {
            let mut cursor = plane;
            loop {
                match Command::read(&self.data, &mut pos)? {
                    Command::EndOfPlane => break,
                    Command::Skip { count } => {
                        // Skipped positions keep the transparency the
                        // canvas starts out with.
                        cursor += PLANES * count;
                    }
                    Command::Repeat { count, index } => {
                        let color = palette.lookup(index);
                        for _ in 0..count {
                            color_map.record(index, color);
                            if !canvas.put(cursor, color) {
                                return Err(DecodeError::CanvasOverflow {
                                    plane,
                                    position: cursor,
                                });
                            }
                            cursor += PLANES;
                        }
                    }
                    Command::Copy { indices } => {
                        for &index in indices {
                            let color = palette.lookup(index);
                            color_map.record(index, color);
                            if !canvas.put(cursor, color) {
                                return Err(DecodeError::CanvasOverflow {
                                    plane,
                                    position: cursor,
                                });
                            }
                            cursor += PLANES;
                        }
                    }
                }
            }
        }

        let width = usize::from(self.width).min(VIRTUAL_WIDTH);
        let height = usize::from(self.height).min(VIRTUAL_HEIGHT);
        let image = if width < VIRTUAL_WIDTH || height < VIRTUAL_HEIGHT {
            canvas.crop(width, height)
        } else {
            canvas
        };

        info!(
            "decoded {}x{} image, {} distinct colors",
            image.width(),
            image.height(),
            color_map.len()
        );
        Ok(DecodedImage { image, color_map })
    }
}

/// Full decode: parse the file, pick the embedded palette over the
/// supplied fallback, and rasterize.
pub fn decode(data: &[u8], fallback: Option<&Palette>) -> Result<DecodedImage, DecodeError> {
    let file = parse(data)?;
    let palette = file
        .palette
        .as_ref()
        .or(fallback)
        .ok_or(DecodeError::MissingPalette)?;
    file.rasterize(palette)
}
