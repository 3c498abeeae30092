use log::{debug, info};
use thiserror::Error;

use super::format::{
    command_word, PixelGrid, CMD_COPY, CMD_END_OF_PLANE, CMD_SKIP, HEADER_SIZE, MAX_RUN, PLANES,
};
use crate::constants::{TRANSPARENCY, VIRTUAL_HEIGHT, VIRTUAL_WIDTH};
use crate::palette::color_map::ColorIndexMap;
use crate::palette::{color_to_dac, Palette, Rgb};

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Image is {width}x{height}, larger than the {VIRTUAL_WIDTH}x{VIRTUAL_HEIGHT} canvas")]
    ImageTooLarge { width: usize, height: usize },
    #[error("Opaque color {color:?} has no recorded palette index")]
    UnmappedColor { color: Rgb },
    #[error("Command region of {0} bytes does not fit the 16-bit header field")]
    RegionTooLong(usize),
}

/// Encodes a pixel grid into the legacy byte layout: header, optional
/// embedded palette, the four plane command streams, and the per-row
/// visibility table. Decoding the result restores `image` within its own
/// bounds.
///
/// Runs of one repeated color still go out as COPY; REPEAT exists in the
/// format but this encoder never produces it, matching the streams the
/// engine's other tools are known to consume.
pub fn encode(
    image: &PixelGrid,
    color_map: &ColorIndexMap,
    embed: Option<&Palette>,
) -> Result<Vec<u8>, EncodeError> {
    if image.width() > VIRTUAL_WIDTH || image.height() > VIRTUAL_HEIGHT {
        return Err(EncodeError::ImageTooLarge {
            width: image.width(),
            height: image.height(),
        });
    }

    let mut out = Vec::with_capacity(HEADER_SIZE + image.len());
    out.extend_from_slice(&u16::from(embed.is_some()).to_le_bytes());
    let region_len_at = out.len();
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(&(image.width() as u16).to_le_bytes());
    out.extend_from_slice(&(image.height() as u16).to_le_bytes());

    if let Some(palette) = embed {
        write_embedded_palette(&mut out, palette);
    }

    let region_start = out.len();
    encode_planes(&mut out, image, color_map)?;
    write_visibility_table(&mut out, image);

    // The length field covers the command stream together with the
    // visibility table; the engine's loader skips both as one region.
    let region_len = out.len() - region_start;
    if region_len > usize::from(u16::MAX) {
        return Err(EncodeError::RegionTooLong(region_len));
    }
    out[region_len_at..region_len_at + 2].copy_from_slice(&(region_len as u16).to_le_bytes());

    info!(
        "encoded {}x{} image into {} bytes",
        image.width(),
        image.height(),
        out.len()
    );
    Ok(out)
}

fn write_embedded_palette(out: &mut Vec<u8>, palette: &Palette) {
    for color in palette.colors() {
        out.extend_from_slice(&color_to_dac(color));
    }
}

/// Samples the virtual canvas; positions beyond the image's own bounds
/// read as transparent.
fn sample(image: &PixelGrid, pos: usize) -> Rgb {
    let x = pos % VIRTUAL_WIDTH;
    let y = pos / VIRTUAL_WIDTH;
    if x >= image.width() || y >= image.height() {
        TRANSPARENCY
    } else {
        image.get(x, y)
    }
}

fn encode_planes(
    out: &mut Vec<u8>,
    image: &PixelGrid,
    color_map: &ColorIndexMap,
) -> Result<(), EncodeError> {
    let end_pos = VIRTUAL_WIDTH * VIRTUAL_HEIGHT;

    for plane in 0..PLANES {
        let plane_start = out.len();
        let mut pos = plane;

        while pos < end_pos {
            if sample(image, pos) == TRANSPARENCY {
                let mut count: u16 = 0;
                while pos < end_pos
                    && usize::from(count) < MAX_RUN
                    && sample(image, pos) == TRANSPARENCY
                {
                    count += 1;
                    pos += PLANES;
                }
                // A skip running off the end of the canvas needs no word,
                // the end-of-plane marker already covers it.
                if pos < end_pos {
                    out.extend_from_slice(&command_word(CMD_SKIP, count).to_le_bytes());
                }
            } else {
                let word_at = out.len();
                out.extend_from_slice(&[0, 0]);
                let mut count: u16 = 0;

                while pos < end_pos && usize::from(count) < MAX_RUN {
                    let pixel = sample(image, pos);
                    if pixel == TRANSPARENCY {
                        break;
                    }
                    let index = color_map
                        .index_of(pixel)
                        .ok_or(EncodeError::UnmappedColor { color: pixel })?;
                    out.push(index);
                    count += 1;
                    pos += PLANES;
                }

                let word = command_word(CMD_COPY, count).to_le_bytes();
                out[word_at..word_at + 2].copy_from_slice(&word);
            }
        }

        out.extend_from_slice(&command_word(CMD_END_OF_PLANE, 0).to_le_bytes());
        debug!("plane {}: {} bytes", plane, out.len() - plane_start);
    }

    Ok(())
}

#[derive(Clone, Copy)]
struct HideDesc {
    skip: u16,
    hide: u16,
}

/// Appends the per-row (skip, hide) table the renderer uses to jump over
/// transparent double-words. Counts are in 4-pixel units relative to the
/// virtual canvas width, with fully-transparent rows folded into a
/// running skip that carries over to the next visible row.
fn write_visibility_table(out: &mut Vec<u8>, image: &PixelGrid) {
    let mut rows = vec![
        HideDesc {
            skip: 0xFFFF,
            hide: 0,
        };
        image.height()
    ];

    for (y, row) in rows.iter_mut().enumerate() {
        for x in 0..image.width() {
            if image.get(x, y) != TRANSPARENCY {
                let column = x as u16;
                if column < row.skip {
                    row.skip = column;
                }
                if column >= row.hide {
                    row.hide = column + 1;
                }
            }
        }
    }

    let virtual_width = VIRTUAL_WIDTH as u16;
    let mut pending: u16 = 0;
    for row in &mut rows {
        if row.skip == 0xFFFF {
            // Whole row transparent; fold it into the running skip.
            row.skip = (pending + virtual_width) >> 2;
            row.hide = 0;
            pending = 0;
        } else {
            let first = row.skip & !3;
            let last = (row.hide + 3) & !3;
            row.skip = (pending + first) >> 2;
            row.hide = (last - first) >> 2;
            pending = virtual_width - last;
        }
    }

    for row in &rows {
        out.extend_from_slice(&row.skip.to_le_bytes());
        out.extend_from_slice(&row.hide.to_le_bytes());
    }
}
