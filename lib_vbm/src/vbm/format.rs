use thiserror::Error;

use crate::constants::{TRANSPARENCY, VIRTUAL_HEIGHT, VIRTUAL_WIDTH};
use crate::palette::{Palette, Rgb};

/// Header size before the optional embedded palette.
pub const HEADER_SIZE: usize = 8;
/// An embedded palette block, 256 DAC triplets.
pub const EMBEDDED_PALETTE_SIZE: usize = 256 * 3;
/// Longest run a command word can carry, the low 14 bits.
pub const MAX_RUN: usize = 0x3FFF;
/// Plane count of the interleaving; a plane's cursor strides by this.
pub const PLANES: usize = 4;

pub const CMD_END_OF_PLANE: u16 = 0;
pub const CMD_SKIP: u16 = 1;
pub const CMD_REPEAT: u16 = 2;
pub const CMD_COPY: u16 = 3;

/// Packs a command word, tag in the top two bits, run length below.
pub fn command_word(tag: u16, count: u16) -> u16 {
    (tag << 14) | count
}

pub(crate) fn read_u16le(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Command stream ends inside the word at offset {offset}")]
    TruncatedWord { offset: usize },
    #[error("Command at offset {offset} wants {needed} payload byte(s) past the end")]
    TruncatedPayload { offset: usize, needed: usize },
}

/// One decoded command of a plane stream, payload included.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    EndOfPlane,
    Skip { count: usize },
    Repeat { count: usize, index: u8 },
    Copy { indices: &'a [u8] },
}

impl<'a> Command<'a> {
    /// Reads the command at `*pos`, advancing past the word and any
    /// payload bytes it owns.
    pub fn read(data: &'a [u8], pos: &mut usize) -> Result<Command<'a>, StreamError> {
        let offset = *pos;
        let word = data
            .get(offset..offset + 2)
            .map(|w| u16::from_le_bytes([w[0], w[1]]))
            .ok_or(StreamError::TruncatedWord { offset })?;
        *pos += 2;

        let count = usize::from(word & MAX_RUN as u16);
        match word >> 14 {
            CMD_END_OF_PLANE => Ok(Command::EndOfPlane),
            CMD_SKIP => Ok(Command::Skip { count }),
            CMD_REPEAT => {
                let index = *data.get(*pos).ok_or(StreamError::TruncatedPayload {
                    offset,
                    needed: 1,
                })?;
                *pos += 1;
                Ok(Command::Repeat { count, index })
            }
            _ => {
                let indices =
                    data.get(*pos..*pos + count)
                        .ok_or(StreamError::TruncatedPayload {
                            offset,
                            needed: count,
                        })?;
                *pos += count;
                Ok(Command::Copy { indices })
            }
        }
    }
}

/// Parsed file container: header fields plus the raw command region
/// (command stream followed by the visibility table, which decode ignores).
#[derive(Debug)]
pub struct VbmFile {
    pub width: u16,
    pub height: u16,
    pub palette: Option<Palette>,
    pub data: Vec<u8>,
}

/// Owned rectangular grid of 24-bit colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl PixelGrid {
    pub fn filled(width: usize, height: usize, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    /// The virtual canvas every asset gets composed onto.
    pub fn virtual_canvas() -> Self {
        Self::filled(VIRTUAL_WIDTH, VIRTUAL_HEIGHT, TRANSPARENCY)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Panics when `(x, y)` lies outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Rgb {
        assert!(x < self.width && y < self.height);
        self.pixels[y * self.width + x]
    }

    /// Panics when `(x, y)` lies outside the grid.
    pub fn set(&mut self, x: usize, y: usize, color: Rgb) {
        assert!(x < self.width && y < self.height);
        self.pixels[y * self.width + x] = color;
    }

    /// Writes by flat row-major position; `false` when out of bounds.
    pub(crate) fn put(&mut self, pos: usize, color: Rgb) -> bool {
        match self.pixels.get_mut(pos) {
            Some(slot) => {
                *slot = color;
                true
            }
            None => false,
        }
    }

    /// Top-left crop. Panics when the requested size exceeds the grid.
    pub fn crop(&self, width: usize, height: usize) -> PixelGrid {
        assert!(width <= self.width && height <= self.height);
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            let row = y * self.width;
            pixels.extend_from_slice(&self.pixels[row..row + width]);
        }
        PixelGrid {
            width,
            height,
            pixels,
        }
    }
}
