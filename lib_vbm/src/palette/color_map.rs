use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use super::Rgb;

/// One side-band record: `{index, r, g, b}`.
pub const RECORD_SIZE: usize = 4;

#[derive(Error, Debug)]
pub enum ColorMapError {
    #[error("Color map length {0} is not a multiple of {RECORD_SIZE}")]
    UnalignedRecords(usize),
    #[error("Color {color:?} is recorded under index {first} and again under index {second}")]
    DuplicateColor { color: Rgb, first: u8, second: u8 },
}

/// Bookkeeping between decoded colors and the palette indices they came
/// from. Index values carry engine meaning beyond their RGB appearance,
/// so a re-encode must reuse the recorded index for a color instead of
/// inventing a new one.
#[derive(Debug, Default, Clone)]
pub struct ColorIndexMap {
    by_index: BTreeMap<u8, Rgb>,
    by_color: HashMap<Rgb, u8>,
}

impl ColorIndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `index` resolved to `color` during decode.
    pub fn record(&mut self, index: u8, color: Rgb) {
        self.by_index.insert(index, color);
        self.by_color.insert(color, index);
    }

    pub fn index_of(&self, color: Rgb) -> Option<u8> {
        self.by_color.get(&color).copied()
    }

    pub fn color_of(&self, index: u8) -> Option<Rgb> {
        self.by_index.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Observed pairs, ordered by index ascending.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Rgb)> + '_ {
        self.by_index.iter().map(|(&index, &color)| (index, color))
    }

    /// Colors that more than one index resolved to, with the offending
    /// indices. Reported by batch drivers; harmless to the codec itself.
    pub fn duplicate_colors(&self) -> Vec<(Rgb, Vec<u8>)> {
        let mut groups: BTreeMap<Rgb, Vec<u8>> = BTreeMap::new();
        for (index, color) in self.iter() {
            groups.entry(color).or_default().push(index);
        }
        groups
            .into_iter()
            .filter(|(_, indices)| indices.len() > 1)
            .collect()
    }

    /// Serializes to the side-band layout, records ordered by index.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.by_index.len() * RECORD_SIZE);
        for (index, color) in self.iter() {
            bytes.push(index);
            bytes.extend_from_slice(&color);
        }
        bytes
    }

    /// Parses a side-band file. Two records carrying the same color make
    /// the reverse lookup ambiguous, so the file is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ColorMapError> {
        if bytes.len() % RECORD_SIZE != 0 {
            return Err(ColorMapError::UnalignedRecords(bytes.len()));
        }

        let mut map = Self::new();
        for record in bytes.chunks_exact(RECORD_SIZE) {
            let index = record[0];
            let color = [record[1], record[2], record[3]];
            if let Some(first) = map.index_of(color) {
                return Err(ColorMapError::DuplicateColor {
                    color,
                    first,
                    second: index,
                });
            }
            map.record(index, color);
        }
        Ok(map)
    }
}
