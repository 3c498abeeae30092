//! Fixed replacement colors for the upper palette slots of Soltys.
//!
//! The Soltys runtime installs its own colors into slots 198..=255 at
//! startup, so palettes ripped from the game files usually carry zeroed
//! entries there. Patching restores them before any conversion.

use super::{color_from_dac, Palette, Rgb, PALETTE_SIZE};

const BLACK: Rgb = [0, 0, 0];

/// Replacement table in DAC form, one entry per slot starting at 198.
/// Promotion to full depth wraps in a byte, matching the engine.
const SYSTEM_COLORS: [Rgb; 58] = [
    [0, 60, 0],     // 198
    [0, 104, 0],    // 199
    [20, 172, 0],   // 200
    [82, 82, 0],    // 201
    [0, 132, 82],   // 202
    [132, 173, 82], // 203
    [82, 0, 0],     // 204
    [206, 0, 24],   // 205
    [255, 33, 33],  // 206
    [123, 41, 0],   // 207
    [0, 41, 0],     // 208
    [0, 0, 82],     // 209
    [132, 0, 0],    // 210
    [255, 0, 0],    // 211
    [255, 66, 66],  // 212
    [148, 66, 16],  // 213
    [0, 82, 0],     // 214
    [0, 0, 132],    // 215
    [173, 0, 0],    // 216
    [255, 49, 0],   // 217
    [255, 99, 99],  // 218
    [181, 107, 49], // 219
    [0, 132, 0],    // 220
    [0, 0, 255],    // 221
    [173, 41, 0],   // 222
    [255, 82, 0],   // 223
    [255, 132, 132], // 224
    [214, 148, 74], // 225
    [41, 214, 0],   // 226
    [0, 82, 173],   // 227
    [255, 214, 0],  // 228
    [247, 132, 49], // 229
    [255, 165, 165], // 230
    [239, 198, 123], // 231
    [173, 214, 0],  // 232
    [0, 132, 214],  // 233
    [57, 57, 57],   // 234
    [247, 189, 74], // 235
    [255, 198, 198], // 236
    [255, 239, 173], // 237
    [214, 255, 173], // 238
    [82, 173, 255], // 239
    [107, 107, 107], // 240
    [247, 222, 99], // 241
    [255, 0, 255],  // 242
    [255, 132, 255], // 243
    [132, 132, 173], // 244
    [148, 247, 255], // 245
    [148, 148, 148], // 246
    [82, 0, 82],    // 247
    [112, 68, 112], // 248
    [176, 88, 144], // 249
    [214, 132, 173], // 250
    [206, 247, 255], // 251
    [198, 198, 198], // 252
    [0, 214, 255],  // 253
    [96, 224, 96],  // 254
    [255, 255, 255], // 255
];

/// Returns a copy of `palette` with known-zeroed Soltys system slots
/// replaced by their fixed colors. Entries that are not exactly black are
/// left untouched.
pub fn patch_soltys(palette: &Palette) -> Palette {
    let mut colors = palette.colors();
    let start = PALETTE_SIZE - SYSTEM_COLORS.len();
    for (slot, &dac) in colors[start..].iter_mut().zip(SYSTEM_COLORS.iter()) {
        if *slot == BLACK {
            *slot = color_from_dac(dac);
        }
    }
    Palette::from_colors(colors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_replaces_black_slots() {
        let palette = Palette::from_colors([BLACK; PALETTE_SIZE]);
        let patched = patch_soltys(&palette);
        // 198 holds [0, 60, 0] in DAC form.
        assert_eq!(patched.get(198).unwrap(), [0, 240, 0]);
        // Promotion wraps in a byte, like the engine's 255 << 2.
        assert_eq!(patched.get(255).unwrap(), [252, 252, 252]);
    }

    #[test]
    fn test_patch_keeps_non_black_slots() {
        let mut palette = Palette::from_colors([BLACK; PALETTE_SIZE]);
        palette.set(200, [9, 9, 9]).unwrap();
        let patched = patch_soltys(&palette);
        assert_eq!(patched.get(200).unwrap(), [9, 9, 9]);
    }

    #[test]
    fn test_patch_leaves_lower_slots_alone() {
        let palette = Palette::from_colors([BLACK; PALETTE_SIZE]);
        let patched = patch_soltys(&palette);
        for index in 0..198 {
            assert_eq!(patched.get(index).unwrap(), BLACK);
        }
    }

    #[test]
    fn test_patch_is_a_pure_function() {
        let palette = Palette::from_colors([BLACK; PALETTE_SIZE]);
        let _ = patch_soltys(&palette);
        assert_eq!(palette.get(255).unwrap(), BLACK);
    }
}
