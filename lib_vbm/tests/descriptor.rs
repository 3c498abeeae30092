mod common;

use common::{full_color_map, sparse_grid};
use lib_vbm::constants::{TRANSPARENCY, VIRTUAL_HEIGHT, VIRTUAL_WIDTH};
use lib_vbm::{encode, ColorIndexMap, PixelGrid};

/// The visibility table sits at the very end of the file, one
/// (skip, hide) pair of u16le per image row.
fn visibility_rows(encoded: &[u8], height: usize) -> Vec<(u16, u16)> {
    let table = &encoded[encoded.len() - height * 4..];
    table
        .chunks_exact(4)
        .map(|row| {
            (
                u16::from_le_bytes([row[0], row[1]]),
                u16::from_le_bytes([row[2], row[3]]),
            )
        })
        .collect()
}

#[test]
fn test_encoding_is_deterministic() {
    let grid = sparse_grid(31, 17, &[(3, 2, 1), (17, 9, 2), (30, 16, 3)]);
    let map = full_color_map();
    assert_eq!(
        encode(&grid, &map, None).unwrap(),
        encode(&grid, &map, None).unwrap()
    );
}

#[test]
fn test_fully_transparent_canvas() {
    let grid = PixelGrid::filled(VIRTUAL_WIDTH, VIRTUAL_HEIGHT, TRANSPARENCY);
    let encoded = encode(&grid, &ColorIndexMap::new(), None).unwrap();

    // No pixels to emit: the region is four end-of-plane words plus the
    // visibility table, and the header length field covers both.
    assert_eq!(encoded.len(), 8 + 8 + VIRTUAL_HEIGHT * 4);
    assert_eq!(
        u16::from_le_bytes([encoded[2], encoded[3]]),
        (8 + VIRTUAL_HEIGHT * 4) as u16
    );

    let rows = visibility_rows(&encoded, VIRTUAL_HEIGHT);
    let mut skipped_double_words = 0u32;
    for &(skip, hide) in &rows {
        assert_eq!(hide, 0);
        skipped_double_words += u32::from(skip);
    }
    assert_eq!(
        skipped_double_words,
        (VIRTUAL_WIDTH * VIRTUAL_HEIGHT / 4) as u32
    );
}

#[test]
fn test_exact_bytes_for_a_two_color_plane_run() {
    // Indices 1 and 2 sit four columns apart, both on plane 0; the plane
    // merges them into one COPY of two indices.
    let grid = sparse_grid(8, 1, &[(0, 0, 1), (4, 0, 2)]);
    let encoded = encode(&grid, &full_color_map(), None).unwrap();

    let expected = vec![
        0x00, 0x00, // no embedded palette
        0x10, 0x00, // region length: 12 command bytes + 4 table bytes
        0x08, 0x00, // width 8
        0x01, 0x00, // height 1
        0x02, 0xC0, 0x01, 0x02, // plane 0: COPY x2 of indices 1, 2
        0x00, 0x00, // plane 0 end
        0x00, 0x00, // plane 1 end
        0x00, 0x00, // plane 2 end
        0x00, 0x00, // plane 3 end
        0x00, 0x00, 0x02, 0x00, // row 0: skip 0, hide 2 double-words
    ];
    assert_eq!(encoded, expected);
}

#[test]
fn test_row_extents_round_to_double_words() {
    // Row 0 is opaque in columns 5..=9: the stored extents round down
    // and up to multiples of four before dividing.
    let opaque: Vec<(usize, usize, u8)> = (5..10).map(|x| (x, 0, 1)).collect();
    let grid = sparse_grid(16, 2, &opaque);
    let encoded = encode(&grid, &full_color_map(), None).unwrap();

    let rows = visibility_rows(&encoded, 2);
    assert_eq!(rows[0], (1, 2)); // skip 4..=7 -> 1, span 4..12 -> 2
    // Row 1 is empty and inherits the pending tail of row 0.
    assert_eq!(rows[1], (((320 - 12) + 320) >> 2, 0));
}

#[test]
fn test_trailing_transparent_planes_emit_no_skip() {
    // A single opaque pixel at the origin: plane 0 is one COPY, planes
    // 1..3 are entirely transparent and collapse to bare end markers.
    let grid = sparse_grid(4, 1, &[(0, 0, 9)]);
    let encoded = encode(&grid, &full_color_map(), None).unwrap();

    let region = &encoded[8..];
    assert_eq!(
        region,
        [
            0x01, 0xC0, 0x09, // plane 0: COPY x1 of index 9
            0x00, 0x00, // plane 0 end
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // planes 1..3
            0x00, 0x00, 0x01, 0x00, // row 0: skip 0, hide 1
        ]
    );
}
