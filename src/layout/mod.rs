//! Symbol layout shared by the encoder and the decoder: base matrix
//! construction with all function patterns, format/version information
//! placement, the zig-zag data path and data masking.

/// Zig-zag module traversal for codeword placement and extraction
pub mod data_path;
/// Mask application and penalty-based selection
pub mod mask;

use crate::ecc::bch;
use crate::models::flags::{FIXED, FORMAT, NON_DATA};
use crate::models::{ECLevel, MaskPattern, ModuleMatrix, Version};
use crate::tables::alignment_positions;

/// Build the base matrix for a version: finder patterns with separators,
/// timing patterns, alignment patterns, the dark module, and reserved
/// format/version areas. Fixed cells are preset to their expected colors
/// so the decoder can validate sampled modules against them.
pub fn build_base_matrix(version: Version) -> ModuleMatrix {
    let size = version.dimension() as i32;
    let mut m = ModuleMatrix::new(version.dimension());

    stamp_finder(&mut m, 0, 0);
    stamp_finder(&mut m, 0, size - 7);
    stamp_finder(&mut m, size - 7, 0);

    // Timing patterns on row 6 and column 6, dark on even indices
    for i in 8..size - 8 {
        let dark = i % 2 == 0;
        m.stamp(6, i, dark, FIXED | NON_DATA);
        m.stamp(i, 6, dark, FIXED | NON_DATA);
    }

    // Alignment patterns, skipping the three finder corners
    let positions = alignment_positions(version);
    for &row in &positions {
        for &col in &positions {
            let (row, col) = (row as i32, col as i32);
            let in_tl = row <= 8 && col <= 8;
            let in_tr = row <= 8 && col >= size - 9;
            let in_bl = row >= size - 9 && col <= 8;
            if in_tl || in_tr || in_bl {
                continue;
            }
            stamp_alignment(&mut m, row, col);
        }
    }

    // Format information reserve around the finders
    for &(row, col) in format_positions_main().iter() {
        m.stamp(row, col, false, NON_DATA | FORMAT);
    }
    for &(row, col) in format_positions_second(size).iter() {
        m.stamp(row, col, false, NON_DATA | FORMAT);
    }

    // Dark module
    m.stamp(size - 8, 8, true, FIXED | NON_DATA);

    // Version information reserve, 6x3 and 3x6 blocks
    if version.has_version_info() {
        for &(row, col) in version_positions_top_right(size).iter() {
            m.stamp(row, col, false, NON_DATA | FORMAT);
        }
        for &(row, col) in version_positions_bottom_left(size).iter() {
            m.stamp(row, col, false, NON_DATA | FORMAT);
        }
    }

    m
}

/// Stamp a 7x7 finder pattern at (row, col) together with its one-module
/// white separator. The separator ring extends one module beyond the
/// pattern on all sides; writes past the symbol edge land in the guard.
fn stamp_finder(m: &mut ModuleMatrix, row: i32, col: i32) {
    for dr in -1..=7 {
        for dc in -1..=7 {
            let in_pattern = (0..7).contains(&dr) && (0..7).contains(&dc);
            let dark = in_pattern
                && (dr == 0
                    || dr == 6
                    || dc == 0
                    || dc == 6
                    || ((2..=4).contains(&dr) && (2..=4).contains(&dc)));
            m.stamp(row + dr, col + dc, dark, FIXED | NON_DATA);
        }
    }
}

/// Stamp a 5x5 alignment pattern centered at (row, col): dark border,
/// light ring, single dark center.
fn stamp_alignment(m: &mut ModuleMatrix, row: i32, col: i32) {
    for dr in -2i32..=2 {
        for dc in -2i32..=2 {
            let dark = dr.abs() == 2 || dc.abs() == 2 || (dr == 0 && dc == 0);
            m.stamp(row + dr, col + dc, dark, FIXED | NON_DATA);
        }
    }
}

/// (row, col) of format bit i (LSB first) in the copy around the
/// top-left finder
pub fn format_positions_main() -> [(i32, i32); 15] {
    let mut pos = [(0, 0); 15];
    for (i, slot) in pos.iter_mut().enumerate() {
        let i = i as i32;
        *slot = match i {
            0..=5 => (i, 8),
            6 => (7, 8),
            7 => (8, 8),
            8 => (8, 7),
            _ => (8, 14 - i),
        };
    }
    pos
}

/// (row, col) of format bit i (LSB first) in the split copy below the
/// top-right finder and beside the bottom-left one
pub fn format_positions_second(size: i32) -> [(i32, i32); 15] {
    let mut pos = [(0, 0); 15];
    for (i, slot) in pos.iter_mut().enumerate() {
        let i = i as i32;
        *slot = if i <= 7 {
            (8, size - 1 - i)
        } else {
            (size - 15 + i, 8)
        };
    }
    pos
}

/// (row, col) of version bit i (LSB first) in the 6x3 block below the
/// top-right finder
pub fn version_positions_top_right(size: i32) -> [(i32, i32); 18] {
    let mut pos = [(0, 0); 18];
    for (i, slot) in pos.iter_mut().enumerate() {
        let i = i as i32;
        *slot = (i / 3, size - 11 + i % 3);
    }
    pos
}

/// (row, col) of version bit i (LSB first) in the 3x6 block beside the
/// bottom-left finder
pub fn version_positions_bottom_left(size: i32) -> [(i32, i32); 18] {
    let mut pos = [(0, 0); 18];
    for (i, slot) in pos.iter_mut().enumerate() {
        let i = i as i32;
        *slot = (size - 11 + i % 3, i / 3);
    }
    pos
}

/// Write both copies of the format information for (ec, mask)
pub fn write_format_info(m: &mut ModuleMatrix, ec: ECLevel, mask: MaskPattern) {
    let codeword = bch::format_codeword(ec, mask);
    let size = m.size() as i32;
    for (i, &(row, col)) in format_positions_main().iter().enumerate() {
        m.set_dark(row, col, (codeword >> i) & 1 == 1);
    }
    for (i, &(row, col)) in format_positions_second(size).iter().enumerate() {
        m.set_dark(row, col, (codeword >> i) & 1 == 1);
    }
}

/// Write both copies of the version information; no-op below version 7
pub fn write_version_info(m: &mut ModuleMatrix, version: Version) {
    if !version.has_version_info() {
        return;
    }
    let codeword = bch::version_codeword(version.number());
    let size = m.size() as i32;
    for (i, &(row, col)) in version_positions_top_right(size).iter().enumerate() {
        m.set_dark(row, col, (codeword >> i) & 1 == 1);
    }
    for (i, &(row, col)) in version_positions_bottom_left(size).iter().enumerate() {
        m.set_dark(row, col, (codeword >> i) & 1 == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecc::bch::decode_format;
    use crate::tables::TOTAL_CODEWORDS;

    fn v(n: u8) -> Version {
        Version::new(n).unwrap()
    }

    #[test]
    fn test_v1_has_no_alignment_pattern() {
        let m = build_base_matrix(v(1));
        // Every fixed module of v1 belongs to finders, separators or timing.
        // Alignment would put a dark module at (18, 18).
        assert!(!m.is_fixed(16, 16));
        assert!(!m.is_dark(18, 18));
    }

    #[test]
    fn test_v2_alignment_ring() {
        let m = build_base_matrix(v(2));
        // Center at (18, 18): dark center, light ring, dark border.
        assert!(m.is_dark(18, 18));
        assert!(!m.is_dark(18, 17));
        assert!(m.is_dark(18, 16));
        assert!(m.is_fixed(16, 16));
    }

    #[test]
    fn test_timing_alternates() {
        let m = build_base_matrix(v(3));
        for i in 8..m.size() as i32 - 8 {
            assert_eq!(m.is_dark(6, i), i % 2 == 0);
            assert_eq!(m.is_dark(i, 6), i % 2 == 0);
            assert!(m.is_fixed(6, i));
        }
    }

    #[test]
    fn test_dark_module() {
        for n in [1, 7, 40] {
            let m = build_base_matrix(v(n));
            let size = m.size() as i32;
            assert!(m.is_dark(size - 8, 8));
            assert!(m.is_fixed(size - 8, 8));
        }
    }

    #[test]
    fn test_finder_colors() {
        let m = build_base_matrix(v(1));
        // Outer ring dark, next ring light, center dark.
        assert!(m.is_dark(0, 0));
        assert!(!m.is_dark(1, 1));
        assert!(m.is_dark(3, 3));
        // Separator is light and fixed.
        assert!(!m.is_dark(7, 7));
        assert!(m.is_fixed(7, 7));
    }

    #[test]
    fn test_format_positions_disjoint_and_in_range() {
        let size = v(1).dimension() as i32;
        let main = format_positions_main();
        let second = format_positions_second(size);
        for &(r, c) in main.iter().chain(second.iter()) {
            assert!((0..size).contains(&r) && (0..size).contains(&c));
        }
        let mut all: Vec<_> = main.to_vec();
        all.extend_from_slice(&second);
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 30, "the two copies must not overlap");
    }

    #[test]
    fn test_format_write_read_roundtrip() {
        let mut m = build_base_matrix(v(1));
        let ec = ECLevel::Q;
        let mask = MaskPattern::new(6).unwrap();
        write_format_info(&mut m, ec, mask);

        let size = m.size() as i32;
        for positions in [format_positions_main(), format_positions_second(size)] {
            let mut bits = 0u16;
            for (i, &(row, col)) in positions.iter().enumerate() {
                bits |= (m.is_dark(row, col) as u16) << i;
            }
            assert_eq!(decode_format(bits), Some((ec, mask)));
        }
    }

    #[test]
    fn test_version_info_only_from_v7() {
        let m6 = build_base_matrix(v(6));
        let size6 = m6.size() as i32;
        assert!(!m6.is_non_data(0, size6 - 11));

        let m7 = build_base_matrix(v(7));
        let size7 = m7.size() as i32;
        assert!(m7.is_non_data(0, size7 - 11));
        assert!(m7.is_format(size7 - 11, 0));
    }

    #[test]
    fn test_data_cell_count_vs_codeword_capacity() {
        // Data modules hold all codeword bits plus at most 7 remainder bits.
        for n in 1..=40u8 {
            let m = build_base_matrix(v(n));
            let bits = 8 * TOTAL_CODEWORDS[n as usize] as usize;
            let cells = m.data_cell_count();
            assert!(cells >= bits, "v{n}: {cells} cells < {bits} bits");
            assert!(cells - bits < 8, "v{n}: {} remainder bits", cells - bits);
        }
    }
}
