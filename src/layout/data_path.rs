//! The zig-zag codeword placement path.
//!
//! Modules are visited in vertical 2-column strips from the right edge,
//! right column first at every row, alternating direction at the top and
//! bottom. Column 6 holds the vertical timing pattern and is skipped by
//! shifting the strip one column left. Cells flagged NON_DATA do not
//! participate. The path stops after `max_cells` coordinates; the few
//! modules past the last codeword (remainder bits) carry no data.

use crate::models::ModuleMatrix;

/// Module coordinates of the data path, in placement order
pub fn data_path(matrix: &ModuleMatrix, max_cells: usize) -> Vec<(i32, i32)> {
    let size = matrix.size() as i32;
    let mut path = Vec::with_capacity(max_cells);
    let mut col = size - 1;
    let mut upward = true;

    while col > 0 {
        if col == 6 {
            col -= 1;
        }
        for i in 0..size {
            let row = if upward { size - 1 - i } else { i };
            for c in [col, col - 1] {
                if !matrix.is_non_data(row, c) {
                    if path.len() == max_cells {
                        return path;
                    }
                    path.push((row, c));
                }
            }
        }
        upward = !upward;
        col -= 2;
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::build_base_matrix;
    use crate::models::Version;
    use crate::tables::TOTAL_CODEWORDS;
    use std::collections::HashSet;

    #[test]
    fn test_path_length_is_codeword_capacity() {
        for n in 1..=40u8 {
            let version = Version::new(n).unwrap();
            let matrix = build_base_matrix(version);
            let bits = 8 * TOTAL_CODEWORDS[n as usize] as usize;
            let path = data_path(&matrix, bits);
            assert_eq!(path.len(), bits, "v{n}");
        }
    }

    #[test]
    fn test_path_cells_distinct_and_data_only() {
        let version = Version::new(5).unwrap();
        let matrix = build_base_matrix(version);
        let bits = 8 * TOTAL_CODEWORDS[5] as usize;
        let path = data_path(&matrix, bits);

        let mut seen = HashSet::new();
        for &(row, col) in &path {
            assert!(col != 6, "path must never enter the timing column");
            assert!(!matrix.is_non_data(row, col));
            assert!(seen.insert((row, col)), "duplicate cell ({row},{col})");
        }
    }

    #[test]
    fn test_path_starts_bottom_right() {
        let version = Version::new(1).unwrap();
        let matrix = build_base_matrix(version);
        let path = data_path(&matrix, 26 * 8);
        assert_eq!(path[0], (20, 20));
        assert_eq!(path[1], (20, 19));
        assert_eq!(path[2], (19, 20));
        assert_eq!(path[3], (19, 19));
    }
}
