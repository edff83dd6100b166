//! Data mask application and automatic mask selection.
//!
//! Masks XOR the dark/light value of every module the data path can
//! reach; function patterns and format/version cells are untouched.
//! Selection scores all eight masked symbols with the four ISO penalty
//! rules and keeps the cheapest.

use crate::layout::write_format_info;
use crate::models::{ECLevel, MaskPattern, ModuleMatrix};

/// XOR the mask predicate over every data-path module. Applying the same
/// mask twice restores the matrix.
pub fn apply_mask(matrix: &mut ModuleMatrix, mask: MaskPattern) {
    let size = matrix.size() as i32;
    for row in 0..size {
        for col in 0..size {
            if !matrix.is_non_data(row, col) && mask.is_masked(row as usize, col as usize) {
                matrix.toggle_dark(row, col);
            }
        }
    }
}

/// Pick the lowest-penalty mask for a matrix that already carries its
/// data bits. Format information participates in the score, as the
/// standard prescribes.
pub fn choose_mask(matrix: &ModuleMatrix, ec: ECLevel) -> MaskPattern {
    let mut best = MaskPattern::all()[0];
    let mut best_score = u32::MAX;
    for mask in MaskPattern::all() {
        let mut candidate = matrix.clone();
        apply_mask(&mut candidate, mask);
        write_format_info(&mut candidate, ec, mask);
        let score = penalty_score(&candidate);
        if score < best_score {
            best_score = score;
            best = mask;
        }
    }
    best
}

// N3 finder-like sequences: 1:1:3:1:1 with four light modules on one side.
const FINDER_SEQ_LEADING: u16 = 0b00001011101;
const FINDER_SEQ_TRAILING: u16 = 0b10111010000;
const WINDOW_MASK: u16 = 0x7FF;

/// Total penalty of a finished symbol (rules N1..N4)
pub fn penalty_score(matrix: &ModuleMatrix) -> u32 {
    let size = matrix.size() as i32;
    let mut result = 0u32;

    // N1 (runs) and N3 (finder-like windows), rows then columns
    for r in 0..size {
        let mut run_color = matrix.is_dark(r, 0);
        let mut run_len = 1u32;
        let mut window = run_color as u16;
        for c in 1..size {
            let dark = matrix.is_dark(r, c);
            if dark == run_color {
                run_len += 1;
                if run_len == 5 {
                    result += 3;
                } else if run_len > 5 {
                    result += 1;
                }
            } else {
                run_color = dark;
                run_len = 1;
            }
            window = ((window << 1) | dark as u16) & WINDOW_MASK;
            if c >= 10 && (window == FINDER_SEQ_LEADING || window == FINDER_SEQ_TRAILING) {
                result += 40;
            }
        }
    }
    for c in 0..size {
        let mut run_color = matrix.is_dark(0, c);
        let mut run_len = 1u32;
        let mut window = run_color as u16;
        for r in 1..size {
            let dark = matrix.is_dark(r, c);
            if dark == run_color {
                run_len += 1;
                if run_len == 5 {
                    result += 3;
                } else if run_len > 5 {
                    result += 1;
                }
            } else {
                run_color = dark;
                run_len = 1;
            }
            window = ((window << 1) | dark as u16) & WINDOW_MASK;
            if r >= 10 && (window == FINDER_SEQ_LEADING || window == FINDER_SEQ_TRAILING) {
                result += 40;
            }
        }
    }

    // N2: 2x2 blocks of one color
    for r in 0..size - 1 {
        for c in 0..size - 1 {
            let color = matrix.is_dark(r, c);
            if color == matrix.is_dark(r, c + 1)
                && color == matrix.is_dark(r + 1, c)
                && color == matrix.is_dark(r + 1, c + 1)
            {
                result += 3;
            }
        }
    }

    // N4: dark-module balance, 10 points per 5% step away from 50%
    let mut dark = 0u32;
    for r in 0..size {
        for c in 0..size {
            if matrix.is_dark(r, c) {
                dark += 1;
            }
        }
    }
    let total = (size * size) as u32;
    let k = (dark * 20).abs_diff(total * 10).div_ceil(total) - 1;
    result += 10 * k;

    result
}
