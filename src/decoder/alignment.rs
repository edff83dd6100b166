//! Bottom-right alignment pattern location.
//!
//! The affine transform predicts where the alignment center should be;
//! a window around that prediction is scanned against the 5x5 alignment
//! template (dark border, light ring, dark center) and the candidates
//! are ranked by mismatch count.

use crate::models::{BitMatrix, Point};

/// Accepted template mismatches out of 25 sampled modules
const MAX_TEMPLATE_MISMATCH: usize = 8;
/// Candidates handed to the perspective fit, best first
const MAX_CANDIDATES: usize = 8;

/// Alignment-center candidates inside a search window, ordered by
/// ascending template mismatch
pub fn locate_alignment(
    binary: &BitMatrix,
    predicted: Point,
    window: f64,
    module: f64,
) -> Vec<Point> {
    if !predicted.x.is_finite() || !predicted.y.is_finite() || module < 1.0 {
        return Vec::new();
    }

    let half = (window / 2.0).max(module);
    let min_x = ((predicted.x - half).floor().max(0.0)) as usize;
    let max_x = ((predicted.x + half).ceil().max(0.0) as usize).min(binary.width().saturating_sub(1));
    let min_y = ((predicted.y - half).floor().max(0.0)) as usize;
    let max_y = ((predicted.y + half).ceil().max(0.0) as usize).min(binary.height().saturating_sub(1));

    let mut scored: Vec<(Point, usize)> = Vec::new();
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let center = Point::new(x as f64, y as f64);
            if let Some(mismatch) = template_mismatch(binary, &center, module) {
                if mismatch <= MAX_TEMPLATE_MISMATCH {
                    scored.push((center, mismatch));
                }
            }
        }
    }
    scored.sort_by(|a, b| a.1.cmp(&b.1));

    // Drop near-duplicates of better-scored centers.
    let mut picked: Vec<Point> = Vec::new();
    for (center, _) in scored {
        let close = picked
            .iter()
            .any(|p| (p.x - center.x).abs() < module && (p.y - center.y).abs() < module);
        if !close {
            picked.push(center);
            if picked.len() == MAX_CANDIDATES {
                break;
            }
        }
    }
    picked
}

/// Compare the 5x5 neighborhood of `center` (sampled at module pitch)
/// against the alignment template; None when the window leaves the image
fn template_mismatch(binary: &BitMatrix, center: &Point, module: f64) -> Option<usize> {
    let mut mismatches = 0usize;
    for dy in -2i32..=2 {
        for dx in -2i32..=2 {
            let expected_dark = dx.abs() == 2 || dy.abs() == 2 || (dx == 0 && dy == 0);
            let sx = (center.x + dx as f64 * module).round();
            let sy = (center.y + dy as f64 * module).round();
            if sx < 0.0
                || sy < 0.0
                || sx as usize >= binary.width()
                || sy as usize >= binary.height()
            {
                return None;
            }
            if binary.get(sx as usize, sy as usize) != expected_dark {
                mismatches += 1;
            }
        }
    }
    Some(mismatches)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Paint a 5x5 alignment pattern centered at (cx, cy)
    fn paint_alignment(matrix: &mut BitMatrix, cx: usize, cy: usize, unit: usize) {
        for my in 0..5i32 {
            for mx in 0..5i32 {
                let dark = mx == 0 || mx == 4 || my == 0 || my == 4 || (mx == 2 && my == 2);
                for py in 0..unit {
                    for px in 0..unit {
                        let x = (cx as i32 + (mx - 2) * unit as i32) as usize + px;
                        let y = (cy as i32 + (my - 2) * unit as i32) as usize + py;
                        matrix.set(x, y, dark);
                    }
                }
            }
        }
    }

    #[test]
    fn test_exact_center_found_first() {
        let mut matrix = BitMatrix::new(60, 60);
        // Center module occupies pixels 28..32; its center pixel is 30.
        paint_alignment(&mut matrix, 30, 30, 4);

        let found = locate_alignment(&matrix, Point::new(32.0, 28.0), 20.0, 4.0);
        assert!(!found.is_empty());
        let best = found[0];
        assert!((best.x - 30.0).abs() <= 2.0, "best: {best:?}");
        assert!((best.y - 30.0).abs() <= 2.0, "best: {best:?}");
    }

    #[test]
    fn test_blank_window_yields_nothing() {
        let matrix = BitMatrix::new(60, 60);
        let found = locate_alignment(&matrix, Point::new(30.0, 30.0), 20.0, 4.0);
        assert!(found.is_empty());
    }

    #[test]
    fn test_window_clamped_to_image() {
        let mut matrix = BitMatrix::new(40, 40);
        paint_alignment(&mut matrix, 20, 20, 3);
        // Prediction near the image edge must not panic.
        let found = locate_alignment(&matrix, Point::new(1.0, 1.0), 80.0, 3.0);
        let _ = found;
    }
}
