//! Finder pattern location by 1:1:3:1:1 run-length signatures.
//!
//! A horizontal pass over every row collects candidate centers; a
//! vertical pass restricted to the columns those candidates touch
//! re-tests the signature and pairs each vertical match with the best
//! horizontal candidate through a squared-deviation distance. Unpaired
//! candidates are dropped, overlapping ones merged.

use crate::models::BitMatrix;

/// Relative deviation allowed per signature span
const SIGNATURE_DEVIATION: f64 = 0.25;

/// One finder pattern candidate
#[derive(Debug, Clone)]
pub struct FinderCandidate {
    /// Center column in pixels
    pub x: f64,
    /// Center row in pixels (refined by the vertical pass)
    pub y: f64,
    /// Row of the horizontal signature match
    pub row: usize,
    /// First column of the center run
    pub col1: usize,
    /// Last column of the center run
    pub col2: usize,
    /// Module pitch estimate in pixels
    pub module: f64,
    /// Pairing cost; `f64::MAX` means no vertical match
    pub distance: f64,
    module_h: f64,
}

impl FinderCandidate {
    /// Build a candidate from a known center and module pitch
    pub fn new(x: f64, y: f64, module: f64) -> Self {
        Self {
            x,
            y,
            row: y.max(0.0) as usize,
            col1: x.max(0.0) as usize,
            col2: x.max(0.0) as usize,
            module,
            distance: 0.0,
            module_h: module,
        }
    }
}

/// One run of same-colored pixels
#[derive(Debug, Clone, Copy)]
struct Run {
    start: usize,
    len: usize,
    dark: bool,
}

fn run_lengths(get: impl Fn(usize) -> bool, extent: usize) -> Vec<Run> {
    let mut runs = Vec::new();
    if extent == 0 {
        return runs;
    }
    let mut start = 0;
    let mut dark = get(0);
    for i in 1..extent {
        let color = get(i);
        if color != dark {
            runs.push(Run {
                start,
                len: i - start,
                dark,
            });
            start = i;
            dark = color;
        }
    }
    runs.push(Run {
        start,
        len: extent - start,
        dark,
    });
    runs
}

/// Test five runs against the 1:1:3:1:1 signature; returns the module
/// pitch when they match
fn signature_match(window: &[Run]) -> Option<f64> {
    if !window[0].dark {
        return None;
    }
    let total: usize = window.iter().map(|r| r.len).sum();
    let module = total as f64 / 7.0;
    if module < 1.0 {
        return None;
    }
    for (run, expected) in window.iter().zip([1.0, 1.0, 3.0, 1.0, 1.0]) {
        let deviation = (run.len as f64 - expected * module).abs();
        if deviation > SIGNATURE_DEVIATION * expected * module {
            return None;
        }
    }
    Some(module)
}

fn run_center(run: &Run) -> f64 {
    run.start as f64 + (run.len as f64 - 1.0) / 2.0
}

/// Locate finder pattern candidates in a binarized image
pub fn locate_finders(binary: &BitMatrix) -> Vec<FinderCandidate> {
    let width = binary.width();
    let height = binary.height();
    let mut candidates: Vec<FinderCandidate> = Vec::new();

    // Horizontal pass
    for y in 0..height {
        let runs = run_lengths(|x| binary.get(x, y), width);
        for window in runs.windows(5) {
            if let Some(module) = signature_match(window) {
                let center = &window[2];
                candidates.push(FinderCandidate {
                    x: run_center(center),
                    y: y as f64,
                    row: y,
                    col1: center.start,
                    col2: center.start + center.len - 1,
                    module,
                    distance: f64::MAX,
                    module_h: module,
                });
            }
        }
    }

    // Vertical pass over the columns the horizontal candidates touch
    let mut active = vec![false; width];
    for c in &candidates {
        for flag in active.iter_mut().take(c.col2 + 1).skip(c.col1) {
            *flag = true;
        }
    }
    for (x, _) in active.iter().enumerate().filter(|&(_, &a)| a) {
        let runs = run_lengths(|y| binary.get(x, y), height);
        for window in runs.windows(5) {
            let Some(module_v) = signature_match(window) else {
                continue;
            };
            let center = &window[2];
            let center_y = run_center(center);
            let row_lo = center.start;
            let row_hi = center.start + center.len - 1;

            // Offer this vertical match to every overlapping candidate.
            for cand in candidates.iter_mut() {
                if x < cand.col1 || x > cand.col2 {
                    continue;
                }
                if cand.row < row_lo || cand.row > row_hi {
                    continue;
                }
                let dx = cand.x - x as f64;
                let dy = cand.row as f64 - center_y;
                let dm = cand.module_h - module_v;
                let dist = dx * dx + dy * dy + dm * dm;
                if dist < cand.distance {
                    cand.distance = dist;
                    cand.y = center_y;
                    cand.module = (cand.module_h + module_v) / 2.0;
                }
            }
        }
    }

    // Keep paired candidates only; among overlapping ones, the best.
    let mut paired: Vec<FinderCandidate> = candidates
        .into_iter()
        .filter(|c| c.distance < f64::MAX)
        .collect();
    paired.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    let mut merged: Vec<FinderCandidate> = Vec::new();
    for cand in paired {
        let overlaps = merged.iter().any(|kept| {
            let reach = 3.5 * kept.module.max(cand.module);
            (kept.x - cand.x).abs() < reach && (kept.y - cand.y).abs() < reach
        });
        if !overlaps {
            merged.push(cand);
        }
    }
    merged
}
