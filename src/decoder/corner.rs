//! Corner geometry: assembling three finder candidates into an oriented
//! L-shape and estimating the symbol version from module pitch.

use crate::decoder::finder::FinderCandidate;
use crate::models::Point;

/// Maximum ratio disagreement between the two short sides of the L
const SIDE_LENGTH_DEV: f64 = 0.8;
/// Allowed deviation of the corner angle from 90 degrees, as |cos|
/// (sin of 4 degrees)
const RIGHT_ANGLE_DEV: f64 = 0.069756;

/// Three finder centers arranged as an L, with the geometry needed for
/// transforms and version estimation
#[derive(Debug, Clone)]
pub struct Corner {
    /// Right-angle vertex
    pub top_left: Point,
    /// End of the top line
    pub top_right: Point,
    /// End of the left line
    pub bottom_left: Point,
    /// Length of the top line in pixels
    pub top_len: f64,
    /// Length of the left line in pixels
    pub left_len: f64,
    /// Module pitch along the top line
    pub module_top: f64,
    /// Module pitch along the left line
    pub module_left: f64,
}

impl Corner {
    /// Try to arrange three finder candidates into an L-corner.
    ///
    /// The two short sides must agree in length within [`SIDE_LENGTH_DEV`]
    /// and meet at a right angle within [`RIGHT_ANGLE_DEV`]; the remaining
    /// two finders are oriented by the cross product so that the symbol
    /// reads top-left, top-right, bottom-left in image space.
    pub fn from_candidates(
        f1: &FinderCandidate,
        f2: &FinderCandidate,
        f3: &FinderCandidate,
    ) -> Option<Corner> {
        let finders = [f1, f2, f3];
        let centers = [
            Point::new(f1.x, f1.y),
            Point::new(f2.x, f2.y),
            Point::new(f3.x, f3.y),
        ];

        // The right-angle vertex is the finder whose arms are closest to
        // perpendicular.
        let mut vertex = 0;
        let mut vertex_cos = f64::INFINITY;
        for i in 0..3 {
            let p = centers[i];
            let q = centers[(i + 1) % 3];
            let r = centers[(i + 2) % 3];
            let v1 = (q.x - p.x, q.y - p.y);
            let v2 = (r.x - p.x, r.y - p.y);
            let denom = p.distance(&q) * p.distance(&r);
            if denom == 0.0 {
                return None;
            }
            let cos = ((v1.0 * v2.0 + v1.1 * v2.1) / denom).abs();
            if cos < vertex_cos {
                vertex_cos = cos;
                vertex = i;
            }
        }
        if vertex_cos > RIGHT_ANGLE_DEV {
            return None;
        }

        let tl = centers[vertex];
        let p1 = centers[(vertex + 1) % 3];
        let p2 = centers[(vertex + 2) % 3];
        let d1 = tl.distance(&p1);
        let d2 = tl.distance(&p2);
        if d1.min(d2) / d1.max(d2) < SIDE_LENGTH_DEV {
            return None;
        }

        // Cross product sign orients the arms: with y growing downward,
        // (top-left -> top-right) x (top-left -> bottom-left) is positive.
        let v1 = (p1.x - tl.x, p1.y - tl.y);
        let v2 = (p2.x - tl.x, p2.y - tl.y);
        let cross = v1.0 * v2.1 - v1.1 * v2.0;
        let (tr_idx, bl_idx) = if cross > 0.0 {
            ((vertex + 1) % 3, (vertex + 2) % 3)
        } else {
            ((vertex + 2) % 3, (vertex + 1) % 3)
        };

        let top_right = centers[tr_idx];
        let bottom_left = centers[bl_idx];
        let module_vertex = finders[vertex].module;
        Some(Corner {
            top_left: tl,
            top_right,
            bottom_left,
            top_len: tl.distance(&top_right),
            left_len: tl.distance(&bottom_left),
            module_top: (module_vertex + finders[tr_idx].module) / 2.0,
            module_left: (module_vertex + finders[bl_idx].module) / 2.0,
        })
    }

    /// Version estimate from mean module pitch, clamped to 1..=40.
    ///
    /// Finder centers sit 7 modules inside the symbol edge, so the line
    /// between them spans dimension - 7 modules.
    pub fn estimated_version(&self) -> u8 {
        let modules =
            (self.top_len / self.module_top + self.left_len / self.module_left) / 2.0;
        let version = ((modules - 10.0) / 4.0).round();
        version.clamp(1.0, 40.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(x: f64, y: f64, module: f64) -> FinderCandidate {
        FinderCandidate::new(x, y, module)
    }

    #[test]
    fn test_axis_aligned_corner() {
        // v1 geometry at 4 px/module: centers 56 px apart.
        let tl = candidate(30.0, 30.0, 4.0);
        let tr = candidate(86.0, 30.0, 4.0);
        let bl = candidate(30.0, 86.0, 4.0);

        let corner = Corner::from_candidates(&tr, &tl, &bl).expect("valid L");
        assert_eq!(corner.top_left, Point::new(30.0, 30.0));
        assert_eq!(corner.top_right, Point::new(86.0, 30.0));
        assert_eq!(corner.bottom_left, Point::new(30.0, 86.0));
        assert_eq!(corner.estimated_version(), 1);
    }

    #[test]
    fn test_rotated_corner_orientation() {
        // The same L rotated 90 degrees clockwise in image space.
        let tl = candidate(86.0, 30.0, 4.0);
        let tr = candidate(86.0, 86.0, 4.0);
        let bl = candidate(30.0, 30.0, 4.0);

        let corner = Corner::from_candidates(&bl, &tr, &tl).expect("valid L");
        assert_eq!(corner.top_left, Point::new(86.0, 30.0));
        assert_eq!(corner.top_right, Point::new(86.0, 86.0));
        assert_eq!(corner.bottom_left, Point::new(30.0, 30.0));
    }

    #[test]
    fn test_collinear_rejected() {
        let a = candidate(10.0, 10.0, 4.0);
        let b = candidate(50.0, 10.0, 4.0);
        let c = candidate(90.0, 10.0, 4.0);
        assert!(Corner::from_candidates(&a, &b, &c).is_none());
    }

    #[test]
    fn test_uneven_sides_rejected() {
        let tl = candidate(30.0, 30.0, 4.0);
        let tr = candidate(86.0, 30.0, 4.0);
        let bl = candidate(30.0, 120.0, 4.0);
        assert!(Corner::from_candidates(&tl, &tr, &bl).is_none());
    }

    #[test]
    fn test_version_estimate_scales() {
        // v9 geometry: dimension 53, centers (53-7)*4 = 184 px apart.
        let tl = candidate(20.0, 20.0, 4.0);
        let tr = candidate(204.0, 20.0, 4.0);
        let bl = candidate(20.0, 204.0, 4.0);
        let corner = Corner::from_candidates(&tl, &tr, &bl).unwrap();
        assert_eq!(corner.estimated_version(), 9);
    }
}
