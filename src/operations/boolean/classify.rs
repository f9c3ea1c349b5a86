use crate::math::polygon_2d::{classify_point, point_segment_distance, PointClassification};
use crate::math::{Point2, TOLERANCE};

use super::split::EdgeFragment;

/// Position of an edge fragment relative to the other polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentClass {
    Inside,
    Outside,
    /// Lies on an edge of the other polygon running the same way.
    SharedSame,
    /// Lies on an edge of the other polygon running the opposite way.
    SharedOpposite,
}

/// Classifies a fragment against `other` (a counter-clockwise loop) by its midpoint.
#[must_use]
pub fn classify_fragment(fragment: &EdgeFragment, other: &[Point2]) -> FragmentClass {
    let mid = fragment.midpoint();
    match classify_point(&mid, other) {
        PointClassification::Inside => FragmentClass::Inside,
        PointClassification::Outside => FragmentClass::Outside,
        PointClassification::OnBoundary => shared_direction(fragment, &mid, other),
    }
}

fn shared_direction(fragment: &EdgeFragment, mid: &Point2, other: &[Point2]) -> FragmentClass {
    let dir = fragment.end - fragment.start;
    let n = other.len();
    let mut best: Option<(f64, f64)> = None;
    for i in 0..n {
        let o0 = other[i];
        let o1 = other[(i + 1) % n];
        let dist = point_segment_distance(mid, &o0, &o1);
        if best.is_none_or(|(d, _)| dist < d) {
            best = Some((dist, dir.dot(&(o1 - o0))));
        }
    }
    match best {
        Some((dist, dot)) if dist <= TOLERANCE * 10.0 && dot > 0.0 => FragmentClass::SharedSame,
        Some((dist, _)) if dist <= TOLERANCE * 10.0 => FragmentClass::SharedOpposite,
        _ => FragmentClass::Outside,
    }
}
