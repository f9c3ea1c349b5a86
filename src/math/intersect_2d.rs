use super::{Point2, TOLERANCE};

/// How two segments meet.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentIntersection {
    /// The segments do not touch.
    None,
    /// The segments meet in a single point.
    Point(Point2),
    /// The segments are collinear and share the sub-segment between the two points.
    Overlap(Point2, Point2),
}

/// Bounded segment-segment intersection in 2D.
///
/// Horizontal and vertical segments keep their fixed coordinate exactly in the
/// result, so seams between axis-aligned outlines never drift.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> SegmentIntersection {
    let da = a1 - a0;
    let db = b1 - b0;
    let len_a = da.norm();
    let len_b = db.norm();
    if len_a < TOLERANCE || len_b < TOLERANCE {
        return SegmentIntersection::None;
    }

    let cross = da.x * db.y - da.y * db.x;
    if cross.abs() <= TOLERANCE * len_a * len_b {
        return collinear_overlap(a0, a1, b0, b1);
    }

    let dx = b0.x - a0.x;
    let dy = b0.y - a0.y;
    let t = (dx * db.y - dy * db.x) / cross;
    let u = (dx * da.y - dy * da.x) / cross;

    let eps_a = TOLERANCE / len_a;
    let eps_b = TOLERANCE / len_b;
    if t < -eps_a || t > 1.0 + eps_a || u < -eps_b || u > 1.0 + eps_b {
        return SegmentIntersection::None;
    }

    let t = t.clamp(0.0, 1.0);
    let mut pt = a0 + da * t;
    snap_to_axis(&mut pt, a0, a1);
    snap_to_axis(&mut pt, b0, b1);
    SegmentIntersection::Point(pt)
}

/// Parameter of `p` projected onto the segment `a0`–`a1` (0 at `a0`, 1 at `a1`).
#[must_use]
pub fn segment_param(p: &Point2, a0: &Point2, a1: &Point2) -> f64 {
    let d = a1 - a0;
    let len_sq = d.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return 0.0;
    }
    (p - a0).dot(&d) / len_sq
}

fn collinear_overlap(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> SegmentIntersection {
    let da = a1 - a0;
    let len_a = da.norm();
    // Distance of b's endpoints from a's supporting line.
    let off0 = (da.x * (b0.y - a0.y) - da.y * (b0.x - a0.x)).abs() / len_a;
    let off1 = (da.x * (b1.y - a0.y) - da.y * (b1.x - a0.x)).abs() / len_a;
    if off0 > TOLERANCE || off1 > TOLERANCE {
        return SegmentIntersection::None;
    }

    let tb0 = segment_param(b0, a0, a1);
    let tb1 = segment_param(b1, a0, a1);
    let (lo, hi) = if tb0 <= tb1 { (tb0, tb1) } else { (tb1, tb0) };
    let start = lo.max(0.0);
    let end = hi.min(1.0);
    let eps = TOLERANCE / len_a;
    if end < start - eps {
        return SegmentIntersection::None;
    }

    let point_at = |t: f64| -> Point2 {
        // Prefer exact endpoints over interpolated ones.
        for p in [a0, a1, b0, b1] {
            if (segment_param(p, a0, a1) - t).abs() <= eps {
                return *p;
            }
        }
        a0 + da * t
    };
    if end - start <= eps {
        return SegmentIntersection::Point(point_at(start));
    }
    SegmentIntersection::Overlap(point_at(start), point_at(end))
}

fn snap_to_axis(pt: &mut Point2, s0: &Point2, s1: &Point2) {
    if (s0.y - s1.y).abs() <= TOLERANCE {
        pt.y = s0.y;
    }
    if (s0.x - s1.x).abs() <= TOLERANCE {
        pt.x = s0.x;
    }
}
