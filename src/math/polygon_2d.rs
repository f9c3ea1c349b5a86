use super::{Point2, Vector2, TOLERANCE};

/// Classification of a point relative to a closed polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClassification {
    Inside,
    Outside,
    OnBoundary,
}

/// Computes the signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Returns the polygon wound counter-clockwise.
#[must_use]
pub fn to_ccw(points: &[Point2]) -> Vec<Point2> {
    if signed_area(points) < 0.0 {
        points.iter().rev().copied().collect()
    } else {
        points.to_vec()
    }
}

/// Returns the polygon wound clockwise.
#[must_use]
pub fn to_cw(points: &[Point2]) -> Vec<Point2> {
    if signed_area(points) > 0.0 {
        points.iter().rev().copied().collect()
    } else {
        points.to_vec()
    }
}

/// Rotates a closed polygon so it starts at the leftmost vertex (smallest x),
/// breaking ties by smallest y. Ensures deterministic output.
#[must_use]
pub fn rotate_to_canonical_start(points: &[Point2]) -> Vec<Point2> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let mut best = 0;
    for (i, pt) in points.iter().enumerate().skip(1) {
        let b = &points[best];
        if pt.x < b.x - TOLERANCE || (pt.x - b.x).abs() < TOLERANCE && pt.y < b.y {
            best = i;
        }
    }
    if best == 0 {
        return points.to_vec();
    }
    let mut rotated = Vec::with_capacity(points.len());
    rotated.extend_from_slice(&points[best..]);
    rotated.extend_from_slice(&points[..best]);
    rotated
}

/// Removes repeated vertices, collinear vertices and zero-width spikes from a
/// closed polygon.
#[must_use]
pub fn simplify_loop(points: &[Point2]) -> Vec<Point2> {
    let mut pts: Vec<Point2> = Vec::with_capacity(points.len());
    for &p in points {
        if pts.last().is_none_or(|last| (p - last).norm() > TOLERANCE) {
            pts.push(p);
        }
    }
    while pts.len() > 1 && (pts[0] - pts[pts.len() - 1]).norm() <= TOLERANCE {
        pts.pop();
    }

    let mut changed = true;
    while changed && pts.len() >= 3 {
        changed = false;
        let n = pts.len();
        for i in 0..n {
            let prev = pts[(i + n - 1) % n];
            let cur = pts[i];
            let next = pts[(i + 1) % n];
            let a = cur - prev;
            let b = next - cur;
            let cross = a.x * b.y - a.y * b.x;
            if cross.abs() <= TOLERANCE * (a.norm() + b.norm()).max(1.0) {
                pts.remove(i);
                changed = true;
                break;
            }
        }
    }
    pts
}

/// Returns `true` if every segment of the closed polygon is horizontal or vertical.
#[must_use]
pub fn is_axis_aligned_loop(points: &[Point2]) -> bool {
    let n = points.len();
    (0..n).all(|i| {
        let a = points[i];
        let b = points[(i + 1) % n];
        (a.x - b.x).abs() <= TOLERANCE || (a.y - b.y).abs() <= TOLERANCE
    })
}

/// Distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn point_segment_distance(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Classifies `p` against a closed polygon using the crossing-number rule.
#[must_use]
pub fn classify_point(p: &Point2, polygon: &[Point2]) -> PointClassification {
    let n = polygon.len();
    if n < 3 {
        return PointClassification::Outside;
    }
    for i in 0..n {
        if point_segment_distance(p, &polygon[i], &polygon[(i + 1) % n]) <= TOLERANCE * 10.0 {
            return PointClassification::OnBoundary;
        }
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = pj.x + (p.y - pj.y) / (pi.y - pj.y) * (pi.x - pj.x);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    if inside {
        PointClassification::Inside
    } else {
        PointClassification::Outside
    }
}

/// Returns the left-pointing normal of a direction vector.
#[must_use]
pub fn left_normal(dir: Vector2) -> Vector2 {
    Vector2::new(-dir.y, dir.x)
}
