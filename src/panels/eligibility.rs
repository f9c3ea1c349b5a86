use crate::math::polygon_2d::point_segment_distance;
use crate::math::{Point2, Rect2, TOLERANCE};

use super::path::{CornerEligibility, CornerId, CornerLoop, Hole, HoleKind};

/// Parameter at which the segment `a`→`b` enters `rect` (Liang–Barsky), or
/// `None` if it misses.
fn entry_parameter(a: &Point2, b: &Point2, rect: &Rect2) -> Option<f64> {
    let d = b - a;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    let checks = [
        (-d.x, a.x - rect.min.x),
        (d.x, rect.max.x - a.x),
        (-d.y, a.y - rect.min.y),
        (d.y, rect.max.y - a.y),
    ];
    for (p, q) in checks {
        if p.abs() < f64::EPSILON {
            if q < -TOLERANCE {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 + TOLERANCE {
            return None;
        }
    }
    Some(t0)
}

/// Free length along `a`→`b` before the segment ends or enters a band.
fn free_run(a: &Point2, b: &Point2, bands: &[Rect2]) -> f64 {
    let t = bands
        .iter()
        .filter_map(|band| entry_parameter(a, b, band))
        .fold(1.0_f64, f64::min);
    (b - a).norm() * t
}

fn distance_to_loop(p: &Point2, points: &[Point2]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| point_segment_distance(p, &points[i], &points[(i + 1) % n]))
        .fold(f64::INFINITY, f64::min)
}

fn loop_corners(
    contour: CornerLoop,
    points: &[Point2],
    others: &[&[Point2]],
    bands: &[Rect2],
) -> Vec<CornerEligibility> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let p = points[i];
            let id = CornerId { contour, index: i };
            if bands.iter().any(|band| band.contains(&p)) {
                return CornerEligibility {
                    id,
                    position: p,
                    eligible: false,
                    max_radius: 0.0,
                };
            }
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            let max_radius = others
                .iter()
                .map(|other| distance_to_loop(&p, other))
                .fold(
                    free_run(&p, &prev, bands).min(free_run(&p, &next, bands)),
                    f64::min,
                );
            let eligible = max_radius > TOLERANCE;
            CornerEligibility {
                id,
                position: p,
                eligible,
                max_radius: if eligible { max_radius } else { 0.0 },
            }
        })
        .collect()
}

/// Fillet eligibility for every corner of the outline and of the cutout
/// holes.
///
/// A corner is eligible when it lies outside every band and has room for a
/// radius. `max_radius` is the shortest of the free runs along its two
/// segments and the distance to the nearest other loop.
#[must_use]
pub fn corner_eligibility(outline: &[Point2], holes: &[Hole], bands: &[Rect2]) -> Vec<CornerEligibility> {
    let hole_loops: Vec<&[Point2]> = holes.iter().map(|h| h.points.as_slice()).collect();
    let mut corners = loop_corners(CornerLoop::Outline, outline, &hole_loops, bands);

    for (index, hole) in holes.iter().enumerate() {
        if hole.kind != HoleKind::Cutout {
            continue;
        }
        let others: Vec<&[Point2]> = std::iter::once(outline)
            .chain(
                hole_loops
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != index)
                    .map(|(_, l)| *l),
            )
            .collect();
        corners.extend(loop_corners(CornerLoop::Hole(index), &hole.points, &others, bands));
    }
    corners
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square(half: f64) -> Vec<Point2> {
        Rect2::centered(half * 2.0, half * 2.0).to_polygon()
    }

    #[test]
    fn free_square_corners_reach_the_next_corner() {
        let corners = corner_eligibility(&square(10.0), &[], &[]);
        assert_eq!(corners.len(), 4);
        for c in corners {
            assert!(c.eligible);
            assert_abs_diff_eq!(c.max_radius, 20.0);
        }
    }

    #[test]
    fn band_stops_the_run_and_blocks_corners_inside() {
        // Band along the right edge.
        let band = Rect2::new(Point2::new(7.0, -10.0), Point2::new(13.0, 10.0));
        let corners = corner_eligibility(&square(10.0), &[], &[band]);
        let top_left = corners.iter().find(|c| c.position == Point2::new(-10.0, 10.0)).unwrap();
        assert!(top_left.eligible);
        assert_abs_diff_eq!(top_left.max_radius, 17.0);
        let top_right = corners.iter().find(|c| c.position == Point2::new(10.0, 10.0)).unwrap();
        assert!(!top_right.eligible);
        assert_abs_diff_eq!(top_right.max_radius, 0.0);
    }

    #[test]
    fn holes_limit_radius_and_cutouts_get_corners() {
        let hole = Hole {
            points: vec![
                Point2::new(-8.0, 5.0),
                Point2::new(-5.0, 5.0),
                Point2::new(-5.0, 8.0),
                Point2::new(-8.0, 8.0),
            ]
            .into_iter()
            .rev()
            .collect(),
            kind: HoleKind::Cutout,
        };
        let corners = corner_eligibility(&square(10.0), &[hole], &[]);
        assert_eq!(corners.len(), 8);
        let top_left = corners.iter().find(|c| c.position == Point2::new(-10.0, 10.0)).unwrap();
        assert_abs_diff_eq!(top_left.max_radius, 8.0_f64.sqrt(), epsilon = 1e-9);
        let hole_corner = corners
            .iter()
            .find(|c| c.id.contour == CornerLoop::Hole(0))
            .unwrap();
        assert!(hole_corner.eligible);
    }

    #[test]
    fn slot_holes_have_no_corners() {
        let hole = Hole {
            points: Rect2::centered(2.0, 2.0).to_polygon(),
            kind: HoleKind::Slot,
        };
        let corners = corner_eligibility(&square(10.0), &[hole], &[]);
        assert_eq!(corners.len(), 4);
    }
}
