use crate::math::intersect_2d::{segment_param, segment_segment_intersect_2d, SegmentIntersection};
use crate::math::{Point2, TOLERANCE};

/// Which polygon an edge fragment originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonSource {
    A,
    B,
}

/// A piece of a polygon edge between two consecutive split points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeFragment {
    pub start: Point2,
    pub end: Point2,
    pub source: PolygonSource,
}

impl EdgeFragment {
    /// Midpoint of the fragment, used for classification.
    #[must_use]
    pub fn midpoint(&self) -> Point2 {
        nalgebra::center(&self.start, &self.end)
    }
}

/// Splits the edges of both polygons at every point where they meet.
///
/// Both inputs are closed loops. Shared split points are computed once per
/// edge pair and inserted into both edges, so fragments from `a` and `b` end
/// on identical coordinates.
#[must_use]
pub fn split_polygons(a: &[Point2], b: &[Point2]) -> Vec<EdgeFragment> {
    let na = a.len();
    let nb = b.len();
    let mut cuts_a: Vec<Vec<Point2>> = vec![Vec::new(); na];
    let mut cuts_b: Vec<Vec<Point2>> = vec![Vec::new(); nb];

    for i in 0..na {
        let a0 = a[i];
        let a1 = a[(i + 1) % na];
        for j in 0..nb {
            let b0 = b[j];
            let b1 = b[(j + 1) % nb];
            match segment_segment_intersect_2d(&a0, &a1, &b0, &b1) {
                SegmentIntersection::None => {}
                SegmentIntersection::Point(p) => {
                    cuts_a[i].push(p);
                    cuts_b[j].push(p);
                }
                SegmentIntersection::Overlap(p, q) => {
                    cuts_a[i].extend([p, q]);
                    cuts_b[j].extend([p, q]);
                }
            }
        }
    }

    let mut fragments = split_loop(a, &cuts_a, PolygonSource::A);
    fragments.extend(split_loop(b, &cuts_b, PolygonSource::B));
    fragments
}

fn split_loop(points: &[Point2], cuts: &[Vec<Point2>], source: PolygonSource) -> Vec<EdgeFragment> {
    let n = points.len();
    let mut fragments = Vec::with_capacity(n);
    for i in 0..n {
        let p0 = points[i];
        let p1 = points[(i + 1) % n];

        let mut stops: Vec<(f64, Point2)> = cuts[i]
            .iter()
            .map(|p| (segment_param(p, &p0, &p1), *p))
            .filter(|(t, _)| *t > 0.0 && *t < 1.0)
            .collect();
        stops.sort_by(|x, y| x.0.total_cmp(&y.0));

        let mut prev = p0;
        for (_, p) in stops.into_iter().chain(std::iter::once((1.0, p1))) {
            if (p - prev).norm() > TOLERANCE {
                fragments.push(EdgeFragment {
                    start: prev,
                    end: p,
                    source,
                });
                prev = p;
            }
        }
    }
    fragments
}
