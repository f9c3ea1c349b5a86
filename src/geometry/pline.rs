use crate::error::{GeometryViolation, Result};
use crate::math::arc_2d::{arc_from_bulge, arc_point_at, arc_subdivision_count, bulge_for_sweep};
use crate::math::{Point2, TOLERANCE};

/// Bulge-encoded polyline vertex for mixed line/arc segments.
///
/// `bulge = tan(sweep_angle / 4)`:
/// - `0` = straight line to next vertex
/// - `> 0` = counter-clockwise arc to next vertex
/// - `< 0` = clockwise arc to next vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlineVertex {
    pub x: f64,
    pub y: f64,
    pub bulge: f64,
}

impl PlineVertex {
    /// Creates a new vertex with the given coordinates and bulge.
    #[must_use]
    pub fn new(x: f64, y: f64, bulge: f64) -> Self {
        Self { x, y, bulge }
    }

    /// Creates a line vertex (bulge = 0).
    #[must_use]
    pub fn line(x: f64, y: f64) -> Self {
        Self { x, y, bulge: 0.0 }
    }

    fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// A polyline with mixed straight-line and circular-arc segments.
///
/// For closed polylines, the last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Pline {
    pub vertices: Vec<PlineVertex>,
    pub closed: bool,
}

impl Pline {
    /// Creates a `Pline` of straight segments through `points`.
    #[must_use]
    pub fn from_points(points: &[Point2], closed: bool) -> Self {
        let vertices = points.iter().map(|p| PlineVertex::line(p.x, p.y)).collect();
        Self { vertices, closed }
    }

    /// Returns the number of segments in this polyline.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        let n = self.vertices.len();
        if n < 2 {
            return 0;
        }
        if self.closed {
            n
        } else {
            n - 1
        }
    }

    /// Replaces the corner at `index` with a tangent arc of `radius`.
    ///
    /// The corner's two neighbouring segments must be straight and at least
    /// `radius` long. Inserting the arc adds one vertex, so callers filleting
    /// several corners should work from the highest index down.
    ///
    /// # Errors
    ///
    /// Returns `GeometryViolation::Degenerate` if the corner is missing, one of
    /// its segments is too short, or the corner has no turn.
    pub fn fillet_vertex(&mut self, index: usize, radius: f64) -> Result<()> {
        let n = self.vertices.len();
        if n < 3 || index >= n || (!self.closed && (index == 0 || index == n - 1)) {
            return Err(GeometryViolation::Degenerate(format!("no corner at {index}")).into());
        }
        let prev_idx = (index + n - 1) % n;
        let prev = self.vertices[prev_idx].point();
        let cur = self.vertices[index].point();
        let next = self.vertices[(index + 1) % n].point();

        let d_in = cur - prev;
        let d_out = next - cur;
        let len_in = d_in.norm();
        let len_out = d_out.norm();
        if radius > len_in + TOLERANCE || radius > len_out + TOLERANCE {
            return Err(GeometryViolation::Degenerate(format!(
                "fillet radius {radius} longer than corner segments"
            ))
            .into());
        }

        let cross = d_in.x * d_out.y - d_in.y * d_out.x;
        let sweep = cross.atan2(d_in.dot(&d_out));
        if sweep.abs() < 1e-9 {
            return Err(GeometryViolation::Degenerate("corner has no turn".into()).into());
        }

        // Setback along each segment so the arc is tangent to both.
        let setback = radius * (sweep.abs() * 0.5).tan();
        let setback = setback.min(len_in).min(len_out);
        let t_in = cur - d_in / len_in * setback;
        let t_out = cur + d_out / len_out * setback;

        self.vertices[index] = PlineVertex::new(t_in.x, t_in.y, bulge_for_sweep(sweep));
        self.vertices
            .insert(index + 1, PlineVertex::line(t_out.x, t_out.y));
        Ok(())
    }

    /// Converts this polyline to points, tessellating arcs into chords.
    ///
    /// `tolerance` bounds the deviation between each arc and its chords.
    /// Closed polylines do not repeat their first point.
    #[must_use]
    pub fn to_points(&self, tolerance: f64) -> Vec<Point2> {
        let n = self.vertices.len();
        if n == 0 {
            return Vec::new();
        }

        let mut points = Vec::with_capacity(n * 2);
        points.push(self.vertices[0].point());
        for i in 0..self.segment_count() {
            let v0 = &self.vertices[i];
            let v1 = &self.vertices[(i + 1) % n];
            let p0 = v0.point();
            let p1 = v1.point();

            if v0.bulge.abs() >= 1e-12 {
                let arc = arc_from_bulge(&p0, &p1, v0.bulge);
                if arc.radius >= 1e-12 {
                    let n_sub = arc_subdivision_count(arc.radius, arc.sweep.abs(), tolerance);
                    for j in 1..n_sub {
                        let t = f64::from(j) / f64::from(n_sub);
                        points.push(arc_point_at(&arc, t));
                    }
                }
            }
            points.push(p1);
        }

        if self.closed && points.len() > 1 {
            points.pop();
        }
        points
    }
}
