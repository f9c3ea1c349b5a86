use crate::error::Result;
use crate::geometry::{FingerJoint, FingerParams};
use crate::math::polygon_2d::simplify_loop;
use crate::math::{Point2, Rect2, Vector2, TOLERANCE};

use super::path::{EdgeInfo, EdgeJoint, EdgeSide, EdgeStatus, JointKind};

/// How one local edge of a panel is built.
///
/// Coordinates are panel-local. `boundary` is the nominal edge position and
/// `span` the nominal extent along the edge, over which the finger layout is
/// computed so that both mates agree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePlan {
    pub side: EdgeSide,
    pub boundary: f64,
    pub span: (f64, f64),
    pub extension: f64,
    pub joint: Option<EdgeJoint>,
    pub params: FingerParams,
}

impl EdgePlan {
    #[must_use]
    pub fn straight(side: EdgeSide, boundary: f64, span: (f64, f64), params: FingerParams) -> Self {
        Self {
            side,
            boundary,
            span,
            extension: 0.0,
            joint: None,
            params,
        }
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.joint.is_some()
    }

    /// Distance from the boundary to the baseline the joint is cut from.
    ///
    /// A finger edge carrying tabs sits back by the tab depth so the tabs
    /// reach the boundary; slotted edges and T-slot tabs start on it.
    #[must_use]
    pub fn inset(&self) -> f64 {
        match self.joint {
            Some(joint) if joint.kind == JointKind::Finger && joint.tabs_out => joint.depth,
            _ => 0.0,
        }
    }

    /// Boundary after the extension.
    #[must_use]
    pub fn extended_boundary(&self) -> f64 {
        self.boundary + self.side.outward_sign() * self.extension
    }

    /// Perpendicular coordinate of the baseline.
    #[must_use]
    pub fn baseline(&self) -> f64 {
        self.extended_boundary() - self.side.outward_sign() * self.inset()
    }

    /// Strip around a locked edge that edits may not touch.
    #[must_use]
    pub fn band(&self) -> Option<Rect2> {
        let joint = self.joint?;
        let (lo, hi) = (self.boundary - joint.depth, self.boundary + joint.depth);
        let (a, b) = self.span;
        Some(if self.side.is_u_side() {
            Rect2::new(Point2::new(lo, a), Point2::new(hi, b))
        } else {
            Rect2::new(Point2::new(a, lo), Point2::new(b, hi))
        })
    }

    /// Local point at coordinate `along` on the edge and `across` perpendicular.
    fn point(&self, along: f64, across: f64) -> Point2 {
        if self.side.is_u_side() {
            Point2::new(across, along)
        } else {
            Point2::new(along, across)
        }
    }

    /// Rectangle spanning `along` on the edge and `across` perpendicular to it.
    #[must_use]
    pub fn local_rect(&self, along: (f64, f64), across: (f64, f64)) -> Rect2 {
        Rect2::new(self.point(along.0, across.0), self.point(along.1, across.1))
    }

    /// Nominal start and end on the baseline, in counter-clockwise travel order.
    fn nominal_ends(&self) -> (Point2, Point2) {
        let base = self.baseline();
        let (lo, hi) = self.span;
        match self.side {
            EdgeSide::Bottom | EdgeSide::Right => (self.point(lo, base), self.point(hi, base)),
            EdgeSide::Top | EdgeSide::Left => (self.point(hi, base), self.point(lo, base)),
        }
    }

    /// Path of this edge from corner `from` to corner `to`.
    ///
    /// The joint is generated over the nominal span and then trimmed to the
    /// corners, so the result starts exactly at `from` and ends at `to`.
    ///
    /// # Errors
    ///
    /// Returns a `GeometryViolation` if the joint cannot be generated.
    pub fn path(&self, from: Point2, to: Point2) -> Result<Vec<Point2>> {
        let Some(joint) = self.joint else {
            return Ok(vec![from, to]);
        };
        let (start, end) = self.nominal_ends();
        if (end - start).norm() < TOLERANCE {
            return Ok(vec![from, to]);
        }
        let zigzag = FingerJoint::new(start, end, &self.params, joint.tabs_out)
            .with_depth(joint.depth)
            .execute()?;

        let dir = (end - start).normalize();
        let outward = Vector2::new(dir.y, -dir.x);
        let to_run = |p: &Point2| ((p - start).dot(&dir), (p - start).dot(&outward));
        let run: Vec<(f64, f64)> = zigzag.iter().map(to_run).collect();
        let clipped = clip_run(&run, to_run(&from).0, to_run(&to).0);
        Ok(clipped
            .into_iter()
            .map(|(q, o)| start + dir * q + outward * o)
            .collect())
    }

    #[must_use]
    pub fn info(&self) -> EdgeInfo {
        EdgeInfo {
            side: self.side,
            status: if self.is_locked() {
                EdgeStatus::Locked
            } else {
                EdgeStatus::Unlocked
            },
            extension: self.extension,
            joint: self.joint,
        }
    }
}

/// Clips a run (along-edge, offset) pairs with non-decreasing along-edge
/// coordinate to `[lo, hi]`, starting and ending on the baseline.
fn clip_run(run: &[(f64, f64)], lo: f64, hi: f64) -> Vec<(f64, f64)> {
    let mut out: Vec<(f64, f64)> = Vec::with_capacity(run.len() + 2);
    let mut push = |p: (f64, f64)| {
        if out
            .last()
            .is_none_or(|l: &(f64, f64)| (l.0 - p.0).abs() > TOLERANCE || (l.1 - p.1).abs() > TOLERANCE)
        {
            out.push(p);
        }
    };
    push((lo, 0.0));
    for w in run.windows(2) {
        let (a, b) = (w[0], w[1]);
        if (b.0 - a.0).abs() <= TOLERANCE {
            if a.0 >= lo - TOLERANCE && a.0 <= hi + TOLERANCE {
                push(a);
                push(b);
            }
            continue;
        }
        let from = a.0.max(lo);
        let to = b.0.min(hi);
        if to - from > TOLERANCE {
            push((from, a.1));
            push((to, a.1));
        }
    }
    push((hi, 0.0));
    out
}

/// Corner where the baselines of two adjacent sides meet.
#[must_use]
pub fn corner(a: &EdgePlan, b: &EdgePlan) -> Point2 {
    let (u_side, v_side) = if a.side.is_u_side() { (a, b) } else { (b, a) };
    Point2::new(u_side.baseline(), v_side.baseline())
}

/// Closes the four edges into a counter-clockwise outline.
///
/// `plans` must be in [`EdgeSide::ALL`] order.
///
/// # Errors
///
/// Returns a `GeometryViolation` if a joint cannot be generated.
pub fn build_outline(plans: &[EdgePlan; 4]) -> Result<Vec<Point2>> {
    let mut points = Vec::new();
    for i in 0..4 {
        let prev = &plans[(i + 3) % 4];
        let cur = &plans[i];
        let next = &plans[(i + 1) % 4];
        points.extend(cur.path(corner(prev, cur), corner(cur, next))?);
    }
    Ok(simplify_loop(&points))
}

/// Rectangle between the four baselines.
#[must_use]
pub fn body(plans: &[EdgePlan; 4]) -> Rect2 {
    Rect2::new(corner(&plans[3], &plans[0]), corner(&plans[1], &plans[2]))
}
