use crate::error::{GeometryViolation, Result};
use crate::geometry::Shape;
use crate::math::polygon_2d::{classify_point, to_cw, PointClassification};
use crate::math::{Point2, Rect2, TOLERANCE};
use crate::operations::boolean::{Region, Subtract, Union};

use super::path::EdgeSide;

/// Boolean applied by a safe-area edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOperation {
    /// Adds material.
    Union,
    /// Removes material.
    Difference,
}

/// Edited boundary of one panel.
///
/// `base` is the plain panel body when editing started and `polygon` the
/// body after all edits. Synthesis transplants the difference between the
/// two onto the jointed outline.
#[derive(Debug, Clone, PartialEq)]
pub struct SafeAreaState {
    pub base: Rect2,
    pub polygon: Vec<Point2>,
    /// Interior cutouts, clockwise.
    pub cutouts: Vec<Vec<Point2>>,
}

/// The single hole-free region of a boolean result.
fn single_region(mut regions: Vec<Region>) -> Result<Vec<Point2>> {
    match regions.len() {
        0 => Err(GeometryViolation::EmptyResult.into()),
        1 => {
            let region = regions.remove(0);
            if region.holes.is_empty() {
                Ok(region.outer)
            } else {
                Err(GeometryViolation::Degenerate("edit would enclose a hole".into()).into())
            }
        }
        n => Err(GeometryViolation::MultipleRegions(n).into()),
    }
}

/// Extent along `side` of the vertices of `piece` lying on the edge line `at`.
fn chord(piece: &[Point2], side: EdgeSide, at: f64) -> Option<(f64, f64)> {
    let (lo, hi) = piece
        .iter()
        .filter(|p| (side.across(p) - at).abs() <= TOLERANCE)
        .map(|p| side.along(p))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), a| (lo.min(a), hi.max(a)));
    (hi - lo > TOLERANCE).then_some((lo, hi))
}

/// Rectangle spanning `across` perpendicular to `side` and `along` it.
fn side_rect(side: EdgeSide, across: (f64, f64), along: (f64, f64)) -> Rect2 {
    if side.is_u_side() {
        Rect2::new(Point2::new(across.0, along.0), Point2::new(across.1, along.1))
    } else {
        Rect2::new(Point2::new(along.0, across.0), Point2::new(along.1, across.1))
    }
}

fn shifted(piece: &[Point2], side: EdgeSide, delta: f64) -> Vec<Point2> {
    piece
        .iter()
        .map(|p| {
            if side.is_u_side() {
                Point2::new(p.x + delta, p.y)
            } else {
                Point2::new(p.x, p.y + delta)
            }
        })
        .collect()
}

impl SafeAreaState {
    /// Fresh state for a panel whose body is `body`.
    #[must_use]
    pub fn new(body: Rect2) -> Self {
        Self {
            base: body,
            polygon: body.to_polygon(),
            cutouts: Vec::new(),
        }
    }

    /// Applies one edit and returns the new state.
    ///
    /// A difference lying strictly inside the polygon becomes a cutout.
    ///
    /// # Errors
    ///
    /// - `ShapeOutsideSafeArea` if the shape reaches into a band.
    /// - `EmptyResult` if nothing would remain.
    /// - `MultipleRegions` if the result would fall apart.
    /// - `Degenerate` for shapes without area or results with holes.
    pub fn apply(&self, operation: EdgeOperation, shape: &Shape, bands: &[Rect2]) -> Result<Self> {
        let polygon = shape.to_polygon()?;
        let reach = Rect2::from_points(&polygon)
            .ok_or_else(|| GeometryViolation::Degenerate("empty shape".into()))?;
        if bands.iter().any(|band| band.overlaps(&reach)) {
            return Err(GeometryViolation::ShapeOutsideSafeArea.into());
        }

        let regions = match operation {
            EdgeOperation::Union => Union::new(&self.polygon, &polygon).execute()?,
            EdgeOperation::Difference => Subtract::new(&self.polygon, &polygon).execute()?,
        };

        let mut next = self.clone();
        if operation == EdgeOperation::Difference
            && regions.len() == 1
            && regions[0].holes.len() == 1
        {
            let overlaps_cutout = self
                .cutouts
                .iter()
                .filter_map(|c| Rect2::from_points(c))
                .any(|c| c.overlaps(&reach));
            if overlaps_cutout {
                return Err(
                    GeometryViolation::Degenerate("cutout overlaps another cutout".into()).into(),
                );
            }
            next.cutouts.push(to_cw(&polygon));
            return Ok(next);
        }

        next.polygon = single_region(regions)?;
        Ok(next)
    }

    /// Carries the edits over to `body`, the panel body after its `side`
    /// edge moved.
    ///
    /// Material added on the moved edge moves with it and notches cut into
    /// it are stretched to keep reaching it. Everything else stays put.
    ///
    /// # Errors
    ///
    /// Returns a `GeometryViolation` if the edits no longer form a single
    /// region on the new body or a cutout would leave the panel.
    pub fn rebase(&self, side: EdgeSide, body: Rect2) -> Result<Self> {
        let from = side.coordinate(&self.base);
        let to = side.coordinate(&body);
        let base = self.base.to_polygon();

        let mut polygon = body.to_polygon();
        for added in Subtract::new(&self.polygon, &base).execute()? {
            let piece = if chord(&added.outer, side, from).is_some() {
                shifted(&added.outer, side, to - from)
            } else {
                added.outer
            };
            polygon = single_region(Union::new(&polygon, &piece).execute()?)?;
        }
        for removed in Subtract::new(&base, &self.polygon).execute()? {
            let mut piece = removed.outer;
            if let Some(along) = chord(&piece, side, from).filter(|_| (to - from).abs() > TOLERANCE) {
                let strip = side_rect(side, (from, to), along).to_polygon();
                piece = single_region(Union::new(&piece, &strip).execute()?)?;
            }
            polygon = single_region(Subtract::new(&polygon, &piece).execute()?)?;
        }

        let escaped = self
            .cutouts
            .iter()
            .flatten()
            .any(|p| classify_point(p, &polygon) != PointClassification::Inside);
        if escaped {
            return Err(GeometryViolation::Degenerate("cutout would leave the panel".into()).into());
        }
        Ok(Self {
            base: body,
            polygon,
            cutouts: self.cutouts.clone(),
        })
    }

    /// Rebases edge by edge until the state sits on `body`.
    ///
    /// # Errors
    ///
    /// Returns the first `GeometryViolation` from [`rebase`](Self::rebase).
    pub fn fit_to(&self, body: Rect2) -> Result<Self> {
        let mut state = self.clone();
        for side in EdgeSide::ALL {
            let target = side.coordinate(&body);
            if (side.coordinate(&state.base) - target).abs() > TOLERANCE {
                state = state.rebase(side, side.with_coordinate(&state.base, target))?;
            }
        }
        Ok(state)
    }

    /// Transfers the edits onto `jointed`, the outline with its joints.
    ///
    /// # Errors
    ///
    /// Returns a `GeometryViolation` if a step does not leave exactly one
    /// region.
    pub fn compose(&self, jointed: &[Point2]) -> Result<Vec<Point2>> {
        let base = self.base.to_polygon();
        let mut outline = jointed.to_vec();
        for added in Subtract::new(&self.polygon, &base).execute()? {
            outline = single_region(Union::new(&outline, &added.outer).execute()?)?;
        }
        for removed in Subtract::new(&base, &self.polygon).execute()? {
            outline = single_region(Subtract::new(&outline, &removed.outer).execute()?)?;
        }
        Ok(outline)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::math::polygon_2d::signed_area;
    use approx::assert_abs_diff_eq;

    fn state() -> SafeAreaState {
        SafeAreaState::new(Rect2::centered(100.0, 60.0))
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
        Shape::Rectangle {
            min: Point2::new(x0, y0),
            max: Point2::new(x1, y1),
        }
    }

    #[test]
    fn difference_notches_the_edge() {
        let next = state()
            .apply(EdgeOperation::Difference, &rect(-10.0, 20.0, 10.0, 40.0), &[])
            .unwrap();
        assert_abs_diff_eq!(signed_area(&next.polygon), 6000.0 - 200.0, epsilon = 1e-6);
        assert!(next.cutouts.is_empty());
    }

    #[test]
    fn union_grows_past_the_edge() {
        let next = state()
            .apply(EdgeOperation::Union, &rect(-10.0, 20.0, 10.0, 50.0), &[])
            .unwrap();
        assert_abs_diff_eq!(signed_area(&next.polygon), 6000.0 + 400.0, epsilon = 1e-6);
    }

    #[test]
    fn interior_difference_becomes_cutout() {
        let next = state()
            .apply(EdgeOperation::Difference, &rect(-5.0, -5.0, 5.0, 5.0), &[])
            .unwrap();
        assert_eq!(next.cutouts.len(), 1);
        assert!(signed_area(&next.cutouts[0]) < 0.0);
        assert_eq!(next.polygon, state().polygon);
    }

    #[test]
    fn removing_everything_is_rejected() {
        let err = state()
            .apply(EdgeOperation::Difference, &rect(-60.0, -40.0, 60.0, 40.0), &[])
            .unwrap_err();
        assert_eq!(err, BoxError::Geometry(GeometryViolation::EmptyResult));
    }

    #[test]
    fn splitting_is_rejected() {
        let err = state()
            .apply(EdgeOperation::Difference, &rect(-5.0, -40.0, 5.0, 40.0), &[])
            .unwrap_err();
        assert_eq!(err, BoxError::Geometry(GeometryViolation::MultipleRegions(2)));
    }

    #[test]
    fn bands_are_off_limits() {
        let band = Rect2::new(Point2::new(-50.0, -33.0), Point2::new(50.0, -27.0));
        let err = state()
            .apply(EdgeOperation::Difference, &rect(-5.0, -35.0, 5.0, -20.0), &[band])
            .unwrap_err();
        assert_eq!(err, BoxError::Geometry(GeometryViolation::ShapeOutsideSafeArea));
    }

    #[test]
    fn notch_stretches_to_a_raised_edge() {
        let notched = state()
            .apply(EdgeOperation::Difference, &rect(-5.0, 20.0, 5.0, 35.0), &[])
            .unwrap();
        // Top edge from 30 up to 50.
        let raised = EdgeSide::Top.with_coordinate(&notched.base, 50.0);
        let next = notched.rebase(EdgeSide::Top, raised).unwrap();
        assert_eq!(next.base, raised);
        assert_abs_diff_eq!(signed_area(&next.polygon), 100.0 * 80.0 - 10.0 * 30.0, epsilon = 1e-6);
        assert!(next.polygon.contains(&Point2::new(5.0, 20.0)));
        assert!(next.polygon.contains(&Point2::new(5.0, 50.0)));
    }

    #[test]
    fn bump_rides_on_a_lowered_edge() {
        let bumped = state()
            .apply(EdgeOperation::Union, &rect(-10.0, 20.0, 10.0, 40.0), &[])
            .unwrap()
            .apply(EdgeOperation::Difference, &rect(40.0, -40.0, 60.0, -20.0), &[])
            .unwrap();
        let lowered = EdgeSide::Top.with_coordinate(&bumped.base, 25.0);
        let next = bumped.rebase(EdgeSide::Top, lowered).unwrap();
        let top = next.polygon.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        assert_abs_diff_eq!(top, 35.0, epsilon = 1e-9);
        // The notch on the bottom edge does not move.
        assert!(next.polygon.contains(&Point2::new(40.0, -20.0)));
        assert_abs_diff_eq!(
            signed_area(&next.polygon),
            100.0 * 55.0 + 200.0 - 100.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn cutout_cannot_leave_a_shrunk_panel() {
        let cut = state()
            .apply(EdgeOperation::Difference, &rect(-5.0, 10.0, 5.0, 20.0), &[])
            .unwrap();
        let lowered = EdgeSide::Top.with_coordinate(&cut.base, 15.0);
        let err = cut.rebase(EdgeSide::Top, lowered).unwrap_err();
        assert!(matches!(err, BoxError::Geometry(GeometryViolation::Degenerate(_))));
    }

    #[test]
    fn compose_transfers_edits_onto_outline() {
        let next = state()
            .apply(EdgeOperation::Union, &rect(-10.0, 20.0, 10.0, 50.0), &[])
            .unwrap()
            .apply(EdgeOperation::Difference, &rect(30.0, 20.0, 60.0, 40.0), &[])
            .unwrap();
        let jointed = Rect2::centered(100.0, 60.0).to_polygon();
        let composed = next.compose(&jointed).unwrap();
        assert_abs_diff_eq!(signed_area(&composed), 6000.0 + 400.0 - 200.0, epsilon = 1e-6);
    }
}
