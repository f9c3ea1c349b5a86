use tracing::warn;

use crate::geometry::Pline;
use crate::math::{Point2, TOLERANCE};

use super::path::{CornerEligibility, CornerId, CornerLoop, Hole, PanelId};

/// Chord tolerance for tessellating fillet arcs, in millimetres.
pub const FILLET_TOLERANCE: f64 = 0.05;

/// Rounds the requested corners of one loop.
///
/// Requests for ineligible corners, or larger than the corner allows, are
/// skipped. Corners are filleted from the highest index down so earlier
/// indices stay valid.
fn fillet_loop(
    panel: PanelId,
    contour: CornerLoop,
    points: &[Point2],
    corners: &[CornerEligibility],
    requests: &[(CornerId, f64)],
) -> Vec<Point2> {
    let mut wanted: Vec<(usize, f64)> = requests
        .iter()
        .filter(|(id, _)| id.contour == contour)
        .filter_map(|&(id, radius)| {
            let corner = corners.iter().find(|c| c.id == id)?;
            (corner.eligible && radius <= corner.max_radius + TOLERANCE).then_some((id.index, radius))
        })
        .collect();
    if wanted.is_empty() {
        return points.to_vec();
    }
    wanted.sort_by(|a, b| b.0.cmp(&a.0));

    let mut pline = Pline::from_points(points, true);
    for (index, radius) in wanted {
        if let Err(err) = pline.fillet_vertex(index, radius) {
            warn!(%panel, index, radius, %err, "skipping fillet");
        }
    }
    pline.to_points(FILLET_TOLERANCE)
}

/// Applies stored fillets to an outline and its holes.
#[must_use]
pub fn apply_fillets(
    panel: PanelId,
    outline: &[Point2],
    holes: &[Hole],
    corners: &[CornerEligibility],
    requests: &[(CornerId, f64)],
) -> (Vec<Point2>, Vec<Hole>) {
    let outline = fillet_loop(panel, CornerLoop::Outline, outline, corners, requests);
    let holes = holes
        .iter()
        .enumerate()
        .map(|(i, hole)| Hole {
            points: fillet_loop(panel, CornerLoop::Hole(i), &hole.points, corners, requests),
            kind: hole.kind,
        })
        .collect();
    (outline, holes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::polygon_2d::signed_area;
    use crate::math::Rect2;
    use crate::model::FaceId;
    use crate::panels::eligibility::corner_eligibility;
    use std::f64::consts::PI;

    #[test]
    fn fillet_rounds_eligible_corner() {
        let square = Rect2::centered(20.0, 20.0).to_polygon();
        let corners = corner_eligibility(&square, &[], &[]);
        let (outline, _) = apply_fillets(
            PanelId::Face(FaceId::Front),
            &square,
            &[],
            &corners,
            &[(CornerId::outline(2), 5.0)],
        );
        assert!(outline.len() > 5);
        let expected = 400.0 - (25.0 - PI * 25.0 / 4.0);
        assert!((signed_area(&outline) - expected).abs() < 0.5);
    }

    #[test]
    fn oversized_request_is_skipped() {
        let square = Rect2::centered(20.0, 20.0).to_polygon();
        let corners = corner_eligibility(&square, &[], &[]);
        let (outline, _) = apply_fillets(
            PanelId::Face(FaceId::Front),
            &square,
            &[],
            &corners,
            &[(CornerId::outline(0), 25.0)],
        );
        assert_eq!(outline, square);
    }
}
