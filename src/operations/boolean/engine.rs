use crate::error::{GeometryViolation, Result};
use crate::math::polygon_2d::{signed_area, simplify_loop, to_ccw};
use crate::math::{Point2, TOLERANCE};

use super::assemble::{assemble_regions, Region};
use super::classify::classify_fragment;
use super::select::{should_keep_fragment, BooleanOp};
use super::split::{split_polygons, PolygonSource};

/// Executes a boolean operation on two simple polygons.
///
/// Orchestrates the full pipeline: edge splitting, classification, selection
/// and assembly. Inputs may have either winding; both are normalized to
/// counter-clockwise first. An empty result is returned as an empty list.
///
/// # Errors
///
/// Returns `GeometryViolation::Degenerate` if either input encloses no area.
pub fn boolean_execute(a: &[Point2], b: &[Point2], op: BooleanOp) -> Result<Vec<Region>> {
    let a = prepare(a)?;
    let b = prepare(b)?;

    let fragments: Vec<_> = split_polygons(&a, &b)
        .into_iter()
        .map(|frag| {
            let other = match frag.source {
                PolygonSource::A => &b,
                PolygonSource::B => &a,
            };
            let class = classify_fragment(&frag, other);
            (frag, should_keep_fragment(frag.source, class, op))
        })
        .collect();

    let regions = assemble_regions(&fragments);
    tracing::trace!(?op, regions = regions.len(), "polygon boolean");
    Ok(regions)
}

fn prepare(points: &[Point2]) -> Result<Vec<Point2>> {
    let simplified = simplify_loop(points);
    if simplified.len() < 3 || signed_area(&simplified).abs() <= TOLERANCE {
        return Err(GeometryViolation::Degenerate("polygon encloses no area".into()).into());
    }
    Ok(to_ccw(&simplified))
}
