use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::Result;
use crate::geometry::{FingerLayout, FingerParams};
use crate::math::polygon_2d::to_cw;
use crate::math::{Axis, Bounds3, Point2, Point3, Rect2, Vector3, TOLERANCE};
use crate::model::{Assembly, FaceId, SubdivisionId, VoidId, VoidTree};
use crate::operations::boolean::{Region, Subtract, Union};

use super::edges::{self, EdgePlan};
use super::edits::{resolve_fillets, PanelEdits};
use super::eligibility::corner_eligibility;
use super::fillet::apply_fillets;
use super::frame::PanelFrame;
use super::path::{
    EdgeJoint, EdgeSide, Hole, HoleKind, JointKind, PanelCollection, PanelId, PanelPath,
    PanelSource,
};

/// How far past an edge the neighbour probe looks.
const PROBE_DISTANCE: f64 = 1e-3;

/// Extra reach of a lap notch past the divider outline.
const NOTCH_OVERSHOOT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum SlabKind {
    Face(FaceId),
    InsetLid(FaceId),
    Divider(SubdivisionId),
}

/// A solid panel slab in assembly coordinates.
#[derive(Debug, Clone, Copy)]
struct Slab {
    id: PanelId,
    kind: SlabKind,
    axis: Axis,
    bounds: Bounds3,
}

/// A panel whose edges are planned but whose outline is not built yet.
struct Draft {
    slab: Slab,
    source: PanelSource,
    frame: PanelFrame,
    plans: [EdgePlan; 4],
    slots: Vec<Hole>,
    notches: Vec<Rect2>,
    feet: Vec<Rect2>,
}

/// Synthesizes every panel of the primary assembly and, recursively, of the
/// sub-assemblies it hosts.
///
/// # Errors
///
/// Returns an error only if the void tree is inconsistent.
pub fn synthesize(voids: &VoidTree, primary: &Assembly, edits: &PanelEdits) -> Result<PanelCollection> {
    let mut panels = Vec::new();
    synthesize_assembly(voids, primary, None, Vector3::zeros(), edits, &mut panels)?;
    debug!(panels = panels.len(), "synthesized panels");
    Ok(PanelCollection { panels })
}

fn synthesize_assembly(
    voids: &VoidTree,
    assembly: &Assembly,
    host: Option<VoidId>,
    origin: Vector3,
    edits: &PanelEdits,
    out: &mut Vec<PanelPath>,
) -> Result<()> {
    let scope = Scope {
        assembly,
        host,
        origin,
        params: assembly.config.finger_params(),
        slabs: collect_slabs(voids, assembly, host)?,
    };

    let mut drafts: Vec<Draft> = scope.slabs.iter().map(|s| scope.draft(s, edits)).collect();
    scope.cut_slots(&mut drafts);
    scope.cut_cross_laps(&mut drafts);
    if host.is_none() {
        scope.add_feet(&mut drafts);
    }
    for draft in drafts {
        out.push(finish(draft, assembly.thickness(), edits)?);
    }

    for vid in voids.subtree(assembly.root)? {
        let node = voids.node(vid)?;
        if let Some(sub) = &node.sub_assembly {
            let sub_origin = origin + sub.origin(&node.bounds).coords;
            synthesize_assembly(voids, &sub.assembly, Some(vid), sub_origin, edits, out)?;
        }
    }
    Ok(())
}

fn face_panel(host: Option<VoidId>, face: FaceId) -> (PanelId, PanelSource) {
    match host {
        None => (PanelId::Face(face), PanelSource::Face { face }),
        Some(sub_assembly) => (
            PanelId::SubAssemblyFace { sub_assembly, face },
            PanelSource::SubAssemblyFace { sub_assembly, face },
        ),
    }
}

/// Solid slabs of one assembly: flush faces, inset lids, then dividers in
/// depth-first order.
fn collect_slabs(voids: &VoidTree, assembly: &Assembly, host: Option<VoidId>) -> Result<Vec<Slab>> {
    let t = assembly.thickness();
    let outer = assembly.outer_bounds();
    let mut slabs = Vec::new();

    for face in FaceId::ALL {
        if assembly.is_flush_solid(face) {
            let axis = face.normal_axis();
            let lo = if face.is_high() {
                assembly.config.extent(axis) - t
            } else {
                0.0
            };
            slabs.push(Slab {
                id: face_panel(host, face).0,
                kind: SlabKind::Face(face),
                axis,
                bounds: outer.with_span(axis, lo, t),
            });
        }
    }

    let interior = voids.node(assembly.root)?.bounds;
    for face in FaceId::ALL {
        if let Some(bounds) = assembly.inset_lid_slab(face, &interior) {
            slabs.push(Slab {
                id: face_panel(host, face).0,
                kind: SlabKind::InsetLid(face),
                axis: face.normal_axis(),
                bounds,
            });
        }
    }

    for vid in voids.subtree(assembly.root)? {
        let node = voids.node(vid)?;
        let Some(partition) = &node.partition else {
            continue;
        };
        for divider in partition.dividers(&node.bounds, t) {
            let id = SubdivisionId {
                parent: vid,
                axis: divider.axis,
                index: divider.index,
            };
            slabs.push(Slab {
                id: PanelId::Divider(id),
                kind: SlabKind::Divider(id),
                axis: divider.axis,
                bounds: divider.bounds,
            });
        }
    }
    Ok(slabs)
}

fn with_coord(mut p: Point3, axis: Axis, value: f64) -> Point3 {
    p[axis.index()] = value;
    p
}

struct Scope<'a> {
    assembly: &'a Assembly,
    host: Option<VoidId>,
    origin: Vector3,
    params: FingerParams,
    slabs: Vec<Slab>,
}

impl Scope<'_> {
    fn draft(&self, slab: &Slab, edits: &PanelEdits) -> Draft {
        let frame = PanelFrame::for_slab(slab.axis, &slab.bounds, self.origin);
        let (u, v) = frame.axes();
        let plans = EdgeSide::ALL.map(|side| {
            let (perp, along) = if side.is_u_side() { (u, v) } else { (v, u) };
            let half = slab.bounds.extent(along) * 0.5;
            let mut plan = EdgePlan::straight(
                side,
                side.outward_sign() * slab.bounds.extent(perp) * 0.5,
                (-half, half),
                self.params,
            );
            plan.joint = match slab.kind {
                SlabKind::Face(face) => self.face_joint(face, perp, side.outward_sign() > 0.0),
                SlabKind::InsetLid(_) | SlabKind::Divider(_) => {
                    self.probe_joint(slab, perp, side.outward_sign() > 0.0)
                }
            };
            if plan.joint.is_none() {
                plan.extension = edits.extension(slab.id, side);
            }
            plan
        });

        let source = match slab.kind {
            SlabKind::Face(face) | SlabKind::InsetLid(face) => face_panel(self.host, face).1,
            SlabKind::Divider(subdivision) => PanelSource::Divider {
                subdivision,
                axis: slab.axis,
            },
        };
        Draft {
            slab: *slab,
            source,
            frame,
            plans,
            slots: Vec::new(),
            notches: Vec::new(),
            feet: Vec::new(),
        }
    }

    /// Finger joint between two flush outer faces.
    fn face_joint(&self, face: FaceId, perp: Axis, high: bool) -> Option<EdgeJoint> {
        let neighbour = FaceId::from_axis_side(perp, high);
        if !self.assembly.is_flush_solid(neighbour) {
            return None;
        }
        Some(EdgeJoint {
            kind: JointKind::Finger,
            tabs_out: self.assembly.carries_tabs(face, neighbour),
            depth: self.assembly.thickness(),
            mate: face_panel(self.host, neighbour).0,
        })
    }

    /// T-slot joint into whatever solid panel lies face-on past the edge.
    fn probe_joint(&self, slab: &Slab, perp: Axis, high: bool) -> Option<EdgeJoint> {
        let edge = if high {
            slab.bounds.max(perp) + PROBE_DISTANCE
        } else {
            slab.bounds.min(perp) - PROBE_DISTANCE
        };
        let probe = with_coord(slab.bounds.center(), perp, edge);
        let mate = self
            .slabs
            .iter()
            .find(|m| m.id != slab.id && m.axis == perp && m.bounds.contains_strict(&probe))?;
        Some(EdgeJoint {
            kind: JointKind::TSlot,
            tabs_out: true,
            depth: self.assembly.thickness(),
            mate: mate.id,
        })
    }

    /// Cuts a slot hole into each mate for every T-slot tab.
    fn cut_slots(&self, drafts: &mut [Draft]) {
        let index: HashMap<PanelId, usize> = drafts
            .iter()
            .enumerate()
            .map(|(i, d)| (d.slab.id, i))
            .collect();

        let mut holes: Vec<(usize, Hole)> = Vec::new();
        for draft in drafts.iter() {
            let (u, v) = draft.frame.axes();
            for plan in &draft.plans {
                let Some(joint) = plan.joint.filter(|j| j.kind == JointKind::TSlot) else {
                    continue;
                };
                let Some(&mate) = index.get(&joint.mate) else {
                    continue;
                };
                let along = if plan.side.is_u_side() { v } else { u };
                let normal = draft.slab.axis;
                let bounds = &draft.slab.bounds;
                let mate_frame = &drafts[mate].frame;
                let layout = FingerLayout::new(bounds.extent(along), &self.params);
                for (a, b) in layout.slot_intervals(self.params.kerf) {
                    let base = mate_frame.center;
                    let p0 = with_coord(
                        with_coord(base, along, bounds.min(along) + a),
                        normal,
                        bounds.min(normal),
                    );
                    let p1 = with_coord(
                        with_coord(base, along, bounds.min(along) + b),
                        normal,
                        bounds.max(normal),
                    );
                    let rect = Rect2::new(mate_frame.to_local(&p0), mate_frame.to_local(&p1));
                    holes.push((
                        mate,
                        Hole {
                            points: to_cw(&rect.to_polygon()),
                            kind: HoleKind::Slot,
                        },
                    ));
                }
            }
        }
        for (mate, hole) in holes {
            drafts[mate].slots.push(hole);
        }
    }

    /// Notches crossing dividers so they slot together halfway.
    ///
    /// The divider on the lower-index axis is notched from the high side of
    /// the shared axis, the other from the low side.
    fn cut_cross_laps(&self, drafts: &mut [Draft]) {
        let t = self.assembly.thickness();
        let dividers: Vec<usize> = drafts
            .iter()
            .enumerate()
            .filter(|(_, d)| matches!(d.slab.kind, SlabKind::Divider(_)))
            .map(|(i, _)| i)
            .collect();

        let mut notches: Vec<(usize, Rect2)> = Vec::new();
        for (n, &i) in dividers.iter().enumerate() {
            for &j in &dividers[n + 1..] {
                let (a, b) = (drafts[i].slab, drafts[j].slab);
                let Some(shared) = a.axis.third(b.axis) else {
                    continue;
                };
                let Some(overlap) = a.bounds.overlap(&b.bounds) else {
                    continue;
                };
                let mid = overlap.min(shared) + overlap.extent(shared) * 0.5;
                for (idx, this, other) in [(i, a, b), (j, b, a)] {
                    let (lo, hi) = if this.axis.index() < other.axis.index() {
                        (mid, this.bounds.max(shared) + t + NOTCH_OVERSHOOT)
                    } else {
                        (this.bounds.min(shared) - t - NOTCH_OVERSHOOT, mid)
                    };
                    let base = this.bounds.center();
                    let p0 = with_coord(
                        with_coord(base, other.axis, overlap.min(other.axis)),
                        shared,
                        lo,
                    );
                    let p1 = with_coord(
                        with_coord(base, other.axis, overlap.max(other.axis)),
                        shared,
                        hi,
                    );
                    let frame = &drafts[idx].frame;
                    notches.push((idx, Rect2::new(frame.to_local(&p0), frame.to_local(&p1))));
                }
            }
        }
        for (idx, notch) in notches {
            drafts[idx].notches.push(notch);
        }
    }

    /// Feet on every wall edge facing the low-side lid.
    fn add_feet(&self, drafts: &mut [Draft]) {
        let Some(feet) = self.assembly.config.assembly.feet else {
            return;
        };
        let axis = self.assembly.config.assembly.axis;
        let t = self.assembly.thickness();
        for draft in drafts.iter_mut() {
            let SlabKind::Face(face) = draft.slab.kind else {
                continue;
            };
            if face.normal_axis() == axis {
                continue;
            }
            let (u, v) = draft.frame.axes();
            let Some(k) = (0..4).find(|&k| {
                let side = draft.plans[k].side;
                let perp = if side.is_u_side() { u } else { v };
                perp == axis && side.outward_sign() < 0.0
            }) else {
                continue;
            };
            let plan = draft.plans[k];
            let (lo_side, hi_side) = {
                let (p, n) = (plan.side.prev(), plan.side.next());
                if p.outward_sign() < 0.0 { (p, n) } else { (n, p) }
            };
            let plans = draft.plans;
            let inset_of = |side: EdgeSide| {
                plans
                    .iter()
                    .find(|p| p.side == side)
                    .map_or(0.0, EdgePlan::inset)
            };
            let (lo, hi) = plan.span;
            let limit = if plan.is_locked() {
                self.params.corner_clearance()
            } else {
                (hi - lo) * 0.5
            };
            let boundary = plan.extended_boundary();
            let across = (boundary - feet.height, boundary + plan.inset() + t * 0.5);
            let reach = (feet.inset + feet.width).min(limit);

            let start = feet.inset.max(inset_of(lo_side));
            let end = feet.inset.max(inset_of(hi_side));
            if reach - start > TOLERANCE {
                draft.feet.push(plan.local_rect((lo + start, lo + reach), across));
            }
            if reach - end > TOLERANCE {
                draft.feet.push(plan.local_rect((hi - reach, hi - end), across));
            }
        }
    }
}

fn largest(regions: Vec<Region>) -> Option<Vec<Point2>> {
    regions
        .into_iter()
        .max_by(|a, b| a.area().total_cmp(&b.area()))
        .map(|r| r.outer)
}

/// Builds the final outline, holes and corner data of one panel.
fn finish(draft: Draft, thickness: f64, edits: &PanelEdits) -> Result<PanelPath> {
    let id = draft.slab.id;
    let mut outline = edges::build_outline(&draft.plans)?;

    for foot in &draft.feet {
        match Union::new(&outline, &foot.to_polygon()).execute() {
            Ok(regions) if regions.len() == 1 => outline.clone_from(&regions[0].outer),
            Ok(regions) => warn!(%id, regions = regions.len(), "foot does not join the outline"),
            Err(err) => warn!(%id, %err, "skipping foot"),
        }
    }

    for notch in &draft.notches {
        match Subtract::new(&outline, &notch.to_polygon()).execute() {
            Ok(regions) => {
                if regions.len() != 1 {
                    warn!(%id, regions = regions.len(), "lap notch splits the divider");
                }
                if let Some(kept) = largest(regions) {
                    outline = kept;
                }
            }
            Err(err) => warn!(%id, %err, "skipping lap notch"),
        }
    }

    let mut bands: Vec<Rect2> = draft.plans.iter().filter_map(EdgePlan::band).collect();
    bands.extend(draft.notches.iter().copied());

    let body = edges::body(&draft.plans);
    let mut holes = draft.slots;
    if let Some(state) = edits.safe_areas.get(&id) {
        match state.fit_to(body).and_then(|fitted| fitted.compose(&outline)) {
            Ok(composed) => outline = composed,
            Err(err) => warn!(%id, %err, "keeping unedited outline"),
        }
        holes.extend(state.cutouts.iter().map(|c| Hole {
            points: c.clone(),
            kind: HoleKind::Cutout,
        }));
    }

    let corners = corner_eligibility(&outline, &holes, &bands);
    let requests = resolve_fillets(&corners, edits.fillets_for(id));
    let (outline, holes) = apply_fillets(id, &outline, &holes, &corners, &requests);

    let (u, v) = draft.frame.axes();
    Ok(PanelPath {
        id,
        source: draft.source,
        outline,
        holes,
        thickness,
        frame: draft.frame,
        width: draft.slab.bounds.extent(u),
        height: draft.slab.bounds.extent(v),
        edges: draft.plans.iter().map(EdgePlan::info).collect(),
        corners,
        bands,
        body,
        visible: true,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::polygon_2d::{is_axis_aligned_loop, signed_area};
    use crate::model::{BoxConfig, Faces, FeetConfig, Subdivide};
    use crate::panels::path::EdgeStatus;
    use approx::assert_abs_diff_eq;

    fn enclosed() -> (VoidTree, Assembly) {
        let mut voids = VoidTree::new();
        let mut config = BoxConfig::new(100.0, 80.0, 60.0);
        config.finger_width = 8.0;
        let assembly = Assembly::new(config, Faces::all_solid(), &mut voids).unwrap();
        (voids, assembly)
    }

    #[test]
    fn enclosed_box_has_six_locked_faces() {
        let (voids, assembly) = enclosed();
        let panels = synthesize(&voids, &assembly, &PanelEdits::default()).unwrap();
        assert_eq!(panels.len(), 6);
        for panel in panels.iter() {
            assert!(is_axis_aligned_loop(&panel.outline));
            assert!(signed_area(&panel.outline) > 0.0);
            assert!(panel.edges.iter().all(|e| e.status == EdgeStatus::Locked));
            assert!(panel.corners.iter().all(|c| !c.eligible));
        }
    }

    #[test]
    fn divider_gets_tslots_and_walls_get_holes() {
        let (mut voids, assembly) = enclosed();
        Subdivide::new(assembly.root, Axis::X, vec![50.0])
            .execute(&mut voids, &assembly)
            .unwrap();
        let panels = synthesize(&voids, &assembly, &PanelEdits::default()).unwrap();
        let divider = panels.dividers().next().unwrap();
        assert!(divider
            .edges
            .iter()
            .all(|e| e.joint.is_some_and(|j| j.kind == JointKind::TSlot)));
        assert_abs_diff_eq!(divider.position().x, 54.5);
        let bottom = panels.get(&PanelId::Face(FaceId::Bottom)).unwrap();
        assert!(!bottom.holes.is_empty());
        assert!(bottom.holes.iter().all(|h| signed_area(&h.points) < 0.0));
    }

    #[test]
    fn open_face_leaves_divider_edge_free() {
        let mut voids = VoidTree::new();
        let assembly = Assembly::new(
            BoxConfig::new(100.0, 80.0, 60.0),
            Faces::with_open(&[FaceId::Top, FaceId::Front]),
            &mut voids,
        )
        .unwrap();
        Subdivide::new(assembly.root, Axis::X, vec![40.0])
            .execute(&mut voids, &assembly)
            .unwrap();
        let panels = synthesize(&voids, &assembly, &PanelEdits::default()).unwrap();
        let divider = panels.dividers().next().unwrap();
        assert_eq!(divider.edge(EdgeSide::Top).unwrap().status, EdgeStatus::Unlocked);
        assert_eq!(divider.edge(EdgeSide::Right).unwrap().status, EdgeStatus::Unlocked);
        assert_eq!(divider.edge(EdgeSide::Left).unwrap().status, EdgeStatus::Locked);
        // Top-right corner: runs of 54 (top, up to the back-wall band) and
        // 74 (right, down to the bottom band).
        let corner = divider
            .corners
            .iter()
            .find(|c| c.position == Point2::new(28.5, 38.5))
            .unwrap();
        assert!(corner.eligible);
        assert_abs_diff_eq!(corner.max_radius, 54.0, epsilon = 1e-9);
    }

    #[test]
    fn crossing_dividers_are_notched() {
        let (mut voids, assembly) = enclosed();
        crate::model::GridSubdivide::new(
            assembly.root,
            vec![
                crate::model::AxisCut::new(Axis::X, vec![45.0]),
                crate::model::AxisCut::new(Axis::Z, vec![25.0]),
            ],
        )
        .execute(&mut voids, &assembly)
        .unwrap();
        let panels = synthesize(&voids, &assembly, &PanelEdits::default()).unwrap();
        let dividers: Vec<_> = panels.dividers().collect();
        assert_eq!(dividers.len(), 2);
        for d in dividers {
            let full = d.body.width() * d.body.height();
            assert!(signed_area(&d.outline) < full);
            assert_eq!(d.bands.len(), 5);
        }
    }

    #[test]
    fn feet_hang_below_walls() {
        let mut voids = VoidTree::new();
        let mut config = BoxConfig::new(100.0, 80.0, 60.0);
        config.assembly.feet = Some(FeetConfig::default());
        let assembly = Assembly::new(config, Faces::all_solid(), &mut voids).unwrap();
        let panels = synthesize(&voids, &assembly, &PanelEdits::default()).unwrap();
        let front = panels.get(&PanelId::Face(FaceId::Front)).unwrap();
        let lowest = front.outline.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        assert_abs_diff_eq!(lowest, -40.0 - 10.0);
        let bottom = panels.get(&PanelId::Face(FaceId::Bottom)).unwrap();
        let lowest = bottom.outline.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        assert_abs_diff_eq!(lowest, -30.0);
    }
}
