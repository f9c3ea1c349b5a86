use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};

use crate::error::{GeometryViolation, Result};
use crate::math::{Point2, TOLERANCE};
use crate::panels::PanelPath;

use super::TriangleMesh;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Extrudes a panel outline with its holes into a closed world-space mesh.
pub struct TessellatePanel<'a> {
    panel: &'a PanelPath,
}

impl<'a> TessellatePanel<'a> {
    #[must_use]
    pub fn new(panel: &'a PanelPath) -> Self {
        Self { panel }
    }

    /// Executes the tessellation.
    ///
    /// # Errors
    ///
    /// Returns `GeometryViolation::Degenerate` if a loop cannot be
    /// triangulated (too few points or self-crossing).
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<TriangleMesh> {
        let panel = self.panel;
        let half = panel.thickness * 0.5;
        let normal = panel.frame.normal_vector();

        let mut cdt = Cdt::new();
        insert_constraint_loop(&mut cdt, &panel.outline)?;
        for hole in &panel.holes {
            insert_constraint_loop(&mut cdt, &hole.points)?;
        }
        let interior = classify_interior_faces(&cdt);

        let mut mesh = TriangleMesh::default();

        // Caps: top at +t/2 facing the normal, bottom at -t/2 reversed.
        for (w, n, flip) in [(half, normal, false), (-half, -normal, true)] {
            let mut vertex_map: HashMap<usize, u32> = HashMap::new();
            for face in cdt.inner_faces() {
                if !interior.contains(&face.fix().index()) {
                    continue;
                }
                let mut tri = [0u32; 3];
                for (i, vh) in face.vertices().iter().enumerate() {
                    let key = vh.fix().index();
                    tri[i] = *vertex_map.entry(key).or_insert_with(|| {
                        let pos = vh.position();
                        let local = Point2::new(pos.x, pos.y);
                        let idx = mesh.vertices.len() as u32;
                        mesh.vertices.push(panel.frame.to_world(&local, w));
                        mesh.normals.push(n);
                        mesh.uvs.push(local);
                        idx
                    });
                }
                if flip {
                    tri.swap(1, 2);
                }
                mesh.indices.push(tri);
            }
        }

        let loops = std::iter::once(panel.outline.as_slice())
            .chain(panel.holes.iter().map(|h| h.points.as_slice()));
        for points in loops {
            add_side_walls(&mut mesh, panel, points, half);
        }
        Ok(mesh)
    }
}

/// Tessellates one panel. See [`TessellatePanel`].
///
/// # Errors
///
/// Returns `GeometryViolation::Degenerate` if the outline cannot be
/// triangulated.
pub fn tessellate_panel(panel: &PanelPath) -> Result<TriangleMesh> {
    TessellatePanel::new(panel).execute()
}

/// One flat-shaded quad per loop segment. The outward side is to the right
/// of travel for both counter-clockwise outlines and clockwise holes.
#[allow(clippy::cast_possible_truncation)]
fn add_side_walls(mesh: &mut TriangleMesh, panel: &PanelPath, points: &[Point2], half: f64) {
    let (eu, ev) = panel.frame.axis_vectors();

    let n = points.len();
    let mut along = 0.0;
    for i in 0..n {
        let (a, b) = (points[i], points[(i + 1) % n]);
        let d = b - a;
        let len = d.norm();
        if len < TOLERANCE {
            continue;
        }
        let outward = (eu * d.y - ev * d.x) / len;
        let base = mesh.vertices.len() as u32;
        for (p, w, s) in [(a, -half, along), (b, -half, along + len), (b, half, along + len), (a, half, along)] {
            mesh.vertices.push(panel.frame.to_world(&p, w));
            mesh.normals.push(outward);
            mesh.uvs.push(Point2::new(s, w));
        }
        mesh.indices.push([base, base + 1, base + 2]);
        mesh.indices.push([base, base + 2, base + 3]);
        along += len;
    }
}

/// Inserts a closed polygon as constraint edges into the CDT.
fn insert_constraint_loop(cdt: &mut Cdt, points: &[Point2]) -> Result<()> {
    if points.len() < 3 {
        return Err(GeometryViolation::Degenerate("constraint loop needs at least 3 points".into()).into());
    }

    let mut handles = Vec::with_capacity(points.len());
    for p in points {
        let h = cdt
            .insert(SpadePoint2::new(p.x, p.y))
            .map_err(|e: InsertionError| GeometryViolation::Degenerate(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(GeometryViolation::Degenerate("loop crosses itself".into()).into());
        }
        cdt.add_constraint(from, to);
    }
    Ok(())
}

/// Inner faces lying inside the panel material.
///
/// Flood-fills from the faces next to the convex hull; crossing a constraint
/// edge flips inside/outside, so odd depth means material.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();
    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        let Some(inner) = edge.rev().face().as_inner() else {
            continue;
        };
        let idx = inner.fix().index();
        if depth_map.contains_key(&idx) {
            continue;
        }
        let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
        depth_map.insert(idx, depth);
        if depth % 2 == 1 {
            interior.insert(idx);
        }
        queue.push_back((inner.fix(), depth));
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        for edge in cdt.face(face_fix).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let idx = neighbor.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let next = depth + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, next);
            if next % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((neighbor.fix(), next));
        }
    }
    interior
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::polygon_2d::signed_area;
    use crate::math::Axis;
    use crate::model::{Assembly, BoxConfig, FaceId, Faces, Subdivide, VoidTree};
    use crate::panels::{synthesize, PanelEdits, PanelId};
    use approx::assert_abs_diff_eq;

    fn material_volume(panel: &PanelPath) -> f64 {
        let area = signed_area(&panel.outline)
            + panel.holes.iter().map(|h| signed_area(&h.points)).sum::<f64>();
        area * panel.thickness
    }

    #[test]
    fn plain_panels_extrude_to_closed_solids() {
        let mut voids = VoidTree::new();
        let assembly = Assembly::new(
            BoxConfig::new(100.0, 80.0, 60.0),
            Faces::with_open(&[FaceId::Top]),
            &mut voids,
        )
        .unwrap();
        let panels = synthesize(&voids, &assembly, &PanelEdits::default()).unwrap();
        for panel in panels.iter() {
            let mesh = tessellate_panel(panel).unwrap();
            assert_abs_diff_eq!(mesh.volume(), material_volume(panel), epsilon = 1e-6);
            assert_eq!(mesh.vertices.len(), mesh.normals.len());
        }
    }

    #[test]
    fn slot_holes_are_left_open() {
        let mut voids = VoidTree::new();
        let assembly =
            Assembly::new(BoxConfig::new(100.0, 80.0, 60.0), Faces::all_solid(), &mut voids).unwrap();
        Subdivide::new(assembly.root, Axis::X, vec![50.0])
            .execute(&mut voids, &assembly)
            .unwrap();
        let panels = synthesize(&voids, &assembly, &PanelEdits::default()).unwrap();
        let bottom = panels.panel(&PanelId::Face(FaceId::Bottom)).unwrap();
        assert!(!bottom.holes.is_empty());
        let mesh = tessellate_panel(bottom).unwrap();
        assert_abs_diff_eq!(mesh.volume(), material_volume(bottom), epsilon = 1e-6);
    }

    #[test]
    fn top_cap_faces_the_panel_normal() {
        let mut voids = VoidTree::new();
        let assembly =
            Assembly::new(BoxConfig::new(100.0, 80.0, 60.0), Faces::all_solid(), &mut voids).unwrap();
        let panels = synthesize(&voids, &assembly, &PanelEdits::default()).unwrap();
        let front = panels.panel(&PanelId::Face(FaceId::Front)).unwrap();
        let mesh = tessellate_panel(front).unwrap();
        let normal = front.frame.normal_vector();
        let [a, b, c] = mesh.indices[0].map(|i| mesh.vertices[i as usize]);
        let face_normal = (b - a).cross(&(c - a)).normalize();
        assert_abs_diff_eq!(face_normal.dot(&normal), 1.0, epsilon = 1e-9);
    }
}
