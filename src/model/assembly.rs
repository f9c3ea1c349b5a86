use tracing::debug;

use crate::error::{Result, StructuralViolation};
use crate::math::{Axis, Bounds3, Point3};

use super::config::{AssemblyConfig, BoxConfig, LidConfig, TabDirection};
use super::face::{FaceId, Faces};
use super::void_tree::{VoidId, VoidNode, VoidTree};

/// One box: its configuration, face set and the voids it owns.
///
/// `root` is the interior between the walls (and between inset lids).
/// `lid_caps` are the leaf voids above inset lids; they hang outside the
/// root's tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub config: BoxConfig,
    pub faces: Faces,
    pub root: VoidId,
    pub lid_caps: Vec<VoidId>,
}

impl Assembly {
    /// Builds a box and its root void.
    ///
    /// # Errors
    ///
    /// Returns `StructuralViolation::InvalidConfig` if the configuration is
    /// invalid or leaves no interior.
    pub fn new(config: BoxConfig, faces: Faces, voids: &mut VoidTree) -> Result<Self> {
        config.validate()?;
        let mut assembly = Self {
            config,
            faces,
            root: VoidId::default(),
            lid_caps: Vec::new(),
        };
        let interior = assembly.interior_bounds()?;
        assembly.root = voids.add(VoidNode::leaf(interior, None));
        assembly.sync_lid_caps(voids)?;
        debug!(root = ?assembly.root, "created assembly");
        Ok(assembly)
    }

    #[must_use]
    pub fn thickness(&self) -> f64 {
        self.config.material_thickness
    }

    /// Outer envelope in box-local coordinates.
    #[must_use]
    pub fn outer_bounds(&self) -> Bounds3 {
        Bounds3::new(
            0.0,
            0.0,
            0.0,
            self.config.width,
            self.config.height,
            self.config.depth,
        )
    }

    /// Lid descriptor of `face`, or `None` for walls.
    #[must_use]
    pub fn lid(&self, face: FaceId) -> Option<&LidConfig> {
        self.config.assembly.lid(face)
    }

    /// `true` if `face` is a solid lid sunk below the box edge.
    #[must_use]
    pub fn is_inset_lid(&self, face: FaceId) -> bool {
        self.faces.is_solid(face) && self.lid(face).is_some_and(|lid| lid.inset > 0.0)
    }

    /// `true` if `face` is a solid panel flush with the box edge.
    #[must_use]
    pub fn is_flush_solid(&self, face: FaceId) -> bool {
        self.faces.is_solid(face) && !self.is_inset_lid(face)
    }

    /// Material between the outer boundary at `face` and the interior.
    fn side_depth(&self, face: FaceId) -> f64 {
        if !self.faces.is_solid(face) {
            0.0
        } else if let Some(lid) = self.lid(face).filter(|lid| lid.inset > 0.0) {
            lid.inset + self.thickness()
        } else {
            self.thickness()
        }
    }

    /// Interior between the walls: the root void's bounds.
    ///
    /// # Errors
    ///
    /// Returns `StructuralViolation::InvalidConfig` if the walls and inset
    /// lids leave no room.
    pub fn interior_bounds(&self) -> Result<Bounds3> {
        let mut bounds = self.outer_bounds();
        for axis in Axis::ALL {
            let lo = self.side_depth(FaceId::from_axis_side(axis, false));
            let hi = self.config.extent(axis) - self.side_depth(FaceId::from_axis_side(axis, true));
            if hi - lo <= 0.0 {
                return Err(StructuralViolation::InvalidConfig(format!(
                    "no interior left along {axis}"
                ))
                .into());
            }
            bounds = bounds.with_span(axis, lo, hi - lo);
        }
        Ok(bounds)
    }

    /// Slab occupied by an inset lid panel.
    #[must_use]
    pub fn inset_lid_slab(&self, face: FaceId, interior: &Bounds3) -> Option<Bounds3> {
        let inset = self.lid(face)?.inset;
        if !self.is_inset_lid(face) {
            return None;
        }
        let axis = face.normal_axis();
        let t = self.thickness();
        let lo = if face.is_high() {
            self.config.extent(axis) - inset - t
        } else {
            inset
        };
        Some(interior.with_span(axis, lo, t))
    }

    fn cap_bounds(&self, face: FaceId, inset: f64, interior: &Bounds3) -> Bounds3 {
        let axis = face.normal_axis();
        let lo = if face.is_high() {
            self.config.extent(axis) - inset
        } else {
            0.0
        };
        interior.with_span(axis, lo, inset)
    }

    /// Creates, moves or removes the cap voids so there is exactly one per
    /// inset lid. Existing caps keep their ids.
    fn sync_lid_caps(&mut self, voids: &mut VoidTree) -> Result<()> {
        let interior = self.interior_bounds()?;
        let mut caps = Vec::new();
        for face in FaceId::ALL {
            let existing = self
                .lid_caps
                .iter()
                .copied()
                .find(|&id| voids.node(id).is_ok_and(|n| n.lid_inset_side == Some(face)));
            let wanted = self
                .lid(face)
                .filter(|_| self.is_inset_lid(face))
                .map(|lid| self.cap_bounds(face, lid.inset, &interior));
            match (existing, wanted) {
                (Some(id), Some(bounds)) => {
                    voids.node_mut(id)?.bounds = bounds;
                    caps.push(id);
                }
                (None, Some(bounds)) => {
                    let mut node = VoidNode::leaf(bounds, None);
                    node.lid_inset_side = Some(face);
                    caps.push(voids.add(node));
                }
                (Some(id), None) => {
                    voids.remove_leaf(id)?;
                }
                (None, None) => {}
            }
        }
        self.lid_caps = caps;
        Ok(())
    }

    /// Whether `face` carries the tabs on its joint with `neighbour`.
    ///
    /// A lid carries them iff it is `TabsOut`; between two walls the one with
    /// the higher [`FaceId::wall_rank`] does.
    #[must_use]
    pub fn carries_tabs(&self, face: FaceId, neighbour: FaceId) -> bool {
        if let Some(lid) = self.lid(face) {
            return lid.tab_direction == TabDirection::TabsOut;
        }
        if let Some(lid) = self.lid(neighbour) {
            return lid.tab_direction == TabDirection::TabsIn;
        }
        face.wall_rank() > neighbour.wall_rank()
    }

    /// Whether dividers across `axis` are forbidden in the root void: both
    /// faces perpendicular to the axis are open, so nothing would hold them.
    #[must_use]
    pub fn is_blocked(&self, axis: Axis) -> bool {
        !self.faces.is_solid(FaceId::from_axis_side(axis, false))
            && !self.faces.is_solid(FaceId::from_axis_side(axis, true))
    }

    /// Re-lays-out the root void, its descendants and the lid caps after a
    /// change of faces or dimensions.
    ///
    /// # Errors
    ///
    /// Returns a `StructuralViolation` if the new layout is invalid.
    pub fn relayout(&mut self, voids: &mut VoidTree) -> Result<()> {
        let interior = self.interior_bounds()?;
        if let Some(partition) = &voids.node(self.root)?.partition {
            for (axis, _) in partition.cuts() {
                if self.is_blocked(axis) {
                    return Err(StructuralViolation::AxisBlocked(axis).into());
                }
            }
        }
        voids.relayout(self.root, interior, self.thickness())?;
        self.sync_lid_caps(voids)
    }

    /// Opens or closes one face.
    ///
    /// # Errors
    ///
    /// Returns a `StructuralViolation` if the resulting layout is invalid.
    pub fn set_face_solid(&mut self, voids: &mut VoidTree, face: FaceId, solid: bool) -> Result<()> {
        self.faces.set_solid(face, solid);
        self.relayout(voids)?;
        debug!(%face, solid, "toggled face");
        Ok(())
    }
}

/// A nested box anchored inside a leaf void.
#[derive(Debug, Clone, PartialEq)]
pub struct SubAssembly {
    /// Gap between the host void's walls and the nested box.
    pub clearance: f64,
    pub assembly: Assembly,
}

impl SubAssembly {
    /// Origin of the nested box in its host's coordinates.
    #[must_use]
    pub fn origin(&self, host: &Bounds3) -> Point3 {
        let c = self.clearance;
        Point3::new(host.x + c, host.y + c, host.z + c)
    }

    /// Resizes the nested box to fill `host` minus the clearance.
    ///
    /// # Errors
    ///
    /// Returns `StructuralViolation::SubAssemblyDoesNotFit` if any side
    /// becomes too small, or another violation if its own voids no longer fit.
    pub fn resize(&mut self, voids: &mut VoidTree, host: &Bounds3) -> Result<()> {
        self.assembly.config = fitted_config(&self.assembly.config, host, self.clearance)?;
        self.assembly.relayout(voids)
    }
}

fn fitted_config(base: &BoxConfig, host: &Bounds3, clearance: f64) -> Result<BoxConfig> {
    let mut config = base.clone();
    let t = config.material_thickness;
    for axis in Axis::ALL {
        let extent = host.extent(axis) - 2.0 * clearance;
        if extent <= 2.0 * t {
            return Err(StructuralViolation::SubAssemblyDoesNotFit(format!(
                "{axis} extent {extent} leaves no room inside {t} mm walls"
            ))
            .into());
        }
        config.set_extent(axis, extent);
    }
    Ok(config)
}

/// Nests a new box inside a leaf void.
pub struct CreateSubAssembly {
    void_id: VoidId,
    clearance: f64,
    axis: Axis,
    material_thickness: Option<f64>,
}

impl CreateSubAssembly {
    /// Creates a new `CreateSubAssembly` operation.
    ///
    /// `material_thickness` defaults to the parent's.
    #[must_use]
    pub fn new(void_id: VoidId, clearance: f64, axis: Axis, material_thickness: Option<f64>) -> Self {
        Self {
            void_id,
            clearance,
            axis,
            material_thickness,
        }
    }

    /// Executes the operation inside `parent`.
    ///
    /// # Errors
    ///
    /// Returns a `StructuralViolation` if the target is not a free leaf or the
    /// nested box does not fit.
    pub fn execute(self, voids: &mut VoidTree, parent: &Assembly) -> Result<()> {
        let node = voids.node(self.void_id)?;
        let id = format!("{:?}", self.void_id);
        if node.lid_inset_side.is_some() {
            return Err(StructuralViolation::LidInset(id).into());
        }
        if node.sub_assembly.is_some() {
            return Err(StructuralViolation::HostsSubAssembly(id).into());
        }
        if !node.is_leaf() {
            return Err(StructuralViolation::NotALeaf(id).into());
        }
        if self.clearance.is_nan() || self.clearance < 0.0 {
            return Err(StructuralViolation::SubAssemblyDoesNotFit(format!(
                "clearance {} must not be negative",
                self.clearance
            ))
            .into());
        }
        let host = node.bounds;

        let mut base = parent.config.clone();
        base.material_thickness = self.material_thickness.unwrap_or(parent.thickness());
        base.assembly = AssemblyConfig::on_axis(self.axis);
        let config = fitted_config(&base, &host, self.clearance)?;

        let assembly = Assembly::new(config, Faces::all_solid(), voids)?;
        voids.node_mut(self.void_id)?.sub_assembly = Some(SubAssembly {
            clearance: self.clearance,
            assembly,
        });
        debug!(host = ?self.void_id, "created sub-assembly");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn enclosed(voids: &mut VoidTree) -> Assembly {
        Assembly::new(BoxConfig::new(100.0, 80.0, 60.0), Faces::all_solid(), voids).unwrap()
    }

    #[test]
    fn root_is_interior_of_solid_faces() {
        let mut voids = VoidTree::new();
        let a = enclosed(&mut voids);
        let root = voids.node(a.root).unwrap().bounds;
        assert_abs_diff_eq!(root.x, 3.0);
        assert_abs_diff_eq!(root.w, 94.0);
        assert_abs_diff_eq!(root.h, 74.0);
        assert_abs_diff_eq!(root.d, 54.0);
        assert!(a.lid_caps.is_empty());
    }

    #[test]
    fn open_face_extends_interior() {
        let mut voids = VoidTree::new();
        let a = Assembly::new(
            BoxConfig::new(100.0, 80.0, 60.0),
            Faces::with_open(&[FaceId::Top]),
            &mut voids,
        )
        .unwrap();
        let root = voids.node(a.root).unwrap().bounds;
        assert_abs_diff_eq!(root.max(Axis::Y), 80.0);
    }

    #[test]
    fn inset_lid_creates_cap() {
        let mut voids = VoidTree::new();
        let mut config = BoxConfig::new(100.0, 80.0, 60.0);
        config.assembly.positive_lid.inset = 10.0;
        let a = Assembly::new(config, Faces::all_solid(), &mut voids).unwrap();
        assert_eq!(a.lid_caps.len(), 1);
        let cap = voids.node(a.lid_caps[0]).unwrap();
        assert_eq!(cap.lid_inset_side, Some(FaceId::Top));
        assert_abs_diff_eq!(cap.bounds.min(Axis::Y), 70.0);
        let root = voids.node(a.root).unwrap().bounds;
        assert_abs_diff_eq!(root.max(Axis::Y), 67.0);
    }

    #[test]
    fn mating_table_is_exclusive() {
        let mut voids = VoidTree::new();
        let a = enclosed(&mut voids);
        for f in FaceId::ALL {
            for g in FaceId::ALL {
                if f.normal_axis() != g.normal_axis() {
                    assert_ne!(a.carries_tabs(f, g), a.carries_tabs(g, f), "{f} vs {g}");
                }
            }
        }
    }

    #[test]
    fn blocking_needs_both_faces_open() {
        let mut voids = VoidTree::new();
        let mut a = enclosed(&mut voids);
        assert!(!a.is_blocked(Axis::X));
        a.set_face_solid(&mut voids, FaceId::Left, false).unwrap();
        assert!(!a.is_blocked(Axis::X));
        a.set_face_solid(&mut voids, FaceId::Right, false).unwrap();
        assert!(a.is_blocked(Axis::X));
    }

    #[test]
    fn sub_assembly_must_fit() {
        let mut voids = VoidTree::new();
        let a = enclosed(&mut voids);
        let err = CreateSubAssembly::new(a.root, 30.0, Axis::Y, None).execute(&mut voids, &a);
        assert!(matches!(
            err,
            Err(crate::error::BoxError::Structural(
                StructuralViolation::SubAssemblyDoesNotFit(_)
            ))
        ));
        CreateSubAssembly::new(a.root, 2.0, Axis::Z, Some(2.0))
            .execute(&mut voids, &a)
            .unwrap();
        let sub = voids.node(a.root).unwrap().sub_assembly.clone().unwrap();
        assert_abs_diff_eq!(sub.assembly.config.width, 90.0);
        assert_abs_diff_eq!(sub.assembly.thickness(), 2.0);
        assert_eq!(sub.assembly.config.assembly.axis, Axis::Z);
    }
}
