use tracing::trace;

use crate::error::{GeometryViolation, Result, StructuralViolation};
use crate::math::TOLERANCE;
use crate::model::{
    Assembly, BoxConfig, CreateSubAssembly, Faces, GridSubdivide, SetDividerPosition, Subdivide,
    VoidId, VoidTree,
};
use crate::panels::{synthesize, PanelCollection, PanelEdits, SafeAreaState};

use super::action::{Action, AssemblyTarget};

/// A complete box design: the void arena, the primary assembly and the
/// panel-level edits.
///
/// Everything a preview needs to diverge from the committed design lives in
/// here, so a preview is simply a second `Scene`.
#[derive(Debug, Clone)]
pub struct Scene {
    pub voids: VoidTree,
    pub primary: Assembly,
    pub edits: PanelEdits,
}

impl Scene {
    /// Builds a scene holding a single box.
    ///
    /// # Errors
    ///
    /// Returns `StructuralViolation::InvalidConfig` if the configuration is
    /// invalid.
    pub fn new(config: BoxConfig, faces: Faces) -> Result<Self> {
        let mut voids = VoidTree::new();
        let primary = Assembly::new(config, faces, &mut voids)?;
        Ok(Self {
            voids,
            primary,
            edits: PanelEdits::default(),
        })
    }

    /// Synthesizes the panels of this scene.
    ///
    /// # Errors
    ///
    /// Returns an error only if the void tree is inconsistent.
    pub fn panels(&self) -> Result<PanelCollection> {
        synthesize(&self.voids, &self.primary, &self.edits)
    }

    /// Leaf voids of the primary assembly.
    ///
    /// # Errors
    ///
    /// Returns an error only if the void tree is inconsistent.
    pub fn leaves(&self) -> Result<Vec<VoidId>> {
        self.voids.leaves(self.primary.root)
    }

    /// The assembly whose void tree contains `void_id`.
    ///
    /// # Errors
    ///
    /// Returns `StructuralViolation::UnknownVoid` if no assembly owns it.
    pub fn assembly_of(&self, void_id: VoidId) -> Result<Assembly> {
        let top = self.voids.top(void_id)?;
        let owns = |a: &Assembly| a.root == top || a.lid_caps.contains(&top);
        if owns(&self.primary) {
            return Ok(self.primary.clone());
        }
        self.voids
            .iter()
            .filter_map(|(_, node)| node.sub_assembly.as_ref())
            .map(|sub| &sub.assembly)
            .find(|a| owns(a))
            .cloned()
            .ok_or_else(|| StructuralViolation::UnknownVoid(format!("{void_id:?}")).into())
    }

    /// Applies one action in place.
    ///
    /// On error the scene may be partly modified; callers apply actions to a
    /// copy and keep it only on success.
    ///
    /// # Errors
    ///
    /// Returns the `StructuralViolation` or `GeometryViolation` that rejects
    /// the action.
    pub fn apply(&mut self, action: &Action) -> Result<()> {
        trace!(action = action.kind(), "applying");
        match action {
            Action::AddSubdivisions {
                void_id,
                axis,
                positions,
            } => {
                let assembly = self.assembly_of(*void_id)?;
                Subdivide::new(*void_id, *axis, positions.clone()).execute(&mut self.voids, &assembly)?;
            }
            Action::AddGridSubdivision { void_id, cuts } => {
                let assembly = self.assembly_of(*void_id)?;
                GridSubdivide::new(*void_id, cuts.clone()).execute(&mut self.voids, &assembly)?;
            }
            Action::CreateSubAssembly {
                void_id,
                clearance,
                axis,
                material_thickness,
            } => {
                let assembly = self.assembly_of(*void_id)?;
                CreateSubAssembly::new(*void_id, *clearance, *axis, *material_thickness)
                    .execute(&mut self.voids, &assembly)?;
            }
            Action::SetDividerPosition {
                subdivision,
                position,
            } => {
                let thickness = self.assembly_of(subdivision.parent)?.thickness();
                SetDividerPosition::new(*subdivision, *position).execute(&mut self.voids, thickness)?;
            }
            Action::SetFaceSolid { target, face, solid } => match target {
                AssemblyTarget::Primary => self.primary.set_face_solid(&mut self.voids, *face, *solid)?,
                AssemblyTarget::SubAssembly(host) => {
                    let mut sub = self.voids.node_mut(*host)?.sub_assembly.take().ok_or_else(|| {
                        StructuralViolation::UnknownVoid(format!("sub-assembly at {host:?}"))
                    })?;
                    let toggled = sub.assembly.set_face_solid(&mut self.voids, *face, *solid);
                    self.voids.node_mut(*host)?.sub_assembly = Some(sub);
                    toggled?;
                }
            },
            Action::SetEdgeExtension { panel, edge, value } => {
                let panels = self.panels()?;
                let path = panels.panel(panel)?;
                let locked = path.edge(*edge).is_none_or(|info| info.joint.is_some());
                if locked {
                    return Err(GeometryViolation::EdgeLocked(format!("{panel}:{edge}")).into());
                }
                let extent = if edge.is_u_side() { path.width } else { path.height };
                let opposite = self.edits.extension(*panel, edge.opposite());
                let available = extent + opposite - 2.0 * path.thickness;
                if *value < -available {
                    return Err(GeometryViolation::ExtensionExceedsMaterial {
                        value: *value,
                        available,
                    }
                    .into());
                }

                let from = edge.coordinate(&path.body);
                let to = from + edge.outward_sign() * (value - self.edits.extension(*panel, *edge));
                if let Some(state) = self.edits.safe_areas.get(panel) {
                    let rebased = state.rebase(*edge, edge.with_coordinate(&path.body, to))?;
                    self.edits.safe_areas.insert(*panel, rebased);
                }
                self.edits.move_edge_fillets(*panel, *edge, from, to);

                if value.abs() < TOLERANCE {
                    self.edits.extensions.remove(&(*panel, *edge));
                } else {
                    self.edits.extensions.insert((*panel, *edge), *value);
                }
            }
            Action::ApplyEdgeOperation {
                panel,
                operation,
                shape,
            } => {
                let panels = self.panels()?;
                let path = panels.panel(panel)?;
                let state = self
                    .edits
                    .safe_areas
                    .get(panel)
                    .cloned()
                    .unwrap_or_else(|| SafeAreaState::new(path.body));
                let next = state.apply(*operation, shape, &path.bands)?;
                self.edits.safe_areas.insert(*panel, next);
            }
            Action::SetCornerFillet {
                panel,
                corner,
                radius,
            } => {
                let panels = self.panels()?;
                let path = panels.panel(panel)?;
                let eligibility = path
                    .corner(*corner)
                    .ok_or_else(|| GeometryViolation::UnknownCorner(format!("{panel}:{corner}")))?;
                if *radius <= 0.0 {
                    self.edits.set_fillet(*panel, eligibility.position, 0.0);
                    return Ok(());
                }
                if !eligibility.eligible {
                    return Err(GeometryViolation::CornerNotEligible(format!("{panel}:{corner}")).into());
                }
                if *radius > eligibility.max_radius + TOLERANCE {
                    return Err(GeometryViolation::RadiusExceedsMax {
                        radius: *radius,
                        max: eligibility.max_radius,
                    }
                    .into());
                }
                self.edits.set_fillet(*panel, eligibility.position, *radius);
            }
        }
        Ok(())
    }
}
