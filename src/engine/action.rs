use crate::geometry::Shape;
use crate::math::Axis;
use crate::model::{AxisCut, FaceId, SubdivisionId, VoidId};
use crate::panels::{CornerId, EdgeOperation, EdgeSide, PanelId};

/// The assembly a face toggle applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyTarget {
    Primary,
    /// The sub-assembly hosted by this void.
    SubAssembly(VoidId),
}

/// A structural or panel-level edit of the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Splits a leaf void along one axis.
    AddSubdivisions {
        void_id: VoidId,
        axis: Axis,
        positions: Vec<f64>,
    },
    /// Splits a leaf void along several axes into a grid of leaves.
    AddGridSubdivision { void_id: VoidId, cuts: Vec<AxisCut> },
    /// Nests a box inside a leaf void.
    CreateSubAssembly {
        void_id: VoidId,
        clearance: f64,
        axis: Axis,
        material_thickness: Option<f64>,
    },
    /// Grows (positive) or shrinks (negative) an unlocked edge. Zero clears it.
    SetEdgeExtension {
        panel: PanelId,
        edge: EdgeSide,
        value: f64,
    },
    /// Moves one divider.
    SetDividerPosition {
        subdivision: SubdivisionId,
        position: f64,
    },
    /// Adds or removes material on a panel's editable area.
    ApplyEdgeOperation {
        panel: PanelId,
        operation: EdgeOperation,
        shape: Shape,
    },
    /// Rounds a corner. A radius of zero or less clears it.
    SetCornerFillet {
        panel: PanelId,
        corner: CornerId,
        radius: f64,
    },
    /// Opens or closes a face.
    SetFaceSolid {
        target: AssemblyTarget,
        face: FaceId,
        solid: bool,
    },
}

impl Action {
    /// Stable name of the action, as used by the operation registry.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Action::AddSubdivisions { .. } => "add_subdivisions",
            Action::AddGridSubdivision { .. } => "add_grid_subdivision",
            Action::CreateSubAssembly { .. } => "create_sub_assembly",
            Action::SetEdgeExtension { .. } => "set_edge_extension",
            Action::SetDividerPosition { .. } => "set_divider_position",
            Action::ApplyEdgeOperation { .. } => "apply_edge_operation",
            Action::SetCornerFillet { .. } => "set_corner_fillet",
            Action::SetFaceSolid { .. } => "set_face_solid",
        }
    }
}
