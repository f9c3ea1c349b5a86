use std::fmt;

use crate::error::{GeometryViolation, Result};
use crate::math::{Axis, Point2, Point3, Rect2};
use crate::model::{FaceId, SubdivisionId, VoidId};

use super::frame::PanelFrame;

/// Stable identifier of a synthesized panel.
///
/// Panel-level edits are keyed by this id, so it only depends on the
/// structural element the panel comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PanelId {
    /// An outer face of the primary assembly (flush or inset lid).
    Face(FaceId),
    /// A divider, in the primary assembly or in any sub-assembly.
    Divider(SubdivisionId),
    /// An outer face of the sub-assembly hosted by `sub_assembly`.
    SubAssemblyFace { sub_assembly: VoidId, face: FaceId },
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelId::Face(face) => write!(f, "face-{face}"),
            PanelId::Divider(id) => write!(f, "divider-{:?}-{}{}", id.parent, id.axis, id.index),
            PanelId::SubAssemblyFace { sub_assembly, face } => {
                write!(f, "sub-{sub_assembly:?}-face-{face}")
            }
        }
    }
}

/// What a panel was synthesized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelSource {
    Face { face: FaceId },
    Divider { subdivision: SubdivisionId, axis: Axis },
    SubAssemblyFace { sub_assembly: VoidId, face: FaceId },
}

/// One of the four local edges of a panel.
///
/// `Top`/`Bottom` sit at the maximum/minimum of the local `v` axis,
/// `Right`/`Left` at the maximum/minimum of `u`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeSide {
    Top,
    Right,
    Bottom,
    Left,
}

impl EdgeSide {
    /// Sides in counter-clockwise outline order.
    pub const ALL: [EdgeSide; 4] = [
        EdgeSide::Bottom,
        EdgeSide::Right,
        EdgeSide::Top,
        EdgeSide::Left,
    ];

    /// `true` for the sides whose position is a `u` coordinate.
    #[must_use]
    pub fn is_u_side(self) -> bool {
        matches!(self, EdgeSide::Left | EdgeSide::Right)
    }

    /// `+1` if the outward direction is towards increasing coordinates.
    #[must_use]
    pub fn outward_sign(self) -> f64 {
        match self {
            EdgeSide::Top | EdgeSide::Right => 1.0,
            EdgeSide::Bottom | EdgeSide::Left => -1.0,
        }
    }

    /// Next side counter-clockwise.
    #[must_use]
    pub fn next(self) -> EdgeSide {
        match self {
            EdgeSide::Bottom => EdgeSide::Right,
            EdgeSide::Right => EdgeSide::Top,
            EdgeSide::Top => EdgeSide::Left,
            EdgeSide::Left => EdgeSide::Bottom,
        }
    }

    /// Previous side counter-clockwise.
    #[must_use]
    pub fn prev(self) -> EdgeSide {
        match self {
            EdgeSide::Bottom => EdgeSide::Left,
            EdgeSide::Right => EdgeSide::Bottom,
            EdgeSide::Top => EdgeSide::Right,
            EdgeSide::Left => EdgeSide::Top,
        }
    }

    #[must_use]
    pub fn opposite(self) -> EdgeSide {
        match self {
            EdgeSide::Bottom => EdgeSide::Top,
            EdgeSide::Right => EdgeSide::Left,
            EdgeSide::Top => EdgeSide::Bottom,
            EdgeSide::Left => EdgeSide::Right,
        }
    }

    /// Coordinate of this side of `rect`.
    #[must_use]
    pub fn coordinate(self, rect: &Rect2) -> f64 {
        match self {
            EdgeSide::Bottom => rect.min.y,
            EdgeSide::Right => rect.max.x,
            EdgeSide::Top => rect.max.y,
            EdgeSide::Left => rect.min.x,
        }
    }

    /// `rect` with this side moved to `value`.
    #[must_use]
    pub fn with_coordinate(self, rect: &Rect2, value: f64) -> Rect2 {
        let mut moved = *rect;
        match self {
            EdgeSide::Bottom => moved.min.y = value,
            EdgeSide::Right => moved.max.x = value,
            EdgeSide::Top => moved.max.y = value,
            EdgeSide::Left => moved.min.x = value,
        }
        moved
    }

    /// Component of `p` across this side (the coordinate the side fixes).
    #[must_use]
    pub fn across(self, p: &Point2) -> f64 {
        if self.is_u_side() { p.x } else { p.y }
    }

    /// Component of `p` along this side.
    #[must_use]
    pub fn along(self, p: &Point2) -> f64 {
        if self.is_u_side() { p.y } else { p.x }
    }
}

impl fmt::Display for EdgeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdgeSide::Top => "top",
            EdgeSide::Right => "right",
            EdgeSide::Bottom => "bottom",
            EdgeSide::Left => "left",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStatus {
    /// Meets a solid panel; rejects extension and boolean edits.
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    /// Finger joint between two outer faces.
    Finger,
    /// Tabs of a divider or inset lid entering slot holes of the mate.
    TSlot,
}

/// Joint on one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeJoint {
    pub kind: JointKind,
    /// `true` if this edge carries the tabs, `false` if it is slotted.
    pub tabs_out: bool,
    pub depth: f64,
    pub mate: PanelId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeInfo {
    pub side: EdgeSide,
    pub status: EdgeStatus,
    /// Applied extension, `0` for locked edges.
    pub extension: f64,
    pub joint: Option<EdgeJoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoleKind {
    /// Receives a tab of a divider or inset lid.
    Slot,
    /// Material removed by a safe-area edit.
    Cutout,
}

/// A clockwise hole loop in panel-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Hole {
    pub points: Vec<Point2>,
    pub kind: HoleKind,
}

/// Which loop of a panel a corner belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CornerLoop {
    Outline,
    /// Index into [`PanelPath::holes`].
    Hole(usize),
}

/// A corner, addressed by loop and vertex index in the unfilleted outline.
///
/// Indices shift whenever the outline changes; stored fillets are pinned to
/// the corner position instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CornerId {
    pub contour: CornerLoop,
    pub index: usize,
}

impl CornerId {
    #[must_use]
    pub fn outline(index: usize) -> Self {
        Self {
            contour: CornerLoop::Outline,
            index,
        }
    }

    #[must_use]
    pub fn hole(hole: usize, index: usize) -> Self {
        Self {
            contour: CornerLoop::Hole(hole),
            index,
        }
    }
}

impl fmt::Display for CornerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.contour {
            CornerLoop::Outline => write!(f, "outline:{}", self.index),
            CornerLoop::Hole(h) => write!(f, "hole{h}:{}", self.index),
        }
    }
}

/// Fillet eligibility of one corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerEligibility {
    pub id: CornerId,
    pub position: Point2,
    pub eligible: bool,
    /// Largest fillet radius the corner accepts; `0` when ineligible.
    pub max_radius: f64,
}

/// A synthesized panel: a flat outline with holes, placed in 3D.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelPath {
    pub id: PanelId,
    pub source: PanelSource,
    /// Counter-clockwise, in panel-local coordinates.
    pub outline: Vec<Point2>,
    pub holes: Vec<Hole>,
    pub thickness: f64,
    pub frame: PanelFrame,
    /// Nominal extent along local `u`.
    pub width: f64,
    /// Nominal extent along local `v`.
    pub height: f64,
    /// One entry per side, in [`EdgeSide::ALL`] order.
    pub edges: Vec<EdgeInfo>,
    pub corners: Vec<CornerEligibility>,
    /// Strips around locked edges and lap notches that edits may not enter.
    pub bands: Vec<Rect2>,
    /// Rectangle between the edge baselines (the plain panel without joints).
    pub body: Rect2,
    pub visible: bool,
}

impl PanelPath {
    /// World position of the panel centre.
    #[must_use]
    pub fn position(&self) -> Point3 {
        self.frame.position()
    }

    /// Edge record for `side`.
    #[must_use]
    pub fn edge(&self, side: EdgeSide) -> Option<&EdgeInfo> {
        self.edges.iter().find(|e| e.side == side)
    }

    #[must_use]
    pub fn corner(&self, id: CornerId) -> Option<&CornerEligibility> {
        self.corners.iter().find(|c| c.id == id)
    }
}

/// Every panel of a scene in synthesis order: faces, inset lids, dividers,
/// then each sub-assembly's panels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelCollection {
    pub panels: Vec<PanelPath>,
}

impl PanelCollection {
    #[must_use]
    pub fn get(&self, id: &PanelId) -> Option<&PanelPath> {
        self.panels.iter().find(|p| p.id == *id)
    }

    /// Returns the panel, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns `GeometryViolation::UnknownPanel` if no panel has `id`.
    pub fn panel(&self, id: &PanelId) -> Result<&PanelPath> {
        self.get(id)
            .ok_or_else(|| GeometryViolation::UnknownPanel(id.to_string()).into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PanelPath> {
        self.panels.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Divider panels only.
    pub fn dividers(&self) -> impl Iterator<Item = &PanelPath> {
        self.panels
            .iter()
            .filter(|p| matches!(p.source, PanelSource::Divider { .. }))
    }
}
