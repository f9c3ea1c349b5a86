pub mod edges;
pub mod edits;
pub mod eligibility;
pub mod fillet;
pub mod frame;
pub mod path;
pub mod safe_area;
pub mod synthesize;

pub use edits::{PanelEdits, StoredFillet};
pub use eligibility::corner_eligibility;
pub use frame::PanelFrame;
pub use path::{
    CornerEligibility, CornerId, CornerLoop, EdgeInfo, EdgeJoint, EdgeSide, EdgeStatus, Hole,
    HoleKind, JointKind, PanelCollection, PanelId, PanelPath, PanelSource,
};
pub use safe_area::{EdgeOperation, SafeAreaState};
pub use synthesize::synthesize;
