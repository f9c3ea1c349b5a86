use std::collections::BTreeMap;

use crate::math::{Point2, TOLERANCE};

use super::path::{CornerEligibility, CornerId, EdgeSide, PanelId};
use super::safe_area::SafeAreaState;

/// A fillet pinned to the panel-local position of its corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoredFillet {
    pub position: Point2,
    pub radius: f64,
}

/// Panel-level state that is not derived from the void tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelEdits {
    pub extensions: BTreeMap<(PanelId, EdgeSide), f64>,
    pub safe_areas: BTreeMap<PanelId, SafeAreaState>,
    pub fillets: BTreeMap<PanelId, Vec<StoredFillet>>,
}

impl PanelEdits {
    /// Stored extension of an edge, `0` if none.
    #[must_use]
    pub fn extension(&self, panel: PanelId, side: EdgeSide) -> f64 {
        self.extensions.get(&(panel, side)).copied().unwrap_or(0.0)
    }

    /// Stored fillets of one panel.
    #[must_use]
    pub fn fillets_for(&self, panel: PanelId) -> &[StoredFillet] {
        self.fillets.get(&panel).map(Vec::as_slice).unwrap_or_default()
    }

    /// Stores, replaces or (with `radius <= 0`) removes the fillet at
    /// `position`.
    pub fn set_fillet(&mut self, panel: PanelId, position: Point2, radius: f64) {
        let stored = self.fillets.entry(panel).or_default();
        stored.retain(|f| (f.position - position).norm() > TOLERANCE);
        if radius > 0.0 {
            stored.push(StoredFillet { position, radius });
        }
        if stored.is_empty() {
            self.fillets.remove(&panel);
        }
    }

    /// Moves the fillets sitting on `side` of a panel along with that edge.
    ///
    /// `from` is the edge coordinate before the move, `to` after it.
    pub fn move_edge_fillets(&mut self, panel: PanelId, side: EdgeSide, from: f64, to: f64) {
        let Some(stored) = self.fillets.get_mut(&panel) else {
            return;
        };
        for fillet in stored.iter_mut() {
            if (side.across(&fillet.position) - from).abs() > TOLERANCE {
                continue;
            }
            if side.is_u_side() {
                fillet.position.x = to;
            } else {
                fillet.position.y = to;
            }
        }
    }
}

/// Matches stored fillets to the corners of a freshly built outline.
///
/// Fillets whose corner no longer exists are dropped.
#[must_use]
pub fn resolve_fillets(corners: &[CornerEligibility], stored: &[StoredFillet]) -> Vec<(CornerId, f64)> {
    stored
        .iter()
        .filter_map(|fillet| {
            corners
                .iter()
                .find(|c| (c.position - fillet.position).norm() <= TOLERANCE)
                .map(|c| (c.id, fillet.radius))
        })
        .collect()
}
