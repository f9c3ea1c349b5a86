use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StructuralViolation};
use crate::math::{Axis, Bounds3, TOLERANCE};

use super::assembly::Assembly;
use super::void_tree::{VoidId, VoidNode, VoidTree};

/// Positions of divider slabs along one axis.
///
/// Positions are offsets from the parent void's minimum and name the low
/// face of each divider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisCut {
    pub axis: Axis,
    pub positions: Vec<f64>,
}

impl AxisCut {
    #[must_use]
    pub fn new(axis: Axis, positions: Vec<f64>) -> Self {
        Self { axis, positions }
    }
}

/// How a void's children tile it.
#[derive(Debug, Clone, PartialEq)]
pub enum Partition {
    /// Dividers across one axis; `positions.len() + 1` children.
    Split { axis: Axis, positions: Vec<f64> },
    /// Full-span dividers on several axes. Children are the cross product of
    /// the per-axis spans, the first cut varying slowest.
    Grid { cuts: Vec<AxisCut> },
}

/// Identifies one divider: the `index`-th cut along `axis` of `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubdivisionId {
    pub parent: VoidId,
    pub axis: Axis,
    pub index: usize,
}

/// One divider slab produced by a partition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DividerSlab {
    pub axis: Axis,
    pub index: usize,
    pub bounds: Bounds3,
}

impl Partition {
    /// Cuts of this partition, one per axis.
    #[must_use]
    pub fn cuts(&self) -> Vec<(Axis, &[f64])> {
        match self {
            Partition::Split { axis, positions } => vec![(*axis, positions.as_slice())],
            Partition::Grid { cuts } => cuts
                .iter()
                .map(|c| (c.axis, c.positions.as_slice()))
                .collect(),
        }
    }

    fn positions_mut(&mut self, axis: Axis) -> Option<&mut Vec<f64>> {
        match self {
            Partition::Split {
                axis: split_axis,
                positions,
            } => (*split_axis == axis).then_some(positions),
            Partition::Grid { cuts } => cuts
                .iter_mut()
                .find(|c| c.axis == axis)
                .map(|c| &mut c.positions),
        }
    }

    /// Bounds of each child within `parent`, in child order.
    ///
    /// # Errors
    ///
    /// Returns a `StructuralViolation` if a position does not fit `parent`.
    pub fn child_bounds(&self, parent: &Bounds3, thickness: f64) -> Result<Vec<Bounds3>> {
        let mut per_axis: Vec<(Axis, Vec<(f64, f64)>)> = Vec::new();
        for (axis, positions) in self.cuts() {
            validate_positions(axis, parent.extent(axis), thickness, positions)?;
            per_axis.push((
                axis,
                spans(parent.min(axis), parent.extent(axis), thickness, positions),
            ));
        }

        let mut children = vec![*parent];
        for (axis, spans) in &per_axis {
            children = children
                .iter()
                .flat_map(|b| spans.iter().map(|&(lo, hi)| b.with_span(*axis, lo, hi - lo)))
                .collect();
        }
        Ok(children)
    }

    /// Divider slabs within `parent`. Grid dividers span the whole parent.
    #[must_use]
    pub fn dividers(&self, parent: &Bounds3, thickness: f64) -> Vec<DividerSlab> {
        self.cuts()
            .into_iter()
            .flat_map(|(axis, positions)| {
                positions.iter().enumerate().map(move |(index, p)| DividerSlab {
                    axis,
                    index,
                    bounds: parent.with_span(axis, parent.min(axis) + p, thickness),
                })
            })
            .collect()
    }
}

/// Checks divider positions against a void of `extent` along `axis`.
///
/// # Errors
///
/// Returns `EmptyPositions`, `PositionOutOfRange`, `PositionsNotIncreasing`
/// or `DividersOverlap`.
pub fn validate_positions(axis: Axis, extent: f64, thickness: f64, positions: &[f64]) -> Result<()> {
    if positions.is_empty() {
        return Err(StructuralViolation::EmptyPositions.into());
    }
    let max = extent - thickness;
    for &p in positions {
        if p.is_nan() || p <= TOLERANCE || p >= max - TOLERANCE {
            return Err(StructuralViolation::PositionOutOfRange {
                axis,
                position: p,
                max,
            }
            .into());
        }
    }
    for pair in positions.windows(2) {
        if pair[1] <= pair[0] {
            return Err(StructuralViolation::PositionsNotIncreasing { axis }.into());
        }
        if pair[1] < pair[0] + thickness + TOLERANCE {
            return Err(StructuralViolation::DividersOverlap {
                axis,
                first: pair[0],
                second: pair[1],
            }
            .into());
        }
    }
    Ok(())
}

/// Child spans `(lo, hi)` along one axis, between and around the dividers.
fn spans(min: f64, extent: f64, thickness: f64, positions: &[f64]) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(positions.len() + 1);
    let mut lo = min;
    for &p in positions {
        out.push((lo, min + p));
        lo = min + p + thickness;
    }
    out.push((lo, min + extent));
    out
}

/// Checks that `void_id` may be partitioned and returns its bounds.
fn check_target(voids: &VoidTree, void_id: VoidId) -> Result<Bounds3> {
    let node = voids.node(void_id)?;
    if node.lid_inset_side.is_some() {
        return Err(StructuralViolation::LidInset(format!("{void_id:?}")).into());
    }
    if node.sub_assembly.is_some() {
        return Err(StructuralViolation::HostsSubAssembly(format!("{void_id:?}")).into());
    }
    if !node.is_leaf() {
        return Err(StructuralViolation::NotALeaf(format!("{void_id:?}")).into());
    }
    Ok(node.bounds)
}

fn check_axis(assembly: &Assembly, void_id: VoidId, axis: Axis) -> Result<()> {
    if void_id == assembly.root && assembly.is_blocked(axis) {
        return Err(StructuralViolation::AxisBlocked(axis).into());
    }
    Ok(())
}

fn attach_children(
    voids: &mut VoidTree,
    void_id: VoidId,
    partition: Partition,
    child_bounds: Vec<Bounds3>,
) -> Result<Vec<VoidId>> {
    let children: Vec<VoidId> = child_bounds
        .into_iter()
        .map(|b| voids.add(VoidNode::leaf(b, Some(void_id))))
        .collect();
    let node = voids.node_mut(void_id)?;
    node.children.clone_from(&children);
    node.partition = Some(partition);
    Ok(children)
}

/// Splits a leaf void with dividers across one axis.
pub struct Subdivide {
    void_id: VoidId,
    axis: Axis,
    positions: Vec<f64>,
}

impl Subdivide {
    /// Creates a new `Subdivide` operation.
    #[must_use]
    pub fn new(void_id: VoidId, axis: Axis, positions: Vec<f64>) -> Self {
        Self {
            void_id,
            axis,
            positions,
        }
    }

    /// Executes the split inside `assembly`, returning the new leaves.
    ///
    /// # Errors
    ///
    /// Returns a `StructuralViolation` if the target is not a free leaf, the
    /// axis is blocked, or the positions are invalid.
    pub fn execute(self, voids: &mut VoidTree, assembly: &Assembly) -> Result<Vec<VoidId>> {
        let bounds = check_target(voids, self.void_id)?;
        check_axis(assembly, self.void_id, self.axis)?;

        let partition = Partition::Split {
            axis: self.axis,
            positions: self.positions,
        };
        let child_bounds = partition.child_bounds(&bounds, assembly.thickness())?;
        let children = attach_children(voids, self.void_id, partition, child_bounds)?;
        debug!(void = ?self.void_id, axis = %self.axis, children = children.len(), "subdivided void");
        Ok(children)
    }
}

/// Splits a leaf void with dividers on several axes at once.
pub struct GridSubdivide {
    void_id: VoidId,
    cuts: Vec<AxisCut>,
}

impl GridSubdivide {
    /// Creates a new `GridSubdivide` operation.
    #[must_use]
    pub fn new(void_id: VoidId, cuts: Vec<AxisCut>) -> Self {
        Self { void_id, cuts }
    }

    /// Executes the grid split, returning the new leaves.
    ///
    /// Every axis is checked before anything is created.
    ///
    /// # Errors
    ///
    /// Returns a `StructuralViolation` if the target is not a free leaf, any
    /// axis is blocked or repeated, or any positions are invalid.
    pub fn execute(self, voids: &mut VoidTree, assembly: &Assembly) -> Result<Vec<VoidId>> {
        let bounds = check_target(voids, self.void_id)?;
        if self.cuts.is_empty() {
            return Err(StructuralViolation::EmptyPositions.into());
        }
        for (i, cut) in self.cuts.iter().enumerate() {
            if self.cuts[..i].iter().any(|c| c.axis == cut.axis) {
                return Err(StructuralViolation::DuplicateGridAxis(cut.axis).into());
            }
            check_axis(assembly, self.void_id, cut.axis)?;
        }

        let partition = Partition::Grid { cuts: self.cuts };
        let child_bounds = partition.child_bounds(&bounds, assembly.thickness())?;
        let children = attach_children(voids, self.void_id, partition, child_bounds)?;
        debug!(void = ?self.void_id, children = children.len(), "grid-subdivided void");
        Ok(children)
    }
}

/// Moves one divider and re-lays-out the voids on both sides of it.
pub struct SetDividerPosition {
    subdivision: SubdivisionId,
    position: f64,
}

impl SetDividerPosition {
    /// Creates a new `SetDividerPosition` operation.
    #[must_use]
    pub fn new(subdivision: SubdivisionId, position: f64) -> Self {
        Self {
            subdivision,
            position,
        }
    }

    /// Executes the move.
    ///
    /// # Errors
    ///
    /// Returns `StructuralViolation::UnknownSubdivision` if the divider does
    /// not exist, or another `StructuralViolation` if the new position (or
    /// anything nested below it) no longer fits.
    pub fn execute(self, voids: &mut VoidTree, thickness: f64) -> Result<()> {
        let id = self.subdivision;
        let unknown = || StructuralViolation::UnknownSubdivision(format!("{id:?}"));
        let node = voids.node(id.parent).map_err(|_| unknown())?;
        let bounds = node.bounds;
        let mut partition = node.partition.clone().ok_or_else(unknown)?;
        let slot = partition
            .positions_mut(id.axis)
            .and_then(|positions| positions.get_mut(id.index))
            .ok_or_else(unknown)?;
        *slot = self.position;

        partition.child_bounds(&bounds, thickness)?;
        voids.node_mut(id.parent)?.partition = Some(partition);
        voids.relayout(id.parent, bounds, thickness)?;
        debug!(subdivision = ?id, position = self.position, "moved divider");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn parent() -> Bounds3 {
        Bounds3::new(3.0, 3.0, 3.0, 94.0, 74.0, 54.0)
    }

    #[test]
    fn split_children_leave_divider_gaps() {
        let partition = Partition::Split {
            axis: Axis::X,
            positions: vec![30.0],
        };
        let children = partition.child_bounds(&parent(), 3.0).unwrap();
        assert_eq!(children.len(), 2);
        assert_abs_diff_eq!(children[0].max(Axis::X), 33.0);
        assert_abs_diff_eq!(children[1].min(Axis::X), 36.0);
        assert_abs_diff_eq!(children[1].max(Axis::X), 97.0);
    }

    #[test]
    fn grid_children_are_cross_product() {
        let partition = Partition::Grid {
            cuts: vec![AxisCut::new(Axis::X, vec![40.0]), AxisCut::new(Axis::Z, vec![20.0])],
        };
        let children = partition.child_bounds(&parent(), 3.0).unwrap();
        assert_eq!(children.len(), 4);
        // First cut varies slowest.
        assert_abs_diff_eq!(children[0].x, children[1].x);
        assert!(children[0].z < children[1].z);
        assert_eq!(partition.dividers(&parent(), 3.0).len(), 2);
    }

    #[test]
    fn position_rules() {
        assert!(matches!(
            validate_positions(Axis::X, 50.0, 3.0, &[]),
            Err(crate::error::BoxError::Structural(StructuralViolation::EmptyPositions))
        ));
        assert!(validate_positions(Axis::X, 50.0, 3.0, &[0.0]).is_err());
        assert!(validate_positions(Axis::X, 50.0, 3.0, &[47.0]).is_err());
        assert!(validate_positions(Axis::X, 50.0, 3.0, &[46.9]).is_ok());
        assert!(matches!(
            validate_positions(Axis::X, 50.0, 3.0, &[20.0, 10.0]),
            Err(crate::error::BoxError::Structural(
                StructuralViolation::PositionsNotIncreasing { .. }
            ))
        ));
        assert!(matches!(
            validate_positions(Axis::X, 50.0, 3.0, &[20.0, 22.0]),
            Err(crate::error::BoxError::Structural(
                StructuralViolation::DividersOverlap { .. }
            ))
        ));
    }

    proptest! {
        #[test]
        fn children_tile_parent(
            axis_index in 0usize..3,
            raw in prop::collection::vec(0.05f64..0.95, 1..5),
        ) {
            let axis = Axis::ALL[axis_index];
            let t = 3.0;
            let bounds = parent();
            let extent = bounds.extent(axis);
            let mut positions: Vec<f64> = raw.iter().map(|r| r * (extent - t)).collect();
            positions.sort_by(f64::total_cmp);
            prop_assume!(validate_positions(axis, extent, t, &positions).is_ok());

            let partition = Partition::Split { axis, positions: positions.clone() };
            let children = partition.child_bounds(&bounds, t).unwrap();
            prop_assert_eq!(children.len(), positions.len() + 1);

            let covered: f64 = children.iter().map(|c| c.extent(axis)).sum();
            let dividers = t * positions.len() as f64;
            prop_assert!((covered + dividers - extent).abs() < 1e-9);
            prop_assert!((children[0].min(axis) - bounds.min(axis)).abs() < 1e-12);
            prop_assert!((children[children.len() - 1].max(axis) - bounds.max(axis)).abs() < 1e-9);
            for pair in children.windows(2) {
                prop_assert!((pair[1].min(axis) - pair[0].max(axis) - t).abs() < 1e-9);
                prop_assert!(pair[0].extent(axis) > 0.0);
            }
            for other in Axis::ALL.into_iter().filter(|&a| a != axis) {
                for child in &children {
                    prop_assert_eq!(child.min(other), bounds.min(other));
                    prop_assert_eq!(child.extent(other), bounds.extent(other));
                }
            }
        }
    }
}
