use slotmap::{new_key_type, SlotMap};

use crate::error::{Result, StructuralViolation};
use crate::math::Bounds3;

use super::assembly::SubAssembly;
use super::face::FaceId;
use super::subdivision::Partition;

new_key_type! {
    /// Stable identifier of a void. Never reused within a scene.
    pub struct VoidId;
}

/// A node of the void tree: an axis-aligned region of box interior.
#[derive(Debug, Clone)]
pub struct VoidNode {
    /// Region in the owning box's local coordinates.
    pub bounds: Bounds3,
    pub parent: Option<VoidId>,
    /// Children in partition order. Empty for a leaf.
    pub children: Vec<VoidId>,
    /// How the children tile this void. `Some` iff `children` is non-empty.
    pub partition: Option<Partition>,
    pub sub_assembly: Option<SubAssembly>,
    /// Set on the space above an inset lid; such voids stay leaves.
    pub lid_inset_side: Option<FaceId>,
}

impl VoidNode {
    /// A fresh leaf covering `bounds`.
    #[must_use]
    pub fn leaf(bounds: Bounds3, parent: Option<VoidId>) -> Self {
        Self {
            bounds,
            parent,
            children: Vec::new(),
            partition: None,
            sub_assembly: None,
            lid_inset_side: None,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena that owns every void of a scene, including those of nested
/// sub-assemblies.
///
/// Voids reference each other via generational ids, so a whole scene can be
/// cloned for a preview without aliasing the committed one.
#[derive(Debug, Clone, Default)]
pub struct VoidTree {
    nodes: SlotMap<VoidId, VoidNode>,
}

impl VoidTree {
    /// Creates a new, empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a void and returns its id.
    pub fn add(&mut self, node: VoidNode) -> VoidId {
        self.nodes.insert(node)
    }

    /// Removes a leaf void.
    ///
    /// # Errors
    ///
    /// Returns `StructuralViolation::UnknownVoid` if the void does not exist,
    /// or `StructuralViolation::NotALeaf` if it has children.
    pub fn remove_leaf(&mut self, id: VoidId) -> Result<VoidNode> {
        if !self.node(id)?.is_leaf() {
            return Err(StructuralViolation::NotALeaf(format!("{id:?}")).into());
        }
        self.nodes
            .remove(id)
            .ok_or_else(|| StructuralViolation::UnknownVoid(format!("{id:?}")).into())
    }

    /// Returns a reference to the void, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns `StructuralViolation::UnknownVoid` if the void does not exist.
    pub fn node(&self, id: VoidId) -> Result<&VoidNode> {
        self.nodes
            .get(id)
            .ok_or_else(|| StructuralViolation::UnknownVoid(format!("{id:?}")).into())
    }

    /// Returns a mutable reference to the void, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns `StructuralViolation::UnknownVoid` if the void does not exist.
    pub fn node_mut(&mut self, id: VoidId) -> Result<&mut VoidNode> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| StructuralViolation::UnknownVoid(format!("{id:?}")).into())
    }

    #[must_use]
    pub fn contains(&self, id: VoidId) -> bool {
        self.nodes.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All voids in the arena, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (VoidId, &VoidNode)> {
        self.nodes.iter()
    }

    /// Topmost ancestor of `id` (the root it hangs from).
    ///
    /// # Errors
    ///
    /// Returns `StructuralViolation::UnknownVoid` if `id` or one of its
    /// ancestors is missing.
    pub fn top(&self, id: VoidId) -> Result<VoidId> {
        let mut current = id;
        while let Some(parent) = self.node(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// Pre-order walk of the subtree rooted at `id` (not descending into
    /// sub-assemblies, whose voids form their own trees).
    ///
    /// # Errors
    ///
    /// Returns `StructuralViolation::UnknownVoid` if a void is missing.
    pub fn subtree(&self, id: VoidId) -> Result<Vec<VoidId>> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node(current)?;
            out.push(current);
            stack.extend(node.children.iter().rev());
        }
        Ok(out)
    }

    /// Leaf voids of the subtree rooted at `id`, in partition order.
    ///
    /// # Errors
    ///
    /// Returns `StructuralViolation::UnknownVoid` if a void is missing.
    pub fn leaves(&self, id: VoidId) -> Result<Vec<VoidId>> {
        let mut leaves = Vec::new();
        for vid in self.subtree(id)? {
            if self.node(vid)?.is_leaf() {
                leaves.push(vid);
            }
        }
        Ok(leaves)
    }

    /// Moves a void to `bounds` and re-lays-out everything below it.
    ///
    /// Children are re-tiled from the stored partition positions; a hosted
    /// sub-assembly is resized to the new envelope.
    ///
    /// # Errors
    ///
    /// Returns a `StructuralViolation` if a stored position no longer fits
    /// or a sub-assembly no longer fits its host.
    pub fn relayout(&mut self, id: VoidId, bounds: Bounds3, thickness: f64) -> Result<()> {
        let node = self.node_mut(id)?;
        node.bounds = bounds;
        let partition = node.partition.clone();
        let children = node.children.clone();

        let hosted = self.node_mut(id)?.sub_assembly.take();
        if let Some(mut sub) = hosted {
            let resized = sub.resize(self, &bounds);
            self.node_mut(id)?.sub_assembly = Some(sub);
            resized?;
        }

        if let Some(partition) = partition {
            let spans = partition.child_bounds(&bounds, thickness)?;
            for (child, child_bounds) in children.into_iter().zip(spans) {
                self.relayout(child, child_bounds, thickness)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cube() -> Bounds3 {
        Bounds3::new(0.0, 0.0, 0.0, 10.0, 10.0, 10.0)
    }

    #[test]
    fn add_and_lookup() {
        let mut tree = VoidTree::new();
        let id = tree.add(VoidNode::leaf(cube(), None));
        assert!(tree.node(id).unwrap().is_leaf());
        assert_eq!(tree.top(id).unwrap(), id);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut tree = VoidTree::new();
        let first = tree.add(VoidNode::leaf(cube(), None));
        tree.remove_leaf(first).unwrap();
        let second = tree.add(VoidNode::leaf(cube(), None));
        assert_ne!(first, second);
        assert!(tree.node(first).is_err());
    }

    #[test]
    fn top_walks_to_root() {
        let mut tree = VoidTree::new();
        let root = tree.add(VoidNode::leaf(cube(), None));
        let child = tree.add(VoidNode::leaf(cube(), Some(root)));
        tree.node_mut(root).unwrap().children.push(child);
        assert_eq!(tree.top(child).unwrap(), root);
        assert_eq!(tree.subtree(root).unwrap(), vec![root, child]);
        assert_eq!(tree.leaves(root).unwrap(), vec![child]);
    }
}
