/// What an operation is invoked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionType {
    Void,
    Panel,
    Edge,
    Corner,
}

/// Selection contract of a user-facing operation.
///
/// Callers gate dispatch on it; the engine itself never re-validates the
/// selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Matches [`Action::kind`](super::Action::kind).
    pub id: &'static str,
    pub selection_type: SelectionType,
    pub min_selection: usize,
    /// `None` for no upper bound.
    pub max_selection: Option<usize>,
}

impl OperationDescriptor {
    const fn new(
        id: &'static str,
        selection_type: SelectionType,
        min_selection: usize,
        max_selection: Option<usize>,
    ) -> Self {
        Self {
            id,
            selection_type,
            min_selection,
            max_selection,
        }
    }

    /// Whether `count` selected items satisfy the cardinality contract.
    #[must_use]
    pub fn allows(&self, count: usize) -> bool {
        count >= self.min_selection && self.max_selection.is_none_or(|max| count <= max)
    }
}

/// Every operation the engine accepts.
pub const OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor::new("add_subdivisions", SelectionType::Void, 1, Some(1)),
    OperationDescriptor::new("add_grid_subdivision", SelectionType::Void, 1, Some(1)),
    OperationDescriptor::new("create_sub_assembly", SelectionType::Void, 1, Some(1)),
    OperationDescriptor::new("set_edge_extension", SelectionType::Edge, 1, None),
    OperationDescriptor::new("set_divider_position", SelectionType::Panel, 1, Some(1)),
    OperationDescriptor::new("apply_edge_operation", SelectionType::Panel, 1, Some(1)),
    OperationDescriptor::new("set_corner_fillet", SelectionType::Corner, 1, None),
    OperationDescriptor::new("set_face_solid", SelectionType::Panel, 1, None),
];

/// Looks up an operation by id.
#[must_use]
pub fn descriptor(id: &str) -> Option<&'static OperationDescriptor> {
    OPERATIONS.iter().find(|op| op.id == id)
}
