use crate::{
    types::{EdgeId, NodeId},
    weighting::Weight,
};

/// Handle into the entry arena of a witness search.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct EntryId(usize);

impl EntryId {
    pub(crate) fn new(index: usize) -> Self {
        EntryId(index)
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

/// Search tree node of the witness search.
///
/// Root entries sit on the source node, have no `edge` and carry the first original edge of
/// the path in `last_orig_edge`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WitnessSearchEntry {
    pub edge: EdgeId,
    pub last_orig_edge: EdgeId,
    pub adj_node: NodeId,
    pub weight: Weight,
    /// Every node after the source on the way here was the center node
    pub is_direct_center_node_path: bool,
    pub parent: Option<EntryId>,
}
