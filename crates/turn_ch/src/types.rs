pub type NodeId = usize;
pub type EdgeId = usize;

/// Contraction level of a node. Uncontracted nodes sit below every contracted one.
pub type Level = usize;
