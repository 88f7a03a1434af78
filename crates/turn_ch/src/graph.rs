use crate::{
    constants::UNCONTRACTED_LEVEL,
    edge_direction::EdgeDirection,
    types::{EdgeId, Level, NodeId},
};

pub trait GraphEdge {
    fn start_node(&self) -> NodeId;
    fn end_node(&self) -> NodeId;
    fn adj_node(&self, node: NodeId) -> NodeId {
        if self.start_node() == node {
            self.end_node()
        } else {
            self.start_node()
        }
    }

    fn is_shortcut(&self) -> bool;

    /// First original edge crossed when travelling the edge in `direction`
    fn first_orig_edge(&self, direction: EdgeDirection) -> EdgeId;

    /// Last original edge crossed when travelling the edge in `direction`
    fn last_orig_edge(&self, direction: EdgeDirection) -> EdgeId;
}

/// Snapshot of an edge as seen from `base_node` during an expansion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeState {
    pub edge_id: EdgeId,
    pub base_node: NodeId,
    pub adj_node: NodeId,
    pub is_shortcut: bool,
}

pub trait Graph {
    type Edge: GraphEdge;
    type EdgeIterator<'a>: Iterator<Item = EdgeId>
    where
        Self: 'a;

    fn node_count(&self) -> usize;
    fn edge_count(&self) -> usize;

    /// Original edges always use the ids `0..original_edge_count()`, shortcuts come after.
    fn original_edge_count(&self) -> usize;

    fn edge(&self, edge_id: EdgeId) -> &Self::Edge;

    fn edge_direction(&self, edge_id: EdgeId, start: NodeId) -> EdgeDirection;

    fn edge_state(&self, edge_id: EdgeId, base_node: NodeId) -> EdgeState {
        let edge = self.edge(edge_id);
        EdgeState {
            edge_id,
            base_node,
            adj_node: edge.adj_node(base_node),
            is_shortcut: edge.is_shortcut(),
        }
    }
}

pub trait DirectedEdgeAccess: Graph {
    fn node_outgoing_edges_iter(&self, node: NodeId) -> Self::EdgeIterator<'_>;
    fn node_incoming_edges_iter(&self, node: NodeId) -> Self::EdgeIterator<'_>;

    fn node_original_outgoing_edges_iter(&self, node: NodeId) -> impl Iterator<Item = EdgeId> {
        self.node_outgoing_edges_iter(node)
            .filter(|&edge_id| !self.edge(edge_id).is_shortcut())
    }

    fn node_original_incoming_edges_iter(&self, node: NodeId) -> impl Iterator<Item = EdgeId> {
        self.node_incoming_edges_iter(node)
            .filter(|&edge_id| !self.edge(edge_id).is_shortcut())
    }
}

pub trait NodeLevel: Graph {
    fn node_level(&self, node: NodeId) -> Level;
    fn set_node_level(&mut self, node: NodeId, level: Level);

    /// Level reserved for nodes left in the core once contraction stopped
    fn core_node_level(&self) -> Level {
        self.node_count() + 1
    }

    fn is_core_node(&self, node: NodeId) -> bool {
        self.node_level(node) == self.core_node_level()
    }

    fn is_contracted(&self, node: NodeId) -> bool {
        let level = self.node_level(node);
        level != UNCONTRACTED_LEVEL && level != self.core_node_level()
    }
}

pub trait UnfoldEdge: Graph {
    /// Expands `edge_id` into the original edges it represents, in travel order.
    fn unfold_edge(&self, edge_id: EdgeId, edges: &mut Vec<EdgeId>);
}
