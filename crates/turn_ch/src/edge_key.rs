use crate::{
    graph::{Graph, GraphEdge},
    types::{EdgeId, NodeId},
};

/// An original edge together with the node it terminates at.
///
/// The two travel directions of the same original edge map to different keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct EdgeKey(usize);

impl EdgeKey {
    pub fn new<G: Graph>(graph: &G, orig_edge: EdgeId, adj_node: NodeId) -> Self {
        let edge = graph.edge(orig_edge);
        let base_node = if edge.end_node() == adj_node {
            edge.start_node()
        } else if edge.start_node() == adj_node {
            edge.end_node()
        } else {
            panic!(
                "Node {} is neither the start nor the end of edge {}",
                adj_node, orig_edge
            )
        };

        Self::from_nodes(orig_edge, base_node, adj_node)
    }

    pub fn from_nodes(orig_edge: EdgeId, base_node: NodeId, adj_node: NodeId) -> Self {
        EdgeKey((orig_edge << 1) | usize::from(base_node > adj_node))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}
