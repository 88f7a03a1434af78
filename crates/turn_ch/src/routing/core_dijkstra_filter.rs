use crate::{
    graph::{EdgeState, NodeLevel},
    types::Level,
};

use super::edge_filter::EdgeFilter;

/// Edge filter of the bidirectional hierarchy query.
///
/// In upward mode only edges towards nodes of higher or equal level are expanded. In core mode
/// the search is kept inside the core, where an optional restriction filter has the last word.
pub struct CoreDijkstraFilter<'a, G>
where
    G: NodeLevel,
{
    graph: &'a G,
    max_nodes: usize,
    core_node_level: Level,
    in_core: bool,
    restrictions: Option<Box<dyn EdgeFilter + Send + Sync + 'a>>,
}

impl<'a, G> CoreDijkstraFilter<'a, G>
where
    G: NodeLevel,
{
    pub fn new(graph: &'a G) -> Self {
        CoreDijkstraFilter {
            graph,
            max_nodes: graph.node_count(),
            core_node_level: graph.core_node_level(),
            in_core: false,
            restrictions: None,
        }
    }

    pub fn set_in_core(&mut self, in_core: bool) {
        self.in_core = in_core;
    }

    pub fn in_core(&self) -> bool {
        self.in_core
    }

    pub fn set_restriction_filter(&mut self, filter: impl EdgeFilter + Send + Sync + 'a) {
        self.restrictions = Some(Box::new(filter));
    }

    pub fn core_node_level(&self) -> Level {
        self.core_node_level
    }

    fn is_virtual_node(&self, node: usize) -> bool {
        node >= self.max_nodes
    }

    fn accept_upward(&self, edge: &EdgeState) -> bool {
        // Query endpoints snapped onto edges must stay reachable
        if self.is_virtual_node(edge.base_node) || self.is_virtual_node(edge.adj_node) {
            return true;
        }

        if edge.is_shortcut {
            return true;
        }

        self.graph.node_level(edge.base_node) <= self.graph.node_level(edge.adj_node)
    }

    fn accept_in_core(&self, edge: &EdgeState) -> bool {
        if self.is_virtual_node(edge.adj_node) {
            return false;
        }

        if edge.is_shortcut {
            return true;
        }

        if self.graph.node_level(edge.adj_node) != self.core_node_level {
            return false;
        }

        self.restrictions
            .as_ref()
            .is_none_or(|restrictions| restrictions.accept(edge))
    }
}

impl<G> EdgeFilter for CoreDijkstraFilter<'_, G>
where
    G: NodeLevel,
{
    fn accept(&self, edge: &EdgeState) -> bool {
        if self.in_core {
            self.accept_in_core(edge)
        } else {
            self.accept_upward(edge)
        }
    }
}
