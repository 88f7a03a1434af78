use fxhash::FxHashMap;

use crate::{
    constants::{INFINITE_WEIGHT, UNCONTRACTED_LEVEL},
    edge_direction::EdgeDirection,
    graph::{DirectedEdgeAccess, Graph, GraphEdge, NodeLevel, UnfoldEdge},
    types::{EdgeId, Level, NodeId},
    weighting::{TurnCostWeighting, TurnWeighting, Weight},
};

use super::shortcut::{Shortcut, ShortcutKey};

/// Original road segment. It can be travelled in each direction with a finite weight.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseEdge {
    pub start: NodeId,
    pub end: NodeId,
    pub forward_weight: Weight,
    pub backward_weight: Weight,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PreparationGraphEdge {
    Shortcut(Shortcut),
    Edge(EdgeId, BaseEdge),
}

impl GraphEdge for PreparationGraphEdge {
    fn start_node(&self) -> NodeId {
        match self {
            PreparationGraphEdge::Shortcut(Shortcut { from, .. }) => *from,
            PreparationGraphEdge::Edge(_, BaseEdge { start, .. }) => *start,
        }
    }

    fn end_node(&self) -> NodeId {
        match self {
            PreparationGraphEdge::Shortcut(Shortcut { to, .. }) => *to,
            PreparationGraphEdge::Edge(_, BaseEdge { end, .. }) => *end,
        }
    }

    fn is_shortcut(&self) -> bool {
        matches!(self, PreparationGraphEdge::Shortcut(_))
    }

    fn first_orig_edge(&self, direction: EdgeDirection) -> EdgeId {
        match self {
            PreparationGraphEdge::Shortcut(Shortcut {
                orig_edge_first,
                orig_edge_last,
                ..
            }) => match direction {
                EdgeDirection::Forward => *orig_edge_first,
                EdgeDirection::Backward => *orig_edge_last,
            },
            PreparationGraphEdge::Edge(edge_id, _) => *edge_id,
        }
    }

    fn last_orig_edge(&self, direction: EdgeDirection) -> EdgeId {
        self.first_orig_edge(direction.opposite())
    }
}

/// Mutable graph the contraction runs on.
///
/// Shortcuts are forward-only and appended after the original edges.
pub struct PreparationGraph {
    edges: Vec<PreparationGraphEdge>,
    original_edges: usize,
    levels: Vec<Level>,
    max_level: Level,
    outgoing_edges: Vec<Vec<EdgeId>>,
    incoming_edges: Vec<Vec<EdgeId>>,
    shortcuts: FxHashMap<ShortcutKey, EdgeId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShortcutInsertion {
    Added(EdgeId),
    Updated(EdgeId),
    Unchanged(EdgeId),
}

impl ShortcutInsertion {
    pub fn edge_id(&self) -> EdgeId {
        match self {
            ShortcutInsertion::Added(edge_id)
            | ShortcutInsertion::Updated(edge_id)
            | ShortcutInsertion::Unchanged(edge_id) => *edge_id,
        }
    }
}

impl PreparationGraph {
    pub fn new(nodes: usize) -> Self {
        PreparationGraph {
            edges: Vec::new(),
            original_edges: 0,
            levels: vec![UNCONTRACTED_LEVEL; nodes],
            max_level: UNCONTRACTED_LEVEL,
            outgoing_edges: vec![Vec::new(); nodes],
            incoming_edges: vec![Vec::new(); nodes],
            shortcuts: FxHashMap::default(),
        }
    }

    fn ensure_node(&mut self, node: NodeId) {
        if node >= self.levels.len() {
            self.levels.resize(node + 1, UNCONTRACTED_LEVEL);
            self.outgoing_edges.resize(node + 1, Vec::new());
            self.incoming_edges.resize(node + 1, Vec::new());
        }
    }

    fn link(&mut self, from: NodeId, to: NodeId, edge_id: EdgeId) {
        self.outgoing_edges[from].push(edge_id);
        self.incoming_edges[to].push(edge_id);
    }

    /// Adds an original edge. Infinite weights close the matching direction.
    pub fn add_edge(
        &mut self,
        start: NodeId,
        end: NodeId,
        forward_weight: Weight,
        backward_weight: Weight,
    ) -> EdgeId {
        assert_eq!(
            self.edges.len(),
            self.original_edges,
            "Original edges must be added before any shortcut"
        );

        self.ensure_node(start.max(end));

        let edge_id = self.edges.len();
        self.edges.push(PreparationGraphEdge::Edge(
            edge_id,
            BaseEdge {
                start,
                end,
                forward_weight,
                backward_weight,
            },
        ));
        self.original_edges += 1;

        if forward_weight.is_finite() {
            self.link(start, end, edge_id);
        }

        if backward_weight.is_finite() && start != end {
            self.link(end, start, edge_id);
        }

        edge_id
    }

    pub fn add_one_way_edge(&mut self, start: NodeId, end: NodeId, weight: Weight) -> EdgeId {
        self.add_edge(start, end, weight, INFINITE_WEIGHT)
    }

    /// Inserts `shortcut`, or lowers the weight of an existing shortcut between the same
    /// nodes and original edges.
    pub fn add_or_update_shortcut(&mut self, shortcut: Shortcut) -> ShortcutInsertion {
        let key = shortcut.key();

        if let Some(&edge_id) = self.shortcuts.get(&key) {
            if let PreparationGraphEdge::Shortcut(existing) = &mut self.edges[edge_id] {
                if shortcut.weight < existing.weight {
                    *existing = shortcut;
                    return ShortcutInsertion::Updated(edge_id);
                }
            }
            return ShortcutInsertion::Unchanged(edge_id);
        }

        let edge_id = self.edges.len();
        let Shortcut { from, to, .. } = shortcut;
        self.edges.push(PreparationGraphEdge::Shortcut(shortcut));
        self.link(from, to, edge_id);
        self.shortcuts.insert(key, edge_id);

        ShortcutInsertion::Added(edge_id)
    }

    pub fn shortcut_count(&self) -> usize {
        self.edges.len() - self.original_edges
    }

    pub fn max_level(&self) -> Level {
        self.max_level
    }

    /// Moves every node that is still uncontracted into the core.
    pub fn mark_remaining_as_core(&mut self) -> usize {
        let core_level = self.core_node_level();
        let mut core_nodes = 0;
        for level in self.levels.iter_mut() {
            if *level == UNCONTRACTED_LEVEL {
                *level = core_level;
                core_nodes += 1;
            }
        }

        core_nodes
    }
}

impl Graph for PreparationGraph {
    type Edge = PreparationGraphEdge;
    type EdgeIterator<'a>
        = std::iter::Copied<std::slice::Iter<'a, EdgeId>>
    where
        Self: 'a;

    fn node_count(&self) -> usize {
        self.levels.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn original_edge_count(&self) -> usize {
        self.original_edges
    }

    fn edge(&self, edge_id: EdgeId) -> &Self::Edge {
        &self.edges[edge_id]
    }

    fn edge_direction(&self, edge_id: EdgeId, start: NodeId) -> EdgeDirection {
        let edge = &self.edges[edge_id];

        if edge.start_node() == start {
            return EdgeDirection::Forward;
        } else if edge.end_node() == start {
            return EdgeDirection::Backward;
        }

        panic!(
            "Node {} is neither the start nor the end of edge {}",
            start, edge_id
        )
    }
}

impl DirectedEdgeAccess for PreparationGraph {
    fn node_outgoing_edges_iter(&self, node: NodeId) -> Self::EdgeIterator<'_> {
        self.outgoing_edges[node].iter().copied()
    }

    fn node_incoming_edges_iter(&self, node: NodeId) -> Self::EdgeIterator<'_> {
        self.incoming_edges[node].iter().copied()
    }
}

impl NodeLevel for PreparationGraph {
    fn node_level(&self, node: NodeId) -> Level {
        self.levels[node]
    }

    fn set_node_level(&mut self, node: NodeId, level: Level) {
        self.levels[node] = level;
        if level != self.core_node_level() {
            self.max_level = self.max_level.max(level);
        }
    }
}

impl UnfoldEdge for PreparationGraph {
    fn unfold_edge(&self, edge_id: EdgeId, edges: &mut Vec<EdgeId>) {
        match &self.edges[edge_id] {
            PreparationGraphEdge::Shortcut(Shortcut {
                incoming_edge,
                outgoing_edge,
                ..
            }) => {
                self.unfold_edge(*incoming_edge, edges);
                self.unfold_edge(*outgoing_edge, edges);
            }
            PreparationGraphEdge::Edge(edge_id, _) => edges.push(*edge_id),
        }
    }
}

impl TurnWeighting<PreparationGraph> for TurnCostWeighting {
    fn calc_edge_weight(&self, edge: &PreparationGraphEdge, direction: EdgeDirection) -> Weight {
        match edge {
            PreparationGraphEdge::Shortcut(Shortcut { weight, .. }) => match direction {
                EdgeDirection::Forward => *weight,
                EdgeDirection::Backward => INFINITE_WEIGHT,
            },
            PreparationGraphEdge::Edge(
                _,
                BaseEdge {
                    forward_weight,
                    backward_weight,
                    ..
                },
            ) => match direction {
                EdgeDirection::Forward => *forward_weight,
                EdgeDirection::Backward => *backward_weight,
            },
        }
    }

    fn calc_turn_weight(&self, in_edge: EdgeId, via_node: NodeId, out_edge: EdgeId) -> Weight {
        self.turn_cost(in_edge, via_node, out_edge)
    }
}
