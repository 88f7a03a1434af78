use serde::Serialize;
use tracing::trace;

use crate::{
    constants::{INFINITE_WEIGHT, INVALID_NODE, NO_EDGE},
    edge_key::EdgeKey,
    graph::{DirectedEdgeAccess, Graph, GraphEdge, NodeLevel},
    types::{EdgeId, NodeId},
    weighting::{TurnWeighting, Weight},
};

use super::{
    entry_index::EntryIndex,
    priority_queue::PriorityQueue,
    witness_search_entry::{EntryId, WitnessSearchEntry},
    witness_search_params::WitnessSearchParams,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WitnessSearchStats {
    pub settled_edges: usize,
    pub polled_edges: usize,
    pub entries: usize,
}

/// Edge-based witness search used while contracting a center node.
///
/// A search is initialized once per source node and incoming source edge, then queried for
/// every target node and outgoing target edge around the center node. Queries continue the
/// same search tree, so targets are cheap once the tree grew past them.
pub struct WitnessPathFinder {
    params: WitnessSearchParams,

    entries: Vec<WitnessSearchEntry>,
    index: EntryIndex,
    queue: PriorityQueue<Weight>,
    initial_entries: Vec<EntryId>,

    source_node: NodeId,
    source_edge: EdgeId,
    center_node: NodeId,

    best_path_weight: Weight,
    best_path_inc_edge: EdgeId,
    best_path_is_direct_center_node_path: bool,

    num_direct_center_node_paths: usize,
    num_settled_edges: usize,
    num_polled_edges: usize,
}

fn calc_turn_weight<G, W>(weighting: &W, in_edge: EdgeId, via_node: NodeId, out_edge: EdgeId) -> Weight
where
    G: Graph,
    W: TurnWeighting<G>,
{
    if in_edge == NO_EDGE || out_edge == NO_EDGE {
        return 0.0;
    }
    weighting.calc_turn_weight(in_edge, via_node, out_edge)
}

impl WitnessPathFinder {
    pub fn new(params: WitnessSearchParams) -> Self {
        let index = EntryIndex::new(params.entry_index);
        WitnessPathFinder {
            params,
            entries: Vec::new(),
            index,
            queue: PriorityQueue::new(0),
            initial_entries: Vec::new(),
            source_node: INVALID_NODE,
            source_edge: NO_EDGE,
            center_node: INVALID_NODE,
            best_path_weight: INFINITE_WEIGHT,
            best_path_inc_edge: NO_EDGE,
            best_path_is_direct_center_node_path: false,
            num_direct_center_node_paths: 0,
            num_settled_edges: 0,
            num_polled_edges: 0,
        }
    }

    /// Starts a new search from `source_node`, entered through the original edge `source_edge`
    /// (or `NO_EDGE` for a path that starts at the node).
    pub fn initialize_sources<G, W>(
        &mut self,
        graph: &G,
        weighting: &W,
        source_node: NodeId,
        source_edge: EdgeId,
        center_node: NodeId,
    ) where
        G: DirectedEdgeAccess + NodeLevel,
        W: TurnWeighting<G>,
    {
        self.reset(graph);
        self.source_node = source_node;
        self.source_edge = source_edge;
        self.center_node = center_node;

        for edge_id in graph.node_outgoing_edges_iter(source_node) {
            let edge = graph.edge(edge_id);
            let adj_node = edge.adj_node(source_node);
            if graph.is_contracted(adj_node) {
                continue;
            }

            let direction = graph.edge_direction(edge_id, source_node);
            let first_orig_edge = edge.first_orig_edge(direction);
            let turn_weight =
                calc_turn_weight::<G, _>(weighting, source_edge, source_node, first_orig_edge);
            let edge_weight = weighting.calc_weight(edge, direction, NO_EDGE);
            if turn_weight.is_infinite() || edge_weight.is_infinite() {
                continue;
            }

            let root = self.push_entry(WitnessSearchEntry {
                edge: NO_EDGE,
                last_orig_edge: first_orig_edge,
                adj_node: source_node,
                weight: turn_weight,
                is_direct_center_node_path: false,
                parent: None,
            });

            self.add_initial_entry(
                graph,
                WitnessSearchEntry {
                    edge: edge_id,
                    last_orig_edge: edge.last_orig_edge(direction),
                    adj_node,
                    weight: turn_weight + edge_weight,
                    is_direct_center_node_path: adj_node == center_node,
                    parent: Some(root),
                },
            );
        }

        for index in 0..self.initial_entries.len() {
            let entry_id = self.initial_entries[index];
            let entry = self.entries[entry_id.get()];
            if entry.is_direct_center_node_path {
                self.num_direct_center_node_paths += 1;
            }
            self.queue.push_or_update(entry_id.get(), entry.weight);
        }
    }

    /// Continues the current search until the best path to `target_node`, leaving through
    /// `target_edge`, is known. Returns the entry of that path when it runs directly through
    /// the center node, in which case a shortcut is needed.
    pub fn run_search<G, W>(
        &mut self,
        graph: &G,
        weighting: &W,
        target_node: NodeId,
        target_edge: EdgeId,
    ) -> Option<EntryId>
    where
        G: DirectedEdgeAccess + NodeLevel,
        W: TurnWeighting<G>,
    {
        self.best_path_weight = if self.source_node == target_node {
            calc_turn_weight::<G, _>(weighting, self.source_edge, self.source_node, target_edge)
        } else {
            INFINITE_WEIGHT
        };
        self.best_path_inc_edge = NO_EDGE;
        self.best_path_is_direct_center_node_path = false;

        // Paths to the target found by earlier queries on the same search
        for edge_id in graph.node_original_incoming_edges_iter(target_node) {
            let key = EdgeKey::new(graph, edge_id, target_node);
            if let Some(entry_id) = self.index.get(key) {
                self.update_best_path::<G, _>(weighting, target_node, target_edge, entry_id);
            }
        }

        while let Some(&(id, weight)) = self.queue.peek() {
            if self.num_direct_center_node_paths < 1
                && (!self.best_path_is_direct_center_node_path
                    || self.best_path_weight.is_infinite())
            {
                break;
            }

            if weight > self.best_path_weight {
                break;
            }

            self.queue.pop();
            self.num_polled_edges += 1;

            let entry_id = EntryId::new(id);
            let entry = self.entries[id];
            if entry.is_direct_center_node_path {
                self.num_direct_center_node_paths -= 1;
            }

            if self.num_settled_edges > self.params.max_settled_edges
                && !entry.is_direct_center_node_path
            {
                continue;
            }

            for edge_id in graph.node_outgoing_edges_iter(entry.adj_node) {
                let edge = graph.edge(edge_id);
                let adj_node = edge.adj_node(entry.adj_node);
                if graph.is_contracted(adj_node) {
                    continue;
                }

                let direction = graph.edge_direction(edge_id, entry.adj_node);
                // U-turn on the same original edge
                if edge.first_orig_edge(direction) == entry.last_orig_edge {
                    continue;
                }

                let weight = weighting.calc_weight(edge, direction, entry.last_orig_edge) + entry.weight;
                if weight.is_infinite() {
                    continue;
                }

                let is_direct_center_node_path =
                    entry.is_direct_center_node_path && adj_node == self.center_node;
                let last_orig_edge = edge.last_orig_edge(direction);
                let key = EdgeKey::new(graph, last_orig_edge, adj_node);

                let updated_id = match self.index.get(key) {
                    None => {
                        let new_id = self.push_entry(WitnessSearchEntry {
                            edge: edge_id,
                            last_orig_edge,
                            adj_node,
                            weight,
                            is_direct_center_node_path,
                            parent: Some(entry_id),
                        });
                        self.index.insert(key, new_id);
                        new_id
                    }
                    Some(existing_id) => {
                        let existing = self.entries[existing_id.get()];
                        if weight >= existing.weight {
                            continue;
                        }

                        if existing.is_direct_center_node_path
                            && self.queue.contains(existing_id.get())
                        {
                            self.num_direct_center_node_paths -= 1;
                        }

                        self.entries[existing_id.get()] = WitnessSearchEntry {
                            edge: edge_id,
                            last_orig_edge,
                            adj_node,
                            weight,
                            is_direct_center_node_path,
                            parent: Some(entry_id),
                        };
                        existing_id
                    }
                };

                if is_direct_center_node_path {
                    self.num_direct_center_node_paths += 1;
                }
                self.queue.push_or_update(updated_id.get(), weight);
                self.update_best_path::<G, _>(weighting, target_node, target_edge, updated_id);
            }

            self.num_settled_edges += 1;
        }

        trace!(
            target_node,
            settled = self.num_settled_edges,
            polled = self.num_polled_edges,
            best_weight = self.best_path_weight,
            direct = self.best_path_is_direct_center_node_path,
            "witness search finished"
        );

        if self.best_path_is_direct_center_node_path {
            let key = EdgeKey::new(graph, self.best_path_inc_edge, target_node);
            self.index.get(key)
        } else {
            None
        }
    }

    pub fn entry(&self, entry_id: EntryId) -> &WitnessSearchEntry {
        &self.entries[entry_id.get()]
    }

    /// Entries from the root on the source node up to `entry_id`
    pub fn path_entries(&self, entry_id: EntryId) -> Vec<WitnessSearchEntry> {
        let mut path = Vec::new();
        let mut current = Some(entry_id);
        while let Some(id) = current {
            let entry = self.entries[id.get()];
            path.push(entry);
            current = entry.parent;
        }
        path.reverse();
        path
    }

    pub fn num_settled_edges(&self) -> usize {
        self.num_settled_edges
    }

    pub fn num_polled_edges(&self) -> usize {
        self.num_polled_edges
    }

    /// Number of edge keys reached by the current search
    pub fn num_entries(&self) -> usize {
        self.index.len()
    }

    pub fn stats(&self) -> WitnessSearchStats {
        WitnessSearchStats {
            settled_edges: self.num_settled_edges,
            polled_edges: self.num_polled_edges,
            entries: self.num_entries(),
        }
    }

    /// Drops every entry and resizes the table for `graph`. Also done by
    /// [`Self::initialize_sources`].
    pub fn reset<G: Graph>(&mut self, graph: &G) {
        let capacity = self.params.entry_capacity(graph.node_count());

        self.entries = Vec::with_capacity(capacity);
        self.index.reset(capacity, graph.original_edge_count());
        self.queue = PriorityQueue::new(capacity);
        self.initial_entries.clear();

        self.source_node = INVALID_NODE;
        self.source_edge = NO_EDGE;
        self.center_node = INVALID_NODE;
        self.best_path_weight = INFINITE_WEIGHT;
        self.best_path_inc_edge = NO_EDGE;
        self.best_path_is_direct_center_node_path = false;

        self.num_direct_center_node_paths = 0;
        self.num_settled_edges = 0;
        self.num_polled_edges = 0;
    }

    fn push_entry(&mut self, entry: WitnessSearchEntry) -> EntryId {
        let entry_id = EntryId::new(self.entries.len());
        self.entries.push(entry);
        entry_id
    }

    fn add_initial_entry<G: Graph>(&mut self, graph: &G, entry: WitnessSearchEntry) {
        let key = EdgeKey::new(graph, entry.last_orig_edge, entry.adj_node);
        match self.index.get(key) {
            None => {
                let entry_id = self.push_entry(entry);
                self.index.insert(key, entry_id);
                self.initial_entries.push(entry_id);
            }
            Some(entry_id) => {
                if entry.weight < self.entries[entry_id.get()].weight {
                    self.entries[entry_id.get()] = entry;
                }
            }
        }
    }

    fn update_best_path<G, W>(
        &mut self,
        weighting: &W,
        target_node: NodeId,
        target_edge: EdgeId,
        entry_id: EntryId,
    ) where
        G: Graph,
        W: TurnWeighting<G>,
    {
        let entry = self.entries[entry_id.get()];
        if entry.adj_node != target_node {
            return;
        }

        let total_weight = entry.weight
            + calc_turn_weight::<G, _>(weighting, entry.last_orig_edge, target_node, target_edge);

        let is_direct_center_node_path = entry
            .parent
            .is_some_and(|parent| self.entries[parent.get()].is_direct_center_node_path);

        // Witnesses win ties against direct paths
        let tolerance = if is_direct_center_node_path {
            0.0
        } else {
            self.params.witness_tie_tolerance
        };

        if total_weight - tolerance < self.best_path_weight {
            self.best_path_weight = total_weight;
            self.best_path_inc_edge = entry.last_orig_edge;
            self.best_path_is_direct_center_node_path = is_direct_center_node_path;
        }
    }
}
