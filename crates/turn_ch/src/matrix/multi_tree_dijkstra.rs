use fxhash::FxHashMap;
use tracing::trace;

use crate::{
    ch::priority_queue::PriorityQueue,
    constants::{INFINITE_WEIGHT, NO_EDGE},
    edge_key::EdgeKey,
    graph::{DirectedEdgeAccess, Graph, GraphEdge},
    routing::edge_filter::EdgeFilter,
    types::{EdgeId, NodeId},
    weighting::{TurnWeighting, Weight},
};

use super::multi_tree_entry::MultiTreeEntry;

/// How a node was entered: as a search root, or through an original edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum ArrivalState {
    Root(NodeId),
    Edge(EdgeKey),
}

/// One-to-many search growing a shortest path tree for each source in a single pass.
///
/// Entries are kept per arrival state, a node together with the original edge it was entered
/// through, so a more expensive arrival that allows a cheaper turn later on is never lost.
/// Entries are settled in order of their mean weight. An entry improved after it was settled
/// goes back into the queue, only its improved items get expanded again.
///
/// The search explores whatever `filter` accepts and has no downward phase: with an upward-only
/// hierarchy filter the weights are those of upward paths, not full distances.
pub struct MultiTreeDijkstra<'a, G, W, F> {
    graph: &'a G,
    weighting: &'a W,
    filter: &'a F,
    entries: Vec<MultiTreeEntry>,
    state_entries: FxHashMap<ArrivalState, usize>,
    node_entries: FxHashMap<NodeId, Vec<usize>>,
    queue: PriorityQueue<Weight>,
    num_trees: usize,
    visited_nodes: usize,
}

impl<'a, G, W, F> MultiTreeDijkstra<'a, G, W, F>
where
    G: DirectedEdgeAccess,
    W: TurnWeighting<G>,
    F: EdgeFilter,
{
    pub fn new(graph: &'a G, weighting: &'a W, filter: &'a F) -> Self {
        MultiTreeDijkstra {
            graph,
            weighting,
            filter,
            entries: Vec::new(),
            state_entries: FxHashMap::default(),
            node_entries: FxHashMap::default(),
            queue: PriorityQueue::new(0),
            num_trees: 0,
            visited_nodes: 0,
        }
    }

    fn reset(&mut self, num_trees: usize) {
        self.entries.clear();
        self.state_entries.clear();
        self.node_entries.clear();
        self.queue.clear();
        self.num_trees = num_trees;
        self.visited_nodes = 0;
    }

    fn arrival_state(&self, node: NodeId, original_edge: EdgeId) -> ArrivalState {
        if original_edge == NO_EDGE {
            ArrivalState::Root(node)
        } else {
            ArrivalState::Edge(EdgeKey::new(self.graph, original_edge, node))
        }
    }

    fn entry_id(&mut self, node: NodeId, original_edge: EdgeId, parent: Option<usize>) -> usize {
        let state = self.arrival_state(node, original_edge);
        if let Some(&entry_id) = self.state_entries.get(&state) {
            return entry_id;
        }

        let mut entry =
            MultiTreeEntry::new(node, NO_EDGE, INFINITE_WEIGHT, false, parent, self.num_trees);
        entry.set_sub_item_original_edge_ids(original_edge);

        let entry_id = self.entries.len();
        self.entries.push(entry);
        self.state_entries.insert(state, entry_id);
        self.node_entries.entry(node).or_default().push(entry_id);
        entry_id
    }

    /// Runs the search with tree `i` rooted at `sources[i]`.
    pub fn calc(&mut self, sources: &[NodeId]) {
        self.reset(sources.len());
        let (graph, weighting, filter) = (self.graph, self.weighting, self.filter);

        for (tree, &source) in sources.iter().enumerate() {
            let entry_id = self.entry_id(source, NO_EDGE, None);
            let entry = &mut self.entries[entry_id];
            let item = entry.item_mut(tree);
            item.weight = 0.0;
            item.updated = true;
            entry.update_aggregate();
            self.queue.push_or_update(entry_id, entry.priority());
        }

        while let Some((entry_id, _)) = self.queue.pop() {
            self.visited_nodes += 1;
            let node = self.entries[entry_id].adj_node();
            let items = self.entries[entry_id].take_updated();
            let Some(arrival_edge) = items.first().map(|item| item.original_edge) else {
                continue;
            };

            for edge_id in graph.node_outgoing_edges_iter(node) {
                let state = graph.edge_state(edge_id, node);
                if !filter.accept(&state) {
                    continue;
                }

                let edge = graph.edge(edge_id);
                let direction = graph.edge_direction(edge_id, node);
                // U-turn on the same original edge
                if edge.first_orig_edge(direction) == arrival_edge {
                    continue;
                }

                let edge_weight = weighting.calc_weight(edge, direction, arrival_edge);
                if edge_weight.is_infinite() {
                    continue;
                }

                let last_orig_edge = edge.last_orig_edge(direction);
                let mut adj_entry_id = self
                    .state_entries
                    .get(&self.arrival_state(state.adj_node, last_orig_edge))
                    .copied();
                let mut changed = false;

                for (tree, item) in items.iter().enumerate() {
                    if !item.updated {
                        continue;
                    }

                    let weight = item.weight + edge_weight;
                    let current = adj_entry_id
                        .map_or(INFINITE_WEIGHT, |adj_id| self.entries[adj_id].weight(tree));
                    if weight >= current {
                        continue;
                    }

                    let adj_id = match adj_entry_id {
                        Some(adj_id) => adj_id,
                        None => {
                            let adj_id = self.entry_id(state.adj_node, last_orig_edge, Some(entry_id));
                            adj_entry_id = Some(adj_id);
                            adj_id
                        }
                    };

                    let adj_item = self.entries[adj_id].item_mut(tree);
                    adj_item.weight = weight;
                    adj_item.edge = edge_id;
                    adj_item.updated = true;
                    changed = true;
                }

                if let (true, Some(adj_id)) = (changed, adj_entry_id) {
                    let adj_entry = &mut self.entries[adj_id];
                    adj_entry.set_parent(Some(entry_id));
                    adj_entry.update_aggregate();
                    self.queue.push_or_update(adj_id, adj_entry.priority());
                }
            }
        }

        trace!(
            trees = self.num_trees,
            visited_nodes = self.visited_nodes,
            arrival_states = self.entries.len(),
            "multi-tree search finished"
        );
    }

    /// Weight from `sources[tree]` to `node` over all arrival edges, infinite when unreachable
    pub fn weight(&self, node: NodeId, tree: usize) -> Weight {
        self.entries(node)
            .map(|entry| entry.weight(tree))
            .fold(INFINITE_WEIGHT, Weight::min)
    }

    /// Entry of `node` reached through `original_edge`, or the root entry for `NO_EDGE`
    pub fn entry(&self, node: NodeId, original_edge: EdgeId) -> Option<&MultiTreeEntry> {
        self.state_entries
            .get(&self.arrival_state(node, original_edge))
            .map(|&entry_id| &self.entries[entry_id])
    }

    /// All entries of `node`, one per arrival edge
    pub fn entries(&self, node: NodeId) -> impl Iterator<Item = &MultiTreeEntry> {
        self.node_entries
            .get(&node)
            .into_iter()
            .flatten()
            .map(|&entry_id| &self.entries[entry_id])
    }

    /// Number of entries taken from the queue. A node counts once per arrival edge and once
    /// more for every later improvement.
    pub fn visited_nodes(&self) -> usize {
        self.visited_nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ch::preparation_graph::PreparationGraph,
        routing::edge_filter::AllEdgesFilter,
        test_graph_utils::{random_graph, random_two_way_graph, shortest_path_weight},
        weighting::TurnCostWeighting,
    };

    #[test]
    fn test_single_tree_on_chain() {
        let mut graph = PreparationGraph::new(4);
        graph.add_one_way_edge(0, 1, 1.0);
        graph.add_one_way_edge(1, 2, 2.0);
        graph.add_one_way_edge(2, 3, 3.0);
        let weighting = TurnCostWeighting::new();

        let mut dijkstra = MultiTreeDijkstra::new(&graph, &weighting, &AllEdgesFilter);
        dijkstra.calc(&[0]);

        assert_eq!(dijkstra.weight(3, 0), 6.0);
        assert_eq!(dijkstra.weight(0, 0), 0.0);
        assert_eq!(dijkstra.entry(3, 2).map(|entry| entry.edge(0)), Some(2));
        assert_eq!(dijkstra.entry(0, NO_EDGE).map(|entry| entry.weight(0)), Some(0.0));
        assert_eq!(dijkstra.visited_nodes(), 4);
    }

    #[test]
    fn test_unreachable_node() {
        let mut graph = PreparationGraph::new(3);
        graph.add_one_way_edge(0, 1, 1.0);
        graph.add_one_way_edge(2, 1, 1.0);
        let weighting = TurnCostWeighting::new();

        let mut dijkstra = MultiTreeDijkstra::new(&graph, &weighting, &AllEdgesFilter);
        dijkstra.calc(&[0, 2]);

        assert_eq!(dijkstra.weight(1, 0), 1.0);
        assert_eq!(dijkstra.weight(1, 1), 1.0);
        assert!(dijkstra.weight(2, 0).is_infinite());
        assert!(dijkstra.weight(0, 1).is_infinite());
    }

    #[test]
    fn test_turn_costs_along_tree() {
        // 0 -> 1 -> 2 with an expensive turn at 1, detour 0 -> 3 -> 2
        let mut graph = PreparationGraph::new(4);
        let a = graph.add_one_way_edge(0, 1, 1.0);
        let b = graph.add_one_way_edge(1, 2, 1.0);
        graph.add_one_way_edge(0, 3, 2.0);
        graph.add_one_way_edge(3, 2, 2.0);

        let mut weighting = TurnCostWeighting::new();
        weighting.add_turn_cost(a, 1, b, 10.0);

        let mut dijkstra = MultiTreeDijkstra::new(&graph, &weighting, &AllEdgesFilter);
        dijkstra.calc(&[0]);
        assert_eq!(dijkstra.weight(2, 0), 4.0);

        weighting.add_turn_cost(a, 1, b, 1.0);
        let mut dijkstra = MultiTreeDijkstra::new(&graph, &weighting, &AllEdgesFilter);
        dijkstra.calc(&[0]);
        assert_eq!(dijkstra.weight(2, 0), 3.0);
    }

    #[test]
    fn test_detour_around_forbidden_turn() {
        // 0 -> 1 -> 2 is forbidden at 1, the detour 0 -> 3 -> 1 arrives later through another edge
        let mut graph = PreparationGraph::new(4);
        let a = graph.add_one_way_edge(0, 1, 1.0);
        let b = graph.add_one_way_edge(1, 2, 1.0);
        graph.add_one_way_edge(0, 3, 1.0);
        let d = graph.add_one_way_edge(3, 1, 1.0);

        let mut weighting = TurnCostWeighting::new();
        weighting.restrict_turn(a, 1, b);

        let mut dijkstra = MultiTreeDijkstra::new(&graph, &weighting, &AllEdgesFilter);
        dijkstra.calc(&[0]);

        assert_eq!(dijkstra.weight(1, 0), 1.0);
        assert_eq!(dijkstra.weight(2, 0), 3.0);
        assert_eq!(dijkstra.entries(1).count(), 2);
        assert_eq!(dijkstra.entry(1, d).map(|entry| entry.weight(0)), Some(2.0));
        assert_eq!(
            dijkstra.weight(2, 0),
            shortest_path_weight(&graph, &weighting, 0, 2, false)
        );
    }

    #[test]
    fn test_u_turn_on_two_way_edge_is_skipped() {
        // 0 <-> 1 -> 2, the only way back to 0 from 1 is turning on the edge just used
        let mut graph = PreparationGraph::new(3);
        graph.add_edge(0, 1, 1.0, 1.0);
        graph.add_one_way_edge(1, 2, 1.0);
        let weighting = TurnCostWeighting::new().with_u_turn_cost(0.0);

        let mut dijkstra = MultiTreeDijkstra::new(&graph, &weighting, &AllEdgesFilter);
        dijkstra.calc(&[1]);

        assert_eq!(dijkstra.weight(0, 0), 1.0);
        assert_eq!(dijkstra.weight(2, 0), 1.0);
        assert_eq!(dijkstra.entries(1).count(), 1);
    }

    fn check_trees_against_single_source_search(graph: &PreparationGraph, weighting: &TurnCostWeighting) {
        let sources: Vec<NodeId> = (0..graph.node_count()).step_by(3).collect();

        let mut dijkstra = MultiTreeDijkstra::new(graph, weighting, &AllEdgesFilter);
        dijkstra.calc(&sources);

        for (tree, &source) in sources.iter().enumerate() {
            for target in 0..graph.node_count() {
                assert_eq!(
                    dijkstra.weight(target, tree),
                    shortest_path_weight(graph, weighting, source, target, false),
                    "{source} -> {target}"
                );
            }
        }
    }

    #[test]
    fn test_trees_match_single_source_search() {
        let (graph, _) = random_graph(21, 25, 80);
        check_trees_against_single_source_search(&graph, &TurnCostWeighting::new());
    }

    #[test]
    fn test_trees_match_single_source_search_with_turn_costs() {
        for seed in 21..26 {
            let (graph, weighting) = random_graph(seed, 25, 80);
            check_trees_against_single_source_search(&graph, &weighting);
        }
    }

    #[test]
    fn test_trees_match_single_source_search_on_two_way_edges() {
        for seed in 0..5 {
            let (graph, weighting) = random_two_way_graph(seed, 15, 30);
            check_trees_against_single_source_search(&graph, &weighting);
        }
    }
}
