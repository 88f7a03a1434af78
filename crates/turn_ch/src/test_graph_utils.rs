use std::{cmp::Ordering, collections::BinaryHeap};

use fxhash::FxHashMap;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    ch::preparation_graph::PreparationGraph,
    constants::{INFINITE_WEIGHT, NO_EDGE},
    graph::{DirectedEdgeAccess, Graph, GraphEdge, NodeLevel},
    routing::edge_filter::EdgeFilter,
    types::{EdgeId, NodeId},
    weighting::{TurnCostWeighting, TurnWeighting, Weight},
};

/// ```text
///        5       5
///   p -> s ----> c ----> t -> q
///        |               ^
///        +-----> a ------+
///          w/2      w/2
/// ```
pub struct DiamondGraph {
    pub graph: PreparationGraph,
    pub weighting: TurnCostWeighting,
}

impl DiamondGraph {
    pub const P: NodeId = 0;
    pub const S: NodeId = 1;
    pub const C: NodeId = 2;
    pub const A: NodeId = 3;
    pub const T: NodeId = 4;
    pub const Q: NodeId = 5;

    pub const PS: EdgeId = 0;
    pub const SC: EdgeId = 1;
    pub const CT: EdgeId = 2;
    pub const SA: EdgeId = 3;
    pub const AT: EdgeId = 4;
    pub const TQ: EdgeId = 5;

    pub fn new(witness_weight: Weight) -> Self {
        let mut graph = PreparationGraph::new(6);
        graph.add_one_way_edge(Self::P, Self::S, 1.0);
        graph.add_one_way_edge(Self::S, Self::C, 5.0);
        graph.add_one_way_edge(Self::C, Self::T, 5.0);
        graph.add_one_way_edge(Self::S, Self::A, witness_weight / 2.0);
        graph.add_one_way_edge(Self::A, Self::T, witness_weight / 2.0);
        graph.add_one_way_edge(Self::T, Self::Q, 1.0);

        DiamondGraph {
            graph,
            weighting: TurnCostWeighting::new(),
        }
    }
}

/// Random one-way graph with random turn costs, a tenth of the turns being forbidden.
pub fn random_graph(seed: u64, nodes: usize, edges: usize) -> (PreparationGraph, TurnCostWeighting) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = PreparationGraph::new(nodes);

    for _ in 0..edges {
        let start = rng.random_range(0..nodes);
        let mut end = rng.random_range(0..nodes);
        if end == start {
            end = (end + 1) % nodes;
        }
        let weight = rng.random_range(1..10) as Weight;
        graph.add_one_way_edge(start, end, weight);
    }

    let mut weighting = TurnCostWeighting::new();
    for via_node in 0..nodes {
        for in_edge in graph.node_incoming_edges_iter(via_node) {
            for out_edge in graph.node_outgoing_edges_iter(via_node) {
                match rng.random_range(0..10) {
                    0 => weighting.restrict_turn(in_edge, via_node, out_edge),
                    1 | 2 => {
                        let cost = rng.random_range(1..5) as Weight;
                        weighting.add_turn_cost(in_edge, via_node, out_edge, cost);
                    }
                    _ => {}
                }
            }
        }
    }

    (graph, weighting)
}

/// Random graph of mostly two-way edges with a random U-turn cost, random turn costs and a
/// tenth of the turns being forbidden.
pub fn random_two_way_graph(
    seed: u64,
    nodes: usize,
    edges: usize,
) -> (PreparationGraph, TurnCostWeighting) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = PreparationGraph::new(nodes);

    for _ in 0..edges {
        let start = rng.random_range(0..nodes);
        let mut end = rng.random_range(0..nodes);
        if end == start {
            end = (end + 1) % nodes;
        }
        let forward_weight = rng.random_range(1..10) as Weight;
        let backward_weight = if rng.random_bool(0.2) {
            INFINITE_WEIGHT
        } else {
            rng.random_range(1..10) as Weight
        };
        graph.add_edge(start, end, forward_weight, backward_weight);
    }

    let u_turn_cost = match rng.random_range(0..4) {
        0 => 0.0,
        1 => 2.0,
        2 => 5.0,
        _ => INFINITE_WEIGHT,
    };
    let mut weighting = TurnCostWeighting::new().with_u_turn_cost(u_turn_cost);
    for via_node in 0..nodes {
        for in_edge in graph.node_incoming_edges_iter(via_node) {
            for out_edge in graph.node_outgoing_edges_iter(via_node) {
                if in_edge == out_edge {
                    continue;
                }
                match rng.random_range(0..10) {
                    0 => weighting.restrict_turn(in_edge, via_node, out_edge),
                    1 | 2 => {
                        let cost = rng.random_range(1..5) as Weight;
                        weighting.add_turn_cost(in_edge, via_node, out_edge, cost);
                    }
                    _ => {}
                }
            }
        }
    }

    (graph, weighting)
}

#[derive(Clone, Copy, Debug)]
struct HeapItem {
    weight: Weight,
    node: NodeId,
    last_orig_edge: EdgeId,
    direct: bool,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight
    }
}

impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Flip weight to make this a min-heap
        other.weight.total_cmp(&self.weight)
    }
}

type StateKey = (NodeId, EdgeId, bool);

fn relax(
    heap: &mut BinaryHeap<HeapItem>,
    weights: &mut FxHashMap<StateKey, Weight>,
    item: HeapItem,
) {
    let key = (item.node, item.last_orig_edge, item.direct);
    let current = weights.get(&key).copied().unwrap_or(INFINITE_WEIGHT);
    if item.weight < current {
        weights.insert(key, item.weight);
        heap.push(item);
    }
}

/// Cheapest `(direct, witness)` path weights from `source` to `target` over uncontracted nodes,
/// explored exhaustively. A path is direct when its last node before `target` was reached by
/// going straight from `source` to `center`, possibly looping there.
pub fn brute_force_witness_search(
    graph: &PreparationGraph,
    weighting: &TurnCostWeighting,
    source: NodeId,
    source_edge: EdgeId,
    center: NodeId,
    target: NodeId,
    target_edge: EdgeId,
) -> (Weight, Weight) {
    let mut best_direct = INFINITE_WEIGHT;
    let mut best_witness = if source == target {
        weighting.turn_cost(source_edge, source, target_edge)
    } else {
        INFINITE_WEIGHT
    };

    let mut heap = BinaryHeap::new();
    let mut weights = FxHashMap::default();

    for edge_id in graph.node_outgoing_edges_iter(source) {
        let edge = graph.edge(edge_id);
        let adj_node = edge.adj_node(source);
        if graph.is_contracted(adj_node) {
            continue;
        }

        let direction = graph.edge_direction(edge_id, source);
        let weight = weighting.turn_cost(source_edge, source, edge.first_orig_edge(direction))
            + weighting.calc_weight(edge, direction, NO_EDGE);
        if weight.is_infinite() {
            continue;
        }

        let last_orig_edge = edge.last_orig_edge(direction);
        if adj_node == target {
            let total = weight + weighting.turn_cost(last_orig_edge, target, target_edge);
            best_witness = best_witness.min(total);
        }

        relax(
            &mut heap,
            &mut weights,
            HeapItem {
                weight,
                node: adj_node,
                last_orig_edge,
                direct: adj_node == center,
            },
        );
    }

    while let Some(item) = heap.pop() {
        if item.weight > weights[&(item.node, item.last_orig_edge, item.direct)] {
            continue;
        }

        for edge_id in graph.node_outgoing_edges_iter(item.node) {
            let edge = graph.edge(edge_id);
            let adj_node = edge.adj_node(item.node);
            if graph.is_contracted(adj_node) {
                continue;
            }

            let direction = graph.edge_direction(edge_id, item.node);
            if edge.first_orig_edge(direction) == item.last_orig_edge {
                continue;
            }

            let weight = item.weight + weighting.calc_weight(edge, direction, item.last_orig_edge);
            if weight.is_infinite() {
                continue;
            }

            let last_orig_edge = edge.last_orig_edge(direction);
            if adj_node == target {
                let total = weight + weighting.turn_cost(last_orig_edge, target, target_edge);
                if item.direct {
                    best_direct = best_direct.min(total);
                } else {
                    best_witness = best_witness.min(total);
                }
            }

            relax(
                &mut heap,
                &mut weights,
                HeapItem {
                    weight,
                    node: adj_node,
                    last_orig_edge,
                    direct: item.direct && adj_node == center,
                },
            );
        }
    }

    (best_direct, best_witness)
}

/// Cheapest turn-aware path weight between two nodes over the whole graph, ignoring levels.
pub fn shortest_path_weight<G, W>(
    graph: &G,
    weighting: &W,
    source: NodeId,
    target: NodeId,
    include_shortcuts: bool,
) -> Weight
where
    G: DirectedEdgeAccess,
    W: TurnWeighting<G>,
{
    if source == target {
        return 0.0;
    }

    let mut heap = BinaryHeap::new();
    let mut weights = FxHashMap::default();
    relax(
        &mut heap,
        &mut weights,
        HeapItem {
            weight: 0.0,
            node: source,
            last_orig_edge: NO_EDGE,
            direct: false,
        },
    );

    while let Some(item) = heap.pop() {
        if item.weight > weights[&(item.node, item.last_orig_edge, false)] {
            continue;
        }

        if item.node == target {
            return item.weight;
        }

        for edge_id in graph.node_outgoing_edges_iter(item.node) {
            let edge = graph.edge(edge_id);
            if edge.is_shortcut() && !include_shortcuts {
                continue;
            }

            let direction = graph.edge_direction(edge_id, item.node);
            if edge.first_orig_edge(direction) == item.last_orig_edge {
                continue;
            }

            let weight = item.weight + weighting.calc_weight(edge, direction, item.last_orig_edge);
            if weight.is_infinite() {
                continue;
            }

            relax(
                &mut heap,
                &mut weights,
                HeapItem {
                    weight,
                    node: edge.adj_node(item.node),
                    last_orig_edge: edge.last_orig_edge(direction),
                    direct: false,
                },
            );
        }
    }

    INFINITE_WEIGHT
}

/// Turn-aware bidirectional query. The forward search expands outgoing edges and the backward
/// search incoming edges, both restricted to what `filter` accepts, and the two meet on any node.
pub fn hierarchy_query_weight<F>(
    graph: &PreparationGraph,
    weighting: &TurnCostWeighting,
    filter: &F,
    source: NodeId,
    target: NodeId,
) -> Weight
where
    F: EdgeFilter,
{
    if source == target {
        return 0.0;
    }

    // (node, last original edge) -> weight from the source
    let mut forward = FxHashMap::default();
    let mut heap = BinaryHeap::new();
    relax(
        &mut heap,
        &mut forward,
        HeapItem {
            weight: 0.0,
            node: source,
            last_orig_edge: NO_EDGE,
            direct: false,
        },
    );
    while let Some(item) = heap.pop() {
        if item.weight > forward[&(item.node, item.last_orig_edge, false)] {
            continue;
        }

        for edge_id in graph.node_outgoing_edges_iter(item.node) {
            if !filter.accept(&graph.edge_state(edge_id, item.node)) {
                continue;
            }

            let edge = graph.edge(edge_id);
            let direction = graph.edge_direction(edge_id, item.node);
            if edge.first_orig_edge(direction) == item.last_orig_edge {
                continue;
            }

            let weight = item.weight + weighting.calc_weight(edge, direction, item.last_orig_edge);
            if weight.is_infinite() {
                continue;
            }

            relax(
                &mut heap,
                &mut forward,
                HeapItem {
                    weight,
                    node: edge.adj_node(item.node),
                    last_orig_edge: edge.last_orig_edge(direction),
                    direct: false,
                },
            );
        }
    }

    // (node, first original edge of the rest of the path) -> weight to the target
    let mut backward = FxHashMap::default();
    let mut heap = BinaryHeap::new();
    relax(
        &mut heap,
        &mut backward,
        HeapItem {
            weight: 0.0,
            node: target,
            last_orig_edge: NO_EDGE,
            direct: false,
        },
    );
    while let Some(item) = heap.pop() {
        if item.weight > backward[&(item.node, item.last_orig_edge, false)] {
            continue;
        }

        for edge_id in graph.node_incoming_edges_iter(item.node) {
            if !filter.accept(&graph.edge_state(edge_id, item.node)) {
                continue;
            }

            let edge = graph.edge(edge_id);
            let prev_node = edge.adj_node(item.node);
            let direction = graph.edge_direction(edge_id, prev_node);
            let last_orig_edge = edge.last_orig_edge(direction);
            if last_orig_edge == item.last_orig_edge {
                continue;
            }

            let weight = item.weight
                + weighting.calc_weight(edge, direction, NO_EDGE)
                + weighting.turn_cost(last_orig_edge, item.node, item.last_orig_edge);
            if weight.is_infinite() {
                continue;
            }

            relax(
                &mut heap,
                &mut backward,
                HeapItem {
                    weight,
                    node: prev_node,
                    last_orig_edge: edge.first_orig_edge(direction),
                    direct: false,
                },
            );
        }
    }

    let mut backward_by_node: FxHashMap<NodeId, Vec<(EdgeId, Weight)>> = FxHashMap::default();
    for (&(node, first_orig_edge, _), &weight) in &backward {
        backward_by_node
            .entry(node)
            .or_default()
            .push((first_orig_edge, weight));
    }

    let mut best = INFINITE_WEIGHT;
    for (&(node, last_orig_edge, _), &forward_weight) in &forward {
        let Some(continuations) = backward_by_node.get(&node) else {
            continue;
        };

        for &(first_orig_edge, backward_weight) in continuations {
            if last_orig_edge != NO_EDGE && last_orig_edge == first_orig_edge {
                continue;
            }

            let total = forward_weight
                + weighting.turn_cost(last_orig_edge, node, first_orig_edge)
                + backward_weight;
            best = best.min(total);
        }
    }

    best
}
