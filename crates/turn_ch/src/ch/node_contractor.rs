use std::iter;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    constants::NO_EDGE,
    error::ContractionError,
    graph::{DirectedEdgeAccess, Graph, GraphEdge, NodeLevel},
    stopwatch::Stopwatch,
    types::{EdgeId, Level, NodeId},
    weighting::TurnWeighting,
};

use super::{
    preparation_graph::{PreparationGraph, ShortcutInsertion},
    shortcut::Shortcut,
    witness_path_finder::WitnessPathFinder,
    witness_search_entry::WitnessSearchEntry,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ContractionResult {
    pub level: Level,
    pub shortcuts_added: usize,
    pub searches: usize,
    pub settled_edges: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ContractionSummary {
    pub contracted_nodes: usize,
    pub core_nodes: usize,
    pub shortcuts: usize,
    pub searches: usize,
    pub settled_edges: usize,
}

/// Contracts `node`, adding the shortcuts needed to keep every turn-aware path between its
/// uncontracted neighbors, and assigns it the next level.
#[instrument(level = "debug", skip(graph, finder, weighting))]
pub fn contract_node<W>(
    graph: &mut PreparationGraph,
    finder: &mut WitnessPathFinder,
    weighting: &W,
    node: NodeId,
) -> Result<ContractionResult, ContractionError>
where
    W: TurnWeighting<PreparationGraph>,
{
    if node >= graph.node_count() {
        return Err(ContractionError::NodeOutOfBounds(node));
    }

    if graph.is_contracted(node) || graph.is_core_node(node) {
        return Err(ContractionError::AlreadyContracted {
            node,
            level: graph.node_level(node),
        });
    }

    let mut result = ContractionResult::default();
    let paths = find_shortcut_paths(graph, finder, weighting, node, &mut result);

    for path in paths {
        result.shortcuts_added += add_shortcuts(graph, &path);
    }

    result.level = graph.max_level() + 1;
    graph.set_node_level(node, result.level);

    debug!(
        node,
        level = result.level,
        shortcuts = result.shortcuts_added,
        searches = result.searches,
        "Contracted node"
    );

    Ok(result)
}

/// Contracts the nodes in `order` and moves all remaining nodes into the core.
pub fn contract_nodes<W>(
    graph: &mut PreparationGraph,
    finder: &mut WitnessPathFinder,
    weighting: &W,
    order: &[NodeId],
) -> Result<ContractionSummary, ContractionError>
where
    W: TurnWeighting<PreparationGraph>,
{
    let stopwatch = Stopwatch::start("contract_nodes");
    info!("Start contracting {} nodes", order.len());

    let mut summary = ContractionSummary::default();
    for &node in order {
        let result = contract_node(graph, finder, weighting, node)?;
        summary.contracted_nodes += 1;
        summary.shortcuts += result.shortcuts_added;
        summary.searches += result.searches;
        summary.settled_edges += result.settled_edges;
    }

    summary.core_nodes = graph.mark_remaining_as_core();

    info!(
        "Contracted {} nodes with {} shortcuts, {} nodes left in the core",
        summary.contracted_nodes, summary.shortcuts, summary.core_nodes
    );
    stopwatch.report();

    Ok(summary)
}

/// Original edges a path can arrive at `node` through, plus `NO_EDGE` for paths starting there
fn arrival_edges(graph: &PreparationGraph, node: NodeId) -> Vec<EdgeId> {
    graph
        .node_original_incoming_edges_iter(node)
        .chain(iter::once(NO_EDGE))
        .collect()
}

/// Original edges a path can leave `node` through, plus `NO_EDGE` for paths ending there
fn departure_edges(graph: &PreparationGraph, node: NodeId) -> Vec<EdgeId> {
    graph
        .node_original_outgoing_edges_iter(node)
        .chain(iter::once(NO_EDGE))
        .collect()
}

fn uncontracted_neighbors(
    graph: &PreparationGraph,
    node: NodeId,
    edges: impl Iterator<Item = EdgeId>,
) -> Vec<NodeId> {
    let mut neighbors: Vec<NodeId> = edges
        .map(|edge_id| graph.edge(edge_id).adj_node(node))
        .filter(|&adj_node| adj_node != node && !graph.is_contracted(adj_node))
        .collect();
    neighbors.sort_unstable();
    neighbors.dedup();
    neighbors
}

fn find_shortcut_paths<W>(
    graph: &PreparationGraph,
    finder: &mut WitnessPathFinder,
    weighting: &W,
    node: NodeId,
    result: &mut ContractionResult,
) -> Vec<Vec<WitnessSearchEntry>>
where
    W: TurnWeighting<PreparationGraph>,
{
    let source_nodes = uncontracted_neighbors(graph, node, graph.node_incoming_edges_iter(node));
    let target_nodes = uncontracted_neighbors(graph, node, graph.node_outgoing_edges_iter(node));

    let mut paths = Vec::new();
    if source_nodes.is_empty() || target_nodes.is_empty() {
        return paths;
    }

    let target_edges: Vec<(NodeId, Vec<EdgeId>)> = target_nodes
        .iter()
        .map(|&target_node| (target_node, departure_edges(graph, target_node)))
        .collect();

    for &source_node in &source_nodes {
        for source_edge in arrival_edges(graph, source_node) {
            finder.initialize_sources(graph, weighting, source_node, source_edge, node);

            for (target_node, edges) in &target_edges {
                for &target_edge in edges {
                    result.searches += 1;
                    if let Some(entry_id) =
                        finder.run_search(graph, weighting, *target_node, target_edge)
                    {
                        paths.push(finder.path_entries(entry_id));
                    }
                }
            }

            result.settled_edges += finder.num_settled_edges();
        }
    }

    paths
}

/// Turns a direct path through the center node into shortcuts. Paths looping at the center
/// node yield one shortcut per hop after the first, each one skipping the previous shortcut.
fn add_shortcuts(graph: &mut PreparationGraph, path: &[WitnessSearchEntry]) -> usize {
    let [root, first, hops @ ..] = path else {
        return 0;
    };

    let mut added = 0;
    let mut incoming_edge = first.edge;
    for hop in hops {
        let insertion = graph.add_or_update_shortcut(Shortcut {
            from: root.adj_node,
            to: hop.adj_node,
            incoming_edge,
            outgoing_edge: hop.edge,
            orig_edge_first: root.last_orig_edge,
            orig_edge_last: hop.last_orig_edge,
            weight: hop.weight - root.weight,
        });

        if let ShortcutInsertion::Added(_) = insertion {
            added += 1;
        }
        incoming_edge = insertion.edge_id();
    }

    added
}
