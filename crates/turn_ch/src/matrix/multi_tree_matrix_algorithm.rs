use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::{
    error::MatrixError,
    graph::DirectedEdgeAccess,
    routing::edge_filter::EdgeFilter,
    stopwatch::Stopwatch,
    types::NodeId,
    weighting::{TurnWeighting, Weight},
};

use super::{
    matrix::Matrix,
    matrix_algorithm::{MatrixAlgorithm, MatrixAlgorithmResult},
    matrix_params::{MatrixParams, Threads},
    multi_tree_dijkstra::MultiTreeDijkstra,
};

struct BatchResult {
    first_source: usize,
    rows: Vec<Vec<Weight>>,
    visited_nodes: usize,
}

/// Many-to-many matrix from multi-tree searches, one per batch of sources.
///
/// Each search is a single forward pass over the edges `filter` accepts, with no downward
/// phase. The filter must therefore admit every edge of a shortest path: [`AllEdgesFilter`] on
/// the base graph, or a [`CoreDijkstraFilter`] in core mode for matrices between core nodes.
/// An upward-only hierarchy filter yields upward path weights, not distances.
///
/// [`AllEdgesFilter`]: crate::routing::edge_filter::AllEdgesFilter
/// [`CoreDijkstraFilter`]: crate::routing::core_dijkstra_filter::CoreDijkstraFilter
pub struct MultiTreeMatrixAlgorithm<'a, G, W, F> {
    graph: &'a G,
    weighting: &'a W,
    filter: &'a F,
    params: MatrixParams,
}

impl<'a, G, W, F> MultiTreeMatrixAlgorithm<'a, G, W, F>
where
    G: DirectedEdgeAccess + Sync,
    W: TurnWeighting<G> + Sync,
    F: EdgeFilter + Sync,
{
    pub fn new(graph: &'a G, weighting: &'a W, filter: &'a F, params: MatrixParams) -> Self {
        MultiTreeMatrixAlgorithm {
            graph,
            weighting,
            filter,
            params,
        }
    }

    fn validate(&self, nodes: &[NodeId]) -> Result<(), MatrixError> {
        match nodes.iter().find(|&&node| node >= self.graph.node_count()) {
            Some(&node) => Err(MatrixError::InvalidNode(node)),
            None => Ok(()),
        }
    }

    fn run_batch(&self, first_source: usize, sources: &[NodeId], targets: &[NodeId]) -> BatchResult {
        let mut dijkstra = MultiTreeDijkstra::new(self.graph, self.weighting, self.filter);
        dijkstra.calc(sources);

        let rows = (0..sources.len())
            .map(|tree| {
                targets
                    .iter()
                    .map(|&target| dijkstra.weight(target, tree))
                    .collect()
            })
            .collect();

        BatchResult {
            first_source,
            rows,
            visited_nodes: dijkstra.visited_nodes(),
        }
    }

    fn run_batches(&self, sources: &[NodeId], targets: &[NodeId]) -> Result<Vec<BatchResult>, MatrixError> {
        let batch_size = self.params.trees_per_search.max(1);

        if self.params.threads == Threads::Single {
            return Ok(sources
                .chunks(batch_size)
                .enumerate()
                .map(|(batch, chunk)| self.run_batch(batch * batch_size, chunk, targets))
                .collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.params.threads.number_of_threads())
            .build()
            .map_err(|err| MatrixError::ThreadPool(err.to_string()))?;

        Ok(pool.install(|| {
            sources
                .par_chunks(batch_size)
                .enumerate()
                .map(|(batch, chunk)| self.run_batch(batch * batch_size, chunk, targets))
                .collect()
        }))
    }
}

impl<G, W, F> MatrixAlgorithm for MultiTreeMatrixAlgorithm<'_, G, W, F>
where
    G: DirectedEdgeAccess + Sync,
    W: TurnWeighting<G> + Sync,
    F: EdgeFilter + Sync,
{
    #[instrument(skip_all, fields(sources = sources.len(), targets = targets.len()))]
    fn calc_matrix(
        &mut self,
        sources: &[NodeId],
        targets: &[NodeId],
    ) -> Result<MatrixAlgorithmResult, MatrixError> {
        if sources.is_empty() || targets.is_empty() {
            return Err(MatrixError::EmptyRequest);
        }
        self.validate(sources)?;
        self.validate(targets)?;

        let stopwatch = Stopwatch::start("multi_tree_matrix");
        let batches = self.run_batches(sources, targets)?;

        let mut matrix = Matrix::new(sources.len(), targets.len());
        let mut visited_nodes = 0;
        for batch in batches {
            debug!(
                first_source = batch.first_source,
                trees = batch.rows.len(),
                visited_nodes = batch.visited_nodes,
                "Finished matrix batch"
            );
            visited_nodes += batch.visited_nodes;
            for (offset, row) in batch.rows.iter().enumerate() {
                for (target_index, &weight) in row.iter().enumerate() {
                    matrix.update_entry(batch.first_source + offset, target_index, weight);
                }
            }
        }

        Ok(MatrixAlgorithmResult {
            matrix,
            visited_nodes,
            duration: stopwatch.report(),
        })
    }
}
