pub mod ch;
pub mod constants;
pub mod edge_direction;
pub mod edge_key;
pub mod error;
pub mod graph;
pub mod matrix;
pub mod routing;
mod stopwatch;
pub mod types;
pub mod weighting;

#[cfg(test)]
pub(crate) mod test_graph_utils;
