use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        DEFAULT_ENTRY_CAPACITY_DIVISOR, DEFAULT_MAX_ENTRY_CAPACITY, DEFAULT_MAX_SETTLED_EDGES,
        DEFAULT_MIN_ENTRY_CAPACITY, DEFAULT_WITNESS_TIE_TOLERANCE,
    },
    weighting::Weight,
};

/// How search entries are looked up by edge key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryIndexStrategy {
    /// Hash map sized from the node count, cheap to reset
    #[default]
    Map,
    /// Dense table with one slot per edge key, faster lookups on large searches
    Array,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WitnessSearchParams {
    /// Once more edges were settled, only direct center node paths are expanded
    pub max_settled_edges: usize,

    /// A witness replaces a direct path when it is at most this much more expensive
    pub witness_tie_tolerance: Weight,

    pub min_entry_capacity: usize,
    pub max_entry_capacity: usize,
    pub entry_capacity_divisor: usize,

    pub entry_index: EntryIndexStrategy,
}

impl Default for WitnessSearchParams {
    fn default() -> Self {
        WitnessSearchParams {
            max_settled_edges: DEFAULT_MAX_SETTLED_EDGES,
            witness_tie_tolerance: DEFAULT_WITNESS_TIE_TOLERANCE,
            min_entry_capacity: DEFAULT_MIN_ENTRY_CAPACITY,
            max_entry_capacity: DEFAULT_MAX_ENTRY_CAPACITY,
            entry_capacity_divisor: DEFAULT_ENTRY_CAPACITY_DIVISOR,
            entry_index: EntryIndexStrategy::default(),
        }
    }
}

impl WitnessSearchParams {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn max_settled_edges(mut self, max_settled_edges: usize) -> Self {
        self.max_settled_edges = max_settled_edges;
        self
    }

    pub fn witness_tie_tolerance(mut self, tolerance: Weight) -> Self {
        self.witness_tie_tolerance = tolerance;
        self
    }

    pub fn entry_index(mut self, strategy: EntryIndexStrategy) -> Self {
        self.entry_index = strategy;
        self
    }

    /// Initial size of the per search tables for a graph with `node_count` nodes
    pub fn entry_capacity(&self, node_count: usize) -> usize {
        (node_count / self.entry_capacity_divisor.max(1))
            .max(self.min_entry_capacity)
            .min(self.max_entry_capacity)
    }
}
