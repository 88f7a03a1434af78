use crate::{
    types::{EdgeId, Level, NodeId},
    weighting::Weight,
};

pub(crate) const INVALID_NODE: NodeId = usize::MAX;
pub const NO_EDGE: EdgeId = usize::MAX;

pub const INFINITE_WEIGHT: Weight = f64::INFINITY;

pub const UNCONTRACTED_LEVEL: Level = 0;

pub(crate) const DEFAULT_MAX_SETTLED_EDGES: usize = 100;
pub(crate) const DEFAULT_WITNESS_TIE_TOLERANCE: Weight = 1.0e-6;
pub(crate) const DEFAULT_MIN_ENTRY_CAPACITY: usize = 200;
pub(crate) const DEFAULT_MAX_ENTRY_CAPACITY: usize = 2000;
pub(crate) const DEFAULT_ENTRY_CAPACITY_DIVISOR: usize = 10;

pub(crate) const DEFAULT_TREES_PER_SEARCH: usize = 16;
