use std::cmp::Ordering;

use crate::{
    constants::INFINITE_WEIGHT,
    types::{EdgeId, NodeId},
    weighting::Weight,
};

/// Per source state of a [`MultiTreeEntry`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MultiTreeItem {
    pub edge: EdgeId,
    pub weight: Weight,
    /// Improved since the entry was last expanded
    pub updated: bool,
    /// Original edge the item arrived through, for turn costs
    pub original_edge: EdgeId,
}

/// Node entry of a search growing one shortest path tree per source at once.
///
/// Entries are ordered by the mean weight of their reached items. An entry where no item is
/// reached has a `NaN` aggregate and sorts after every other entry.
#[derive(Clone, Debug)]
pub struct MultiTreeEntry {
    adj_node: NodeId,
    parent: Option<usize>,
    items: Vec<MultiTreeItem>,
    aggregate_weight: Weight,
}

impl MultiTreeEntry {
    pub fn new(
        adj_node: NodeId,
        edge: EdgeId,
        edge_weight: Weight,
        updated: bool,
        parent: Option<usize>,
        num_trees: usize,
    ) -> Self {
        let item = MultiTreeItem {
            edge,
            weight: edge_weight,
            updated,
            original_edge: edge,
        };

        let mut entry = MultiTreeEntry {
            adj_node,
            parent,
            items: vec![item; num_trees],
            aggregate_weight: INFINITE_WEIGHT,
        };
        entry.update_aggregate();
        entry
    }

    pub fn adj_node(&self) -> NodeId {
        self.adj_node
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<usize>) {
        self.parent = parent;
    }

    pub fn num_trees(&self) -> usize {
        self.items.len()
    }

    pub fn item(&self, tree: usize) -> &MultiTreeItem {
        &self.items[tree]
    }

    /// Callers must run [`MultiTreeEntry::update_aggregate`] after changing weights.
    pub fn item_mut(&mut self, tree: usize) -> &mut MultiTreeItem {
        &mut self.items[tree]
    }

    pub fn items(&self) -> &[MultiTreeItem] {
        &self.items
    }

    pub fn weight(&self, tree: usize) -> Weight {
        self.items[tree].weight
    }

    pub fn set_weight(&mut self, tree: usize, weight: Weight) {
        self.items[tree].weight = weight;
        self.update_aggregate();
    }

    pub fn edge(&self, tree: usize) -> EdgeId {
        self.items[tree].edge
    }

    pub fn set_edge(&mut self, tree: usize, edge: EdgeId) {
        self.items[tree].edge = edge;
    }

    pub fn set_sub_item_original_edge_ids(&mut self, original_edge: EdgeId) {
        for item in self.items.iter_mut() {
            item.original_edge = original_edge;
        }
    }

    pub fn has_updated_items(&self) -> bool {
        self.items.iter().any(|item| item.updated)
    }

    /// Marks every item as expanded and returns the items as they were.
    pub fn take_updated(&mut self) -> Vec<MultiTreeItem> {
        let items = self.items.clone();
        for item in self.items.iter_mut() {
            item.updated = false;
        }
        items
    }

    /// Recomputes the mean weight over all items with a finite weight.
    pub fn update_aggregate(&mut self) {
        let (sum, reached) = self
            .items
            .iter()
            .filter(|item| item.weight.is_finite())
            .fold((0.0, 0usize), |(sum, reached), item| {
                (sum + item.weight, reached + 1)
            });

        self.aggregate_weight = sum / reached as Weight;
    }

    pub fn aggregate_weight(&self) -> Weight {
        self.aggregate_weight
    }

    /// Aggregate weight usable as a queue priority, unreached entries map to infinity
    pub fn priority(&self) -> Weight {
        if self.aggregate_weight.is_nan() {
            INFINITE_WEIGHT
        } else {
            self.aggregate_weight
        }
    }
}

impl PartialEq for MultiTreeEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MultiTreeEntry {}

impl PartialOrd for MultiTreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MultiTreeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().total_cmp(&other.priority())
    }
}
