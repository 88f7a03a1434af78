use fxhash::FxHashMap;

use crate::edge_key::EdgeKey;

use super::{witness_search_entry::EntryId, witness_search_params::EntryIndexStrategy};

/// Lookup of the current search entry of each edge key.
pub(crate) enum EntryIndex {
    Map(FxHashMap<EdgeKey, EntryId>),
    Array {
        slots: Vec<Option<EntryId>>,
        occupied: Vec<EdgeKey>,
    },
}

impl EntryIndex {
    pub(crate) fn new(strategy: EntryIndexStrategy) -> Self {
        match strategy {
            EntryIndexStrategy::Map => EntryIndex::Map(FxHashMap::default()),
            EntryIndexStrategy::Array => EntryIndex::Array {
                slots: Vec::new(),
                occupied: Vec::new(),
            },
        }
    }

    /// Drops all entries. The dense table keeps its allocation and only clears used slots.
    pub(crate) fn reset(&mut self, capacity: usize, original_edge_count: usize) {
        match self {
            EntryIndex::Map(map) => {
                *map = FxHashMap::with_capacity_and_hasher(capacity, Default::default());
            }
            EntryIndex::Array { slots, occupied } => {
                for key in occupied.drain(..) {
                    slots[key.get()] = None;
                }
                let required = original_edge_count * 2;
                if slots.len() < required {
                    slots.resize(required, None);
                }
                occupied.reserve(capacity);
            }
        }
    }

    pub(crate) fn get(&self, key: EdgeKey) -> Option<EntryId> {
        match self {
            EntryIndex::Map(map) => map.get(&key).copied(),
            EntryIndex::Array { slots, .. } => slots.get(key.get()).copied().flatten(),
        }
    }

    pub(crate) fn insert(&mut self, key: EdgeKey, entry_id: EntryId) {
        match self {
            EntryIndex::Map(map) => {
                map.insert(key, entry_id);
            }
            EntryIndex::Array { slots, occupied } => {
                let slot = &mut slots[key.get()];
                if slot.is_none() {
                    occupied.push(key);
                }
                *slot = Some(entry_id);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            EntryIndex::Map(map) => map.len(),
            EntryIndex::Array { occupied, .. } => occupied.len(),
        }
    }
}
