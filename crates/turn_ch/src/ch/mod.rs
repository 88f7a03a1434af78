mod entry_index;
pub mod node_contractor;
pub mod preparation_graph;
pub mod priority_queue;
pub mod shortcut;
pub mod witness_path_finder;
pub mod witness_search_entry;
pub mod witness_search_params;
