pub mod matrix;
pub mod matrix_algorithm;
pub mod matrix_params;
pub mod multi_tree_dijkstra;
pub mod multi_tree_entry;
pub mod multi_tree_matrix_algorithm;
