pub mod core_dijkstra_filter;
pub mod edge_filter;
