use thiserror::Error;

use crate::types::NodeId;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContractionError {
    #[error("Node {0} is out of bounds")]
    NodeOutOfBounds(NodeId),
    #[error("Node {node} is already contracted with level {level}")]
    AlreadyContracted { node: NodeId, level: usize },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MatrixError {
    #[error("Matrix request needs at least one source and one target")]
    EmptyRequest,
    #[error("Node {0} does not exist in the graph")]
    InvalidNode(NodeId),
    #[error("Failed to build the search thread pool: {0}")]
    ThreadPool(String),
}
