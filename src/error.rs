//! Error types for the map, graph and search layers.

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////

/// Failures reported by [`AssociativeMap`](crate::AssociativeMap).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    #[error("key already present in map")]
    DuplicateKey,
    #[error("key not found in map")]
    KeyNotFound,
}

pub type MapResult<T> = Result<T, MapError>;

////////////////////////////////////////////////////////////////////////////////

/// Failures reported by [`DirectedWeightedGraph`](crate::DirectedWeightedGraph)
/// and its shortest-path queries.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    #[error("node not found in graph")]
    NodeNotFound,
    #[error("node already present in graph")]
    DuplicateNode,
    #[error("edge already present in graph")]
    DuplicateEdge,
    #[error("edge not found in graph")]
    EdgeNotFound,
    /// No path connects the endpoints, or one of them is not in the graph.
    #[error("no path between the requested nodes")]
    PathNotFound,
}

pub type GraphResult<T> = Result<T, GraphError>;
