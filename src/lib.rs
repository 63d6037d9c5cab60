//! route-graph: a single-threaded directed weighted graph with Dijkstra
//! shortest-path queries, indexed through its own chained hash map.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep each layer small enough that its contract can be checked on
//!   its own, and let the layer above rely only on that contract.
//! - Layers:
//!   - AssociativeMap<K, V, S>: chained hash table with unique keys. Grows
//!     by doubling the bucket array once the load factor reaches 0.8.
//!   - DirectedWeightedGraph<N, W, S>: nodes stored in a generational arena
//!     (`slotmap`), indexed by identifier through an AssociativeMap. Edges
//!     reference their destination by arena key, never by pointer.
//!   - Shortest paths: Dijkstra over the graph. Frontier records live in a
//!     per-query `Vec` and link to their predecessor by index.
//!
//! Constraints
//! - Single-threaded and synchronous. Nothing locks; a search borrows the
//!   graph immutably, so it cannot observe a mutation in progress.
//! - Unique keys: duplicate map keys, duplicate nodes and duplicate edges
//!   are rejected rather than overwritten.
//! - Node identifiers are any `Eq + Hash + Clone` type; edge weights any
//!   `Copy + Into<f64>` type.
//! - Weights are assumed non-negative. Their sign is not checked.
//!
//! Hashing and rehashing
//! - Each map entry stores the `u64` hash computed at insertion. A rehash
//!   relocates entries by that stored hash, so `K: Hash` is never called
//!   during growth and growth cannot fail half way.
//! - Exactly one doubling happens per threshold crossing; growth never goes
//!   back through `put`.
//!
//! Search determinism
//! - Frontier ties are broken by discovery order. Nothing in a query depends
//!   on hash iteration order, so repeated queries on an unchanged graph
//!   return identical results.
//!
//! Logging
//! - Events go through `tracing`; the crate never installs a subscriber.
//!   Rehashes and node removals are `debug`, search outcomes are `trace`.
//!
//! Notes and non-goals
//! - No thread-safety, persistence, negative-weight handling or
//!   multi-source queries.
//! - Null keys are unrepresentable; there is no runtime check for them.

pub mod associative_map;
mod associative_map_proptest;
pub mod error;
pub mod graph;
pub mod search;

// Public surface
pub use associative_map::AssociativeMap;
pub use error::{GraphError, GraphResult, MapError, MapResult};
pub use graph::{DirectedWeightedGraph, NodeHandle};
pub use search::ShortestPath;
