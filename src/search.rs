//! Dijkstra shortest-path queries over a [`DirectedWeightedGraph`].
//!
//! Each query builds its frontier records in a local `Vec`; a record's
//! predecessor is an index into that `Vec`, so the whole chain is dropped
//! with the query. Weights are assumed non-negative: a finalized node is
//! never revisited, and negative weights give unspecified (but terminating)
//! results.

use crate::error::{GraphError, GraphResult};
use crate::graph::{DirectedWeightedGraph, NodeHandle};
use core::borrow::Borrow;
use core::cmp::{Ordering, Reverse};
use core::hash::{BuildHasher, Hash};
use slotmap::{DefaultKey, SecondaryMap};
use std::collections::BinaryHeap;

/// Cost and node sequence of one shortest path, start and end inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath<N> {
    pub cost: f64,
    pub nodes: Vec<N>,
}

impl<N> ShortestPath<N> {
    /// Number of edges traversed.
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy)]
struct FrontierRecord {
    node: NodeHandle,
    cost: f64,
    predecessor: Option<usize>,
}

// Min-heap key. Records are numbered in push order, so equal costs pop in
// the order they were discovered.
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    cost: f64,
    record: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.record.cmp(&other.record))
    }
}

/// Outcome of one Dijkstra run.
struct Search {
    records: Vec<FrontierRecord>,
    // Record index of every finalized node's cheapest path.
    finalized: SecondaryMap<DefaultKey, usize>,
    terminal: Option<usize>,
}

impl Search {
    /// Handles from the seed record to `record`, in path order.
    fn path_to(&self, record: usize) -> Vec<NodeHandle> {
        let mut path = Vec::new();
        let mut cursor = Some(record);
        while let Some(i) = cursor {
            let r = &self.records[i];
            path.push(r.node);
            cursor = r.predecessor;
        }
        path.reverse();
        path
    }
}

impl<N, W, S> DirectedWeightedGraph<N, W, S>
where
    N: Eq + Hash + Clone,
    W: Copy + Into<f64>,
    S: BuildHasher,
{
    // Run Dijkstra from `start`. Stops when `target` is popped, otherwise
    // drains the frontier and finalizes everything reachable.
    fn dijkstra(&self, start: NodeHandle, target: Option<NodeHandle>) -> Search {
        let mut records = vec![FrontierRecord {
            node: start,
            cost: 0.0,
            predecessor: None,
        }];
        let mut frontier = BinaryHeap::new();
        frontier.push(Reverse(HeapEntry {
            cost: 0.0,
            record: 0,
        }));
        let mut finalized: SecondaryMap<DefaultKey, usize> = SecondaryMap::new();
        tracing::trace!(start = ?start, target = ?target, "shortest path search started");

        while let Some(Reverse(HeapEntry { record, .. })) = frontier.pop() {
            let current = records[record];
            if finalized.contains_key(current.node.raw_handle()) {
                continue;
            }
            finalized.insert(current.node.raw_handle(), record);
            tracing::trace!(node = ?current.node, cost = current.cost, "node finalized");
            if Some(current.node) == target {
                tracing::trace!(
                    cost = current.cost,
                    explored = finalized.len(),
                    "shortest path found"
                );
                return Search {
                    records,
                    finalized,
                    terminal: Some(record),
                };
            }
            for (successor, weight) in self.successors(current.node) {
                if finalized.contains_key(successor.raw_handle()) {
                    continue;
                }
                let cost = current.cost + weight.into();
                records.push(FrontierRecord {
                    node: successor,
                    cost,
                    predecessor: Some(record),
                });
                frontier.push(Reverse(HeapEntry {
                    cost,
                    record: records.len() - 1,
                }));
            }
        }

        tracing::trace!(explored = finalized.len(), "frontier exhausted");
        Search {
            records,
            finalized,
            terminal: None,
        }
    }

    // Search between two identifiers; an absent endpoint reads as no path.
    fn search<Q>(&self, start: &Q, end: &Q) -> GraphResult<(Search, usize)>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (Some(s), Some(e)) = (self.handle_of(start), self.handle_of(end)) else {
            return Err(GraphError::PathNotFound);
        };
        let search = self.dijkstra(s, Some(e));
        let terminal = search.terminal.ok_or(GraphError::PathNotFound)?;
        Ok((search, terminal))
    }

    fn ids(&self, handles: &[NodeHandle]) -> GraphResult<Vec<N>> {
        handles
            .iter()
            .map(|&h| self.node_id(h).cloned().ok_or(GraphError::NodeNotFound))
            .collect()
    }

    /// Cost and node sequence of the cheapest path from `start` to `end`.
    pub fn shortest_path<Q>(&self, start: &Q, end: &Q) -> GraphResult<ShortestPath<N>>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (search, terminal) = self.search(start, end)?;
        Ok(ShortestPath {
            cost: search.records[terminal].cost,
            nodes: self.ids(&search.path_to(terminal))?,
        })
    }

    /// Total weight of the cheapest path; zero when `start == end`.
    pub fn shortest_path_cost<Q>(&self, start: &Q, end: &Q) -> GraphResult<f64>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (search, terminal) = self.search(start, end)?;
        Ok(search.records[terminal].cost)
    }

    /// Identifiers along the cheapest path, `start` and `end` included.
    pub fn shortest_path_nodes<Q>(&self, start: &Q, end: &Q) -> GraphResult<Vec<N>>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (search, terminal) = self.search(start, end)?;
        self.ids(&search.path_to(terminal))
    }

    /// Weight of each edge along the cheapest path, in travel order. Empty
    /// when `start == end`.
    pub fn shortest_path_weights<Q>(&self, start: &Q, end: &Q) -> GraphResult<Vec<W>>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (search, terminal) = self.search(start, end)?;
        search
            .path_to(terminal)
            .windows(2)
            .map(|pair| {
                self.weight_between(pair[0], pair[1])
                    .ok_or(GraphError::EdgeNotFound)
            })
            .collect()
    }

    /// The node reachable from `start` with the most expensive shortest
    /// path, and that cost. Only costs above zero qualify, so `start` and
    /// nodes reached over zero-weight edges alone are never chosen. Equal
    /// costs keep the node that comes first in [`node_ids`](Self::node_ids).
    pub fn furthest_from<Q>(&self, start: &Q) -> GraphResult<(N, f64)>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let s = self.handle_of(start).ok_or(GraphError::NodeNotFound)?;
        let search = self.dijkstra(s, None);

        let mut furthest: Option<(&N, f64)> = None;
        for (h, id) in self.node_handles() {
            if h == s {
                continue;
            }
            let Some(&record) = search.finalized.get(h.raw_handle()) else {
                continue;
            };
            let cost = search.records[record].cost;
            if cost > furthest.map_or(0.0, |(_, best)| best) {
                furthest = Some((id, cost));
            }
        }
        furthest
            .map(|(id, cost)| (id.clone(), cost))
            .ok_or(GraphError::PathNotFound)
    }

    /// Shortest-path cost from `start` to every node it can reach, `start`
    /// included at zero.
    pub fn costs_from<Q>(&self, start: &Q) -> GraphResult<Vec<(N, f64)>>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let s = self.handle_of(start).ok_or(GraphError::NodeNotFound)?;
        let search = self.dijkstra(s, None);
        Ok(self
            .node_handles()
            .filter_map(|(h, id)| {
                let &record = search.finalized.get(h.raw_handle())?;
                Some((id.clone(), search.records[record].cost))
            })
            .collect())
    }
}
