//! DirectedWeightedGraph: nodes live in a generational arena and are indexed
//! by identifier through an [`AssociativeMap`].

use crate::associative_map::AssociativeMap;
use crate::error::{GraphError, GraphResult, MapError};
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

/// Stable reference to a node. A handle to a removed node never resolves
/// again, even if its arena slot is reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeHandle(DefaultKey);

impl NodeHandle {
    pub(crate) fn new(k: DefaultKey) -> Self {
        NodeHandle(k)
    }
    pub(crate) fn raw_handle(&self) -> DefaultKey {
        self.0
    }

    pub fn id<'a, N, W, S>(&self, graph: &'a DirectedWeightedGraph<N, W, S>) -> Option<&'a N> {
        graph.node_id(*self)
    }
}

#[derive(Debug, Clone)]
struct Edge<W> {
    successor: DefaultKey,
    weight: W,
}

#[derive(Debug, Clone)]
struct GraphNode<N, W> {
    id: N,
    edges: Vec<Edge<W>>, // insertion order
}

/// Directed graph with one weighted edge at most per ordered node pair.
///
/// Policies: inserting a node that already exists fails with
/// [`GraphError::DuplicateNode`] (use [`ensure_node`](Self::ensure_node) for
/// insert-if-absent), and inserting an edge that already exists fails with
/// [`GraphError::DuplicateEdge`] rather than updating its weight.
#[derive(Debug, Clone)]
pub struct DirectedWeightedGraph<N, W, S = RandomState> {
    index: AssociativeMap<N, DefaultKey, S>,
    nodes: SlotMap<DefaultKey, GraphNode<N, W>>,
    edge_count: usize,
}

impl<N, W> DirectedWeightedGraph<N, W>
where
    N: Eq + Hash + Clone,
    W: Copy,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    /// Build a graph from `(source, destination, weight)` triples, creating
    /// endpoints on first sight. Fails on a repeated source/destination pair.
    pub fn from_edges<I>(edges: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = (N, N, W)>,
    {
        let mut graph = Self::new();
        for (src, dst, weight) in edges {
            let s = graph.ensure_node(src)?;
            let d = graph.ensure_node(dst)?;
            graph.link(s.raw_handle(), d.raw_handle(), weight)?;
        }
        Ok(graph)
    }
}

impl<N, W> Default for DirectedWeightedGraph<N, W>
where
    N: Eq + Hash + Clone,
    W: Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, W, S> DirectedWeightedGraph<N, W, S>
where
    N: Eq + Hash + Clone,
    W: Copy,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            index: AssociativeMap::with_hasher(hasher),
            nodes: SlotMap::with_key(),
            edge_count: 0,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn handle_of<Q>(&self, id: &Q) -> Option<NodeHandle>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.get(id).ok().map(|&k| NodeHandle::new(k))
    }

    fn key_of<Q>(&self, id: &Q) -> GraphResult<DefaultKey>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index
            .get(id)
            .copied()
            .map_err(|_| GraphError::NodeNotFound)
    }

    pub fn contains_node<Q>(&self, id: &Q) -> bool
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.contains_key(id)
    }

    /// Add a node. Fails with [`GraphError::DuplicateNode`] if `id` exists.
    pub fn insert_node(&mut self, id: N) -> GraphResult<NodeHandle> {
        let k = self.nodes.insert(GraphNode {
            id: id.clone(),
            edges: Vec::new(),
        });
        // `index` and `nodes` hold the same keys; undo the arena slot if the
        // index refuses the id.
        if let Err(e) = self.index.put(id, k) {
            self.nodes.remove(k);
            return Err(match e {
                MapError::DuplicateKey => GraphError::DuplicateNode,
                MapError::KeyNotFound => GraphError::NodeNotFound,
            });
        }
        Ok(NodeHandle::new(k))
    }

    /// Handle of the node `id`, inserting it first if absent.
    pub fn ensure_node(&mut self, id: N) -> GraphResult<NodeHandle> {
        match self.index.get(&id) {
            Ok(&k) => Ok(NodeHandle::new(k)),
            Err(_) => self.insert_node(id),
        }
    }

    /// Remove a node together with its outgoing edges and every edge that
    /// points at it.
    pub fn remove_node<Q>(&mut self, id: &Q) -> GraphResult<()>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self
            .index
            .remove(id)
            .map_err(|_| GraphError::NodeNotFound)?;
        let mut dropped = self.nodes.remove(k).map(|n| n.edges.len()).unwrap_or(0);
        for node in self.nodes.values_mut() {
            let before = node.edges.len();
            node.edges.retain(|e| e.successor != k);
            dropped += before - node.edges.len();
        }
        self.edge_count -= dropped;
        tracing::debug!(dropped_edges = dropped, "graph node removed");
        Ok(())
    }

    fn link(&mut self, src: DefaultKey, dst: DefaultKey, weight: W) -> GraphResult<()> {
        let node = self.nodes.get_mut(src).ok_or(GraphError::NodeNotFound)?;
        if node.edges.iter().any(|e| e.successor == dst) {
            return Err(GraphError::DuplicateEdge);
        }
        node.edges.push(Edge {
            successor: dst,
            weight,
        });
        self.edge_count += 1;
        Ok(())
    }

    /// Add the edge `src -> dst`. Both endpoints must already exist.
    pub fn insert_edge<Q>(&mut self, src: &Q, dst: &Q, weight: W) -> GraphResult<()>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let s = self.key_of(src)?;
        let d = self.key_of(dst)?;
        self.link(s, d, weight)
    }

    // Source key and position of `src -> dst` in its edge list.
    fn find_edge<Q>(&self, src: &Q, dst: &Q) -> Option<(DefaultKey, usize)>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let s = self.key_of(src).ok()?;
        let d = self.key_of(dst).ok()?;
        let pos = self.nodes.get(s)?.edges.iter().position(|e| e.successor == d)?;
        Some((s, pos))
    }

    /// Remove the edge `src -> dst` and return its weight.
    pub fn remove_edge<Q>(&mut self, src: &Q, dst: &Q) -> GraphResult<W>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (s, pos) = self.find_edge(src, dst).ok_or(GraphError::EdgeNotFound)?;
        let node = self.nodes.get_mut(s).ok_or(GraphError::EdgeNotFound)?;
        let edge = node.edges.remove(pos);
        self.edge_count -= 1;
        Ok(edge.weight)
    }

    pub fn contains_edge<Q>(&self, src: &Q, dst: &Q) -> bool
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_edge(src, dst).is_some()
    }

    /// Weight of `src -> dst`; [`GraphError::EdgeNotFound`] if the edge or
    /// either endpoint is missing.
    pub fn edge_weight<Q>(&self, src: &Q, dst: &Q) -> GraphResult<W>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (s, pos) = self.find_edge(src, dst).ok_or(GraphError::EdgeNotFound)?;
        Ok(self.nodes[s].edges[pos].weight)
    }

    /// Outgoing edges of `src` as `(destination, weight)`, in insertion order.
    pub fn edges_from<Q>(&self, src: &Q) -> GraphResult<impl Iterator<Item = (&N, W)> + '_>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let s = self.key_of(src)?;
        let node = self.nodes.get(s).ok_or(GraphError::NodeNotFound)?;
        Ok(node
            .edges
            .iter()
            .filter_map(move |e| self.nodes.get(e.successor).map(|n| (&n.id, e.weight))))
    }

    pub(crate) fn successors(&self, h: NodeHandle) -> impl Iterator<Item = (NodeHandle, W)> + '_ {
        self.nodes
            .get(h.raw_handle())
            .into_iter()
            .flat_map(|n| n.edges.iter())
            .map(|e| (NodeHandle::new(e.successor), e.weight))
    }

    pub(crate) fn weight_between(&self, src: NodeHandle, dst: NodeHandle) -> Option<W> {
        self.nodes
            .get(src.raw_handle())?
            .edges
            .iter()
            .find(|e| e.successor == dst.raw_handle())
            .map(|e| e.weight)
    }

    /// Clones of every node identifier, in [`node_ids`](Self::node_ids) order.
    pub fn all_node_ids(&self) -> Vec<N> {
        self.node_ids().cloned().collect()
    }
}

impl<N, W, S> DirectedWeightedGraph<N, W, S> {
    /// Every node identifier. The order is stable as long as the graph is not
    /// mutated.
    pub fn node_ids(&self) -> impl Iterator<Item = &N> {
        self.nodes.values().map(|n| &n.id)
    }

    pub(crate) fn node_handles(&self) -> impl Iterator<Item = (NodeHandle, &N)> {
        self.nodes.iter().map(|(k, n)| (NodeHandle::new(k), &n.id))
    }

    pub fn node_id(&self, h: NodeHandle) -> Option<&N> {
        self.nodes.get(h.raw_handle()).map(|n| &n.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn abc() -> DirectedWeightedGraph<char, u32> {
        let mut g = DirectedWeightedGraph::new();
        for id in ['A', 'B', 'C'] {
            g.insert_node(id).unwrap();
        }
        g.insert_edge(&'A', &'B', 1).unwrap();
        g.insert_edge(&'A', &'C', 2).unwrap();
        g.insert_edge(&'B', &'C', 3).unwrap();
        g.insert_edge(&'C', &'A', 4).unwrap();
        g
    }

    #[test]
    fn insert_and_contains_nodes() {
        let mut g: DirectedWeightedGraph<&'static str, f64> = DirectedWeightedGraph::new();
        assert!(g.is_empty());
        let h = g.insert_node("a").unwrap();
        assert!(g.contains_node(&"a"));
        assert!(!g.contains_node(&"b"));
        assert_eq!(h.id(&g), Some(&"a"));
        assert_eq!(g.handle_of(&"a"), Some(h));
        assert_eq!(g.node_count(), 1);
    }

    /// Invariant: a duplicate node is rejected and leaves the graph unchanged;
    /// the arena never keeps a slot that the index does not know about.
    #[test]
    fn duplicate_node_rejected() {
        let mut g = abc();
        let before = g.all_node_ids();
        assert_eq!(g.insert_node('A'), Err(GraphError::DuplicateNode));
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.all_node_ids(), before);
        let existing = g.handle_of(&'A').unwrap();
        assert_eq!(g.ensure_node('A'), Ok(existing));
        assert_eq!(g.edge_count(), 4);
        assert!(g.contains_edge(&'A', &'B'));
    }

    #[test]
    fn ensure_node_returns_existing_handle() {
        let mut g: DirectedWeightedGraph<String, u8> = DirectedWeightedGraph::new();
        let h1 = g.ensure_node("x".to_string()).unwrap();
        let h2 = g.ensure_node("x".to_string()).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn insert_edge_requires_both_endpoints() {
        let mut g = abc();
        assert_eq!(g.insert_edge(&'A', &'Z', 1), Err(GraphError::NodeNotFound));
        assert_eq!(g.insert_edge(&'Z', &'A', 1), Err(GraphError::NodeNotFound));
        assert_eq!(g.edge_count(), 4);
    }

    /// Invariant: a second edge for the same ordered pair is rejected and the
    /// original weight is kept; the reverse direction is a separate edge.
    #[test]
    fn duplicate_edge_rejected() {
        let mut g = abc();
        assert_eq!(g.insert_edge(&'A', &'B', 9), Err(GraphError::DuplicateEdge));
        assert_eq!(g.edge_weight(&'A', &'B'), Ok(1));
        g.insert_edge(&'B', &'A', 9).unwrap();
        assert_eq!(g.edge_weight(&'B', &'A'), Ok(9));
        assert_eq!(g.edge_count(), 5);
    }

    #[test]
    fn edge_weight_and_contains_edge() {
        let g = abc();
        assert!(g.contains_edge(&'A', &'C'));
        assert!(!g.contains_edge(&'C', &'B'));
        assert!(!g.contains_edge(&'Z', &'A'));
        assert_eq!(g.edge_weight(&'B', &'C'), Ok(3));
        assert_eq!(g.edge_weight(&'C', &'B'), Err(GraphError::EdgeNotFound));
        assert_eq!(g.edge_weight(&'Z', &'B'), Err(GraphError::EdgeNotFound));
    }

    #[test]
    fn remove_edge_returns_weight() {
        let mut g = abc();
        assert_eq!(g.remove_edge(&'A', &'C'), Ok(2));
        assert!(!g.contains_edge(&'A', &'C'));
        assert_eq!(g.remove_edge(&'A', &'C'), Err(GraphError::EdgeNotFound));
        assert_eq!(g.edge_count(), 3);
    }

    /// Invariant: removing a node drops its outgoing edges and every edge
    /// pointing at it, and the edge count follows.
    #[test]
    fn remove_node_drops_incident_edges() {
        let mut g = abc();
        let stale = g.handle_of(&'C').unwrap();
        g.remove_node(&'C').unwrap();
        assert!(!g.contains_node(&'C'));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert!(g.contains_edge(&'A', &'B'));
        assert!(!g.contains_edge(&'B', &'C'));
        assert!(stale.id(&g).is_none());
        assert_eq!(g.remove_node(&'C'), Err(GraphError::NodeNotFound));

        // The identifier is free again and does not alias the old handle.
        let fresh = g.insert_node('C').unwrap();
        assert_ne!(fresh, stale);
        assert_eq!(g.edges_from(&'C').unwrap().count(), 0);
    }

    #[test]
    fn edges_from_in_insertion_order() {
        let g = abc();
        let out: Vec<(char, u32)> = g.edges_from(&'A').unwrap().map(|(n, w)| (*n, w)).collect();
        assert_eq!(out, vec![('B', 1), ('C', 2)]);
        assert!(matches!(g.edges_from(&'Z'), Err(GraphError::NodeNotFound)));
    }

    /// Invariant: `node_ids` covers every node and repeats the same order
    /// while the graph is unchanged.
    #[test]
    fn node_ids_are_complete_and_stable() {
        let g = abc();
        let first = g.all_node_ids();
        let second: Vec<char> = g.node_ids().copied().collect();
        assert_eq!(first, second);
        let set: BTreeSet<char> = first.into_iter().collect();
        assert_eq!(set, BTreeSet::from(['A', 'B', 'C']));
    }

    #[test]
    fn from_edges_creates_endpoints() {
        let g = DirectedWeightedGraph::from_edges(vec![
            ("a".to_string(), "b".to_string(), 1.5f64),
            ("b".to_string(), "c".to_string(), 2.0),
            ("a".to_string(), "c".to_string(), 4.0),
        ])
        .unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.edge_weight("b", "c"), Ok(2.0));

        let dup = DirectedWeightedGraph::from_edges(vec![('x', 'y', 1u8), ('x', 'y', 2u8)]);
        assert!(matches!(dup, Err(GraphError::DuplicateEdge)));
    }
}
