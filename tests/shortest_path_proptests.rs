// Shortest-path property tests.
//
// Property: on random graphs with non-negative integer weights, Dijkstra
// agrees with a Bellman-Ford reference on reachability and cost for every
// ordered pair, and each returned node list is a walk whose edge weights
// sum to the reported cost.
//  - Model: dense distance table relaxed |V| - 1 times over the edge list.
//  - Weights are small integers so f64 sums are exact.
//  - Duplicate (src, dst) pairs in the generated list are skipped, matching
//    the graph's reject-duplicates policy.
use proptest::prelude::*;
use route_graph::{DirectedWeightedGraph, GraphError};

fn bellman_ford(n: usize, edges: &[(usize, usize, u32)], start: usize) -> Vec<Option<u64>> {
    let mut dist: Vec<Option<u64>> = vec![None; n];
    dist[start] = Some(0);
    for _ in 1..n.max(2) {
        let mut changed = false;
        for &(s, d, w) in edges {
            if let Some(ds) = dist[s] {
                let cand = ds + u64::from(w);
                if dist[d].map_or(true, |dd| cand < dd) {
                    dist[d] = Some(cand);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    dist
}

fn arb_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize, u32)>)> {
    (1usize..=9).prop_flat_map(|n| {
        let edge = (0..n, 0..n, 0u32..20);
        (Just(n), proptest::collection::vec(edge, 0..30))
    })
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_dijkstra_matches_bellman_ford((n, raw_edges) in arb_graph()) {
        let mut g: DirectedWeightedGraph<usize, u32> = DirectedWeightedGraph::new();
        for id in 0..n {
            g.insert_node(id).unwrap();
        }
        let mut edges = Vec::new();
        for (s, d, w) in raw_edges {
            match g.insert_edge(&s, &d, w) {
                Ok(()) => edges.push((s, d, w)),
                Err(GraphError::DuplicateEdge) => {}
                Err(e) => prop_assert!(false, "unexpected error {:?}", e),
            }
        }
        prop_assert_eq!(g.edge_count(), edges.len());

        for s in 0..n {
            let reference = bellman_ford(n, &edges, s);
            for t in 0..n {
                match (g.shortest_path(&s, &t), reference[t]) {
                    (Ok(p), Some(expected)) => {
                        prop_assert_eq!(p.cost, expected as f64);
                        prop_assert_eq!(p.nodes.first(), Some(&s));
                        prop_assert_eq!(p.nodes.last(), Some(&t));
                        let weights = g.shortest_path_weights(&s, &t).unwrap();
                        prop_assert_eq!(weights.len(), p.hops());
                        let mut sum = 0u64;
                        for (pair, w) in p.nodes.windows(2).zip(&weights) {
                            prop_assert_eq!(g.edge_weight(&pair[0], &pair[1]), Ok(*w));
                            sum += u64::from(*w);
                        }
                        prop_assert_eq!(sum, expected);
                    }
                    (Err(GraphError::PathNotFound), None) => {}
                    (got, want) => prop_assert!(false, "{} -> {}: got {:?}, want {:?}", s, t, got, want),
                }
            }
        }
    }
}

// Property: node removal keeps the remaining graph consistent. Edges that
// touched the removed node disappear, every other edge survives, and no
// surviving path passes through the removed node.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_remove_node_consistency((n, raw_edges) in arb_graph(), victim in 0usize..9) {
        let victim = victim % n;
        let mut g: DirectedWeightedGraph<usize, u32> = DirectedWeightedGraph::new();
        for id in 0..n {
            g.insert_node(id).unwrap();
        }
        let mut edges = Vec::new();
        for (s, d, w) in raw_edges {
            if g.insert_edge(&s, &d, w).is_ok() {
                edges.push((s, d, w));
            }
        }

        g.remove_node(&victim).unwrap();
        let kept: Vec<_> = edges.iter().copied().filter(|&(s, d, _)| s != victim && d != victim).collect();
        prop_assert_eq!(g.node_count(), n - 1);
        prop_assert_eq!(g.edge_count(), kept.len());
        for &(s, d, w) in &kept {
            prop_assert_eq!(g.edge_weight(&s, &d), Ok(w));
        }
        for s in g.all_node_ids() {
            for t in g.all_node_ids() {
                if let Ok(nodes) = g.shortest_path_nodes(&s, &t) {
                    prop_assert!(!nodes.contains(&victim));
                }
            }
        }
    }
}
