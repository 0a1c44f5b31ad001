//! Longest-path ranking. Fast, and on ER-sized graphs the extra edge slack
//! compared to network simplex is not worth the machinery.

use crate::graph::EntityGraph;
use erdling_core::EntityId;
use rustc_hash::FxHashMap;

/// Assigns each node the length of the longest predecessor chain leading to
/// it. The graph must already be acyclic. Ranks are normalized to start at 0.
pub fn longest_path(graph: &EntityGraph) -> FxHashMap<EntityId, usize> {
    let mut ranks = FxHashMap::default();
    for node in graph.nodes() {
        rank_of(graph, node, &mut ranks);
    }
    ranks
}

fn rank_of(graph: &EntityGraph, node: EntityId, ranks: &mut FxHashMap<EntityId, usize>) -> usize {
    if let Some(&r) = ranks.get(&node) {
        return r;
    }
    // Insert a placeholder so malformed (cyclic) input terminates instead of
    // recursing forever.
    ranks.insert(node, 0);
    let r = graph
        .predecessors(node)
        .iter()
        .map(|&p| rank_of(graph, p, ranks) + 1)
        .max()
        .unwrap_or(0);
    ranks.insert(node, r);
    r
}

/// Nodes grouped by rank, rank 0 first, preserving graph insertion order
/// within a rank.
pub fn by_rank(graph: &EntityGraph, ranks: &FxHashMap<EntityId, usize>) -> Vec<Vec<EntityId>> {
    let max = ranks.values().copied().max().unwrap_or(0);
    let mut layers = vec![Vec::new(); max + 1];
    for node in graph.nodes() {
        layers[ranks[&node]].push(node);
    }
    layers
}
