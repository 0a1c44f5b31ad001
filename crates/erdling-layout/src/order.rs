//! Within-rank ordering by barycenter sweeps. Alternating down/up passes
//! reorder each rank by the mean position of its neighbors in the fixed
//! adjacent rank; the ordering with the fewest connector crossings seen
//! across all sweeps wins.

use crate::graph::EntityGraph;
use erdling_core::EntityId;
use rustc_hash::FxHashMap;

const SWEEPS: usize = 4;

pub fn order_ranks(graph: &EntityGraph, layers: &mut Vec<Vec<EntityId>>) {
    if layers.len() < 2 {
        return;
    }
    let mut best = layers.clone();
    let mut best_crossings = total_crossings(graph, layers);

    for sweep in 0..SWEEPS {
        if sweep % 2 == 0 {
            for i in 1..layers.len() {
                let fixed = layers[i - 1].clone();
                sort_by_barycenter(&mut layers[i], &fixed, |n| graph.predecessors(n));
            }
        } else {
            for i in (0..layers.len() - 1).rev() {
                let fixed = layers[i + 1].clone();
                sort_by_barycenter(&mut layers[i], &fixed, |n| graph.successors(n));
            }
        }
        let crossings = total_crossings(graph, layers);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = layers.clone();
        }
        if best_crossings == 0 {
            break;
        }
    }
    *layers = best;
}

fn sort_by_barycenter<'g>(
    layer: &mut [EntityId],
    fixed: &[EntityId],
    neighbors: impl Fn(EntityId) -> &'g [EntityId],
) {
    let pos: FxHashMap<EntityId, usize> =
        fixed.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    let mut keyed: Vec<(f64, usize, EntityId)> = layer
        .iter()
        .enumerate()
        .map(|(i, &n)| {
            let adj: Vec<usize> = neighbors(n).iter().filter_map(|m| pos.get(m)).copied().collect();
            let key = if adj.is_empty() {
                // Keep unconnected nodes where they are.
                i as f64
            } else {
                adj.iter().sum::<usize>() as f64 / adj.len() as f64
            };
            (key, i, n)
        })
        .collect();
    // Tie-break on the previous index makes the sort stable and deterministic.
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    for (slot, (_, _, n)) in keyed.into_iter().enumerate() {
        layer[slot] = n;
    }
}

fn total_crossings(graph: &EntityGraph, layers: &[Vec<EntityId>]) -> usize {
    let mut total = 0;
    for pair in layers.windows(2) {
        total += crossings_between(graph, &pair[0], &pair[1]);
    }
    total
}

/// Counts pairwise inversions among edges spanning two adjacent ranks.
/// Quadratic, which is fine at ER scale.
fn crossings_between(graph: &EntityGraph, upper: &[EntityId], lower: &[EntityId]) -> usize {
    let lower_pos: FxHashMap<EntityId, usize> =
        lower.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    let mut endpoints = Vec::new();
    for (ui, &u) in upper.iter().enumerate() {
        for &v in graph.successors(u) {
            if let Some(&vi) = lower_pos.get(&v) {
                endpoints.push((ui, vi));
            }
        }
    }
    let mut count = 0;
    for i in 0..endpoints.len() {
        for j in (i + 1)..endpoints.len() {
            let (a, b) = (endpoints[i], endpoints[j]);
            if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_a_simple_crossing() {
        // a->y, b->x drawn in order [a,b] / [x,y] crosses once.
        let (a, b, x, y) = (EntityId(0), EntityId(1), EntityId(2), EntityId(3));
        let mut g = EntityGraph::new();
        g.add_node(a);
        g.add_node(b);
        g.add_edge(a, y);
        g.add_edge(b, x);
        let mut layers = vec![vec![a, b], vec![x, y]];
        assert_eq!(crossings_between(&g, &layers[0], &layers[1]), 1);
        order_ranks(&g, &mut layers);
        assert_eq!(total_crossings(&g, &layers), 0);
    }

    #[test]
    fn single_rank_is_untouched() {
        let mut g = EntityGraph::new();
        g.add_node(EntityId(0));
        g.add_node(EntityId(1));
        let mut layers = vec![vec![EntityId(0), EntityId(1)]];
        order_ranks(&g, &mut layers);
        assert_eq!(layers, vec![vec![EntityId(0), EntityId(1)]]);
    }
}
