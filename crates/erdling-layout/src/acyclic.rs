//! Cycle removal by greedy DFS feedback arc set: back edges found during a
//! depth-first walk are reversed so ranking sees a DAG. Reversal only affects
//! layout direction, never the relationship stored in the model.

use crate::graph::EntityGraph;
use erdling_core::EntityId;
use rustc_hash::FxHashSet;

pub fn remove_cycles(graph: &mut EntityGraph) {
    let feedback = dfs_fas(graph);
    for (from, to) in feedback {
        if from == to {
            // Self-referential relationships contribute nothing to ranking.
            graph.remove_edge(from, to);
            continue;
        }
        tracing::debug!(%from, %to, "reversing edge to break cycle");
        graph.reverse_edge(from, to);
    }
}

fn dfs_fas(graph: &EntityGraph) -> Vec<(EntityId, EntityId)> {
    let mut feedback = Vec::new();
    let mut visited = FxHashSet::default();
    let mut on_stack = FxHashSet::default();

    for root in graph.nodes().collect::<Vec<_>>() {
        dfs(graph, root, &mut visited, &mut on_stack, &mut feedback);
    }
    feedback
}

fn dfs(
    graph: &EntityGraph,
    node: EntityId,
    visited: &mut FxHashSet<EntityId>,
    on_stack: &mut FxHashSet<EntityId>,
    feedback: &mut Vec<(EntityId, EntityId)>,
) {
    if !visited.insert(node) {
        return;
    }
    on_stack.insert(node);
    for &next in graph.successors(node) {
        if on_stack.contains(&next) {
            feedback.push((node, next));
        } else {
            dfs(graph, next, visited, on_stack, feedback);
        }
    }
    on_stack.remove(&node);
}
