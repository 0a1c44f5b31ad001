use crate::graph::EntityGraph;
use erdling_core::EntityId;
use rustc_hash::FxHashSet;

/// Weakly connected components in graph insertion order, so disconnected
/// schema fragments keep a stable left-to-right arrangement across runs.
pub fn split(graph: &EntityGraph) -> Vec<Vec<EntityId>> {
    let mut seen = FxHashSet::default();
    let mut components = Vec::new();

    for root in graph.nodes() {
        if seen.contains(&root) {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !seen.insert(node) {
                continue;
            }
            component.push(node);
            stack.extend(graph.undirected_neighbors(node));
        }
        components.push(component);
    }
    components
}
