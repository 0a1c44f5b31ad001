use erdling_core::EntityId;
use indexmap::IndexMap;

/// Directed graph over entities, one edge per relationship. Insertion order
/// is preserved so layout stays deterministic for a given model.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    adj: IndexMap<EntityId, Adjacency>,
}

#[derive(Debug, Clone, Default)]
struct Adjacency {
    out: Vec<EntityId>,
    inc: Vec<EntityId>,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: EntityId) {
        self.adj.entry(id).or_default();
    }

    pub fn add_edge(&mut self, from: EntityId, to: EntityId) {
        self.add_node(from);
        self.add_node(to);
        self.adj[&from].out.push(to);
        self.adj[&to].inc.push(from);
    }

    /// Removes one occurrence of the edge; a no-op if the edge or either
    /// node is absent.
    pub fn remove_edge(&mut self, from: EntityId, to: EntityId) -> bool {
        let Some(a) = self.adj.get_mut(&from) else {
            return false;
        };
        if !remove_one(&mut a.out, to) {
            return false;
        }
        if let Some(b) = self.adj.get_mut(&to) {
            remove_one(&mut b.inc, from);
        }
        true
    }

    /// Removes one occurrence of the edge and inserts the reversed edge.
    /// Used by cycle removal; a no-op if the edge is absent.
    pub fn reverse_edge(&mut self, from: EntityId, to: EntityId) {
        if self.remove_edge(from, to) {
            self.add_edge(to, from);
        }
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.adj.keys().copied()
    }

    pub fn successors(&self, id: EntityId) -> &[EntityId] {
        self.adj.get(&id).map(|a| a.out.as_slice()).unwrap_or(&[])
    }

    pub fn predecessors(&self, id: EntityId) -> &[EntityId] {
        self.adj.get(&id).map(|a| a.inc.as_slice()).unwrap_or(&[])
    }

    pub fn edges(&self) -> impl Iterator<Item = (EntityId, EntityId)> + '_ {
        self.adj
            .iter()
            .flat_map(|(&from, a)| a.out.iter().map(move |&to| (from, to)))
    }

    /// Neighbors regardless of direction, for component discovery.
    pub fn undirected_neighbors(&self, id: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        let a = self.adj.get(&id);
        a.map(|a| a.out.iter().chain(a.inc.iter()).copied())
            .into_iter()
            .flatten()
    }
}

fn remove_one(list: &mut Vec<EntityId>, id: EntityId) -> bool {
    if let Some(pos) = list.iter().position(|&x| x == id) {
        list.remove(pos);
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_edge_flips_direction() {
        let mut g = EntityGraph::new();
        let (a, b) = (EntityId(0), EntityId(1));
        g.add_edge(a, b);
        g.reverse_edge(a, b);
        assert_eq!(g.successors(b), &[a]);
        assert!(g.successors(a).is_empty());
    }

    #[test]
    fn removing_an_unknown_edge_is_a_noop() {
        let mut g = EntityGraph::new();
        let (a, b) = (EntityId(0), EntityId(1));
        g.add_node(a);
        assert!(!g.remove_edge(a, b), "edge never existed");
        assert!(!g.remove_edge(EntityId(7), EntityId(8)), "nodes never existed");
        g.reverse_edge(a, b);
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn parallel_edges_are_kept() {
        let mut g = EntityGraph::new();
        let (a, b) = (EntityId(0), EntityId(1));
        g.add_edge(a, b);
        g.add_edge(a, b);
        assert_eq!(g.successors(a).len(), 2);
        g.reverse_edge(a, b);
        assert_eq!(g.successors(a).len(), 1);
        assert_eq!(g.successors(b).len(), 1);
    }
}
