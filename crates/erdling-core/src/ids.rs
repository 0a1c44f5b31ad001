use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

id_type!(EntityId, "entity-");
id_type!(AttributeId, "attribute-");
id_type!(RelationshipId, "relationship-");

/// Identity allocation for one diagram session.
///
/// Uniqueness within a category is the only contract; ids are never reused
/// after deletion. The encoding is deliberately unspecified.
pub trait IdAllocator {
    fn next_entity(&mut self) -> EntityId;
    fn next_attribute(&mut self) -> AttributeId;
    fn next_relationship(&mut self) -> RelationshipId;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonotonicIdAllocator {
    next: u64,
}

impl MonotonicIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes allocation above ids restored from a snapshot.
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// The next id that would be handed out; persisted so a restored session
    /// keeps the no-reuse guarantee even across deletions.
    pub fn watermark(&self) -> u64 {
        self.next
    }

    fn bump(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl IdAllocator for MonotonicIdAllocator {
    fn next_entity(&mut self) -> EntityId {
        EntityId(self.bump())
    }

    fn next_attribute(&mut self) -> AttributeId {
        AttributeId(self.bump())
    }

    fn next_relationship(&mut self) -> RelationshipId {
        RelationshipId(self.bump())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_never_reused() {
        let mut alloc = MonotonicIdAllocator::new();
        let a = alloc.next_entity();
        let b = alloc.next_entity();
        assert_ne!(a, b);
        // Deleting `b` in a model does not hand its id back.
        let c = alloc.next_entity();
        assert!(c.0 > b.0);
    }

    #[test]
    fn starting_at_resumes_above_snapshot_ids() {
        let mut alloc = MonotonicIdAllocator::starting_at(17);
        assert_eq!(alloc.next_attribute(), AttributeId(17));
    }
}
