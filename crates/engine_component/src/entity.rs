//! Entity handles.
//!
//! An [`Entity`] is a bare `u64` handle. Handles come from an
//! [`EntityAllocator`] and are never handed out twice, so a handle that
//! outlives its entity stays stale instead of aliasing a newer one.

use serde::{Deserialize, Serialize};

/// Handle to an entity in a world. Carries no data of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(pub u64);

impl Entity {
    /// Never allocated; usable as a "no entity" placeholder.
    pub const NONE: Entity = Entity(0);

    /// Rebuild a handle from [`id`](Self::id).
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Hands out entity handles in increasing order, starting at 1.
#[derive(Debug)]
pub struct EntityAllocator {
    last: u64,
}

impl EntityAllocator {
    /// An allocator that has issued nothing.
    #[must_use]
    pub fn new() -> Self {
        Self { last: Entity::NONE.0 }
    }

    /// Issue the next handle.
    pub fn allocate(&mut self) -> Entity {
        self.last += 1;
        Entity(self.last)
    }

    /// Whether `entity` was produced by this allocator at some point.
    /// Destroyed entities still count.
    #[must_use]
    pub fn issued(&self, entity: Entity) -> bool {
        entity != Entity::NONE && entity.0 <= self.last
    }

    /// Handles issued so far.
    #[must_use]
    pub fn issued_count(&self) -> u64 {
        self.last
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_increase_and_skip_none() {
        let mut alloc = EntityAllocator::new();
        let handles: Vec<_> = (0..3).map(|_| alloc.allocate()).collect();
        assert_eq!(handles, vec![Entity(1), Entity(2), Entity(3)]);
        assert!(!handles.contains(&Entity::NONE));
        assert_eq!(alloc.issued_count(), 3);
    }

    #[test]
    fn test_issued_covers_only_allocated_handles() {
        let mut alloc = EntityAllocator::new();
        let e = alloc.allocate();
        assert!(alloc.issued(e));
        assert!(!alloc.issued(Entity::NONE));
        assert!(!alloc.issued(Entity::from_raw(2)));
    }

    #[test]
    fn test_display_and_serde_shape() {
        let e = Entity::from_raw(7);
        assert_eq!(e.to_string(), "Entity(7)");
        assert_eq!(serde_json::to_string(&e).unwrap(), "7");
        assert_eq!(serde_json::from_str::<Entity>("7").unwrap(), e);
    }
}
