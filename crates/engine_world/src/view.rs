//! Live views over the world.
//!
//! A [`View`] is the set of entities whose component set is a superset of the
//! view's [`Signature`]. The world keeps every view in sync with each
//! structural mutation before the mutating call returns, so a view is never
//! stale when a system reads it.

use std::collections::HashMap;

use engine_component::{Entity, Signature};

use crate::world::EntityMut;

/// Handle to a view registered with a [`World`](crate::World).
///
/// Handles are cheap to copy and stay valid for the lifetime of the world
/// that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub(crate) usize);

impl ViewId {
    /// Registration index of the view.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A notification handler. Receives the entity that entered or left the view,
/// with every component it held at that moment still readable.
pub type Handler = Box<dyn FnMut(&mut EntityMut<'_>)>;

/// A live, cached set of entities matching one signature.
///
/// Iteration order is insertion order until a member leaves; removal moves the
/// last member into the vacated slot, so order is not stable across frames.
#[derive(Debug)]
pub struct View {
    id: ViewId,
    signature: Signature,
    members: Vec<Entity>,
    rows: HashMap<Entity, usize>,
}

impl View {
    pub(crate) fn new(id: ViewId, signature: Signature) -> Self {
        Self {
            id,
            signature,
            members: Vec::new(),
            rows: HashMap::new(),
        }
    }

    /// Handle of this view.
    #[must_use]
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// The signature this view was created with.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Iterate the current members. The iterator is finite and can be
    /// restarted by calling `iter` again.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.members.iter().copied()
    }

    /// Whether `entity` currently has every component the view requires.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.rows.contains_key(&entity)
    }

    /// Number of member entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` when there is nothing to report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns `true` if `entity` was not already a member.
    pub(crate) fn insert(&mut self, entity: Entity) -> bool {
        if self.rows.contains_key(&entity) {
            return false;
        }
        self.rows.insert(entity, self.members.len());
        self.members.push(entity);
        true
    }

    /// Returns `true` if `entity` was a member.
    pub(crate) fn remove(&mut self, entity: Entity) -> bool {
        let Some(row) = self.rows.remove(&entity) else {
            return false;
        };
        self.members.swap_remove(row);
        if let Some(&moved) = self.members.get(row) {
            self.rows.insert(moved, row);
        }
        true
    }
}

/// A view plus the handlers subscribed to it.
pub(crate) struct ViewSlot {
    pub(crate) view: View,
    pub(crate) on_added: Vec<Handler>,
    pub(crate) on_removed: Vec<Handler>,
}

impl ViewSlot {
    pub(crate) fn new(view: View) -> Self {
        Self {
            view,
            on_added: Vec::new(),
            on_removed: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut view = View::new(ViewId(0), Signature::new());
        assert!(view.insert(Entity::from_raw(1)));
        assert!(!view.insert(Entity::from_raw(1)));
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let mut view = View::new(ViewId(0), Signature::new());
        for i in 1..=3 {
            view.insert(Entity::from_raw(i));
        }
        assert!(view.remove(Entity::from_raw(1)));
        assert!(!view.remove(Entity::from_raw(1)));
        assert!(view.contains(Entity::from_raw(3)));
        assert!(view.remove(Entity::from_raw(3)));
        let left: Vec<_> = view.iter().collect();
        assert_eq!(left, vec![Entity::from_raw(2)]);
    }

    #[test]
    fn test_iteration_is_restartable() {
        let mut view = View::new(ViewId(0), Signature::new());
        view.insert(Entity::from_raw(5));
        view.insert(Entity::from_raw(6));
        assert_eq!(view.iter().count(), 2);
        assert_eq!(view.iter().count(), 2);
    }
}
