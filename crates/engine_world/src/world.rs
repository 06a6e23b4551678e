//! World state storage.
//!
//! The [`World`] owns every entity and every component value. It is the
//! single source of truth for entity/component membership and keeps all
//! registered [`View`]s consistent with it.
//!
//! ## Mutation discipline
//!
//! - Public mutators (`add_component`, `remove_component`, `destroy`) update
//!   every affected view and run its handlers before returning.
//! - Handlers receive an [`EntityMut`], never the world. They may read and
//!   modify the entity's components in place, and they may queue structural
//!   changes on [`Commands`]. Queued changes run after the current
//!   notification completes, in FIFO order, before the outer call returns.
//! - Systems that mutate while walking a view iterate a
//!   [`World::snapshot`] copy of the membership.

use std::collections::{BTreeSet, HashMap};

use engine_component::{AnyColumn, Column, Component, ComponentTypeId, Entity, EntityAllocator, Signature};
use tracing::{debug, warn};

use crate::commands::Commands;
use crate::error::WorldError;
use crate::view::{View, ViewId, ViewSlot};

/// Component columns plus each live entity's component set.
#[derive(Default)]
pub(crate) struct Storage {
    columns: HashMap<ComponentTypeId, Box<dyn AnyColumn>>,
    /// Live entities and the component types they currently hold.
    entities: HashMap<Entity, BTreeSet<ComponentTypeId>>,
}

impl Storage {
    fn column<T: Component>(&self) -> Option<&Column<T>> {
        self.columns
            .get(&T::component_type_id())
            .and_then(|col| col.as_any().downcast_ref::<Column<T>>())
    }

    fn column_mut<T: Component>(&mut self) -> Option<&mut Column<T>> {
        self.columns
            .get_mut(&T::component_type_id())
            .and_then(|col| col.as_any_mut().downcast_mut::<Column<T>>())
    }

    fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.column::<T>()?.get(entity)
    }

    fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.column_mut::<T>()?.get_mut(entity)
    }

    fn insert<T: Component>(&mut self, entity: Entity, value: T) {
        let column = self
            .columns
            .entry(T::component_type_id())
            .or_insert_with(|| Box::new(Column::<T>::new()));
        if let Some(column) = column.as_any_mut().downcast_mut::<Column<T>>() {
            column.insert(entity, value);
        }
    }
}

/// Mutable access to one entity during a view notification.
pub struct EntityMut<'w> {
    entity: Entity,
    storage: &'w mut Storage,
    commands: &'w mut Commands,
}

impl EntityMut<'_> {
    /// The entity that entered or left the view.
    #[must_use]
    pub fn id(&self) -> Entity {
        self.entity
    }

    /// The entity's `T`, if it has one.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<&T> {
        self.storage.get::<T>(self.entity)
    }

    /// Mutable access to the stored value.
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.storage.get_mut::<T>(self.entity)
    }

    /// Whether the entity has a `T`.
    #[must_use]
    pub fn has<T: Component>(&self) -> bool {
        self.storage
            .entities
            .get(&self.entity)
            .is_some_and(|types| types.contains(&T::component_type_id()))
    }

    /// Queue structural changes to apply once this notification has finished.
    pub fn commands(&mut self) -> &mut Commands {
        self.commands
    }
}

#[derive(Debug, Clone, Copy)]
enum Transition {
    Added,
    Removed,
}

/// The entity/component store.
pub struct World {
    allocator: EntityAllocator,
    storage: Storage,
    /// Views in registration order. Notification order across views follows it.
    views: Vec<ViewSlot>,
    view_lookup: HashMap<Signature, ViewId>,
    commands: Commands,
}

impl World {
    /// Create a new empty world.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            storage: Storage::default(),
            views: Vec::new(),
            view_lookup: HashMap::new(),
            commands: Commands::default(),
        }
    }

    // -- Entity lifecycle --

    /// Allocate a fresh entity with no components.
    pub fn spawn(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.storage.entities.insert(entity, BTreeSet::new());

        // Only a view with an empty signature can match a bare entity.
        let entered: Vec<usize> = self
            .views
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.view.signature().is_empty())
            .map(|(idx, _)| idx)
            .collect();
        for idx in entered {
            self.views[idx].view.insert(entity);
            self.dispatch(idx, entity, Transition::Added);
        }
        self.flush_commands();
        entity
    }

    /// Remove every component from `entity`, then invalidate it.
    ///
    /// Removal handlers run in view registration order while the components
    /// are still readable.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownEntity`] if `entity` is not alive.
    pub fn destroy(&mut self, entity: Entity) -> Result<(), WorldError> {
        self.destroy_now(entity)?;
        self.flush_commands();
        Ok(())
    }

    /// Returns `true` if `entity` was spawned by this world and not destroyed.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.storage.entities.contains_key(&entity)
    }

    /// Returns `true` if `entity` was spawned by this world and has since
    /// been destroyed. Stale handles are never handed out again.
    #[must_use]
    pub fn is_stale(&self, entity: Entity) -> bool {
        self.allocator.issued(entity) && !self.is_alive(entity)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.storage.entities.len()
    }

    // -- Component operations --

    /// Attach `value` to `entity`.
    ///
    /// If the entity already holds a `T`, the old value is removed first (with
    /// the usual removal notifications) and the new value then enters the
    /// matching views again.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownEntity`] if `entity` is not alive.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), WorldError> {
        self.insert_now(entity, value)?;
        self.flush_commands();
        Ok(())
    }

    /// Detach component `T` from `entity` and return it.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownEntity`] if `entity` is not alive and
    /// [`WorldError::MissingComponent`] if it holds no `T`.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<T, WorldError> {
        let value = self.remove_now::<T>(entity)?;
        self.flush_commands();
        Ok(value)
    }

    /// Get a component value from an entity.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownEntity`] or [`WorldError::MissingComponent`].
    pub fn get<T: Component>(&self, entity: Entity) -> Result<&T, WorldError> {
        if !self.is_alive(entity) {
            return Err(WorldError::UnknownEntity(entity));
        }
        self.storage
            .get::<T>(entity)
            .ok_or(WorldError::MissingComponent {
                component: T::type_name(),
                entity,
            })
    }

    /// Get a mutable component value from an entity.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownEntity`] or [`WorldError::MissingComponent`].
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, WorldError> {
        if !self.is_alive(entity) {
            return Err(WorldError::UnknownEntity(entity));
        }
        self.storage
            .get_mut::<T>(entity)
            .ok_or(WorldError::MissingComponent {
                component: T::type_name(),
                entity,
            })
    }

    /// Check if an entity has a specific component.
    #[must_use]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.storage
            .entities
            .get(&entity)
            .is_some_and(|types| types.contains(&T::component_type_id()))
    }

    // -- Views --

    /// Returns the view for `signature`, creating it on first use.
    ///
    /// Equal signatures always map to the same view. A new view starts out
    /// populated with every live entity that already matches.
    pub fn query(&mut self, signature: Signature) -> ViewId {
        if let Some(&id) = self.view_lookup.get(&signature) {
            return id;
        }

        let id = ViewId(self.views.len());
        let mut view = View::new(id, signature.clone());

        let mut matching: Vec<Entity> = self
            .storage
            .entities
            .iter()
            .filter(|(_, types)| signature.is_satisfied_by(types))
            .map(|(&entity, _)| entity)
            .collect();
        matching.sort();
        for entity in matching {
            view.insert(entity);
        }

        debug!(view = id.index(), %signature, members = view.len(), "created view");

        self.views.push(ViewSlot::new(view));
        self.view_lookup.insert(signature, id);
        id
    }

    /// Returns a registered view.
    ///
    /// # Panics
    ///
    /// Panics if `id` was produced by a different world.
    #[must_use]
    pub fn view(&self, id: ViewId) -> &View {
        &self.views[id.0].view
    }

    /// Copy of a view's current membership, for loops that mutate the world.
    #[must_use]
    pub fn snapshot(&self, id: ViewId) -> Vec<Entity> {
        self.view(id).iter().collect()
    }

    /// Number of registered views.
    #[must_use]
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Subscribe to entities entering view `id`.
    ///
    /// The handler runs once per entry, after the entity's component set has
    /// been fully updated.
    pub fn on_added(&mut self, id: ViewId, handler: impl FnMut(&mut EntityMut<'_>) + 'static) {
        self.views[id.0].on_added.push(Box::new(handler));
    }

    /// Subscribe to entities leaving view `id`.
    ///
    /// The handler runs once per exit, while every component the entity held
    /// before the removal is still readable.
    pub fn on_removed(&mut self, id: ViewId, handler: impl FnMut(&mut EntityMut<'_>) + 'static) {
        self.views[id.0].on_removed.push(Box::new(handler));
    }

    // -- Internals shared with deferred commands --

    pub(crate) fn insert_now<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), WorldError> {
        let type_id = T::component_type_id();
        let already_present = self
            .storage
            .entities
            .get(&entity)
            .ok_or(WorldError::UnknownEntity(entity))?
            .contains(&type_id);
        if already_present {
            drop(self.remove_now::<T>(entity)?);
        }

        self.storage.insert(entity, value);
        let Some(types) = self.storage.entities.get_mut(&entity) else {
            return Err(WorldError::UnknownEntity(entity));
        };
        types.insert(type_id);
        let types = &*types;

        let entered: Vec<usize> = self
            .views
            .iter()
            .enumerate()
            .filter(|(_, slot)| {
                let signature = slot.view.signature();
                signature.contains(type_id) && signature.is_satisfied_by(types)
            })
            .map(|(idx, _)| idx)
            .collect();

        for idx in entered {
            if self.views[idx].view.insert(entity) {
                self.dispatch(idx, entity, Transition::Added);
            }
        }
        Ok(())
    }

    pub(crate) fn remove_now<T: Component>(&mut self, entity: Entity) -> Result<T, WorldError> {
        let type_id = T::component_type_id();
        let held = self
            .storage
            .entities
            .get(&entity)
            .ok_or(WorldError::UnknownEntity(entity))?
            .contains(&type_id);
        let missing = WorldError::MissingComponent {
            component: T::type_name(),
            entity,
        };
        if !held {
            return Err(missing);
        }

        let exited: Vec<usize> = self
            .views
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.view.signature().contains(type_id) && slot.view.contains(entity))
            .map(|(idx, _)| idx)
            .collect();

        for idx in exited {
            self.views[idx].view.remove(entity);
            self.dispatch(idx, entity, Transition::Removed);
        }

        if let Some(types) = self.storage.entities.get_mut(&entity) {
            types.remove(&type_id);
        }
        self.storage
            .column_mut::<T>()
            .and_then(|column| column.remove(entity))
            .ok_or(missing)
    }

    pub(crate) fn destroy_now(&mut self, entity: Entity) -> Result<(), WorldError> {
        if !self.is_alive(entity) {
            return Err(WorldError::UnknownEntity(entity));
        }

        let exited: Vec<usize> = self
            .views
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.view.contains(entity))
            .map(|(idx, _)| idx)
            .collect();

        for idx in exited {
            self.views[idx].view.remove(entity);
            self.dispatch(idx, entity, Transition::Removed);
        }

        if let Some(types) = self.storage.entities.remove(&entity) {
            for type_id in types {
                if let Some(column) = self.storage.columns.get_mut(&type_id) {
                    column.remove_entity(entity);
                }
            }
        }
        debug!(%entity, "destroyed entity");
        Ok(())
    }

    /// Run every handler of one view for one transition.
    fn dispatch(&mut self, idx: usize, entity: Entity, transition: Transition) {
        let slot = &mut self.views[idx];
        let handlers = match transition {
            Transition::Added => &mut slot.on_added,
            Transition::Removed => &mut slot.on_removed,
        };
        let mut target = EntityMut {
            entity,
            storage: &mut self.storage,
            commands: &mut self.commands,
        };
        for handler in handlers.iter_mut() {
            handler(&mut target);
        }
    }

    /// Apply queued commands until the queue is empty. Commands queued by
    /// handlers of a command being applied are appended and run in turn.
    fn flush_commands(&mut self) {
        while let Some(command) = self.commands.pop() {
            if let Err(error) = command(self) {
                warn!(%error, "deferred command failed");
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
