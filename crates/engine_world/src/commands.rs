//! Deferred structural mutations.
//!
//! Notification handlers never hold `&mut World`. Structural changes they
//! request are queued on [`Commands`] and applied by the world after the
//! notification in progress has finished, still inside the outer mutating
//! call. A handler therefore cannot make its own view notify again while it
//! is running.

use std::collections::VecDeque;
use std::fmt;

use engine_component::{Component, Entity};

use crate::error::WorldError;
use crate::world::World;

pub(crate) type Command = Box<dyn FnOnce(&mut World) -> Result<(), WorldError>>;

/// A FIFO queue of pending structural mutations.
#[derive(Default)]
pub struct Commands {
    queue: VecDeque<Command>,
}

impl Commands {
    /// Queue `value` to be attached to `entity`.
    pub fn insert<T: Component>(&mut self, entity: Entity, value: T) {
        self.queue
            .push_back(Box::new(move |world| world.insert_now(entity, value)));
    }

    /// Queue removal of component `T` from `entity`. The removed value is dropped.
    pub fn remove<T: Component>(&mut self, entity: Entity) {
        self.queue
            .push_back(Box::new(move |world| world.remove_now::<T>(entity).map(drop)));
    }

    /// Queue destruction of `entity`.
    pub fn destroy(&mut self, entity: Entity) {
        self.queue
            .push_back(Box::new(move |world| world.destroy_now(entity)));
    }

    /// Queued changes not yet applied.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` when there is nothing to report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn pop(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commands")
            .field("pending", &self.queue.len())
            .finish()
    }
}
