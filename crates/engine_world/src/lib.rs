//! # engine_world
//!
//! The entity/component store and its reactive views.
//!
//! The [`World`] owns entities and component values. A [`View`] is the live
//! set of entities matching a [`Signature`], and it notifies `on_added` and
//! `on_removed` handlers as entities enter and leave. Handlers queue
//! structural changes on [`Commands`].
//!
//! The world is single-threaded. Structural mutation goes through `&mut World`
//! (or a handler's [`Commands`]), so it is serialised by construction.

pub mod commands;
pub mod error;
pub mod view;
pub mod world;

pub use commands::Commands;
pub use engine_component::{Component, ComponentTypeId, Entity, Signature};
pub use error::WorldError;
pub use view::{Handler, View, ViewId};
pub use world::{EntityMut, World};
