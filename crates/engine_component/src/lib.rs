//! # engine_component
//!
//! What an entity is, what a component is, and how component values are
//! stored.
//!
//! An [`Entity`] is a `u64` handle handed out in order by an
//! [`EntityAllocator`] and never reused. Any `'static` type implementing
//! [`Component`] can be attached to one. A [`Signature`] names the set of
//! component types a view requires, and each component type lives in its own
//! dense [`Column`].

pub mod column;
pub mod component;
pub mod entity;
pub mod signature;

pub use column::{AnyColumn, Column};
pub use component::{Component, ComponentTypeId};
pub use entity::{Entity, EntityAllocator};
pub use signature::Signature;
