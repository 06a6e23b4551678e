//! # engine_physics
//!
//! The boundary between the engine and a rigid-body physics backend.
//!
//! [`PhysicsWorld`] and [`CharacterVirtual`] are what the engine needs from a
//! backend: bodies, virtual characters, ray casts, and a world step.
//! [`CharacterSettings`], [`ExtendedUpdateSettings`], and [`CharacterFilters`]
//! configure character construction and the per-frame sweep.
//! [`HeadlessPhysics`] is a deterministic box-world backend for running
//! without a native physics library.

pub mod error;
pub mod headless;
pub mod settings;
pub mod types;
pub mod world;

pub use error::PhysicsError;
pub use headless::{HeadlessCharacter, HeadlessPhysics};
pub use settings::{CapsuleShape, CharacterFilters, CharacterSettings, ExtendedUpdateSettings, Plane};
pub use types::{
    Activation, BodyId, BodySettings, BoxShape, CharacterId, GroundState, MotionType, ObjectLayer, RayHit,
};
pub use world::{CharacterVirtual, PhysicsWorld, SharedPhysics, collision_steps, tug};
