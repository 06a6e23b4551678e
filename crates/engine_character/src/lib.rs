//! # engine_character
//!
//! A physics-driven first-person character controller.
//!
//! Attaching a [`CharacterController`] to an entity binds a physics character
//! through a [`CharacterBinding`], and detaching it releases that character.
//! The per-frame algorithm lives in [`controller`], with each stage exposed
//! as a pure function, and [`PlayerControllerSystem`] runs it for every
//! controller.
//!
//! [`install_builtin_systems`] registers the engine's built-in systems in
//! their fixed order.

pub mod binding;
pub mod component;
pub mod controller;
pub mod system;

use engine_system::{App, CameraSyncSystem, PhysicsSyncSystem, SceneGraphSystem};

pub use binding::{CharacterBinding, PendingReleases};
pub use component::{CharacterController, ControllerTuning};
pub use controller::{GroundContact, update_character};
pub use system::PlayerControllerSystem;

/// Register the built-in systems: scene graph, player controller, physics
/// sync, camera sync. They run after every user system.
pub fn install_builtin_systems(app: &mut App) {
    app.add_builtin(SceneGraphSystem::new);
    app.add_builtin(PlayerControllerSystem::new);
    app.add_builtin(PhysicsSyncSystem::new);
    app.add_builtin(CameraSyncSystem::new);
}
