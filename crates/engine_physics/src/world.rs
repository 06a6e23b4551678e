//! The physics collaborator contract.
//!
//! The engine never looks inside the physics backend. It creates characters
//! and bodies, reads their state through these traits, and hands the backend
//! one sweep per character and one world step per frame.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Quat, Vec3};

use crate::error::PhysicsError;
use crate::settings::{CharacterFilters, CharacterSettings, ExtendedUpdateSettings};
use crate::types::{Activation, BodyId, BodySettings, CharacterId, GroundState, ObjectLayer, RayHit};

/// Physics world shared by the systems of one application.
pub type SharedPhysics = Rc<RefCell<dyn PhysicsWorld>>;

/// A movable, collidable capsule with ground-contact queries.
pub trait CharacterVirtual {
    /// Position of the bottom of the shape.
    fn position(&self) -> Vec3;
    fn rotation(&self) -> Quat;
    fn up(&self) -> Vec3;
    fn linear_velocity(&self) -> Vec3;
    /// Velocity of the supporting body, as of the last ground velocity update.
    fn ground_velocity(&self) -> Vec3;
    fn ground_state(&self) -> GroundState;
    /// Contact normal of the supporting surface; `up` when unsupported.
    fn ground_normal(&self) -> Vec3;
    /// Returns `true` if a surface with `normal` is steeper than the max slope angle.
    fn is_slope_too_steep(&self, normal: Vec3) -> bool;

    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn set_up(&mut self, up: Vec3);
    fn set_rotation(&mut self, rotation: Quat);
}

/// A rigid-body world with virtual characters.
pub trait PhysicsWorld {
    fn gravity(&self) -> Vec3;

    /// # Errors
    ///
    /// Returns [`PhysicsError::ResourceInit`] if the backend rejects the settings.
    fn create_character(
        &mut self,
        settings: &CharacterSettings,
        position: Vec3,
        rotation: Quat,
    ) -> Result<CharacterId, PhysicsError>;

    /// Release a character. Each handle must be released exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownCharacter`] for a handle that is not live.
    fn destroy_character(&mut self, id: CharacterId) -> Result<(), PhysicsError>;

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownCharacter`] for a handle that is not live.
    fn character(&self, id: CharacterId) -> Result<&dyn CharacterVirtual, PhysicsError>;

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownCharacter`] for a handle that is not live.
    fn character_mut(&mut self, id: CharacterId) -> Result<&mut dyn CharacterVirtual, PhysicsError>;

    /// Refresh the character's ground velocity from the body supporting it.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownCharacter`] for a handle that is not live.
    fn update_ground_velocity(&mut self, id: CharacterId) -> Result<(), PhysicsError>;

    /// Sweep the character through the world for `dt` seconds using its
    /// current linear velocity: collide and slide, recover from penetration,
    /// walk up steps, stick to the floor, and refresh the ground state.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownCharacter`] for a handle that is not live.
    fn extended_update(
        &mut self,
        id: CharacterId,
        dt: f32,
        up: Vec3,
        settings: &ExtendedUpdateSettings,
        filters: &CharacterFilters,
    ) -> Result<(), PhysicsError>;

    /// Create a body. It does not take part in the simulation until added.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::ResourceInit`] if the backend rejects the settings.
    fn create_body(&mut self, settings: &BodySettings) -> Result<BodyId, PhysicsError>;

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for a handle that is not live.
    fn add_body(&mut self, id: BodyId, activation: Activation) -> Result<(), PhysicsError>;

    /// Take a body out of the simulation. The handle stays valid.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for a handle that is not live.
    fn remove_body(&mut self, id: BodyId) -> Result<(), PhysicsError>;

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for a handle that is not live.
    fn destroy_body(&mut self, id: BodyId) -> Result<(), PhysicsError>;

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for a handle that is not live.
    fn body_position(&self, id: BodyId) -> Result<Vec3, PhysicsError>;

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for a handle that is not live.
    fn body_rotation(&self, id: BodyId) -> Result<Quat, PhysicsError>;

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for a handle that is not live.
    fn set_body_linear_velocity(&mut self, id: BodyId, velocity: Vec3) -> Result<(), PhysicsError>;

    /// Apply a linear impulse to a body and wake it. Static and kinematic
    /// bodies ignore impulses.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for a handle that is not live.
    fn add_impulse(&mut self, id: BodyId, impulse: Vec3) -> Result<(), PhysicsError>;

    /// Closest added body on the segment from `origin` to
    /// `origin + direction` that a query in `layer` may collide with.
    fn cast_ray(&self, origin: Vec3, direction: Vec3, layer: ObjectLayer) -> Option<RayHit>;

    /// Advance every added body by `dt`, split into `collision_steps` sub-steps.
    fn step(&mut self, dt: f32, collision_steps: u32);
}

/// Cast a ray as a moving object and pull the first body it hits back
/// towards `origin` with an impulse of `strength`.
///
/// # Errors
///
/// Returns [`PhysicsError::UnknownBody`] if the hit body vanished before the
/// impulse was applied.
pub fn tug(
    physics: &mut dyn PhysicsWorld,
    origin: Vec3,
    direction: Vec3,
    strength: f32,
) -> Result<Option<RayHit>, PhysicsError> {
    let Some(hit) = physics.cast_ray(origin, direction, ObjectLayer::MOVING) else {
        return Ok(None);
    };
    physics.add_impulse(hit.body, direction.normalize_or_zero() * -strength)?;
    Ok(Some(hit))
}

/// Number of collision sub-steps for a frame of `dt` seconds: two when the
/// frame rate drops below 55 Hz, one otherwise.
#[must_use]
pub fn collision_steps(dt: f32) -> u32 {
    if dt > 1.0 / 55.0 { 2 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_steps() {
        assert_eq!(collision_steps(1.0 / 60.0), 1);
        assert_eq!(collision_steps(1.0 / 55.0), 1);
        assert_eq!(collision_steps(0.033), 2);
    }
}
