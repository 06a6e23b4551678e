//! Per-frame character update.
//!
//! Each frame, for every entity with a [`CharacterController`]:
//!
//! 1. With pointer focus, turn the camera by the frame's look delta.
//! 2. Rotate the input direction by the camera yaw, flatten, normalize, and
//!    scale by the movement speed.
//! 3. Blend it into the desired velocity (smoothed when inertia is on).
//! 4. Write the up axis and the camera-yaw facing to the physics character.
//! 5. Read ground velocity, ground state, ground normal, up, and velocity
//!    from the physics character.
//! 6. Split the current velocity into its vertical part.
//! 7. On walkable ground, ride the ground (plus a jump if requested);
//!    otherwise keep the current vertical motion.
//! 8. Add gravity.
//! 9. Add the desired velocity, rotated into the character's up frame.
//! 10. Hand the velocity to the physics character.
//! 11. Sweep it through the world.
//! 12. Put the camera at the character's eye.
//!
//! Gravity must come after ground adherence or grounded characters sink.
//! A controller without a physics character yet runs steps 1–3 only.

use anyhow::anyhow;
use engine_math::{CameraPose, Quat, Vec3};
use engine_physics::{CharacterVirtual, GroundState, PhysicsError, PhysicsWorld};
use engine_system::{AppContext, actions};
use engine_world::{Entity, World};
use tracing::warn;

use crate::binding::CharacterBinding;
use crate::component::{CharacterController, ControllerTuning};

/// Share of the previous desired velocity kept each frame with inertia on.
pub const INERTIA_RETENTION: f32 = 0.75;

/// Relative vertical speed below which a character is not separating from
/// the ground.
pub const SEPARATION_EPSILON: f32 = 0.1;

/// Step 2: camera-relative horizontal movement direction.
///
/// `input` is `(right, 0, back)` in camera space. Zero input gives zero.
#[must_use]
pub fn movement_direction(input: Vec3, yaw: Quat, speed: f32) -> Vec3 {
    let mut direction = yaw * input;
    direction.y = 0.0;
    direction.normalize_or_zero() * speed
}

/// Step 3: blend the movement direction into the desired velocity.
#[must_use]
pub fn blend_desired_velocity(desired: Vec3, direction: Vec3, character_speed: f32, enable_inertia: bool) -> Vec3 {
    if enable_inertia {
        desired * INERTIA_RETENTION + direction * (1.0 - INERTIA_RETENTION) * character_speed
    } else {
        direction * character_speed
    }
}

/// Step 5: what the physics character reports about its support.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundContact {
    pub state: GroundState,
    pub ground_velocity: Vec3,
    pub ground_normal: Vec3,
    pub up: Vec3,
    pub linear_velocity: Vec3,
    /// Whether `ground_normal` is steeper than the character's max slope.
    pub slope_too_steep: bool,
}

impl GroundContact {
    /// Snapshot the character's current contact.
    #[must_use]
    pub fn read(character: &dyn CharacterVirtual) -> Self {
        let ground_normal = character.ground_normal();
        Self {
            state: character.ground_state(),
            ground_velocity: character.ground_velocity(),
            ground_normal,
            up: character.up(),
            linear_velocity: character.linear_velocity(),
            slope_too_steep: character.is_slope_too_steep(ground_normal),
        }
    }

    /// Step 6: the component of the current velocity along `up`.
    #[must_use]
    pub fn current_vertical_velocity(&self) -> Vec3 {
        self.up * self.linear_velocity.dot(self.up)
    }

    /// Returns `true` unless the character is moving away from the ground
    /// faster than [`SEPARATION_EPSILON`].
    #[must_use]
    pub fn moving_towards_ground(&self) -> bool {
        (self.current_vertical_velocity() - self.ground_velocity).dot(self.up) < SEPARATION_EPSILON
    }
}

/// Steps 6–7: the velocity the character keeps before gravity and input.
#[must_use]
pub fn resolve_vertical_velocity(contact: &GroundContact, enable_inertia: bool, jump: bool, jump_speed: f32) -> Vec3 {
    let moving_towards_ground = contact.moving_towards_ground();
    let adheres = contact.state == GroundState::OnGround
        && if enable_inertia {
            moving_towards_ground
        } else {
            !contact.slope_too_steep
        };

    if !adheres {
        return contact.current_vertical_velocity();
    }

    let mut velocity = contact.ground_velocity;
    if jump && moving_towards_ground {
        velocity += contact.up * jump_speed;
    }
    velocity
}

/// Steps 8–9.
#[must_use]
pub fn compose_velocity(vertical: Vec3, gravity: Vec3, dt: f32, up_rotation: Quat, desired: Vec3) -> Vec3 {
    vertical + gravity * dt + up_rotation * desired
}

/// Character state written during an update, kept so a failed update can
/// be undone.
#[derive(Debug, Clone, Copy)]
struct SavedMotion {
    up: Vec3,
    rotation: Quat,
    linear_velocity: Vec3,
}

impl SavedMotion {
    fn read(character: &dyn CharacterVirtual) -> Self {
        Self {
            up: character.up(),
            rotation: character.rotation(),
            linear_velocity: character.linear_velocity(),
        }
    }

    fn restore(self, character: &mut dyn CharacterVirtual) {
        character.set_up(self.up);
        character.set_rotation(self.rotation);
        character.set_linear_velocity(self.linear_velocity);
    }
}

/// Steps 4–11 against the bound character. Returns the eye position.
fn drive_character(
    physics: &mut dyn PhysicsWorld,
    binding: &CharacterBinding,
    tuning: &ControllerTuning,
    yaw: Quat,
    desired: Vec3,
    jump: bool,
    dt: f32,
) -> Result<Vec3, PhysicsError> {
    let id = binding.id();
    let up = tuning.up_axis();
    let up_rotation = Quat::from_rotation_arc(Vec3::Y, up);

    // 4
    let character = physics.character_mut(id)?;
    character.set_up(up);
    character.set_rotation(up_rotation * yaw);

    // 5-6
    physics.update_ground_velocity(id)?;
    let contact = GroundContact::read(physics.character(id)?);

    // 7-9
    let vertical = resolve_vertical_velocity(&contact, tuning.enable_inertia, jump, tuning.jump_speed);
    let velocity = compose_velocity(vertical, physics.gravity(), dt, up_rotation, desired);

    // 10-11
    physics.character_mut(id)?.set_linear_velocity(velocity);
    physics.extended_update(id, dt, up, binding.update_settings(), binding.filters())?;

    let character = physics.character(id)?;
    Ok(character.position() + tuning.eye_offset(character.up()))
}

/// Run one frame of the controller for `entity`.
///
/// # Errors
///
/// Fails if the entity lost its controller, if the physics world is
/// borrowed elsewhere, or if the backend rejects any step of the update.
/// A failed update leaves the controller, the camera, and the character's
/// up, rotation, and velocity as they were.
pub fn update_character(world: &mut World, ctx: &AppContext, entity: Entity, dt: f32) -> anyhow::Result<()> {
    // 1
    let mut pose = world.get::<CameraPose>(entity).ok().copied();
    if ctx.input.has_focus() {
        if let Some(pose) = pose.as_mut() {
            pose.look(ctx.input.pointer_delta(), ctx.config.look.sensitivity);
        }
    }
    let yaw = pose.map_or(Quat::IDENTITY, |p| p.yaw_rotation());

    let controller = world.get::<CharacterController>(entity)?;
    let tuning: ControllerTuning = controller.tuning;

    // 2-3
    let direction = movement_direction(ctx.input.direction(), yaw, tuning.movement_speed);
    let desired = blend_desired_velocity(
        controller.desired_velocity,
        direction,
        tuning.character_speed,
        tuning.enable_inertia,
    );

    let eye = match controller.binding() {
        None => None,
        Some(binding) => {
            let mut physics = ctx
                .physics
                .try_borrow_mut()
                .map_err(|_| anyhow!("physics world is borrowed"))?;
            let id = binding.id();
            let saved = SavedMotion::read(physics.character(id)?);

            let jump = ctx.input.is_active(actions::JUMP);
            match drive_character(&mut *physics, binding, &tuning, yaw, desired, jump, dt) {
                Ok(eye) => Some(eye),
                Err(error) => {
                    match physics.character_mut(id) {
                        Ok(character) => saved.restore(character),
                        Err(lost) => warn!(%entity, character = %id, %lost, "could not restore character"),
                    }
                    return Err(error.into());
                }
            }
        }
    };

    world.get_mut::<CharacterController>(entity)?.desired_velocity = desired;
    if let Some(mut pose) = pose {
        // 12
        if let Some(eye) = eye {
            pose.position = eye;
        }
        *world.get_mut::<CameraPose>(entity)? = pose;
    }
    Ok(())
}
