//! The `characterController` component.

use engine_math::Vec3;
use engine_physics::CharacterSettings;
use engine_world::Component;
use serde::{Deserialize, Serialize};

use crate::binding::CharacterBinding;

/// Tunables for a physics-driven first-person character.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerTuning {
    /// Upward speed added by a jump.
    pub jump_speed: f32,
    /// Steady-state scale of the smoothed desired velocity.
    pub character_speed: f32,
    /// Length of the movement direction before smoothing.
    pub movement_speed: f32,
    /// Smooth desired velocity across frames instead of applying it directly.
    pub enable_inertia: bool,
    /// Height of the capsule's cylinder part.
    pub height: f32,
    pub radius: f32,
    pub start_position: Vec3,
    /// Character up axis, written to the physics character every frame.
    pub up: Vec3,
    /// Radians.
    pub max_slope_angle: f32,
    pub max_strength: f32,
    pub character_padding: f32,
    pub penetration_recovery_speed: f32,
    pub predictive_contact_distance: f32,
}

impl Default for ControllerTuning {
    fn default() -> Self {
        let physics = CharacterSettings::capsule(3.0, 1.0);
        Self {
            jump_speed: 11.0,
            character_speed: 6.0,
            movement_speed: 2.0,
            enable_inertia: true,
            height: 3.0,
            radius: 1.0,
            start_position: Vec3::new(2.0, 5.0, 2.0),
            up: Vec3::Y,
            max_slope_angle: physics.max_slope_angle,
            max_strength: physics.max_strength,
            character_padding: physics.character_padding,
            penetration_recovery_speed: physics.penetration_recovery_speed,
            predictive_contact_distance: physics.predictive_contact_distance,
        }
    }
}

impl ControllerTuning {
    /// Physics settings for the backing character.
    #[must_use]
    pub fn character_settings(&self) -> CharacterSettings {
        CharacterSettings {
            max_slope_angle: self.max_slope_angle,
            max_strength: self.max_strength,
            character_padding: self.character_padding,
            penetration_recovery_speed: self.penetration_recovery_speed,
            predictive_contact_distance: self.predictive_contact_distance,
            ..CharacterSettings::capsule(self.height, self.radius)
        }
    }

    /// [`up`](Self::up) as a unit vector, falling back to +Y.
    #[must_use]
    pub fn up_axis(&self) -> Vec3 {
        self.up.try_normalize().unwrap_or(Vec3::Y)
    }

    /// Camera height above the character position along `up`.
    #[must_use]
    pub fn eye_offset(&self, up: Vec3) -> Vec3 {
        up * 0.5 * self.height
    }
}

/// Per-entity controller state. Attaching it binds a physics character;
/// removing it (or destroying the entity) releases that character.
#[derive(Debug, Default)]
pub struct CharacterController {
    pub tuning: ControllerTuning,
    /// Smoothed horizontal velocity the character is trying to reach.
    pub desired_velocity: Vec3,
    pub(crate) binding: Option<CharacterBinding>,
}

impl CharacterController {
    /// An unbound controller at rest.
    #[must_use]
    pub fn new(tuning: ControllerTuning) -> Self {
        Self {
            tuning,
            desired_velocity: Vec3::ZERO,
            binding: None,
        }
    }

    /// Returns `true` once the backing physics character exists.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// The physics character, once bound.
    #[must_use]
    pub fn binding(&self) -> Option<&CharacterBinding> {
        self.binding.as_ref()
    }
}

impl Component for CharacterController {
    fn type_name() -> &'static str {
        "characterController"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning() {
        let tuning = ControllerTuning::default();
        assert_eq!(tuning.jump_speed, 11.0);
        assert_eq!(tuning.character_speed, 6.0);
        assert_eq!(tuning.movement_speed, 2.0);
        assert!(tuning.enable_inertia);
        assert_eq!(tuning.start_position, Vec3::new(2.0, 5.0, 2.0));
        assert_eq!(tuning.up_axis(), Vec3::Y);
    }

    #[test]
    fn test_up_axis_is_normalized() {
        let tilted = ControllerTuning {
            up: Vec3::new(0.0, 2.0, 2.0),
            ..ControllerTuning::default()
        };
        assert!(tilted.up_axis().abs_diff_eq(Vec3::new(0.0, 1.0, 1.0).normalize(), 1e-6));

        let degenerate = ControllerTuning {
            up: Vec3::ZERO,
            ..ControllerTuning::default()
        };
        assert_eq!(degenerate.up_axis(), Vec3::Y);
    }

    #[test]
    fn test_character_settings_follow_tuning() {
        let tuning = ControllerTuning {
            height: 2.0,
            radius: 0.5,
            character_padding: 0.05,
            ..ControllerTuning::default()
        };
        let settings = tuning.character_settings();
        assert_eq!(settings.shape.half_height, 1.0);
        assert_eq!(settings.shape.radius, 0.5);
        assert_eq!(settings.character_padding, 0.05);
        assert_eq!(settings.supporting_volume.constant, -0.5);
        assert_eq!(settings.mass, 1000.0);
    }

    #[test]
    fn test_eye_offset_is_half_height_along_up() {
        let tuning = ControllerTuning::default();
        assert_eq!(tuning.eye_offset(Vec3::Y), Vec3::new(0.0, 1.5, 0.0));
    }

    #[test]
    fn test_new_controller_is_unbound() {
        let controller = CharacterController::default();
        assert!(!controller.is_bound());
        assert_eq!(controller.desired_velocity, Vec3::ZERO);
    }
}
