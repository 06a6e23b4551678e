//! Construction and update settings for virtual characters.

use std::collections::BTreeSet;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::types::{BodyId, ObjectLayer};

/// A capsule standing on its bottom: a cylinder of `2 * half_height` capped by
/// two hemispheres of `radius`, translated so its lowest point sits at the
/// character position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapsuleShape {
    pub half_height: f32,
    pub radius: f32,
    /// Offset of the capsule centre from the character position.
    pub offset: Vec3,
}

impl CapsuleShape {
    /// Capsule whose cylinder part is `height` tall.
    #[must_use]
    pub fn standing(height: f32, radius: f32) -> Self {
        let half_height = 0.5 * height;
        Self {
            half_height,
            radius,
            offset: Vec3::new(0.0, half_height + radius, 0.0),
        }
    }

    /// Distance from the character position to the top of the capsule.
    #[must_use]
    pub fn total_height(&self) -> f32 {
        self.offset.y + self.half_height + self.radius
    }
}

/// A plane `normal · p + constant = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

/// Everything needed to create a virtual character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSettings {
    pub mass: f32,
    /// Radians.
    pub max_slope_angle: f32,
    /// Maximum force the character can push other bodies with.
    pub max_strength: f32,
    pub shape: CapsuleShape,
    pub collide_with_back_faces: bool,
    pub character_padding: f32,
    /// Fraction of a penetration resolved per update (1 = all of it).
    pub penetration_recovery_speed: f32,
    pub predictive_contact_distance: f32,
    /// Only contacts below this plane (in character space) can support the character.
    pub supporting_volume: Plane,
}

impl CharacterSettings {
    /// Standard settings for a standing capsule of the given dimensions.
    #[must_use]
    pub fn capsule(height: f32, radius: f32) -> Self {
        Self {
            mass: 1000.0,
            max_slope_angle: 45f32.to_radians(),
            max_strength: 100.0,
            shape: CapsuleShape::standing(height, radius),
            collide_with_back_faces: true,
            character_padding: 0.02,
            penetration_recovery_speed: 1.0,
            predictive_contact_distance: 0.1,
            supporting_volume: Plane {
                normal: Vec3::Y,
                constant: -radius,
            },
        }
    }
}

/// Step handling for the extended update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtendedUpdateSettings {
    /// How far below the feet the character snaps back down onto the floor
    /// when it was grounded last update. Zero disables sticking.
    pub stick_to_floor_step_down: Vec3,
    /// Highest ledge the character walks up without jumping. Zero disables
    /// stair walking.
    pub walk_stairs_step_up: Vec3,
}

impl Default for ExtendedUpdateSettings {
    fn default() -> Self {
        Self {
            stick_to_floor_step_down: Vec3::new(0.0, -0.5, 0.0),
            walk_stairs_step_up: Vec3::new(0.0, 0.4, 0.0),
        }
    }
}

/// Broad-phase, object-layer, and body filters used when sweeping a
/// character. Built once when the character is bound and reused every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterFilters {
    /// Layer the character sweeps as.
    pub layer: ObjectLayer,
    /// Bodies the sweep ignores.
    pub ignored_bodies: BTreeSet<BodyId>,
}

impl CharacterFilters {
    /// Filters for a character moving in `layer`, colliding with every body
    /// the layer pair table allows.
    #[must_use]
    pub fn for_layer(layer: ObjectLayer) -> Self {
        Self {
            layer,
            ignored_bodies: BTreeSet::new(),
        }
    }

    /// Also skip `body` during sweeps.
    #[must_use]
    pub fn ignoring(mut self, body: BodyId) -> Self {
        self.ignored_bodies.insert(body);
        self
    }

    /// Returns `true` if a body in `layer` takes part in the sweep.
    #[must_use]
    pub fn accepts(&self, body: BodyId, layer: ObjectLayer) -> bool {
        self.layer.collides_with(layer) && !self.ignored_bodies.contains(&body)
    }
}
