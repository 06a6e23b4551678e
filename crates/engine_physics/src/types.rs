//! Handles and plain enums shared across the physics boundary.

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Opaque handle to a virtual character owned by the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(pub u32);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Character({})", self.0)
    }
}

/// Opaque handle to a rigid body owned by the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Body({})", self.0)
    }
}

/// How a character is supported by the geometry under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroundState {
    /// Standing on walkable ground.
    OnGround,
    /// Touching ground that is steeper than the max slope angle.
    OnTooSteepSlope,
    /// No supporting contact.
    InAir,
}

/// Object layer a body lives in. Determines what it can collide with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectLayer(pub u16);

impl ObjectLayer {
    /// Static geometry.
    pub const NON_MOVING: ObjectLayer = ObjectLayer(0);
    /// Everything that moves, characters included.
    pub const MOVING: ObjectLayer = ObjectLayer(1);

    /// Number of layers in the pair table.
    pub const COUNT: u16 = 2;

    /// Object layer pair table: static geometry never collides with other
    /// static geometry; everything else collides.
    #[must_use]
    pub const fn collides_with(self, other: ObjectLayer) -> bool {
        !(self.0 == Self::NON_MOVING.0 && other.0 == Self::NON_MOVING.0)
    }
}

/// How a body responds to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionType {
    /// Never moves.
    Static,
    /// Moved by setting its velocity; unaffected by gravity and contacts.
    Kinematic,
    /// Fully simulated.
    Dynamic,
}

/// Whether a body added to the world starts awake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Activate,
    DontActivate,
}

/// An axis-aligned box collision shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxShape {
    pub half_extent: Vec3,
    /// Rounding radius of the box corners.
    pub convex_radius: f32,
}

/// Everything needed to create a rigid body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySettings {
    pub shape: BoxShape,
    pub position: Vec3,
    pub rotation: Quat,
    pub motion_type: MotionType,
    pub layer: ObjectLayer,
    pub friction: f32,
    pub mass: f32,
}

impl BodySettings {
    /// A box body with the engine's standard material: friction 0.1, mass 1,
    /// convex radius 0.05.
    #[must_use]
    pub fn cuboid(
        position: Vec3,
        rotation: Quat,
        half_extent: Vec3,
        motion_type: MotionType,
        layer: ObjectLayer,
    ) -> Self {
        Self {
            shape: BoxShape {
                half_extent,
                convex_radius: 0.05,
            },
            position,
            rotation,
            motion_type,
            layer,
            friction: 0.1,
            mass: 1.0,
        }
    }
}

/// First body along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub body: BodyId,
    /// Position of the hit along the ray, from 0 (origin) to 1 (origin + direction).
    pub fraction: f32,
    pub point: Vec3,
}
