//! Linear velocity component.

use engine_component::Component;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A 3D velocity component.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Velocity {
    /// Linear velocity in world units per second.
    pub linear: Vec3,
}

impl Velocity {
    /// Zero velocity.
    pub const ZERO: Self = Self { linear: Vec3::ZERO };

    /// Create a new velocity.
    #[must_use]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            linear: Vec3::new(x, y, z),
        }
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Component for Velocity {
    fn type_name() -> &'static str {
        "velocity"
    }
}
