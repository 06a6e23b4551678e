//! Placement of a scene node.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Where a node sits, how it is turned, and how it is scaled.
///
/// Physics owns position and rotation of simulated nodes; scale is only
/// ever set by whoever builds the node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform3D {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform3D {
    /// Origin, unrotated, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Unscaled transform with the given pose.
    #[must_use]
    pub fn from_pose(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Follow a simulated body. Scale is left alone.
    pub fn set_pose(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unscaled_origin() {
        let t = Transform3D::default();
        assert_eq!(t, Transform3D::from_pose(Vec3::ZERO, Quat::IDENTITY));
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn test_following_a_body_keeps_scale() {
        let mut t = Transform3D {
            scale: Vec3::splat(2.0),
            ..Transform3D::IDENTITY
        };
        let turn = Quat::from_rotation_y(1.0);
        t.set_pose(Vec3::new(1.0, 2.0, 3.0), turn);
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.rotation, turn);
        assert_eq!(t.scale, Vec3::splat(2.0));
    }
}
