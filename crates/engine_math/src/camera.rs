//! First-person camera pose.
//!
//! A [`CameraPose`] is produced by whatever controls the view (the character
//! controller) and consumed by the render side. Rotation is stored as Euler
//! angles applied in Y-X-Z order: yaw about world up first, then pitch.

use std::f32::consts::FRAC_PI_2;

use engine_component::Component;
use glam::{EulerRot, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Eye position plus yaw/pitch, in radians.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub yaw: f32,
    /// Always within `[-π/2, π/2]`.
    pub pitch: f32,
}

impl CameraPose {
    /// Level pose at `position`, looking down −Z.
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Apply a pointer delta: positive x turns right (yaw decreases), positive
    /// y looks down. `sensitivity` is the pixels-per-radian divisor.
    pub fn look(&mut self, delta: Vec2, sensitivity: f32) {
        self.yaw -= delta.x / sensitivity;
        self.pitch = (self.pitch - delta.y / sensitivity).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Full view rotation (yaw then pitch).
    #[must_use]
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Rotation about world up only, for ground-plane movement.
    #[must_use]
    pub fn yaw_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Unit view direction. Looks down −Z at zero yaw and pitch.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Component for CameraPose {
    fn type_name() -> &'static str {
        "cameraPose"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_is_clamped() {
        let mut pose = CameraPose::default();
        pose.look(Vec2::new(0.0, -10_000.0), 500.0);
        assert_eq!(pose.pitch, FRAC_PI_2);
        pose.look(Vec2::new(0.0, 20_000.0), 500.0);
        assert_eq!(pose.pitch, -FRAC_PI_2);
    }

    #[test]
    fn test_yaw_is_unbounded() {
        let mut pose = CameraPose::default();
        pose.look(Vec2::new(-5_000.0, 0.0), 500.0);
        assert!((pose.yaw - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_forward_follows_yaw() {
        let mut pose = CameraPose::default();
        assert!(pose.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        pose.yaw = FRAC_PI_2;
        // Quarter turn left faces −X.
        assert!(pose.forward().abs_diff_eq(Vec3::NEG_X, 1e-6));
    }

    #[test]
    fn test_pose_serializes_as_plain_fields() {
        let json = serde_json::to_value(CameraPose::new(Vec3::new(1.0, 2.0, 3.0))).unwrap();
        assert_eq!(json["position"], serde_json::json!([1.0, 2.0, 3.0]));
        assert_eq!(json["yaw"], serde_json::json!(0.0));
    }
}
