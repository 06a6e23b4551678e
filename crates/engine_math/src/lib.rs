//! # engine_math
//!
//! Math types for the engine. Re-exports [`glam`] for linear algebra and
//! defines the spatial types that implement
//! [`Component`](engine_component::Component).

pub mod camera;
pub mod transform;
pub mod velocity;

// Re-export glam types for convenience.
pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

pub use camera::CameraPose;
pub use transform::Transform3D;
pub use velocity::Velocity;
