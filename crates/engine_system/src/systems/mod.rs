//! Built-in systems. They run after user systems, in this order:
//! scene graph, player controller (from `engine_character`), physics sync,
//! camera sync.

mod backlog;
pub mod camera_sync;
pub mod physics_sync;
pub mod scene_graph;

pub use camera_sync::CameraSyncSystem;
pub use physics_sync::{PhysicsBody, PhysicsSyncSystem};
pub use scene_graph::SceneGraphSystem;
