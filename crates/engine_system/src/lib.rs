//! # engine_system
//!
//! The frame runtime. Everything between "an event arrived" and "the world
//! advanced by one frame" lives here:
//!
//! 1. The platform layer feeds key and pointer events into [`InputState`].
//! 2. [`FrameLoop`] measures the clamped frame delta and calls [`App::frame`].
//! 3. The [`Scheduler`] runs user systems, then the built-in systems.
//! 4. The physics world steps once.
//! 5. The input state drops its per-frame edges.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use engine_system::{App, AppContext, EngineConfig, FrameLoop, SceneGraphSystem};
//!
//! let config = EngineConfig::engine_defaults().unwrap();
//! let frame_config = config.frame.clone();
//! let mut app = App::new(AppContext::headless(config));
//! app.add_builtin(SceneGraphSystem::new);
//! FrameLoop::new(frame_config).run(&mut app).unwrap();
//! ```

pub mod app;
pub mod clock;
pub mod config;
pub mod context;
pub mod input;
pub mod runner;
pub mod scene;
pub mod scheduler;
pub mod system;
pub mod systems;

pub use app::App;
pub use clock::FrameClock;
pub use config::{ConfigError, EngineConfig, FrameConfig, InputConfig, LookConfig, PhysicsConfig};
pub use context::AppContext;
pub use input::{InputState, actions};
pub use runner::FrameLoop;
pub use scene::{Node, NodeId, ParentNode, SceneGraph, SceneTree, SharedScene};
pub use scheduler::Scheduler;
pub use system::System;
pub use systems::{CameraSyncSystem, PhysicsBody, PhysicsSyncSystem, SceneGraphSystem};
