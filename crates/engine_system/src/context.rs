//! Shared application context handed to every system.

use std::cell::RefCell;
use std::rc::Rc;

use engine_math::CameraPose;
use engine_physics::{HeadlessPhysics, SharedPhysics};

use crate::config::EngineConfig;
use crate::input::InputState;
use crate::scene::{SceneTree, SharedScene};

/// Collaborators and configuration shared by all systems.
///
/// View handlers outlive any single frame, so systems that react to
/// add/remove clone the shared collaborators (`physics`, `scene`) into their
/// handlers at construction time. Never hold a borrow of either across a
/// structural world mutation: the handlers it triggers borrow them too.
pub struct AppContext {
    /// The render camera, written by the camera sync system.
    pub camera: CameraPose,
    pub input: InputState,
    pub physics: SharedPhysics,
    pub scene: SharedScene,
    pub config: EngineConfig,
}

impl AppContext {
    /// Context over the given collaborators, with input mapped from `config`.
    #[must_use]
    pub fn new(config: EngineConfig, physics: SharedPhysics, scene: SharedScene) -> Self {
        Self {
            camera: CameraPose::default(),
            input: InputState::new(&config.input),
            physics,
            scene,
            config,
        }
    }

    /// Context backed by the headless physics and scene implementations.
    #[must_use]
    pub fn headless(config: EngineConfig) -> Self {
        let physics = Rc::new(RefCell::new(HeadlessPhysics::new(config.physics.gravity)));
        let scene = Rc::new(RefCell::new(SceneTree::new()));
        Self::new(config, physics, scene)
    }
}
