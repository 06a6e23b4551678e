//! Copies the controller-produced camera pose into the render camera.

use engine_math::CameraPose;
use engine_world::{Signature, ViewId, World};

use crate::context::AppContext;
use crate::system::System;

/// View `{CameraPose}`. The most recently created entity with a pose owns
/// the camera.
pub struct CameraSyncSystem {
    view: ViewId,
}

impl CameraSyncSystem {
    /// Watches `{CameraPose}`.
    pub fn new(world: &mut World, _ctx: &AppContext) -> Self {
        Self {
            view: world.query(Signature::new().with::<CameraPose>()),
        }
    }
}

impl System for CameraSyncSystem {
    fn name(&self) -> &str {
        "camera_sync"
    }

    fn update(&mut self, world: &mut World, ctx: &mut AppContext, _dt: f32) -> anyhow::Result<()> {
        if let Some(owner) = world.view(self.view).iter().max() {
            ctx.camera = *world.get::<CameraPose>(owner)?;
        }
        Ok(())
    }
}
