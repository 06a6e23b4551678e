//! User systems for the demo.

use engine_math::{Vec2, Velocity};
use engine_physics::{PhysicsWorld, tug};
use engine_system::{AppContext, PhysicsBody, System, actions};
use engine_world::{Component, Signature, ViewId, World};
use tracing::{debug, info};

/// Marker component picked up by [`TaggedLogger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tagged;

impl Component for Tagged {
    fn type_name() -> &'static str {
        "superCool"
    }
}

/// Logs every tagged entity each frame.
pub struct TaggedLogger {
    view: ViewId,
}

impl TaggedLogger {
    /// Watches `{Tagged}`.
    pub fn new(world: &mut World, _ctx: &AppContext) -> Self {
        Self {
            view: world.query(Signature::new().with::<Tagged>()),
        }
    }
}

impl System for TaggedLogger {
    fn name(&self) -> &str {
        "tagged_logger"
    }

    fn update(&mut self, world: &mut World, _ctx: &mut AppContext, _dt: f32) -> anyhow::Result<()> {
        for entity in world.view(self.view).iter() {
            debug!(%entity, "tagged");
        }
        Ok(())
    }
}

/// Drives kinematic bodies: writes each entity's [`Velocity`] into its body.
pub struct DriftSystem {
    view: ViewId,
}

impl DriftSystem {
    /// Watches `{PhysicsBody, Velocity}`.
    pub fn new(world: &mut World, _ctx: &AppContext) -> Self {
        Self {
            view: world.query(Signature::new().with::<PhysicsBody>().with::<Velocity>()),
        }
    }
}

impl System for DriftSystem {
    fn name(&self) -> &str {
        "drift"
    }

    fn update(&mut self, world: &mut World, ctx: &mut AppContext, _dt: f32) -> anyhow::Result<()> {
        let mut physics = ctx
            .physics
            .try_borrow_mut()
            .map_err(|_| anyhow::anyhow!("physics world is borrowed"))?;
        for entity in world.view(self.view).iter() {
            let body = world.get::<PhysicsBody>(entity)?.body;
            let velocity = world.get::<Velocity>(entity)?.linear;
            physics.set_body_linear_velocity(body, velocity)?;
        }
        Ok(())
    }
}

/// Scripted input: grabs focus, walks forward while turning slowly, and
/// jumps every second and a half. Every two seconds it tugs whatever body
/// the camera looks at back towards the player.
pub struct Autopilot {
    frame: u64,
}

impl Autopilot {
    const JUMP_EVERY: u64 = 90;
    const TUG_EVERY: u64 = 120;
    const TUG_REACH: f32 = 20.0;
    const TUG_STRENGTH: f32 = 10.0;

    /// Starts at frame zero.
    pub fn new(_world: &mut World, _ctx: &AppContext) -> Self {
        Self { frame: 0 }
    }

    fn key_for(ctx: &AppContext, action: &str) -> Option<String> {
        ctx.config.input.mappings.get(action)?.first().cloned()
    }
}

impl System for Autopilot {
    fn name(&self) -> &str {
        "autopilot"
    }

    fn update(&mut self, _world: &mut World, ctx: &mut AppContext, _dt: f32) -> anyhow::Result<()> {
        if self.frame == 0 {
            ctx.input.click();
            if let Some(key) = Self::key_for(ctx, actions::FORWARD) {
                ctx.input.press(&key);
            }
        }

        if let Some(key) = Self::key_for(ctx, actions::JUMP) {
            if self.frame % Self::JUMP_EVERY == 0 {
                ctx.input.press(&key);
            } else {
                ctx.input.release(&key);
            }
        }
        ctx.input.move_pointer(Vec2::new(2.0, 0.0));

        if self.frame > 0 && self.frame % Self::TUG_EVERY == 0 {
            let mut physics = ctx
                .physics
                .try_borrow_mut()
                .map_err(|_| anyhow::anyhow!("physics world is borrowed"))?;
            let reach = ctx.camera.forward() * Self::TUG_REACH;
            if let Some(hit) = tug(&mut *physics, ctx.camera.position, reach, Self::TUG_STRENGTH)? {
                info!(body = %hit.body, distance = hit.fraction * Self::TUG_REACH, "tugged body");
            }
        }

        if self.frame % 60 == 0 {
            let eye = ctx.camera.position;
            info!(frame = self.frame, x = eye.x, y = eye.y, z = eye.z, yaw = ctx.camera.yaw, "player eye");
        }
        self.frame += 1;
        Ok(())
    }
}
