//! One application: world, shared context, and the systems that run on it.

use anyhow::anyhow;
use engine_physics::collision_steps;
use engine_world::World;
use tracing::debug;

use crate::context::AppContext;
use crate::scheduler::Scheduler;
use crate::system::System;

/// A world, its context, and the systems that run over them each frame.
pub struct App {
    pub world: World,
    pub ctx: AppContext,
    scheduler: Scheduler,
    frame: u64,
}

impl App {
    /// An app with an empty world and no systems.
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self {
            world: World::new(),
            ctx,
            scheduler: Scheduler::new(),
            frame: 0,
        }
    }

    /// Build a user system against this app's world and context, then
    /// schedule it.
    pub fn add_system<S, F>(&mut self, build: F)
    where
        S: System + 'static,
        F: FnOnce(&mut World, &AppContext) -> S,
    {
        let system = build(&mut self.world, &self.ctx);
        self.scheduler.add_system(Box::new(system));
    }

    /// Like [`App::add_system`], for the engine's built-in systems.
    pub fn add_builtin<S, F>(&mut self, build: F)
    where
        S: System + 'static,
        F: FnOnce(&mut World, &AppContext) -> S,
    {
        let system = build(&mut self.world, &self.ctx);
        self.scheduler.add_builtin(Box::new(system));
    }

    /// Systems in run order.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Frames completed so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Run one frame: every system, then one physics step, then the input
    /// tick.
    ///
    /// # Errors
    ///
    /// Propagates the first system failure, or fails if the physics world is
    /// still borrowed when the step begins.
    pub fn frame(&mut self, dt: f32) -> anyhow::Result<()> {
        self.scheduler.run(&mut self.world, &mut self.ctx, dt)?;

        let steps = collision_steps(dt);
        self.ctx
            .physics
            .try_borrow_mut()
            .map_err(|_| anyhow!("physics world is borrowed during the frame step"))?
            .step(dt, steps);

        self.ctx.input.end_frame();
        self.frame += 1;
        debug!(frame = self.frame, dt, collision_steps = steps, "frame complete");
        Ok(())
    }
}
