//! The system contract.

use engine_world::World;

use crate::context::AppContext;

/// A unit of per-frame logic.
///
/// Systems are constructed once, before the first frame, and live as long
/// as the application. View subscriptions made at construction persist for
/// that whole lifetime.
pub trait System {
    /// Name used in logs and error context.
    fn name(&self) -> &str;

    /// Run one frame.
    ///
    /// # Errors
    ///
    /// Any error is fatal: the scheduler aborts the frame and hands it to the
    /// frame driver.
    fn update(&mut self, world: &mut World, ctx: &mut AppContext, dt: f32) -> anyhow::Result<()>;
}
