//! System scheduler.
//!
//! Systems run one at a time, in a fixed order, every frame: user systems in
//! the order they were added, then the engine's built-in systems in theirs.
//! Every system in a frame receives the same `dt`.

use anyhow::Context as _;
use engine_world::World;
use tracing::{info, trace};

use crate::context::AppContext;
use crate::system::System;

/// Ordered user and built-in systems.
#[derive(Default)]
pub struct Scheduler {
    systems: Vec<Box<dyn System>>,
    builtins: Vec<Box<dyn System>>,
}

impl Scheduler {
    /// A scheduler with no systems.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user system.
    pub fn add_system(&mut self, system: Box<dyn System>) {
        info!(system = system.name(), position = self.systems.len(), "registered system");
        self.systems.push(system);
    }

    /// Append a built-in system. Built-ins always run after user systems.
    pub fn add_builtin(&mut self, system: Box<dyn System>) {
        info!(system = system.name(), position = self.builtins.len(), "registered built-in system");
        self.builtins.push(system);
    }

    /// Total number of systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len() + self.builtins.len()
    }

    /// Returns `true` when there is nothing to report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// System names in execution order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().chain(&self.builtins).map(|s| s.name())
    }

    /// Run every system once.
    ///
    /// # Errors
    ///
    /// Stops at the first failing system and returns its error, annotated
    /// with the system name. Later systems do not run this frame.
    pub fn run(&mut self, world: &mut World, ctx: &mut AppContext, dt: f32) -> anyhow::Result<()> {
        for system in self.systems.iter_mut().chain(self.builtins.iter_mut()) {
            trace!(system = system.name(), dt, "update");
            system
                .update(world, ctx, dt)
                .with_context(|| format!("system `{}` failed", system.name()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::EngineConfig;

    type Log = Rc<RefCell<Vec<(String, f32)>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
        fail: bool,
    }

    impl System for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn update(&mut self, _world: &mut World, _ctx: &mut AppContext, dt: f32) -> anyhow::Result<()> {
            self.log.borrow_mut().push((self.name.to_string(), dt));
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(())
        }
    }

    fn recorder(name: &'static str, log: &Log) -> Box<dyn System> {
        Box::new(Recorder {
            name,
            log: log.clone(),
            fail: false,
        })
    }

    #[test]
    fn test_runs_in_registration_order_with_same_dt() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        scheduler.add_builtin(recorder("builtin", &log));
        scheduler.add_system(recorder("first", &log));
        scheduler.add_system(recorder("second", &log));
        assert_eq!(scheduler.names().collect::<Vec<_>>(), vec!["first", "second", "builtin"]);

        let mut world = World::new();
        let mut ctx = AppContext::headless(EngineConfig::default());
        for frame in 0..3 {
            let dt = 0.01 * (frame + 1) as f32;
            scheduler.run(&mut world, &mut ctx, dt).unwrap();
        }

        let log = log.borrow();
        assert_eq!(log.len(), 9);
        for (frame, chunk) in log.chunks(3).enumerate() {
            let names: Vec<&str> = chunk.iter().map(|(n, _)| n.as_str()).collect();
            assert_eq!(names, vec!["first", "second", "builtin"]);
            let dt = 0.01 * (frame + 1) as f32;
            assert!(chunk.iter().all(|&(_, d)| d == dt));
        }
    }

    #[test]
    fn test_error_propagates_and_stops_frame() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        scheduler.add_system(recorder("before", &log));
        scheduler.add_system(Box::new(Recorder {
            name: "broken",
            log: log.clone(),
            fail: true,
        }));
        scheduler.add_system(recorder("after", &log));

        let mut world = World::new();
        let mut ctx = AppContext::headless(EngineConfig::default());
        let err = scheduler.run(&mut world, &mut ctx, 0.016).unwrap_err();

        assert_eq!(err.to_string(), "system `broken` failed");
        assert_eq!(err.root_cause().to_string(), "boom");
        let names: Vec<String> = log.borrow().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, vec!["before", "broken"]);
    }
}
