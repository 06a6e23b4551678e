//! Frame loop.
//!
//! Drives [`App::frame`] at a target rate:
//!
//! 1. Measure the clamped time since the previous frame.
//! 2. Run the frame.
//! 3. Sleep out the rest of the frame budget, or warn if it was exceeded.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::app::App;
use crate::clock::FrameClock;
use crate::config::FrameConfig;

/// Runs an [`App`](crate::App) at a target rate until a frame limit or an error.
#[derive(Debug)]
pub struct FrameLoop {
    config: FrameConfig,
    clock: FrameClock,
}

impl FrameLoop {
    /// A loop whose clock starts now.
    #[must_use]
    pub fn new(config: FrameConfig) -> Self {
        let clock = FrameClock::new(config.max_dt);
        Self { config, clock }
    }

    /// Run until `max_frames` frames have completed, or forever if it is 0.
    ///
    /// # Errors
    ///
    /// Returns the first frame error. A failed frame ends the loop.
    pub fn run(&mut self, app: &mut App) -> anyhow::Result<()> {
        let budget = Duration::from_secs_f64(1.0 / self.config.target_fps.max(1.0));
        let mut frames = 0u64;

        info!(
            target_fps = self.config.target_fps,
            max_frames = self.config.max_frames,
            max_dt = self.config.max_dt,
            "starting frame loop"
        );

        loop {
            let start = Instant::now();

            let dt = self.clock.tick();
            app.frame(dt)?;

            frames += 1;
            if self.config.max_frames > 0 && frames >= self.config.max_frames {
                info!(frames, "frame loop complete");
                return Ok(());
            }

            let elapsed = start.elapsed();
            if elapsed < budget {
                std::thread::sleep(budget - elapsed);
            } else {
                warn!(
                    frame = app.frame_count(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = budget.as_millis() as u64,
                    "frame exceeded time budget"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::context::AppContext;

    #[test]
    fn test_run_limited_frames() {
        let config = FrameConfig {
            target_fps: 1000.0,
            max_frames: 5,
            ..FrameConfig::default()
        };
        let mut app = App::new(AppContext::headless(EngineConfig::default()));
        FrameLoop::new(config).run(&mut app).unwrap();
        assert_eq!(app.frame_count(), 5);
    }
}
