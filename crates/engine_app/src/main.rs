//! # engine_app
//!
//! Headless demo of the engine.
//!
//! ## Startup Sequence
//!
//! 1. Initialise structured logging (`RUST_LOG` overrides `engine_app=info`).
//! 2. Load the engine config, merging the project file if one is given.
//! 3. Register user systems, then the built-in systems.
//! 4. Build the demo level.
//! 5. Run the frame loop.

mod level;
mod systems;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use engine_system::{App, AppContext, EngineConfig, FrameLoop};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "engine_app", about = "Headless first-person physics demo")]
struct Args {
    /// Project config merged over the engine defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many frames (overrides the config; 0 runs forever)
    #[arg(short, long)]
    frames: Option<u64>,

    /// Drive the player with scripted input
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    autopilot: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading project config");
            EngineConfig::load(path)?
        }
        None => EngineConfig::engine_defaults()?,
    };
    if let Some(frames) = args.frames {
        config.frame.max_frames = frames;
    }
    let frame_config = config.frame.clone();

    let mut app = App::new(AppContext::headless(config));
    app.add_system(systems::TaggedLogger::new);
    app.add_system(systems::DriftSystem::new);
    if args.autopilot {
        app.add_system(systems::Autopilot::new);
    }
    engine_character::install_builtin_systems(&mut app);
    info!(systems = app.scheduler().len(), "systems registered");

    let level = level::build(&mut app)?;
    info!(entities = app.world.entity_count(), player = %level.player, "level built");

    FrameLoop::new(frame_config).run(&mut app)?;

    let eye = app.ctx.camera.position;
    info!(frames = app.frame_count(), x = eye.x, y = eye.y, z = eye.z, "engine shut down");
    Ok(())
}
