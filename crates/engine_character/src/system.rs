//! The built-in player controller system.

use anyhow::Context as _;
use engine_math::{CameraPose, Quat, Vec3};
use engine_physics::SharedPhysics;
use engine_system::{AppContext, System};
use engine_world::{EntityMut, Signature, ViewId, World};
use tracing::{error, info};

use crate::binding::{CharacterBinding, PendingReleases};
use crate::component::CharacterController;
use crate::controller::update_character;

/// View `{CharacterController}`.
///
/// - On entry: creates the backing physics character and gives the entity a
///   [`CameraPose`] if it has none. A character the backend refuses is
///   logged and the controller stays unbound.
/// - Every frame: runs [`update_character`] for each member.
/// - On exit: releases the physics character. A release that finds the
///   physics world borrowed completes at the start of the next update.
pub struct PlayerControllerSystem {
    view: ViewId,
    releases: PendingReleases,
}

impl PlayerControllerSystem {
    /// Registers the view and its bind/release handlers.
    pub fn new(world: &mut World, ctx: &AppContext) -> Self {
        let view = world.query(Signature::new().with::<CharacterController>());

        let releases = PendingReleases::default();

        let physics = ctx.physics.clone();
        let pending = releases.clone();
        world.on_added(view, move |entity| bind(&physics, &pending, entity));

        world.on_removed(view, |entity| {
            if let Some(controller) = entity.get_mut::<CharacterController>() {
                // Dropping the binding releases the character.
                controller.binding = None;
            }
        });

        Self { view, releases }
    }

    /// The view this system watches.
    #[must_use]
    pub fn view(&self) -> ViewId {
        self.view
    }

    /// Releases still waiting for the physics world.
    #[must_use]
    pub fn pending_releases(&self) -> &PendingReleases {
        &self.releases
    }
}

fn bind(physics: &SharedPhysics, releases: &PendingReleases, entity: &mut EntityMut<'_>) {
    let id = entity.id();
    let Some(controller) = entity.get::<CharacterController>() else {
        return;
    };
    if controller.is_bound() {
        return;
    }

    let tuning = controller.tuning;
    let settings = tuning.character_settings();
    let up = tuning.up_axis();
    let rotation = Quat::from_rotation_arc(Vec3::Y, up);
    match CharacterBinding::acquire(physics, releases, &settings, tuning.start_position, rotation) {
        Ok(binding) => {
            info!(entity = %id, character = %binding.id(), "character controller bound");
            if let Some(controller) = entity.get_mut::<CharacterController>() {
                controller.binding = Some(binding);
            }
        }
        Err(error) => {
            error!(entity = %id, %error, "character controller left unbound");
        }
    }

    if !entity.has::<CameraPose>() {
        let eye = tuning.start_position + tuning.eye_offset(up);
        entity.commands().insert(id, CameraPose::new(eye));
    }
}

impl System for PlayerControllerSystem {
    fn name(&self) -> &str {
        "player_controller"
    }

    fn update(&mut self, world: &mut World, ctx: &mut AppContext, dt: f32) -> anyhow::Result<()> {
        let released = self
            .releases
            .flush(&ctx.physics)
            .context("releasing characters")?;
        if released > 0 {
            info!(released, "released deferred characters");
        }

        for entity in world.snapshot(self.view) {
            update_character(world, ctx, entity, dt).with_context(|| format!("updating character {entity}"))?;
        }
        Ok(())
    }
}
