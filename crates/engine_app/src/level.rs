//! The demo level: a floor, a falling cube, a drifting platform, and the
//! player.

use anyhow::Result;
use engine_character::{CharacterController, ControllerTuning};
use engine_math::{Quat, Transform3D, Vec3, Velocity};
use engine_physics::{BodySettings, MotionType, ObjectLayer};
use engine_system::{App, Node, PhysicsBody};
use engine_world::Entity;

use crate::systems::Tagged;

/// Handles to the demo level's notable entities.
pub struct Level {
    pub player: Entity,
}

/// Spawn an entity whose node follows a new box body.
fn spawn_box(app: &mut App, settings: &BodySettings) -> Result<Entity> {
    // Borrows end before the world mutates: the view handlers need both.
    let body = app.ctx.physics.borrow_mut().create_body(settings)?;
    let node = app.ctx.scene.borrow_mut().create_node();

    let entity = app.world.spawn();
    let transform = Transform3D::from_pose(settings.position, settings.rotation);
    app.world.add_component(entity, Node::new(node, transform))?;
    app.world.add_component(entity, PhysicsBody { body })?;
    Ok(entity)
}

/// Spawn the demo level into `app`: floor, cube, drifting platform, a
/// tagged entity, and the player.
pub fn build(app: &mut App) -> Result<Level> {
    let tagged = app.world.spawn();
    app.world.add_component(tagged, Tagged)?;

    spawn_box(
        app,
        &BodySettings::cuboid(
            Vec3::new(0.0, -0.5, 0.0),
            Quat::IDENTITY,
            Vec3::new(10.0, 0.5, 10.0),
            MotionType::Static,
            ObjectLayer::NON_MOVING,
        ),
    )?;

    spawn_box(
        app,
        &BodySettings::cuboid(
            Vec3::new(0.0, 3.0, 0.0),
            Quat::from_rotation_y(0.3),
            Vec3::splat(0.5),
            MotionType::Dynamic,
            ObjectLayer::MOVING,
        ),
    )?;

    let platform = spawn_box(
        app,
        &BodySettings::cuboid(
            Vec3::new(-5.0, 0.25, -5.0),
            Quat::IDENTITY,
            Vec3::new(1.5, 0.25, 1.5),
            MotionType::Kinematic,
            ObjectLayer::MOVING,
        ),
    )?;
    app.world.add_component(platform, Velocity::new(0.5, 0.0, 0.0))?;

    let player = app.world.spawn();
    app.world
        .add_component(player, CharacterController::new(ControllerTuning::default()))?;

    Ok(Level { player })
}
