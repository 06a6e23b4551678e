//! Registers rigid bodies with the physics world and copies their simulated
//! pose back onto the entity's node.

use anyhow::Context as _;
use engine_physics::{Activation, BodyId, PhysicsError, PhysicsWorld, SharedPhysics};
use engine_world::{Component, EntityMut, Signature, ViewId, World};

use crate::context::AppContext;
use crate::scene::Node;
use crate::system::System;
use crate::systems::backlog::Backlog;

/// Reference to a body owned by the physics world.
///
/// The component owns the body: once it leaves its entity (or the entity is
/// destroyed) the body is destroyed too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub body: BodyId,
}

impl Component for PhysicsBody {
    fn type_name() -> &'static str {
        "physics"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyOp {
    Add(BodyId),
    Remove(BodyId),
    Destroy(BodyId),
}

impl BodyOp {
    fn apply(self, physics: &mut dyn PhysicsWorld) -> Result<(), PhysicsError> {
        match self {
            Self::Add(body) => physics.add_body(body, Activation::Activate),
            Self::Remove(body) => physics.remove_body(body),
            Self::Destroy(body) => physics.destroy_body(body),
        }
    }
}

/// View `{Node, PhysicsBody}`: adds the body to the simulation on entry,
/// removes it on exit, and every frame writes the body's position and
/// rotation into the node transform.
///
/// A second view, `{PhysicsBody}`, destroys the body when the component
/// goes away. It is registered after the first, so a destroyed entity's body
/// is removed from the simulation before it is destroyed.
///
/// Body updates that find the physics world borrowed are queued and applied
/// at the start of the next update.
pub struct PhysicsSyncSystem {
    view: ViewId,
    backlog: Backlog<BodyOp>,
}

impl PhysicsSyncSystem {
    /// Registers both views and their body handlers.
    pub fn new(world: &mut World, ctx: &AppContext) -> Self {
        let view = world.query(Signature::new().with::<Node>().with::<PhysicsBody>());
        let owned = world.query(Signature::new().with::<PhysicsBody>());
        let backlog = Backlog::default();

        world.on_added(view, body_handler(&ctx.physics, &backlog, BodyOp::Add));
        world.on_removed(view, body_handler(&ctx.physics, &backlog, BodyOp::Remove));
        world.on_removed(owned, body_handler(&ctx.physics, &backlog, BodyOp::Destroy));

        Self { view, backlog }
    }
}

fn body_handler(
    physics: &SharedPhysics,
    backlog: &Backlog<BodyOp>,
    op: fn(BodyId) -> BodyOp,
) -> impl FnMut(&mut EntityMut<'_>) + 'static {
    let physics = physics.clone();
    let backlog = backlog.clone();
    move |entity: &mut EntityMut<'_>| {
        if let Some(body) = entity.get::<PhysicsBody>().map(|b| b.body) {
            backlog.submit(&*physics, op(body), |physics, op| op.apply(physics));
        }
    }
}

impl System for PhysicsSyncSystem {
    fn name(&self) -> &str {
        "physics_sync"
    }

    fn update(&mut self, world: &mut World, ctx: &mut AppContext, _dt: f32) -> anyhow::Result<()> {
        let mut physics = ctx
            .physics
            .try_borrow_mut()
            .map_err(|_| anyhow::anyhow!("physics world is borrowed"))?;
        let failed = self.backlog.drain(&mut *physics, |physics, op| op.apply(physics));
        if let Some((op, error)) = failed.into_iter().next() {
            return Err(error).with_context(|| format!("applying deferred {op:?}"));
        }

        for entity in world.snapshot(self.view) {
            let body = world.get::<PhysicsBody>(entity)?.body;
            let position = physics.body_position(body).with_context(|| format!("syncing {entity}"))?;
            let rotation = physics.body_rotation(body).with_context(|| format!("syncing {entity}"))?;
            world.get_mut::<Node>(entity)?.transform.set_pose(position, rotation);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use engine_math::{Quat, Transform3D, Vec3};
    use engine_physics::{BodySettings, HeadlessPhysics, MotionType, ObjectLayer};
    use engine_world::Entity;

    use super::*;
    use crate::config::EngineConfig;
    use crate::scene::{NodeId, SceneTree};

    fn setup() -> (World, AppContext, Rc<RefCell<HeadlessPhysics>>) {
        let headless = Rc::new(RefCell::new(HeadlessPhysics::default()));
        let ctx = AppContext::new(
            EngineConfig::default(),
            headless.clone(),
            Rc::new(RefCell::new(SceneTree::new())),
        );
        (World::new(), ctx, headless)
    }

    fn falling_box(world: &mut World, headless: &RefCell<HeadlessPhysics>) -> (Entity, BodyId) {
        let body = headless
            .borrow_mut()
            .create_body(&BodySettings::cuboid(
                Vec3::new(0.0, 5.0, 0.0),
                Quat::IDENTITY,
                Vec3::splat(0.5),
                MotionType::Dynamic,
                ObjectLayer::MOVING,
            ))
            .unwrap();
        let e = world.spawn();
        world.add_component(e, Node::new(NodeId(1), Transform3D::IDENTITY)).unwrap();
        world.add_component(e, PhysicsBody { body }).unwrap();
        (e, body)
    }

    #[test]
    fn test_body_added_and_removed_with_view_membership() {
        let (mut world, ctx, headless) = setup();
        let _system = PhysicsSyncSystem::new(&mut world, &ctx);

        let (e, body) = falling_box(&mut world, &headless);
        assert!(headless.borrow().is_body_added(body));

        // Losing the node takes the body out of the simulation but keeps it.
        world.remove_component::<Node>(e).unwrap();
        assert!(!headless.borrow().is_body_added(body));
        assert_eq!(headless.borrow().body_count(), 1);
    }

    #[test]
    fn test_body_destroyed_with_its_component() {
        let (mut world, ctx, headless) = setup();
        let _system = PhysicsSyncSystem::new(&mut world, &ctx);

        let (e, _) = falling_box(&mut world, &headless);
        world.remove_component::<PhysicsBody>(e).unwrap();
        assert_eq!(headless.borrow().body_count(), 0);

        let (e, body) = falling_box(&mut world, &headless);
        world.destroy(e).unwrap();
        assert_eq!(headless.borrow().body_count(), 0);
        assert_eq!(
            headless.borrow().body_position(body),
            Err(PhysicsError::UnknownBody(body))
        );
    }

    #[test]
    fn test_body_update_waits_while_physics_is_borrowed() {
        let (mut world, mut ctx, headless) = setup();
        let mut system = PhysicsSyncSystem::new(&mut world, &ctx);

        let body = headless
            .borrow_mut()
            .create_body(&BodySettings::cuboid(
                Vec3::ZERO,
                Quat::IDENTITY,
                Vec3::splat(0.5),
                MotionType::Static,
                ObjectLayer::NON_MOVING,
            ))
            .unwrap();
        let e = world.spawn();
        {
            let _guard = headless.borrow();
            world.add_component(e, Node::new(NodeId(1), Transform3D::IDENTITY)).unwrap();
            world.add_component(e, PhysicsBody { body }).unwrap();
        }
        assert!(!headless.borrow().is_body_added(body));

        system.update(&mut world, &mut ctx, 0.1).unwrap();
        assert!(headless.borrow().is_body_added(body));
    }

    #[test]
    fn test_update_copies_pose_to_node() {
        let (mut world, mut ctx, headless) = setup();
        let mut system = PhysicsSyncSystem::new(&mut world, &ctx);

        let (e, body) = falling_box(&mut world, &headless);
        headless.borrow_mut().step(0.1, 1);
        system.update(&mut world, &mut ctx, 0.1).unwrap();

        let expected = headless.borrow().body_position(body).unwrap();
        assert_eq!(world.get::<Node>(e).unwrap().transform.position, expected);
    }
}
