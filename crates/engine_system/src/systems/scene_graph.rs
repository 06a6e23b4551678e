//! Keeps the scene graph in step with entities that carry a [`Node`].

use std::convert::Infallible;

use engine_world::{EntityMut, Signature, ViewId, World};

use crate::context::AppContext;
use crate::scene::{Node, NodeId, ParentNode, SceneGraph, SharedScene};
use crate::system::System;
use crate::systems::backlog::Backlog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeOp {
    Attach { node: NodeId, parent: Option<NodeId> },
    Detach { node: NodeId, parent: Option<NodeId> },
}

impl NodeOp {
    fn apply(self, scene: &mut dyn SceneGraph) -> Result<(), Infallible> {
        let root = scene.root();
        match self {
            Self::Attach { node, parent } => scene.attach(node, parent.unwrap_or(root)),
            Self::Detach { node, parent } => scene.detach(node, parent.unwrap_or(root)),
        }
        Ok(())
    }
}

/// Attaches an entity's node when it gains a [`Node`] (under its
/// [`ParentNode`] if it has one, the scene root otherwise) and detaches it
/// when the node goes away. Changes that find the scene borrowed are applied
/// at the start of the next update.
pub struct SceneGraphSystem {
    view: ViewId,
    backlog: Backlog<NodeOp>,
}

impl SceneGraphSystem {
    /// Registers the `{Node}` view and its attach/detach handlers.
    pub fn new(world: &mut World, ctx: &AppContext) -> Self {
        let view = world.query(Signature::new().with::<Node>());
        let backlog = Backlog::default();

        world.on_added(view, node_handler(&ctx.scene, &backlog, |node, parent| NodeOp::Attach { node, parent }));
        world.on_removed(view, node_handler(&ctx.scene, &backlog, |node, parent| NodeOp::Detach { node, parent }));

        Self { view, backlog }
    }

    /// The `{Node}` view.
    #[must_use]
    pub fn view(&self) -> ViewId {
        self.view
    }
}

fn node_handler(
    scene: &SharedScene,
    backlog: &Backlog<NodeOp>,
    op: fn(NodeId, Option<NodeId>) -> NodeOp,
) -> impl FnMut(&mut EntityMut<'_>) + 'static {
    let scene = scene.clone();
    let backlog = backlog.clone();
    move |entity: &mut EntityMut<'_>| {
        let Some(node) = entity.get::<Node>().map(|n| n.id) else {
            return;
        };
        let parent = entity.get::<ParentNode>().map(|p| p.0);
        backlog.submit(&*scene, op(node, parent), |scene, op| op.apply(scene));
    }
}

impl System for SceneGraphSystem {
    fn name(&self) -> &str {
        "scene_graph"
    }

    fn update(&mut self, _world: &mut World, ctx: &mut AppContext, _dt: f32) -> anyhow::Result<()> {
        let mut scene = ctx
            .scene
            .try_borrow_mut()
            .map_err(|_| anyhow::anyhow!("scene graph is borrowed"))?;
        // Scene operations cannot fail.
        let _ = self.backlog.drain(&mut *scene, |scene, op| op.apply(scene));
        Ok(())
    }
}
