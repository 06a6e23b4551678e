//! Scene-graph collaborator.
//!
//! The engine only needs to hang visual nodes under a parent and take them
//! down again. [`SceneTree`] is the headless implementation.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use engine_math::Transform3D;
use engine_world::Component;
use tracing::debug;

/// Handle to a node owned by the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// The node hierarchy a renderer would draw.
///
/// Nodes are created detached and only appear once attached under a
/// parent or the root.
pub trait SceneGraph {
    /// The scene root. Nodes without an explicit parent hang here.
    fn root(&self) -> NodeId;
    fn create_node(&mut self) -> NodeId;
    fn attach(&mut self, node: NodeId, parent: NodeId);
    fn detach(&mut self, node: NodeId, parent: NodeId);
}

/// Scene graph shared by the systems of one application.
pub type SharedScene = Rc<RefCell<dyn SceneGraph>>;

/// Visual representation of an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub transform: Transform3D,
}

impl Node {
    /// A node component for scene node `id`.
    #[must_use]
    pub fn new(id: NodeId, transform: Transform3D) -> Self {
        Self { id, transform }
    }
}

impl Component for Node {
    fn type_name() -> &'static str {
        "node"
    }
}

/// Attach this entity's node under another node instead of the scene root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentNode(pub NodeId);

impl Component for ParentNode {
    fn type_name() -> &'static str {
        "parentNode"
    }
}

/// In-memory parent/child bookkeeping.
#[derive(Debug, Clone)]
pub struct SceneTree {
    next_id: u32,
    parents: HashMap<NodeId, NodeId>,
    children: BTreeMap<NodeId, Vec<NodeId>>,
}

impl SceneTree {
    const ROOT: NodeId = NodeId(0);

    /// A tree holding only the root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            parents: HashMap::new(),
            children: BTreeMap::new(),
        }
    }

    /// `None` for the root and for detached nodes.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied()
    }

    /// Attached children in attach order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.children.get(&node).map_or(&[], Vec::as_slice)
    }

    /// Number of nodes currently attached anywhere in the tree.
    #[must_use]
    pub fn attached_count(&self) -> usize {
        self.parents.len()
    }

    fn unlink(&mut self, node: NodeId) {
        if let Some(parent) = self.parents.remove(&node) {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|&child| child != node);
            }
        }
    }
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph for SceneTree {
    fn root(&self) -> NodeId {
        Self::ROOT
    }

    fn create_node(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Re-attaching moves the node.
    fn attach(&mut self, node: NodeId, parent: NodeId) {
        self.unlink(node);
        self.parents.insert(node, parent);
        self.children.entry(parent).or_default().push(node);
    }

    fn detach(&mut self, node: NodeId, parent: NodeId) {
        if self.parent(node) == Some(parent) {
            self.unlink(node);
        } else {
            debug!(%node, %parent, "detach from a node that is not the parent");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_and_detach() {
        let mut tree = SceneTree::new();
        let a = tree.create_node();
        let b = tree.create_node();
        tree.attach(a, tree.root());
        tree.attach(b, a);
        assert_eq!(tree.children(tree.root()), &[a]);
        assert_eq!(tree.parent(b), Some(a));
        assert_eq!(tree.attached_count(), 2);

        tree.detach(b, a);
        assert_eq!(tree.parent(b), None);
        assert!(tree.children(a).is_empty());
    }

    #[test]
    fn test_reattach_moves_node() {
        let mut tree = SceneTree::new();
        let a = tree.create_node();
        let b = tree.create_node();
        tree.attach(b, tree.root());
        tree.attach(b, a);
        assert!(tree.children(tree.root()).is_empty());
        assert_eq!(tree.children(a), &[b]);
    }

    #[test]
    fn test_detach_from_wrong_parent_is_ignored() {
        let mut tree = SceneTree::new();
        let a = tree.create_node();
        let b = tree.create_node();
        tree.attach(b, a);
        tree.detach(b, tree.root());
        assert_eq!(tree.parent(b), Some(a));
    }
}
