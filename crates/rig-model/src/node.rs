//! Scene nodes the rig follows or focuses on.
//!
//! The host owns [`Node`]s and moves them every frame. The rig only ever
//! stores [`NodeRef`]s, so dropping the last `Node` handle ends the node's
//! life even while the rig still points at it; reads through the stale
//! reference then return `None`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::{Quat, Vec3};

use crate::pose::Pose;

#[derive(Debug)]
struct NodeState {
    name: String,
    pose: Pose,
}

/// An owned, shared handle to a scene transform.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeState>>);

impl Node {
    pub fn new(name: impl Into<String>, pose: Pose) -> Self {
        Self(Rc::new(RefCell::new(NodeState {
            name: name.into(),
            pose,
        })))
    }

    pub fn at(name: impl Into<String>, position: Vec3) -> Self {
        Self::new(name, Pose::from_position(position))
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn pose(&self) -> Pose {
        self.0.borrow().pose
    }

    pub fn position(&self) -> Vec3 {
        self.0.borrow().pose.position
    }

    pub fn rotation(&self) -> Quat {
        self.0.borrow().pose.rotation
    }

    pub fn set_pose(&self, pose: Pose) {
        self.0.borrow_mut().pose = pose;
    }

    pub fn set_position(&self, position: Vec3) {
        self.0.borrow_mut().pose.position = position;
    }

    pub fn set_rotation(&self, rotation: Quat) {
        self.0.borrow_mut().pose.rotation = rotation;
    }

    /// Move by `delta` in world space.
    pub fn translate(&self, delta: Vec3) {
        self.0.borrow_mut().pose.position += delta;
    }

    /// A non-owning reference to this node.
    pub fn downgrade(&self) -> NodeRef {
        NodeRef(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.0.borrow();
        f.debug_struct("Node")
            .field("name", &state.name)
            .field("pose", &state.pose)
            .finish()
    }
}

/// A weak reference to a [`Node`].
///
/// `NodeRef::default()` never resolves.
#[derive(Clone, Default)]
pub struct NodeRef(Weak<RefCell<NodeState>>);

impl NodeRef {
    /// Current pose, or `None` once the node is gone.
    pub fn pose(&self) -> Option<Pose> {
        self.0.upgrade().map(|state| state.borrow().pose)
    }

    pub fn name(&self) -> Option<String> {
        self.0.upgrade().map(|state| state.borrow().name.clone())
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Whether both references point at the same node.
    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }

    /// Whether this reference points at `node`. Dead references never match.
    pub fn refers_to(&self, node: &Node) -> bool {
        self.is_alive() && std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&node.0))
    }

    /// Name for log lines; dead references render as `<dropped>`.
    pub fn label(&self) -> String {
        self.name().unwrap_or_else(|| "<dropped>".to_string())
    }
}

impl From<&Node> for NodeRef {
    fn from(node: &Node) -> Self {
        node.downgrade()
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl std::fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NodeRef").field(&self.label()).finish()
    }
}
