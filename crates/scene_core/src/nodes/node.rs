//! Node category and the childless leaf node

use crate::object::{Object, ObjectBase};

/// Upcast to `&dyn Node`, implemented for every sized node type
pub trait AsNode {
    /// This value as a node
    fn as_node(&self) -> &dyn Node;
}

impl<T: Node> AsNode for T {
    fn as_node(&self) -> &dyn Node {
        self
    }
}

/// Anything that can be placed in the scene graph
pub trait Node: Object + AsNode {}

/// Node without children
#[derive(Debug, Clone, Default)]
pub struct Leaf {
    base: ObjectBase,
}

impl Leaf {
    /// Create a leaf
    pub fn new() -> Self {
        Self::default()
    }
}

crate::inherit!(Leaf => apply_leaf, affinity = Nodes);

impl Node for Leaf {}
