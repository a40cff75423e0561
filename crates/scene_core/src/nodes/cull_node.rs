//! Node culled against the view frustum

use crate::foundation::math::Sphere;
use crate::nodes::Node;
use crate::object::{ObjectBase, RefPtr};
use crate::visit::{traverse_single, Traversal};

/// Node with one child and a bounding sphere in local coordinates
///
/// The record traversal skips the child when the sphere lies outside the
/// view frustum; other traversals always enter it.
#[derive(Debug, Clone, Default)]
pub struct CullNode {
    base: ObjectBase,
    /// Bounds of the child subgraph in this node's coordinate frame
    pub bound: Sphere,
    /// The culled subgraph
    pub child: Option<RefPtr<dyn Node>>,
}

impl CullNode {
    /// Create a cull node around `child`
    pub fn new(bound: Sphere, child: RefPtr<dyn Node>) -> Self {
        Self {
            base: ObjectBase::new(),
            bound,
            child: Some(child),
        }
    }

    /// Hand the child to `visitor`
    pub fn t_traverse<V: Traversal + ?Sized>(&self, visitor: &mut V) {
        traverse_single(self.child.as_ref(), visitor);
    }
}

crate::inherit!(CullNode => apply_cull_node, traverse = t_traverse, affinity = Nodes);

impl Node for CullNode {}
