//! Transform category

use crate::foundation::math::Mat4;
use crate::nodes::Node;
use crate::object::{ObjectBase, RefPtr};
use crate::visit::{traverse_children, Traversal};

/// Node that changes the coordinate frame of its children
pub trait Transform: Node {
    /// Combine `parent` (the accumulated model matrix) with this transform
    fn transform(&self, parent: &Mat4) -> Mat4;
}

/// Transform by a fixed matrix
#[derive(Debug, Clone)]
pub struct MatrixTransform {
    base: ObjectBase,
    /// Local-to-parent matrix
    pub matrix: Mat4,
    /// Children, visited in order
    pub children: Vec<RefPtr<dyn Node>>,
}

impl MatrixTransform {
    /// Create a transform with no children
    pub fn new(matrix: Mat4) -> Self {
        Self {
            base: ObjectBase::new(),
            matrix,
            children: Vec::new(),
        }
    }

    /// Builder-style [`MatrixTransform::add_child`]
    pub fn with_child(mut self, child: RefPtr<dyn Node>) -> Self {
        self.add_child(child);
        self
    }

    /// Append a child
    pub fn add_child(&mut self, child: RefPtr<dyn Node>) {
        self.children.push(child);
    }

    /// Hand every child to `visitor`
    pub fn t_traverse<V: Traversal + ?Sized>(&self, visitor: &mut V) {
        traverse_children(&self.children, visitor);
    }
}

impl Default for MatrixTransform {
    fn default() -> Self {
        Self::new(Mat4::identity())
    }
}

crate::inherit!(MatrixTransform => apply_matrix_transform, traverse = t_traverse, affinity = Nodes);

impl Node for MatrixTransform {}

impl Transform for MatrixTransform {
    fn transform(&self, parent: &Mat4) -> Mat4 {
        parent * self.matrix
    }
}
