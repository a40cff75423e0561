//! Node with a variable number of children

use crate::nodes::Node;
use crate::object::{ObjectBase, RefPtr};
use crate::visit::{traverse_children, Traversal};

/// Node with an ordered list of children
#[derive(Debug, Clone, Default)]
pub struct Group {
    base: ObjectBase,
    /// Children, visited in order
    pub children: Vec<RefPtr<dyn Node>>,
}

impl Group {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Group::add_child`]
    pub fn with_child(mut self, child: RefPtr<dyn Node>) -> Self {
        self.add_child(child);
        self
    }

    /// Append a child
    pub fn add_child(&mut self, child: RefPtr<dyn Node>) {
        self.children.push(child);
    }

    /// Remove the child at `index`
    pub fn remove_child(&mut self, index: usize) -> Option<RefPtr<dyn Node>> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    /// Hand every child to `visitor`
    pub fn t_traverse<V: Traversal + ?Sized>(&self, visitor: &mut V) {
        traverse_children(&self.children, visitor);
    }
}

crate::inherit!(Group => apply_group, traverse = t_traverse, affinity = Nodes);

impl Node for Group {}
