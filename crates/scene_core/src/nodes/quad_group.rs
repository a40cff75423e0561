//! Node with exactly four child slots

use crate::nodes::Node;
use crate::object::{ObjectBase, RefPtr};
use crate::visit::{traverse_array, Traversal};

/// Node with four fixed child slots, as used by quadtree tiles
#[derive(Debug, Clone, Default)]
pub struct QuadGroup {
    base: ObjectBase,
    /// Child slots; empty slots are skipped
    pub children: [Option<RefPtr<dyn Node>>; 4],
}

impl QuadGroup {
    /// Create a quad group with empty slots
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`QuadGroup::set_child`]
    pub fn with_child(mut self, slot: usize, child: RefPtr<dyn Node>) -> Self {
        self.set_child(slot, child);
        self
    }

    /// Place `child` in `slot`, returning the previous occupant.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is not below 4.
    pub fn set_child(&mut self, slot: usize, child: RefPtr<dyn Node>) -> Option<RefPtr<dyn Node>> {
        self.children[slot].replace(child)
    }

    /// Hand every occupied slot to `visitor`
    pub fn t_traverse<V: Traversal + ?Sized>(&self, visitor: &mut V) {
        traverse_array(&self.children, visitor);
    }
}

crate::inherit!(QuadGroup => apply_quad_group, traverse = t_traverse, affinity = Nodes);

impl Node for QuadGroup {}
