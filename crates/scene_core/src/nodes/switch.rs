//! Node with individually masked children

use crate::nodes::Node;
use crate::object::{ObjectBase, RefPtr};
use crate::visit::{Mask, Traversal};

/// Child of a [`Switch`] together with its mask
#[derive(Debug, Clone)]
pub struct SwitchChild {
    /// Mask tested against the traversal mask
    pub mask: Mask,
    /// The child node
    pub node: RefPtr<dyn Node>,
}

/// Node whose children are entered only when their mask passes the
/// traversal's mask
#[derive(Debug, Clone, Default)]
pub struct Switch {
    base: ObjectBase,
    /// Masked children, visited in order
    pub children: Vec<SwitchChild>,
}

impl Switch {
    /// Create an empty switch
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child that is on (`Mask::ALL`) or off (empty mask)
    pub fn add_child(&mut self, enabled: bool, node: RefPtr<dyn Node>) {
        let mask = if enabled { Mask::ALL } else { Mask::empty() };
        self.add_masked_child(mask, node);
    }

    /// Append a child with an explicit mask
    pub fn add_masked_child(&mut self, mask: Mask, node: RefPtr<dyn Node>) {
        self.children.push(SwitchChild { mask, node });
    }

    /// Turn every child on or off
    pub fn set_all_children(&mut self, enabled: bool) {
        let mask = if enabled { Mask::ALL } else { Mask::empty() };
        for child in &mut self.children {
            child.mask = mask;
        }
    }

    /// Turn on only the child at `index`
    pub fn set_single_child_on(&mut self, index: usize) {
        for (i, child) in self.children.iter_mut().enumerate() {
            child.mask = if i == index { Mask::ALL } else { Mask::empty() };
        }
    }

    /// Hand every enabled child to `visitor`
    pub fn t_traverse<V: Traversal + ?Sized>(&self, visitor: &mut V) {
        for child in &self.children {
            if visitor.is_enabled(child.mask) {
                visitor.dispatch(&*child.node);
            }
        }
    }
}

crate::inherit!(Switch => apply_switch, traverse = t_traverse, affinity = Nodes);

impl Node for Switch {}
