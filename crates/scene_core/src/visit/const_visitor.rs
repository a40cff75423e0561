//! Read-only traversal interface

use crate::data::Data;
use crate::nodes::{
    BindState, Command, Commands, CullNode, Draw, Group, Leaf, MatrixTransform, Node, QuadGroup,
    StateGroup, Switch, Transform,
};
use crate::object::{Object, ValueObject};
use crate::visit::Mask;

/// Traversal that only observes what it visits
///
/// Mirrors [`crate::visit::Visitor`] overload for overload, with the same
/// ancestor-forwarding defaults ending at
/// [`ConstVisitor::apply_object`]. Running two const visitors over the same
/// unmodified subgraph from different threads is safe.
pub trait ConstVisitor {
    /// Bits a child's mask is tested against
    fn traversal_mask(&self) -> Mask {
        Mask::ALL
    }

    /// Bits treated as set on every child
    fn override_mask(&self) -> Mask {
        Mask::empty()
    }

    /// Most generic overload
    fn apply_object(&mut self, _object: &dyn Object) {}

    /// Boxed property values
    fn apply_value(&mut self, value: &dyn ValueObject) {
        self.apply_object(value.as_object());
    }

    /// Bulk data payloads
    fn apply_data(&mut self, data: &dyn Data) {
        self.apply_object(data.as_object());
    }

    /// Any node
    fn apply_node(&mut self, node: &dyn Node) {
        self.apply_object(node.as_object());
    }

    /// Childless node
    fn apply_leaf(&mut self, leaf: &Leaf) {
        self.apply_node(leaf);
    }

    /// Node with a list of children
    fn apply_group(&mut self, group: &Group) {
        self.apply_node(group);
    }

    /// Node with four fixed children
    fn apply_quad_group(&mut self, group: &QuadGroup) {
        self.apply_node(group);
    }

    /// Node with masked children
    fn apply_switch(&mut self, switch: &Switch) {
        self.apply_node(switch);
    }

    /// Node with a bounding sphere
    fn apply_cull_node(&mut self, node: &CullNode) {
        self.apply_node(node);
    }

    /// Any transform
    fn apply_transform(&mut self, transform: &dyn Transform) {
        self.apply_node(transform.as_node());
    }

    /// Transform by a fixed matrix
    fn apply_matrix_transform(&mut self, transform: &MatrixTransform) {
        self.apply_transform(transform);
    }

    /// Node applying state commands to its children
    fn apply_state_group(&mut self, group: &StateGroup) {
        self.apply_node(group);
    }

    /// List of commands
    fn apply_commands(&mut self, commands: &Commands) {
        self.apply_node(commands);
    }

    /// Any command
    fn apply_command(&mut self, command: &dyn Command) {
        self.apply_node(command.as_node());
    }

    /// Draw call
    fn apply_draw(&mut self, draw: &Draw) {
        self.apply_command(draw);
    }

    /// State binding
    fn apply_bind_state(&mut self, bind: &BindState) {
        self.apply_command(bind);
    }
}
