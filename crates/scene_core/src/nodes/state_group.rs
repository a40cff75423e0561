//! Node binding state for its subgraph

use crate::nodes::{Command, Node};
use crate::object::{ObjectBase, RefPtr};
use crate::visit::{traverse_children, Traversal};

/// Node whose state commands apply to every draw beneath it
///
/// Generic traversals visit the state commands first, then the children.
/// The record traversal instead pushes the commands onto its state stack
/// while the children are recorded.
#[derive(Debug, Clone, Default)]
pub struct StateGroup {
    base: ObjectBase,
    /// State commands bound for the subgraph
    pub state_commands: Vec<RefPtr<dyn Command>>,
    /// Children, visited in order
    pub children: Vec<RefPtr<dyn Node>>,
}

impl StateGroup {
    /// Create an empty state group
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`StateGroup::add_state`]
    pub fn with_state(mut self, command: RefPtr<dyn Command>) -> Self {
        self.add_state(command);
        self
    }

    /// Builder-style [`StateGroup::add_child`]
    pub fn with_child(mut self, child: RefPtr<dyn Node>) -> Self {
        self.add_child(child);
        self
    }

    /// Append a state command
    pub fn add_state(&mut self, command: RefPtr<dyn Command>) {
        self.state_commands.push(command);
    }

    /// Append a child
    pub fn add_child(&mut self, child: RefPtr<dyn Node>) {
        self.children.push(child);
    }

    /// Hand the state commands, then the children, to `visitor`
    pub fn t_traverse<V: Traversal + ?Sized>(&self, visitor: &mut V) {
        traverse_children(&self.state_commands, visitor);
        traverse_children(&self.children, visitor);
    }
}

crate::inherit!(StateGroup => apply_state_group, traverse = t_traverse, affinity = Nodes);

impl Node for StateGroup {}
