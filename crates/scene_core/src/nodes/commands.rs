//! Command category and the built-in commands

use std::sync::OnceLock;

use crate::nodes::Node;
use crate::object::{ObjectBase, RefPtr};
use crate::render::{CommandBuffer, CompileContext, CompileError, ResourceId};
use crate::visit::{traverse_children, Traversal};

/// Node that records into a command buffer
///
/// `compile` creates whatever resources `record` needs and is driven by
/// [`crate::render::CompileTraversal`]; `record` is driven by
/// [`crate::render::RecordTraversal`]. Both must be safe to call through a
/// shared reference, so compiled state lives behind interior mutability.
pub trait Command: Node {
    /// Record into `command_buffer`
    fn record(&self, command_buffer: &mut dyn CommandBuffer);

    /// Create the resources `record` depends on
    fn compile(&self, _context: &mut CompileContext) -> Result<(), CompileError> {
        Ok(())
    }
}

/// Ordered list of commands recorded back to back
#[derive(Debug, Clone, Default)]
pub struct Commands {
    base: ObjectBase,
    /// Commands, recorded in order
    pub children: Vec<RefPtr<dyn Command>>,
}

impl Commands {
    /// Create an empty command list
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Commands::add_child`]
    pub fn with_child(mut self, command: RefPtr<dyn Command>) -> Self {
        self.add_child(command);
        self
    }

    /// Append a command
    pub fn add_child(&mut self, command: RefPtr<dyn Command>) {
        self.children.push(command);
    }

    /// Hand every command to `visitor`
    pub fn t_traverse<V: Traversal + ?Sized>(&self, visitor: &mut V) {
        traverse_children(&self.children, visitor);
    }
}

crate::inherit!(Commands => apply_commands, traverse = t_traverse, affinity = Nodes);

impl Node for Commands {}

/// Non-indexed draw call
#[derive(Debug, Clone, Default)]
pub struct Draw {
    base: ObjectBase,
    /// Number of vertices
    pub vertex_count: u32,
    /// Number of instances
    pub instance_count: u32,
    /// First vertex
    pub first_vertex: u32,
    /// First instance
    pub first_instance: u32,
}

impl Draw {
    /// Draw `vertex_count` vertices of a single instance
    pub fn new(vertex_count: u32) -> Self {
        Self {
            base: ObjectBase::new(),
            vertex_count,
            instance_count: 1,
            first_vertex: 0,
            first_instance: 0,
        }
    }

    /// Set the instance count
    pub fn with_instances(mut self, instance_count: u32) -> Self {
        self.instance_count = instance_count;
        self
    }
}

crate::inherit!(Draw => apply_draw);

impl Node for Draw {}

impl Command for Draw {
    fn record(&self, command_buffer: &mut dyn CommandBuffer) {
        command_buffer.draw(
            self.vertex_count,
            self.instance_count,
            self.first_vertex,
            self.first_instance,
        );
    }
}

/// Binds a compiled state resource to a slot
///
/// Compiling creates the resource once; later compiles are no-ops. Recording
/// an uncompiled bind is skipped with a warning.
#[derive(Debug, Default)]
pub struct BindState {
    base: ObjectBase,
    /// Slot the resource is bound to
    pub slot: u32,
    /// Name of the resource to create
    pub name: String,
    resource: OnceLock<ResourceId>,
}

impl BindState {
    /// Bind the resource `name` to `slot`
    pub fn new(slot: u32, name: impl Into<String>) -> Self {
        Self {
            base: ObjectBase::new(),
            slot,
            name: name.into(),
            resource: OnceLock::new(),
        }
    }

    /// The compiled resource, once compiled
    pub fn resource(&self) -> Option<ResourceId> {
        self.resource.get().copied()
    }
}

crate::inherit!(BindState => apply_bind_state);

impl Node for BindState {}

impl Command for BindState {
    fn record(&self, command_buffer: &mut dyn CommandBuffer) {
        match self.resource() {
            Some(resource) => command_buffer.bind_state(self.slot, resource),
            None => log::warn!("Recording uncompiled BindState '{}' on slot {}", self.name, self.slot),
        }
    }

    fn compile(&self, context: &mut CompileContext) -> Result<(), CompileError> {
        if self.resource.get().is_some() {
            return Ok(());
        }
        let resource = context.create_resource("BindState", &self.name)?;
        // A concurrent compile of the same command may have won; either id is valid.
        let _ = self.resource.set(resource);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CommandList, RecordedCommand};

    #[test]
    fn test_draw_records_itself() {
        let mut commands = CommandList::new();
        Draw::new(36).with_instances(2).record(&mut commands);
        assert_eq!(
            commands.commands,
            vec![RecordedCommand::Draw {
                vertex_count: 36,
                instance_count: 2,
                first_vertex: 0,
                first_instance: 0,
            }]
        );
    }

    #[test]
    fn test_bind_state_compiles_once() {
        let bind = BindState::new(0, "pipeline");
        let mut context = CompileContext::new();

        bind.compile(&mut context).expect("compile succeeds");
        let first = bind.resource().expect("compiled");
        bind.compile(&mut context).expect("recompile is a no-op");

        assert_eq!(bind.resource(), Some(first));
        assert_eq!(context.resource_count(), 1);
    }

    #[test]
    fn test_uncompiled_bind_records_nothing() {
        let mut commands = CommandList::new();
        BindState::new(1, "layout").record(&mut commands);
        assert!(commands.commands.is_empty());
    }
}
