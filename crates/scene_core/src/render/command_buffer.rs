//! Command recording boundary

use crate::foundation::math::Mat4;

/// Handle of a resource created during compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

/// Sink that commands record into
///
/// Implemented by the graphics backend; the core only calls it.
pub trait CommandBuffer {
    /// Set the model matrix used by subsequent draws
    fn set_model_matrix(&mut self, matrix: &Mat4);

    /// Bind a compiled resource to a slot
    fn bind_state(&mut self, slot: u32, resource: ResourceId);

    /// Issue a draw call
    fn draw(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32);
}

/// One call made on a [`CommandList`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// `set_model_matrix`
    SetModelMatrix(Mat4),
    /// `bind_state`
    BindState {
        /// Slot bound
        slot: u32,
        /// Resource bound
        resource: ResourceId,
    },
    /// `draw`
    Draw {
        /// Number of vertices
        vertex_count: u32,
        /// Number of instances
        instance_count: u32,
        /// First vertex
        first_vertex: u32,
        /// First instance
        first_instance: u32,
    },
}

/// Command buffer that keeps every call in memory
#[derive(Debug, Clone, Default)]
pub struct CommandList {
    /// Calls in recording order
    pub commands: Vec<RecordedCommand>,
}

impl CommandList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of draw calls recorded
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, RecordedCommand::Draw { .. }))
            .count()
    }
}

impl CommandBuffer for CommandList {
    fn set_model_matrix(&mut self, matrix: &Mat4) {
        self.commands.push(RecordedCommand::SetModelMatrix(*matrix));
    }

    fn bind_state(&mut self, slot: u32, resource: ResourceId) {
        self.commands.push(RecordedCommand::BindState { slot, resource });
    }

    fn draw(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) {
        self.commands.push(RecordedCommand::Draw {
            vertex_count,
            instance_count,
            first_vertex,
            first_instance,
        });
    }
}
