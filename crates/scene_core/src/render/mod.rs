//! # Render Traversals
//!
//! The specialized traversals that drive the external graphics backend:
//! compiling resources once and recording commands every frame. The backend
//! itself is reached only through [`CommandBuffer`] and [`CompileContext`].

pub mod command_buffer;
pub mod compile_traversal;
pub mod frustum;
pub mod record_traversal;

pub use command_buffer::{CommandBuffer, CommandList, RecordedCommand, ResourceId};
pub use compile_traversal::{CompileContext, CompileError, CompileTraversal};
pub use frustum::{Frustum, Plane};
pub use record_traversal::{RecordStats, RecordTraversal};
