//! # Scene Core
//!
//! The object model underneath a retained-mode scene graph: intrusively
//! reference-counted objects allocated from an affinity-partitioned pool,
//! weak observers that are safe to promote while the target is being
//! destroyed, dynamic per-object properties, and visitor dispatch that lets
//! node types and traversals be added independently.
//!
//! ## Features
//!
//! - **Pooled Allocation**: Size-class pools per affinity with a process-wide instance
//! - **Object Lifetime**: `RefPtr` / `ObserverPtr` over an atomic intrusive count
//! - **Dynamic Properties**: Keyed values attached to any object on demand
//! - **Visitor Dispatch**: Ancestor-forwarding overloads generated by `inherit!`
//! - **Render Traversals**: Recording with culling, masks and state; one-time compile
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_core::prelude::*;
//!
//! #[derive(Default)]
//! struct CountNodes(usize);
//!
//! impl ConstVisitor for CountNodes {
//!     fn apply_node(&mut self, node: &dyn Node) {
//!         self.0 += 1;
//!         node.traverse_const(self);
//!     }
//! }
//!
//! let root = RefPtr::new(
//!     Group::new()
//!         .with_child(RefPtr::new(Leaf::new()).into_node())
//!         .with_child(RefPtr::new(Leaf::new()).into_node()),
//! );
//! root.set_value("name", String::from("root"));
//!
//! let counter: CountNodes = visit(&*root);
//! assert_eq!(counter.0, 3);
//! assert_eq!(root.get_value::<String>("name").as_deref(), Some("root"));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod core;
pub mod data;
pub mod foundation;
pub mod memory;
pub mod nodes;
pub mod object;
pub mod render;
pub mod visit;

#[cfg(test)]
mod tests;

pub use crate::core::{init, CoreConfig, CoreError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports for scene graph users
pub mod prelude {
    pub use crate::{
        data::{Array, Data},
        foundation::math::{Mat4, Sphere, Vec3},
        inherit,
        memory::{AllocatorAffinity, DataBuffer},
        nodes::{
            BindState, Command, Commands, CullNode, Draw, Group, Leaf, MatrixTransform, Node,
            QuadGroup, StateGroup, Switch, Transform,
        },
        object::{Object, ObjectBase, ObjectKey, ObserverPtr, Properties, RefMut, RefPtr, Value, ValueObject},
        render::{CommandBuffer, CommandList, CompileTraversal, RecordTraversal},
        visit::{visit, ConstVisitor, Mask, Traversal, Visitor},
    };
}
