//! # Scene Graph Nodes
//!
//! The node categories traversals know about. Every type here implements
//! `Object` through `inherit!` and hands its children to traversals with the
//! shared helpers in [`crate::visit`].
//!
//! Containers are filled before they are shared: build a `Group`, add
//! children, then wrap it in a `RefPtr`. Later edits go through
//! `RefPtr::get_mut` and must not race with traversals.

pub mod commands;
pub mod cull_node;
pub mod group;
pub mod node;
pub mod quad_group;
pub mod state_group;
pub mod switch;
pub mod transform;

pub use commands::{BindState, Command, Commands, Draw};
pub use cull_node::CullNode;
pub use group::Group;
pub use node::{AsNode, Leaf, Node};
pub use quad_group::QuadGroup;
pub use state_group::StateGroup;
pub use switch::{Switch, SwitchChild};
pub use transform::{MatrixTransform, Transform};
