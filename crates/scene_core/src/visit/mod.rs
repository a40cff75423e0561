//! # Visitors
//!
//! Traversal interfaces with one overload per object category and the
//! generic helpers node types use to hand their children to a traversal.
//!
//! ## Category tree
//!
//! ```text
//! Object
//! ├── Value<T>                  apply_value
//! ├── Array<T>                  apply_data
//! └── Node                      apply_node
//!     ├── Leaf, Group, QuadGroup, Switch, CullNode, StateGroup, Commands
//!     ├── Transform             apply_transform
//!     │   └── MatrixTransform
//!     └── Command               apply_command
//!         ├── Draw
//!         └── BindState
//! ```
//!
//! Each default overload forwards one level up this tree.

pub mod const_visitor;
pub mod mask;
pub mod traversal;
pub mod visitor;

pub use const_visitor::ConstVisitor;
pub use mask::Mask;
pub use traversal::{traverse_array, traverse_children, traverse_single, visit, Traversal};
pub use visitor::Visitor;
