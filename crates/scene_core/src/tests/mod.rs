//! Cross-module tests of the object model, traversal dispatch and allocator

mod lifetime;
mod traversal;
