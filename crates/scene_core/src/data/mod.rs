//! # Data
//!
//! Bulk payload objects. Element storage is a [`DataBuffer`] in the `Data`
//! allocator pool, separate from the small object that owns it.

pub mod array;

pub use array::{Array, Data};

#[doc(no_inline)]
pub use crate::memory::DataBuffer;
