//! Memory management
//!
//! Every object handed out through [`crate::object::RefPtr`] lives in memory
//! obtained from the process-wide [`Allocator`]. Allocations are tagged with an
//! [`AllocatorAffinity`] so that related objects share pools:
//!
//! ```text
//! instance()  ──►  PoolAllocator
//!                    ├── Objects pool  (size classes carved from slabs)
//!                    ├── Data pool     (bulk array payloads)
//!                    ├── Nodes pool    (scene graph nodes)
//!                    ├── Physics pool
//!                    └── large blocks  (straight from the system allocator)
//! ```
//!
//! The raw `allocate`/`deallocate` pair requires the caller to pass back the
//! exact size it asked for. [`Allocation`] and [`DataBuffer`] wrap that contract
//! in owning handles for code that does not need raw pointers.

pub mod allocator;
pub mod pool_allocator;
pub mod buffer;

pub use allocator::{
    allocate, deallocate, instance, set_instance,
    Allocator, AllocatorAffinity, AllocatorError, AllocatorStats, ALLOCATOR_ALIGNMENT,
};
pub use pool_allocator::PoolAllocator;
pub use buffer::{Allocation, DataBuffer};
