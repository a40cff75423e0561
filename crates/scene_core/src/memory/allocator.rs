//! Allocator interface and the process-wide instance

use std::ptr::NonNull;
use std::sync::OnceLock;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::memory::PoolAllocator;

/// Alignment guaranteed for every block returned by an [`Allocator`]
pub const ALLOCATOR_ALIGNMENT: usize = 16;

/// Tag grouping related allocations into the same pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AllocatorAffinity {
    /// General objects: values, commands, state
    Objects,
    /// Bulk payloads such as vertex and index arrays
    Data,
    /// Scene graph nodes
    Nodes,
    /// Physics objects
    Physics,
}

impl AllocatorAffinity {
    /// Number of affinities
    pub const COUNT: usize = 4;

    /// All affinities in pool order
    pub const ALL: [Self; Self::COUNT] = [Self::Objects, Self::Data, Self::Nodes, Self::Physics];

    /// Pool index of this affinity
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Usage counters for one affinity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    /// Blocks handed out and not yet returned
    pub allocated_blocks: usize,
    /// Bytes requested by outstanding blocks
    pub allocated_bytes: usize,
    /// Bytes obtained from the system (slabs plus large blocks)
    pub reserved_bytes: usize,
}

impl std::ops::Add for AllocatorStats {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            allocated_blocks: self.allocated_blocks + other.allocated_blocks,
            allocated_bytes: self.allocated_bytes + other.allocated_bytes,
            reserved_bytes: self.reserved_bytes + other.reserved_bytes,
        }
    }
}

/// Pooled, affinity-partitioned heap allocator
///
/// Implementations must be callable from many threads at once without any
/// locking on the caller's side. Running out of memory is not reported: it
/// aborts through [`std::alloc::handle_alloc_error`].
pub trait Allocator: Send + Sync {
    /// Allocate `size` bytes of uninitialized storage from the pool for `affinity`.
    ///
    /// The returned pointer is aligned to [`ALLOCATOR_ALIGNMENT`].
    fn allocate(&self, size: usize, affinity: AllocatorAffinity) -> NonNull<u8>;

    /// Return a block to the pool it came from.
    ///
    /// Returns `false` if the pointer was not handed out by this allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by [`Allocator::allocate`] on this
    /// allocator, must not have been deallocated already, and `size` must be
    /// exactly the size passed to that `allocate` call.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, size: usize) -> bool;

    /// Usage counters for one affinity
    fn stats(&self, affinity: AllocatorAffinity) -> AllocatorStats;

    /// Usage counters summed over all affinities
    fn total_stats(&self) -> AllocatorStats {
        AllocatorAffinity::ALL
            .iter()
            .map(|affinity| self.stats(*affinity))
            .fold(AllocatorStats::default(), |total, stats| total + stats)
    }

    /// Log the usage counters of every affinity
    fn report(&self) {
        for affinity in AllocatorAffinity::ALL {
            let stats = self.stats(affinity);
            log::info!(
                "{:?}: {} blocks, {} bytes allocated, {} bytes reserved",
                affinity, stats.allocated_blocks, stats.allocated_bytes, stats.reserved_bytes
            );
        }
    }
}

/// Allocator setup errors
#[derive(Error, Debug)]
pub enum AllocatorError {
    /// The process-wide allocator was already created
    #[error("the process-wide allocator has already been initialized")]
    InstanceAlreadyInitialized,

    /// The allocator configuration is invalid
    #[error("invalid allocator configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

static INSTANCE: OnceLock<Box<dyn Allocator>> = OnceLock::new();

/// The process-wide allocator
///
/// Created with the default configuration on first use unless
/// [`set_instance`] ran before. It is never torn down.
pub fn instance() -> &'static dyn Allocator {
    INSTANCE
        .get_or_init(|| Box::new(PoolAllocator::with_defaults()))
        .as_ref()
}

/// Install the process-wide allocator
///
/// Fails once the instance exists, including when it was created lazily by an
/// earlier allocation.
pub fn set_instance(allocator: Box<dyn Allocator>) -> Result<(), AllocatorError> {
    INSTANCE
        .set(allocator)
        .map_err(|_| AllocatorError::InstanceAlreadyInitialized)
}

/// Allocate from the process-wide allocator
pub fn allocate(size: usize, affinity: AllocatorAffinity) -> NonNull<u8> {
    instance().allocate(size, affinity)
}

/// Return a block to the process-wide allocator
///
/// # Safety
///
/// Same contract as [`Allocator::deallocate`] on [`instance`].
pub unsafe fn deallocate(ptr: NonNull<u8>, size: usize) -> bool {
    // SAFETY: forwarded caller contract.
    unsafe { instance().deallocate(ptr, size) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_indices_are_dense() {
        for (i, affinity) in AllocatorAffinity::ALL.iter().enumerate() {
            assert_eq!(affinity.index(), i);
        }
    }

    #[test]
    fn test_instance_cannot_be_replaced_after_use() {
        let ptr = allocate(48, AllocatorAffinity::Objects);
        assert_eq!(ptr.as_ptr() as usize % ALLOCATOR_ALIGNMENT, 0);
        assert!(unsafe { deallocate(ptr, 48) });

        let result = set_instance(Box::new(PoolAllocator::with_defaults()));
        assert!(matches!(result, Err(AllocatorError::InstanceAlreadyInitialized)));
    }
}
