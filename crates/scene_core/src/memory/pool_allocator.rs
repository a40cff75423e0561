//! Slab-backed pooled allocator
//!
//! Each affinity owns a pool of power-of-two size classes. Blocks are carved
//! from large slabs and recycled through per-class free lists; blocks bigger
//! than the largest size class bypass the pools and go to the system
//! allocator. Deallocation finds the owning slab by address, so no header is
//! stored in front of a block.

use std::alloc::{self, Layout};
use std::collections::{BTreeMap, HashMap};
use std::ptr::NonNull;

use parking_lot::{Mutex, RwLock};

use crate::core::config::{AllocatorConfig, AllocatorType};
use crate::memory::{Allocator, AllocatorAffinity, AllocatorError, AllocatorStats, ALLOCATOR_ALIGNMENT};

/// Pointer to a block owned by the allocator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockPtr(NonNull<u8>);

// SAFETY: a BlockPtr is only an address into memory the allocator owns; it is
// never dereferenced by the allocator itself.
unsafe impl Send for BlockPtr {}

/// Contiguous region that size-class blocks are carved from
#[derive(Debug)]
struct Slab {
    base: BlockPtr,
    size: usize,
    used: usize,
}

impl Slab {
    fn carve(&mut self, block_size: usize) -> Option<BlockPtr> {
        if self.size - self.used < block_size {
            return None;
        }
        // SAFETY: used + block_size <= size, so the offset stays inside the slab.
        let ptr = unsafe { self.base.0.as_ptr().add(self.used) };
        self.used += block_size;
        NonNull::new(ptr).map(BlockPtr)
    }
}

/// Per-affinity pool state, guarded by its own mutex
#[derive(Debug)]
struct Pool {
    slab_size: usize,
    slabs: Vec<Slab>,
    free_blocks: Vec<Vec<BlockPtr>>,
    stats: AllocatorStats,
}

impl Pool {
    fn new(slab_size: usize, class_count: usize) -> Self {
        Self {
            slab_size,
            slabs: Vec::new(),
            free_blocks: vec![Vec::new(); class_count],
            stats: AllocatorStats::default(),
        }
    }

    fn carve(&mut self, block_size: usize) -> Option<BlockPtr> {
        self.slabs.last_mut()?.carve(block_size)
    }
}

/// Address range of a registered slab
#[derive(Debug, Clone, Copy)]
struct SlabRange {
    end: usize,
    affinity: AllocatorAffinity,
}

/// Block served directly by the system allocator
#[derive(Debug, Clone, Copy)]
struct LargeBlock {
    ptr: BlockPtr,
    size: usize,
    affinity: AllocatorAffinity,
}

/// Pooled allocator partitioned by [`AllocatorAffinity`]
///
/// Slabs are kept until the allocator itself is dropped; the process-wide
/// instance is never dropped.
#[derive(Debug)]
pub struct PoolAllocator {
    config: AllocatorConfig,
    class_count: usize,
    pools: [Mutex<Pool>; AllocatorAffinity::COUNT],
    slab_ranges: RwLock<BTreeMap<usize, SlabRange>>,
    large_blocks: Mutex<HashMap<usize, LargeBlock>>,
    #[cfg(debug_assertions)]
    live_sizes: Mutex<HashMap<usize, usize>>,
}

impl PoolAllocator {
    /// Create an allocator from a validated configuration
    pub fn new(config: AllocatorConfig) -> Result<Self, AllocatorError> {
        config.validate().map_err(AllocatorError::InvalidConfig)?;
        Ok(Self::build(config))
    }

    /// Create an allocator with the default configuration
    pub fn with_defaults() -> Self {
        Self::build(AllocatorConfig::default())
    }

    fn build(config: AllocatorConfig) -> Self {
        let class_count =
            (config.max_pooled_size.trailing_zeros() - config.min_block_size.trailing_zeros()) as usize + 1;
        let pools = AllocatorAffinity::ALL
            .map(|affinity| Mutex::new(Pool::new(config.slab_sizes.get(affinity), class_count)));

        Self {
            config,
            class_count,
            pools,
            slab_ranges: RwLock::new(BTreeMap::new()),
            large_blocks: Mutex::new(HashMap::new()),
            #[cfg(debug_assertions)]
            live_sizes: Mutex::new(HashMap::new()),
        }
    }

    /// Configuration this allocator was built with
    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    fn is_pooled(&self, size: usize) -> bool {
        self.config.allocator_type == AllocatorType::Pooled && size <= self.config.max_pooled_size
    }

    fn size_class(&self, size: usize) -> usize {
        let block_size = size.max(self.config.min_block_size).next_power_of_two();
        (block_size.trailing_zeros() - self.config.min_block_size.trailing_zeros()) as usize
    }

    fn class_size(&self, class: usize) -> usize {
        debug_assert!(class < self.class_count);
        self.config.min_block_size << class
    }

    fn system_layout(size: usize) -> Layout {
        Layout::from_size_align(size, ALLOCATOR_ALIGNMENT)
            .unwrap_or_else(|_| panic!("allocation of {size} bytes exceeds the address space"))
    }

    fn system_allocate(layout: Layout) -> BlockPtr {
        // SAFETY: layout has a non-zero size; callers clamp sizes to at least one byte.
        let ptr = unsafe { alloc::alloc(layout) };
        match NonNull::new(ptr) {
            Some(ptr) => BlockPtr(ptr),
            None => alloc::handle_alloc_error(layout),
        }
    }

    /// Reserve a fresh slab for `affinity` and register its address range.
    ///
    /// Called with the pool lock held; the range registry lock is always taken
    /// after a pool lock, never before.
    fn reserve_slab(&self, pool: &mut Pool, affinity: AllocatorAffinity) {
        let layout = Self::system_layout(pool.slab_size);
        let base = Self::system_allocate(layout);
        let start = base.0.as_ptr() as usize;

        self.slab_ranges.write().insert(
            start,
            SlabRange {
                end: start + pool.slab_size,
                affinity,
            },
        );

        pool.stats.reserved_bytes += pool.slab_size;
        pool.slabs.push(Slab {
            base,
            size: pool.slab_size,
            used: 0,
        });

        log::debug!(
            "Reserved {} byte slab #{} for {:?}",
            pool.slab_size,
            pool.slabs.len(),
            affinity
        );
    }

    fn allocate_pooled(&self, size: usize, affinity: AllocatorAffinity) -> BlockPtr {
        let class = self.size_class(size);
        let block_size = self.class_size(class);
        let mut pool = self.pools[affinity.index()].lock();

        let block = match pool.free_blocks[class].pop() {
            Some(block) => block,
            None => match pool.carve(block_size) {
                Some(block) => block,
                None => {
                    self.reserve_slab(&mut pool, affinity);
                    match pool.carve(block_size) {
                        Some(block) => block,
                        None => unreachable!("a fresh slab always holds the largest size class"),
                    }
                }
            },
        };

        pool.stats.allocated_blocks += 1;
        pool.stats.allocated_bytes += size;
        block
    }

    fn allocate_large(&self, size: usize, affinity: AllocatorAffinity) -> BlockPtr {
        let block = Self::system_allocate(Self::system_layout(size));
        self.large_blocks.lock().insert(
            block.0.as_ptr() as usize,
            LargeBlock {
                ptr: block,
                size,
                affinity,
            },
        );

        let mut pool = self.pools[affinity.index()].lock();
        pool.stats.allocated_blocks += 1;
        pool.stats.allocated_bytes += size;
        pool.stats.reserved_bytes += size;

        log::trace!("Allocated {} byte block for {:?} from the system", size, affinity);
        block
    }

    fn owning_slab(&self, address: usize) -> Option<AllocatorAffinity> {
        self.slab_ranges
            .read()
            .range(..=address)
            .next_back()
            .filter(|(_, range)| address < range.end)
            .map(|(_, range)| range.affinity)
    }

    #[cfg(debug_assertions)]
    fn track_allocation(&self, address: usize, size: usize) {
        let previous = self.live_sizes.lock().insert(address, size);
        debug_assert!(previous.is_none(), "block {address:#x} handed out twice");
    }

    #[cfg(debug_assertions)]
    fn track_deallocation(&self, address: usize, size: usize) {
        if let Some(allocated) = self.live_sizes.lock().remove(&address) {
            debug_assert_eq!(
                allocated, size,
                "block {address:#x} released with a different size than it was allocated with"
            );
        }
    }
}

impl Allocator for PoolAllocator {
    fn allocate(&self, size: usize, affinity: AllocatorAffinity) -> NonNull<u8> {
        let size = size.max(1);
        let block = if self.is_pooled(size) {
            self.allocate_pooled(size, affinity)
        } else {
            self.allocate_large(size, affinity)
        };

        #[cfg(debug_assertions)]
        self.track_allocation(block.0.as_ptr() as usize, size);

        block.0
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, size: usize) -> bool {
        let size = size.max(1);
        let address = ptr.as_ptr() as usize;

        #[cfg(debug_assertions)]
        self.track_deallocation(address, size);

        if let Some(affinity) = self.owning_slab(address) {
            debug_assert!(self.is_pooled(size), "pooled block released with an oversize length");
            let class = self.size_class(size);
            let mut pool = self.pools[affinity.index()].lock();
            pool.free_blocks[class].push(BlockPtr(ptr));
            pool.stats.allocated_blocks -= 1;
            pool.stats.allocated_bytes -= size;
            return true;
        }

        let Some(block) = self.large_blocks.lock().remove(&address) else {
            log::warn!("Ignoring deallocation of foreign block {address:#x}");
            return false;
        };
        debug_assert_eq!(block.size, size, "large block released with a different size");

        // SAFETY: the block was allocated by `allocate_large` with this exact layout.
        unsafe { alloc::dealloc(block.ptr.0.as_ptr(), Self::system_layout(block.size)) };

        let mut pool = self.pools[block.affinity.index()].lock();
        pool.stats.allocated_blocks -= 1;
        pool.stats.allocated_bytes -= block.size;
        pool.stats.reserved_bytes -= block.size;
        true
    }

    fn stats(&self, affinity: AllocatorAffinity) -> AllocatorStats {
        self.pools[affinity.index()].lock().stats
    }
}

impl Drop for PoolAllocator {
    fn drop(&mut self) {
        let outstanding = self.total_stats().allocated_blocks;
        if outstanding > 0 {
            log::warn!("PoolAllocator dropped with {outstanding} blocks still allocated");
        }

        for block in self.large_blocks.get_mut().values() {
            // SAFETY: recorded by `allocate_large` with this layout and not yet freed.
            unsafe { alloc::dealloc(block.ptr.0.as_ptr(), Self::system_layout(block.size)) };
        }

        for pool in &mut self.pools {
            for slab in &pool.get_mut().slabs {
                // SAFETY: every slab was allocated by `reserve_slab` with this layout.
                unsafe { alloc::dealloc(slab.base.0.as_ptr(), Self::system_layout(slab.size)) };
            }
        }
    }
}
