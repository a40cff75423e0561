//! Owning handles over allocator blocks

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use bytemuck::Pod;

use crate::memory::{instance, Allocator, AllocatorAffinity, ALLOCATOR_ALIGNMENT};

/// Zero-initialized block of bytes returned to its allocator on drop
pub struct Allocation<'a> {
    ptr: NonNull<u8>,
    len: usize,
    allocator: &'a dyn Allocator,
}

impl Allocation<'static> {
    /// Allocate `len` zeroed bytes from the process-wide allocator
    pub fn zeroed(len: usize, affinity: AllocatorAffinity) -> Self {
        Self::zeroed_in(instance(), len, affinity)
    }
}

impl<'a> Allocation<'a> {
    /// Allocate `len` zeroed bytes from `allocator`
    pub fn zeroed_in(allocator: &'a dyn Allocator, len: usize, affinity: AllocatorAffinity) -> Self {
        let ptr = allocator.allocate(len, affinity);
        // SAFETY: the allocator returned at least `len` writable bytes.
        unsafe { ptr.as_ptr().write_bytes(0, len) };
        Self { ptr, len, allocator }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the block is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Start of the block
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// The block's bytes
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `len` initialized bytes are owned by this handle.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The block's bytes, mutably
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: `len` initialized bytes are owned exclusively by this handle.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for Allocation<'_> {
    fn drop(&mut self) {
        // SAFETY: `ptr` came from `allocator.allocate(len, ..)` and is released once.
        let released = unsafe { self.allocator.deallocate(self.ptr, self.len) };
        debug_assert!(released, "allocation returned to the wrong allocator");
    }
}

// SAFETY: the handle owns its bytes exclusively; the allocator is Sync.
unsafe impl Send for Allocation<'_> {}
// SAFETY: shared access only hands out `&[u8]`.
unsafe impl Sync for Allocation<'_> {}

impl fmt::Debug for Allocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocation")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

/// Typed, zero-initialized array stored in the `Data` pool
///
/// Used as the payload of [`crate::data::Array`] so bulk vertex and index data
/// is kept apart from the objects that reference it.
pub struct DataBuffer<T: Pod> {
    allocation: Option<Allocation<'static>>,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Pod> DataBuffer<T> {
    /// Create a buffer of `len` zeroed elements
    pub fn new(len: usize) -> Self {
        assert!(std::mem::size_of::<T>() > 0, "zero-sized element types are not supported");
        assert!(
            std::mem::align_of::<T>() <= ALLOCATOR_ALIGNMENT,
            "element alignment exceeds the allocator alignment"
        );

        let byte_len = len
            .checked_mul(std::mem::size_of::<T>())
            .unwrap_or_else(|| panic!("buffer of {len} elements overflows usize"));
        let allocation = (byte_len > 0).then(|| Allocation::zeroed(byte_len, AllocatorAffinity::Data));

        Self {
            allocation,
            len,
            _marker: PhantomData,
        }
    }

    /// Create a buffer holding a copy of `values`
    pub fn from_slice(values: &[T]) -> Self {
        let mut buffer = Self::new(values.len());
        buffer.as_mut_slice().copy_from_slice(values);
        buffer
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no elements
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Elements as a slice
    pub fn as_slice(&self) -> &[T] {
        match &self.allocation {
            Some(allocation) => bytemuck::cast_slice(allocation.as_bytes()),
            None => &[],
        }
    }

    /// Elements as a mutable slice
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match &mut self.allocation {
            Some(allocation) => bytemuck::cast_slice_mut(allocation.as_bytes_mut()),
            None => &mut [],
        }
    }

    /// Raw bytes of the payload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }
}

impl<T: Pod> Deref for DataBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Pod> DerefMut for DataBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Pod> Clone for DataBuffer<T> {
    fn clone(&self) -> Self {
        Self::from_slice(self.as_slice())
    }
}

impl<T: Pod + fmt::Debug> fmt::Debug for DataBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::PoolAllocator;

    #[test]
    fn test_allocation_is_zeroed_and_released() {
        let allocator = PoolAllocator::with_defaults();
        {
            let mut block = Allocation::zeroed_in(&allocator, 100, AllocatorAffinity::Objects);
            assert_eq!(block.len(), 100);
            assert!(block.as_bytes().iter().all(|&b| b == 0));

            block.as_bytes_mut()[99] = 0xAB;
            assert_eq!(block.as_bytes()[99], 0xAB);
            assert_eq!(allocator.stats(AllocatorAffinity::Objects).allocated_blocks, 1);
        }
        assert_eq!(allocator.stats(AllocatorAffinity::Objects).allocated_blocks, 0);
    }

    #[test]
    fn test_data_buffer_from_slice() {
        let buffer = DataBuffer::from_slice(&[1.0f32, 2.0, 3.0]);
        assert_eq!(buffer.len(), 3);
        assert_eq!(&buffer[..], &[1.0, 2.0, 3.0]);
        assert_eq!(buffer.as_bytes().len(), 12);

        let copy = buffer.clone();
        assert_eq!(copy.as_slice(), buffer.as_slice());
        assert_ne!(copy.as_slice().as_ptr(), buffer.as_slice().as_ptr());
    }

    #[test]
    fn test_empty_data_buffer() {
        let mut buffer = DataBuffer::<u32>::new(0);
        assert!(buffer.is_empty());
        assert!(buffer.as_slice().is_empty());
        assert!(buffer.as_mut_slice().is_empty());
    }

    #[test]
    fn test_data_buffer_mutation() {
        let mut buffer = DataBuffer::<u16>::new(4);
        buffer[2] = 7;
        assert_eq!(buffer.as_slice(), &[0, 0, 7, 0]);
    }
}
