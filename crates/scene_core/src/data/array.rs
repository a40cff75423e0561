//! Typed arrays of plain-old-data elements

use std::sync::atomic::{AtomicU32, Ordering};

use bytemuck::Pod;

use crate::memory::DataBuffer;
use crate::object::ObjectBase;

/// Object category for bulk data
pub trait Data: crate::object::Object {
    /// Number of elements
    fn value_count(&self) -> usize;

    /// Size of one element in bytes
    fn value_size(&self) -> usize;

    /// Payload as raw bytes
    fn data_bytes(&self) -> &[u8];

    /// Incremented every time the payload is marked modified
    fn modified_count(&self) -> u32;

    /// Total payload size in bytes
    fn data_size(&self) -> usize {
        self.value_count() * self.value_size()
    }
}

/// Array of `T` stored in the `Data` pool
#[derive(Debug)]
pub struct Array<T: Pod> {
    base: ObjectBase,
    buffer: DataBuffer<T>,
    modified_count: AtomicU32,
}

impl<T: Pod> Array<T> {
    /// Create an array of `len` zeroed elements
    pub fn new(len: usize) -> Self {
        Self::from_buffer(DataBuffer::new(len))
    }

    /// Create an array holding a copy of `values`
    pub fn from_slice(values: &[T]) -> Self {
        Self::from_buffer(DataBuffer::from_slice(values))
    }

    fn from_buffer(buffer: DataBuffer<T>) -> Self {
        Self {
            base: ObjectBase::new(),
            buffer,
            modified_count: AtomicU32::new(0),
        }
    }

    /// Elements
    pub fn as_slice(&self) -> &[T] {
        self.buffer.as_slice()
    }

    /// Elements, mutably; call [`Array::dirty`] after changing them
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.buffer.as_mut_slice()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the array is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Mark the payload as modified so consumers re-upload it
    pub fn dirty(&self) {
        self.modified_count.fetch_add(1, Ordering::Release);
    }
}

impl<T: Pod> Clone for Array<T> {
    fn clone(&self) -> Self {
        Self::from_buffer(self.buffer.clone())
    }
}

crate::inherit!(impl[T: Pod + Send + Sync] Array<T> => apply_data);

impl<T: Pod + Send + Sync> Data for Array<T> {
    fn value_count(&self) -> usize {
        self.buffer.len()
    }

    fn value_size(&self) -> usize {
        std::mem::size_of::<T>()
    }

    fn data_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    fn modified_count(&self) -> u32 {
        self.modified_count.load(Ordering::Acquire)
    }
}

/// Array of `f32`
pub type FloatArray = Array<f32>;
/// Array of 32-bit indices
pub type UIntArray = Array<u32>;
/// Array of 16-bit indices
pub type UShortArray = Array<u16>;
/// Array of 3-component float vectors
pub type Vec3Array = Array<[f32; 3]>;
