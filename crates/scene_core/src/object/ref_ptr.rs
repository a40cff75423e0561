//! Owning, intrusively counted handle

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

use crate::memory::{self, ALLOCATOR_ALIGNMENT};
use crate::nodes::{Command, Node};
use crate::object::{Object, ObserverPtr};

/// Owning handle to an object living in allocator memory
///
/// The count lives inside the object ([`super::ObjectBase`]), so a raw pointer
/// obtained from [`RefPtr::into_raw`] can be turned back into a handle at any
/// time. A null `ref_ptr` is spelled `Option<RefPtr<T>>`.
///
/// Objects are created with [`RefPtr::new`], which moves the value into a
/// block from the pool named by [`Object::affinity`]. When the last handle is
/// dropped the object's auxiliary is disconnected, the value is dropped, and
/// the block is returned with the size reported by [`Object::size_of`].
pub struct RefPtr<T: ?Sized + Object> {
    ptr: NonNull<T>,
    _marker: PhantomData<T>,
}

// SAFETY: `Object` requires `Send + Sync` and the count is atomic.
unsafe impl<T: ?Sized + Object> Send for RefPtr<T> {}
// SAFETY: shared access only hands out `&T`.
unsafe impl<T: ?Sized + Object> Sync for RefPtr<T> {}

impl<T: Object> RefPtr<T> {
    /// Move `value` into allocator memory and take the first reference
    pub fn new(value: T) -> Self {
        assert!(
            std::mem::align_of::<T>() <= ALLOCATOR_ALIGNMENT,
            "{} needs more alignment than the allocator provides",
            value.class_name()
        );

        let size = std::mem::size_of::<T>();
        debug_assert_eq!(size, value.size_of(), "size_of() must report the leaf size");
        debug_assert_eq!(value.object_base().reference_count(), 0);

        let ptr = memory::allocate(size, value.affinity()).cast::<T>();
        // SAFETY: the block is at least `size` bytes and suitably aligned.
        unsafe { ptr.as_ptr().write(value) };

        // SAFETY: initialized just above.
        let object = unsafe { ptr.as_ref() };
        object.object_base().add_ref();

        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    /// Upcast to a command handle
    pub fn into_command(self) -> RefPtr<dyn Command>
    where
        T: Command,
    {
        let ptr: NonNull<dyn Command> = Self::into_non_null(self);
        RefPtr {
            ptr,
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized + Object> RefPtr<T> {
    fn into_non_null(this: Self) -> NonNull<T> {
        let ptr = this.ptr;
        std::mem::forget(this);
        ptr
    }

    /// Upcast to a plain object handle
    pub fn into_object(self) -> RefPtr<dyn Object> {
        let ptr = NonNull::from(self.as_object());
        std::mem::forget(self);
        RefPtr {
            ptr,
            _marker: PhantomData,
        }
    }

    /// Create a weak handle to the same object
    pub fn downgrade(this: &Self) -> ObserverPtr<T> {
        ObserverPtr::new(this)
    }

    /// Mutable access when this is the only reference and no observer exists
    ///
    /// The guard may replace the whole value. Whatever header the object
    /// carries when the guard drops becomes the handle's, so the count is
    /// put back to this handle's single reference.
    pub fn get_mut(this: &mut Self) -> Option<RefMut<'_, T>> {
        let base = this.object_base();
        let observed = base.existing_auxiliary().is_some_and(|auxiliary| auxiliary.is_connected());
        if base.reference_count() != 1 || observed {
            return None;
        }
        Some(RefMut { handle: this })
    }

    /// Whether two handles point at the same object
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        ptr::addr_eq(a.ptr.as_ptr(), b.ptr.as_ptr())
    }

    /// Current reference count of the object
    pub fn reference_count(this: &Self) -> u32 {
        this.object_base().reference_count()
    }

    /// Give up the handle without releasing its reference
    pub fn into_raw(this: Self) -> *const T {
        Self::into_non_null(this).as_ptr()
    }

    /// Adopt a reference previously leaked with [`RefPtr::into_raw`]
    ///
    /// # Safety
    ///
    /// `ptr` must point at a live object created by [`RefPtr::new`] and the
    /// caller must own one counted reference to it, which moves into the
    /// returned handle.
    pub unsafe fn from_raw(ptr: *const T) -> Self {
        debug_assert!(!ptr.is_null());
        Self {
            // SAFETY: non-null by contract.
            ptr: unsafe { NonNull::new_unchecked(ptr.cast_mut()) },
            _marker: PhantomData,
        }
    }

    /// Take a new reference to an object known only by pointer
    ///
    /// # Safety
    ///
    /// `ptr` must point at a live object created by [`RefPtr::new`] that
    /// some other reference keeps alive for the duration of the call, and no
    /// [`RefMut`] to it may be live.
    pub unsafe fn from_ptr(ptr: *const T) -> Self {
        // SAFETY: live by contract.
        unsafe { (*ptr).object_base().add_ref() };
        // SAFETY: the reference taken above moves into the handle.
        unsafe { Self::from_raw(ptr) }
    }

    /// Increment the count of the object behind `ptr`
    ///
    /// # Safety
    ///
    /// Same as [`RefPtr::from_ptr`].
    pub unsafe fn increment_ref_count(ptr: *const T) {
        // SAFETY: live by contract.
        unsafe { (*ptr).object_base().add_ref() };
    }

    /// Release one reference of the object behind `ptr`, destroying it when
    /// this was the last one
    ///
    /// # Safety
    ///
    /// The caller must own one counted reference to the object.
    pub unsafe fn decrement_ref_count(ptr: *const T) {
        // SAFETY: forwarded caller contract.
        drop(unsafe { Self::from_raw(ptr) });
    }

    /// Run the destruction path once the count has reached zero.
    ///
    /// # Safety
    ///
    /// Only the caller that observed the zero transition may call this.
    unsafe fn destroy(ptr: NonNull<T>) {
        let size = {
            // SAFETY: the object stays live until `drop_in_place` below.
            let object = unsafe { ptr.as_ref() };
            if let Some(auxiliary) = object.object_base().existing_auxiliary() {
                auxiliary.disconnect();
            }
            object.size_of()
        };

        // SAFETY: no references remain and observers can no longer promote.
        unsafe { ptr::drop_in_place(ptr.as_ptr()) };

        // SAFETY: allocated by `RefPtr::new` with `size` bytes.
        let released = unsafe { memory::deallocate(ptr.cast::<u8>(), size) };
        debug_assert!(released, "object memory was not owned by the allocator");
    }
}

impl<T: ?Sized + Node> RefPtr<T> {
    /// Upcast to a node handle
    pub fn into_node(self) -> RefPtr<dyn Node> {
        let ptr = NonNull::from(self.as_node());
        std::mem::forget(self);
        RefPtr {
            ptr,
            _marker: PhantomData,
        }
    }
}

impl RefPtr<dyn Object> {
    /// Recover the concrete type, handing the handle back on mismatch
    pub fn downcast<T: Object>(self) -> Result<RefPtr<T>, Self> {
        if !self.is::<T>() {
            return Err(self);
        }
        let ptr = Self::into_non_null(self).cast::<T>();
        Ok(RefPtr {
            ptr,
            _marker: PhantomData,
        })
    }
}

impl<T: ?Sized + Object> Deref for RefPtr<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: a handle keeps its object alive.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T: ?Sized + Object> Clone for RefPtr<T> {
    fn clone(&self) -> Self {
        self.object_base().add_ref();
        Self {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized + Object> Drop for RefPtr<T> {
    fn drop(&mut self) {
        if self.object_base().release() {
            // SAFETY: this thread observed the count reach zero.
            unsafe { Self::destroy(self.ptr) };
        }
    }
}

/// Exclusive access to the object behind a unique [`RefPtr`]
///
/// Returned by [`RefPtr::get_mut`].
pub struct RefMut<'a, T: ?Sized + Object> {
    handle: &'a mut RefPtr<T>,
}

impl<T: ?Sized + Object> Deref for RefMut<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &**self.handle
    }
}

impl<T: ?Sized + Object> DerefMut for RefMut<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: `get_mut` checked that the only counted reference is the
        // handle borrowed here and that no observer can mint another.
        unsafe { self.handle.ptr.as_mut() }
    }
}

impl<T: ?Sized + Object> Drop for RefMut<'_, T> {
    fn drop(&mut self) {
        // SAFETY: as in `deref_mut`.
        let object = unsafe { self.handle.ptr.as_mut() };
        object.object_base_mut().reseat_unique();
    }
}

impl<T: ?Sized + Object> fmt::Debug for RefMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefMut").field(&self.handle).finish()
    }
}

impl<T: ?Sized + Object> fmt::Debug for RefPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefPtr")
            .field("class", &self.class_name())
            .field("ptr", &self.ptr.cast::<u8>())
            .field("ref_count", &self.object_base().reference_count())
            .finish()
    }
}
