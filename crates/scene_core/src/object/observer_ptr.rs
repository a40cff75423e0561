//! Non-owning handle resolved through the target's auxiliary

use std::fmt;
use std::ptr::{self, NonNull};
use std::sync::Arc;

use crate::object::{Auxiliary, Object, RefPtr};

/// Weak handle that never keeps its target alive
///
/// Holds the target's [`Auxiliary`] rather than the target itself.
/// [`ObserverPtr::lock`] succeeds only while the object is alive and is safe
/// to call concurrently with the last owner dropping it.
pub struct ObserverPtr<T: ?Sized + Object> {
    auxiliary: Arc<Auxiliary>,
    ptr: NonNull<T>,
}

// SAFETY: `ptr` is only dereferenced after a successful promotion; the
// auxiliary is itself `Send + Sync`.
unsafe impl<T: ?Sized + Object> Send for ObserverPtr<T> {}
// SAFETY: see above.
unsafe impl<T: ?Sized + Object> Sync for ObserverPtr<T> {}

impl<T: ?Sized + Object> ObserverPtr<T> {
    /// Observe the object behind `target`
    pub fn new(target: &RefPtr<T>) -> Self {
        let base = target.object_base();
        let auxiliary = Arc::clone(base.auxiliary());
        auxiliary.connect(base);

        Self {
            auxiliary,
            ptr: NonNull::from(&**target),
        }
    }

    /// Promote to an owning handle, or `None` once the target is gone
    pub fn lock(&self) -> Option<RefPtr<T>> {
        if !self.auxiliary.retain_connected() {
            return None;
        }
        // SAFETY: `retain_connected` took a reference on the live object `ptr`
        // points at; it moves into the handle.
        Some(unsafe { RefPtr::from_raw(self.ptr.as_ptr()) })
    }

    /// Whether the target was alive at the time of the call
    pub fn is_valid(&self) -> bool {
        self.auxiliary.is_connected()
    }

    /// Whether two observers watch the same object
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.auxiliary, &b.auxiliary)
    }

    /// Whether this observer watches the object behind `target`
    pub fn observes(&self, target: &RefPtr<T>) -> bool {
        ptr::addr_eq(self.ptr.as_ptr(), ptr::from_ref(&**target))
            && self.auxiliary.is_connected()
    }
}

impl<T: ?Sized + Object> Clone for ObserverPtr<T> {
    fn clone(&self) -> Self {
        Self {
            auxiliary: Arc::clone(&self.auxiliary),
            ptr: self.ptr,
        }
    }
}

impl<T: ?Sized + Object> From<&RefPtr<T>> for ObserverPtr<T> {
    fn from(target: &RefPtr<T>) -> Self {
        Self::new(target)
    }
}

impl<T: ?Sized + Object> fmt::Debug for ObserverPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverPtr")
            .field("ptr", &self.ptr.cast::<u8>())
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::Leaf;

    #[test]
    fn test_lock_while_alive() {
        let leaf = RefPtr::new(Leaf::new());
        let observer = ObserverPtr::new(&leaf);

        assert!(observer.is_valid());
        assert!(observer.observes(&leaf));
        assert_eq!(RefPtr::reference_count(&leaf), 1);

        let promoted = observer.lock().expect("target is alive");
        assert!(RefPtr::ptr_eq(&promoted, &leaf));
        assert_eq!(RefPtr::reference_count(&leaf), 2);
    }

    #[test]
    fn test_lock_after_destruction_is_empty() {
        let leaf = RefPtr::new(Leaf::new());
        let observer = RefPtr::downgrade(&leaf);
        let copy = observer.clone();

        drop(leaf);

        assert!(!observer.is_valid());
        assert!(observer.lock().is_none());
        assert!(copy.lock().is_none());
        assert!(ObserverPtr::ptr_eq(&observer, &copy));
    }

    #[test]
    fn test_observer_blocks_get_mut() {
        let mut leaf = RefPtr::new(Leaf::new());
        assert!(RefPtr::get_mut(&mut leaf).is_some());

        let observer = ObserverPtr::new(&leaf);
        assert!(RefPtr::get_mut(&mut leaf).is_none());
        drop(observer);
        // The auxiliary stays connected for the object's lifetime.
        assert!(RefPtr::get_mut(&mut leaf).is_none());
    }
}
