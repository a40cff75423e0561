//! The `Object` trait and its reference-count header

use std::any::Any;
use std::sync::atomic::{self, AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use crate::memory::AllocatorAffinity;
use crate::object::{Auxiliary, ObjectKey, RefPtr, Value};
use crate::render::RecordTraversal;
use crate::visit::{ConstVisitor, Visitor};

/// Reference count and lazily created [`Auxiliary`] embedded in every object
///
/// Leaf types hold one in a field named `base` and expose it through
/// [`Object::object_base`]; the [`crate::inherit!`] macro wires that up.
pub struct ObjectBase {
    ref_count: AtomicU32,
    auxiliary: OnceLock<Arc<Auxiliary>>,
}

impl ObjectBase {
    /// Create a header with a zero count and no auxiliary
    pub const fn new() -> Self {
        Self {
            ref_count: AtomicU32::new(0),
            auxiliary: OnceLock::new(),
        }
    }

    /// Increment the reference count
    pub fn add_ref(&self) {
        let previous = self.ref_count.fetch_add(1, Ordering::Relaxed);
        debug_assert!(previous < u32::MAX, "reference count overflow");
    }

    /// Decrement the reference count without ever destroying the object.
    ///
    /// # Safety
    ///
    /// The caller must own one of the counted references, and no owning
    /// handle may rely on that reference afterwards.
    pub unsafe fn unref_nodelete(&self) {
        let previous = self.ref_count.fetch_sub(1, Ordering::Release);
        debug_assert!(previous > 0, "unref_nodelete on an object with no references");
    }

    /// Decrement the count, returning `true` to the single caller that
    /// observed it reach zero.
    pub(crate) fn release(&self) -> bool {
        let previous = self.ref_count.fetch_sub(1, Ordering::Release);
        debug_assert!(previous > 0, "object released more times than it was referenced");
        if previous != 1 {
            return false;
        }
        atomic::fence(Ordering::Acquire);
        true
    }

    /// Increment the count only while it is non-zero.
    pub(crate) fn try_add_ref(&self) -> bool {
        let mut current = self.ref_count.load(Ordering::Relaxed);
        while current != 0 {
            match self.ref_count.compare_exchange_weak(
                current,
                current + 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
        false
    }

    /// Current reference count
    pub fn reference_count(&self) -> u32 {
        self.ref_count.load(Ordering::Acquire)
    }

    /// Re-establish the owning handle's reference after the header was
    /// overwritten through [`crate::object::RefMut`].
    pub(crate) fn reseat_unique(&mut self) {
        debug_assert!(
            self.existing_auxiliary().map_or(true, |auxiliary| !auxiliary.is_connected()),
            "a moved-in header cannot carry observers"
        );
        let count = self.ref_count.get_mut();
        if *count == 0 {
            *count = 1;
        }
    }

    /// The auxiliary, created on first call
    pub fn auxiliary(&self) -> &Arc<Auxiliary> {
        self.auxiliary.get_or_init(|| Arc::new(Auxiliary::new()))
    }

    /// The auxiliary if one has been created
    pub fn existing_auxiliary(&self) -> Option<&Arc<Auxiliary>> {
        self.auxiliary.get()
    }
}

impl Default for ObjectBase {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloning an object never clones its identity: the copy starts unreferenced
/// and without properties.
impl Clone for ObjectBase {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ObjectBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBase")
            .field("ref_count", &self.reference_count())
            .field("auxiliary", &self.existing_auxiliary())
            .finish()
    }
}

/// Reference-counted base of every scene graph type
///
/// Implementations are normally generated by [`crate::inherit!`], which routes
/// the `accept*` entry points to the visitor overload for the exact leaf type.
/// `traverse*` default to "no children".
pub trait Object: Any + Send + Sync {
    /// The embedded reference-count header
    fn object_base(&self) -> &ObjectBase;

    /// Mutable access to the header, for values not yet behind a handle
    fn object_base_mut(&mut self) -> &mut ObjectBase;

    /// Name of the most derived type
    fn class_name(&self) -> &'static str;

    /// Size in bytes of the most derived type, as allocated
    fn size_of(&self) -> usize;

    /// Pool that instances are allocated from
    fn affinity(&self) -> AllocatorAffinity {
        AllocatorAffinity::Objects
    }

    /// Upcast for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Upcast to a plain object
    fn as_object(&self) -> &dyn Object;

    /// Dispatch to the mutable visitor's overload for this type
    fn accept(&self, visitor: &mut dyn Visitor);

    /// Dispatch to the read-only visitor's overload for this type
    fn accept_const(&self, visitor: &mut dyn ConstVisitor);

    /// Dispatch to the record traversal's overload for this type
    fn accept_record(&self, traversal: &mut RecordTraversal<'_>);

    /// Visit children with a mutable visitor
    fn traverse(&self, _visitor: &mut dyn Visitor) {}

    /// Visit children with a read-only visitor
    fn traverse_const(&self, _visitor: &mut dyn ConstVisitor) {}

    /// Visit children with the record traversal
    fn traverse_record(&self, _traversal: &mut RecordTraversal<'_>) {}
}

impl dyn Object {
    /// Downcast to a concrete type
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Whether the object is a `T`
    pub fn is<T: Object>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Dynamic keyed properties, available on every object
///
/// Values are themselves objects. `set_*` creates the auxiliary on first use;
/// lookups on an object without one return `None` without creating it.
pub trait Properties {
    /// Insert or overwrite a property, returning the value it replaced
    fn set_object(&self, key: impl Into<ObjectKey>, value: RefPtr<dyn Object>) -> Option<RefPtr<dyn Object>>;

    /// Look up a property
    fn get_object(&self, key: impl Into<ObjectKey>) -> Option<RefPtr<dyn Object>>;

    /// Remove a property
    fn remove_object(&self, key: impl Into<ObjectKey>) -> Option<RefPtr<dyn Object>>;

    /// Store `value` boxed in a [`Value`] object
    fn set_value<T>(&self, key: impl Into<ObjectKey>, value: T)
    where
        T: std::fmt::Debug + Send + Sync + 'static;

    /// Read back a value stored with [`Properties::set_value`]
    ///
    /// Returns `None` when the key is absent or holds a different type.
    fn get_value<T>(&self, key: impl Into<ObjectKey>) -> Option<T>
    where
        T: Clone + std::fmt::Debug + Send + Sync + 'static;

    /// Number of properties
    fn property_count(&self) -> usize;

    /// Snapshot of every property in key order
    fn properties(&self) -> Vec<(ObjectKey, RefPtr<dyn Object>)>;
}

impl<O: ?Sized + Object> Properties for O {
    fn set_object(&self, key: impl Into<ObjectKey>, value: RefPtr<dyn Object>) -> Option<RefPtr<dyn Object>> {
        self.object_base().auxiliary().set_object(key.into(), value)
    }

    fn get_object(&self, key: impl Into<ObjectKey>) -> Option<RefPtr<dyn Object>> {
        self.object_base().existing_auxiliary()?.get_object(&key.into())
    }

    fn remove_object(&self, key: impl Into<ObjectKey>) -> Option<RefPtr<dyn Object>> {
        self.object_base().existing_auxiliary()?.remove_object(&key.into())
    }

    fn set_value<T>(&self, key: impl Into<ObjectKey>, value: T)
    where
        T: std::fmt::Debug + Send + Sync + 'static,
    {
        self.set_object(key, RefPtr::new(Value::new(value)).into_object());
    }

    fn get_value<T>(&self, key: impl Into<ObjectKey>) -> Option<T>
    where
        T: Clone + std::fmt::Debug + Send + Sync + 'static,
    {
        let object = self.get_object(key)?;
        object.downcast_ref::<Value<T>>().map(|value| value.value().clone())
    }

    fn property_count(&self) -> usize {
        self.object_base()
            .existing_auxiliary()
            .map_or(0, |auxiliary| auxiliary.property_count())
    }

    fn properties(&self) -> Vec<(ObjectKey, RefPtr<dyn Object>)> {
        self.object_base()
            .existing_auxiliary()
            .map(|auxiliary| auxiliary.properties())
            .unwrap_or_default()
    }
}
