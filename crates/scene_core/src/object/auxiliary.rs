//! Side table attached to an object on demand
//!
//! The [`Auxiliary`] carries two things an object only sometimes needs: the
//! weak back-reference used by [`super::ObserverPtr`] and the keyed property
//! map. It is reference counted separately from its object (through `Arc`)
//! so observers can outlive the object they watch.
//!
//! ## Promotion protocol
//!
//! ```text
//! observer (lock)                        owner (last unref)
//! ───────────────                        ──────────────────
//! pins += 1              (SeqCst)        count 1 -> 0
//! p = connected          (SeqCst)        connected = null   (SeqCst)
//! if p: count += 1 if count != 0         wait until pins == 0
//! pins -= 1              (Release)       drop + deallocate
//! ```
//!
//! Either the observer reads `connected` before the owner clears it, in which
//! case the owner sees the pin and waits before freeing, or it reads null. An
//! observer that wins the race against a count that already hit zero fails
//! the non-zero increment and reports an expired target.
//!
//! The owner's wait is the only place the object model waits on another
//! thread. A pin covers three atomic operations and never a lock or a call
//! into user code, so the owner spins briefly, then yields, and the wait is
//! bounded by the number of observers caught mid-promotion.

use std::collections::BTreeMap;
use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::object::{Object, ObjectBase, ObjectKey, RefPtr};

/// Weak back-reference and dynamic property store of one object
pub struct Auxiliary {
    connected: AtomicPtr<ObjectBase>,
    pins: AtomicUsize,
    properties: Mutex<BTreeMap<ObjectKey, RefPtr<dyn Object>>>,
}

impl Auxiliary {
    pub(crate) fn new() -> Self {
        Self {
            connected: AtomicPtr::new(ptr::null_mut()),
            pins: AtomicUsize::new(0),
            properties: Mutex::new(BTreeMap::new()),
        }
    }

    /// Whether the owning object is still reachable through observers
    pub fn is_connected(&self) -> bool {
        !self.connected.load(Ordering::Acquire).is_null()
    }

    /// Publish `base` as the live object behind this auxiliary.
    ///
    /// The object must be heap-pinned for as long as it stays connected.
    pub(crate) fn connect(&self, base: &ObjectBase) {
        let target = ptr::from_ref(base).cast_mut();
        if let Err(current) =
            self.connected
                .compare_exchange(ptr::null_mut(), target, Ordering::SeqCst, Ordering::SeqCst)
        {
            debug_assert_eq!(current, target, "auxiliary connected to a different object");
        }
    }

    /// Clear the back-reference and wait out in-flight promotions.
    ///
    /// Runs on the thread that dropped the last reference, before the object
    /// is destroyed. Properties are released here so values do not outlive
    /// their owner just because an observer keeps the auxiliary alive.
    pub(crate) fn disconnect(&self) {
        self.connected.store(ptr::null_mut(), Ordering::SeqCst);

        let mut spins = 0u32;
        while self.pins.load(Ordering::SeqCst) != 0 {
            if spins < 64 {
                std::hint::spin_loop();
                spins += 1;
            } else {
                std::thread::yield_now();
            }
        }

        let properties = std::mem::take(&mut *self.properties.lock());
        drop(properties);
    }

    /// Take a strong reference on the connected object if it is still alive.
    pub(crate) fn retain_connected(&self) -> bool {
        self.pins.fetch_add(1, Ordering::SeqCst);
        let base = self.connected.load(Ordering::SeqCst);

        // SAFETY: a non-null `connected` read while pinned points at an object
        // whose owner has not passed `disconnect`, so its memory is still live.
        let retained = !base.is_null() && unsafe { (*base).try_add_ref() };

        self.pins.fetch_sub(1, Ordering::Release);
        retained
    }

    /// Insert or overwrite a property, returning the previous value
    pub fn set_object(&self, key: ObjectKey, value: RefPtr<dyn Object>) -> Option<RefPtr<dyn Object>> {
        self.properties.lock().insert(key, value)
    }

    /// Look up a property
    pub fn get_object(&self, key: &ObjectKey) -> Option<RefPtr<dyn Object>> {
        self.properties.lock().get(key).cloned()
    }

    /// Remove a property, returning it
    pub fn remove_object(&self, key: &ObjectKey) -> Option<RefPtr<dyn Object>> {
        self.properties.lock().remove(key)
    }

    /// Number of properties
    pub fn property_count(&self) -> usize {
        self.properties.lock().len()
    }

    /// Snapshot of every property in key order
    pub fn properties(&self) -> Vec<(ObjectKey, RefPtr<dyn Object>)> {
        self.properties
            .lock()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl std::fmt::Debug for Auxiliary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auxiliary")
            .field("connected", &self.is_connected())
            .field("properties", &self.property_count())
            .finish()
    }
}
