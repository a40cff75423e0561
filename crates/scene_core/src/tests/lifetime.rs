//! Reference counting and weak promotion

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use parking_lot::Mutex;

use crate::inherit;
use crate::nodes::Node;
use crate::object::{Object, ObjectBase, ObserverPtr, Properties, RefPtr};

/// Node that counts how many times it has been dropped
struct Tracked {
    base: ObjectBase,
    drops: Arc<AtomicUsize>,
    payload: [u64; 8],
}

impl Tracked {
    fn new(drops: &Arc<AtomicUsize>) -> Self {
        Self {
            base: ObjectBase::new(),
            drops: Arc::clone(drops),
            payload: [0xA5A5_A5A5_A5A5_A5A5; 8],
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        assert!(self.payload.iter().all(|&word| word == 0xA5A5_A5A5_A5A5_A5A5));
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

inherit!(Tracked => apply_node, affinity = Nodes);

impl Node for Tracked {}

#[test]
fn test_n_refs_then_n_unrefs_destroy_exactly_once() {
    for n in [1u32, 2, 5, 64] {
        let drops = Arc::new(AtomicUsize::new(0));
        let raw = RefPtr::into_raw(RefPtr::new(Tracked::new(&drops)));

        for _ in 1..n {
            unsafe { RefPtr::increment_ref_count(raw) };
        }
        assert_eq!(unsafe { (*raw).object_base().reference_count() }, n);

        for remaining in (1..n).rev() {
            unsafe { RefPtr::decrement_ref_count(raw) };
            assert_eq!(drops.load(Ordering::SeqCst), 0, "destroyed with {remaining} references left");
        }
        unsafe { RefPtr::decrement_ref_count(raw) };
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn test_clones_share_one_object() {
    let drops = Arc::new(AtomicUsize::new(0));
    let first = RefPtr::new(Tracked::new(&drops));
    let clones: Vec<_> = (0..10).map(|_| first.clone()).collect();

    assert_eq!(RefPtr::reference_count(&first), 11);
    assert!(clones.iter().all(|clone| RefPtr::ptr_eq(clone, &first)));

    drop(clones);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    drop(first);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_replacing_value_through_unique_handle() {
    let old_drops = Arc::new(AtomicUsize::new(0));
    let new_drops = Arc::new(AtomicUsize::new(0));
    let mut handle = RefPtr::new(Tracked::new(&old_drops));

    {
        let mut slot = RefPtr::get_mut(&mut handle).expect("unique handle");
        drop(std::mem::replace(&mut *slot, Tracked::new(&new_drops)));
        assert_eq!(old_drops.load(Ordering::SeqCst), 1);
    }
    assert_eq!(RefPtr::reference_count(&handle), 1);

    {
        let mut slot = RefPtr::get_mut(&mut handle).expect("still unique");
        *slot = Tracked::new(&new_drops);
    }
    assert_eq!(new_drops.load(Ordering::SeqCst), 1);
    assert_eq!(RefPtr::reference_count(&handle), 1);

    drop(handle);
    assert_eq!(old_drops.load(Ordering::SeqCst), 1);
    assert_eq!(new_drops.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unref_nodelete_never_destroys() {
    let drops = Arc::new(AtomicUsize::new(0));
    let embedded = Tracked::new(&drops);

    embedded.object_base().add_ref();
    embedded.object_base().add_ref();
    unsafe {
        embedded.object_base().unref_nodelete();
        embedded.object_base().unref_nodelete();
    }
    assert_eq!(embedded.object_base().reference_count(), 0);
    assert_eq!(drops.load(Ordering::SeqCst), 0);

    drop(embedded);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_upcasts_keep_the_count() {
    let drops = Arc::new(AtomicUsize::new(0));
    let tracked = RefPtr::new(Tracked::new(&drops));
    let node = tracked.clone().into_node();
    let object = node.clone().into_object();

    assert_eq!(RefPtr::reference_count(&tracked), 3);
    assert_eq!(object.class_name(), "Tracked");

    let back = object.downcast::<Tracked>().expect("same type");
    assert!(std::ptr::eq(&*back, &*tracked));
    drop((tracked, node, back));
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_downcast_mismatch_returns_handle() {
    let leaf = RefPtr::new(crate::nodes::Leaf::new()).into_object();
    let leaf = leaf.downcast::<crate::nodes::Group>().expect_err("not a group");
    assert!(leaf.is::<crate::nodes::Leaf>());
}

#[test]
fn test_observer_of_destroyed_object_is_empty() {
    let drops = Arc::new(AtomicUsize::new(0));
    let target = RefPtr::new(Tracked::new(&drops));
    let observer = ObserverPtr::new(&target);
    target.set_value("weight", 2.0f32);

    drop(target);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert!(observer.lock().is_none());
    assert!(!observer.is_valid());
}

#[test]
fn test_concurrent_promotion_against_destruction() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 200;

    for _ in 0..ROUNDS {
        let drops = Arc::new(AtomicUsize::new(0));
        let target = RefPtr::new(Tracked::new(&drops));
        let observer = ObserverPtr::new(&target);
        let barrier = Arc::new(Barrier::new(THREADS + 1));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let observer = observer.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let mut promoted = 0usize;
                    for _ in 0..50 {
                        if let Some(strong) = observer.lock() {
                            // Reading through a promoted handle must see a live object.
                            assert_eq!(strong.payload[7], 0xA5A5_A5A5_A5A5_A5A5);
                            promoted += 1;
                        }
                    }
                    promoted
                })
            })
            .collect();

        barrier.wait();
        drop(target);

        for handle in handles {
            handle.join().expect("promotion thread panicked");
        }

        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert!(observer.lock().is_none());
    }
}

#[test]
fn test_observer_breaks_cycle() {
    struct Owner {
        base: ObjectBase,
        child: Mutex<Option<RefPtr<Child>>>,
    }
    struct Child {
        base: ObjectBase,
        owner: ObserverPtr<Owner>,
    }
    inherit!(Owner => apply_object);
    inherit!(Child => apply_object);

    let owner = RefPtr::new(Owner {
        base: ObjectBase::new(),
        child: Mutex::new(None),
    });
    let child = RefPtr::new(Child {
        base: ObjectBase::new(),
        owner: ObserverPtr::new(&owner),
    });
    *owner.child.lock() = Some(child.clone());
    let weak_child = ObserverPtr::new(&child);
    drop(child);

    let observed = weak_child.lock().expect("kept alive by its owner");
    assert!(observed.owner.lock().is_some());
    assert_eq!(RefPtr::reference_count(&owner), 1);
    drop(observed);

    drop(owner);
    assert!(weak_child.lock().is_none());
}
