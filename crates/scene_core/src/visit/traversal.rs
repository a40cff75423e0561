//! Shared child-walking helpers
//!
//! Node types implement child traversal once, generically over
//! [`Traversal`], and the [`crate::inherit!`] macro instantiates it for the
//! mutable visitor, the read-only visitor and the record traversal.

use crate::object::{Object, RefPtr};
use crate::render::RecordTraversal;
use crate::visit::{ConstVisitor, Mask, Visitor};

/// A traversal that children can be handed to
pub trait Traversal {
    /// Route `object` to this traversal's overload for its leaf type
    fn dispatch<O: ?Sized + Object>(&mut self, object: &O);

    /// Whether a child tagged with `mask` is entered
    fn is_enabled(&self, mask: Mask) -> bool;
}

impl Traversal for dyn Visitor + '_ {
    fn dispatch<O: ?Sized + Object>(&mut self, object: &O) {
        object.accept(self);
    }

    fn is_enabled(&self, mask: Mask) -> bool {
        self.traversal_mask().admits(self.override_mask(), mask)
    }
}

impl Traversal for dyn ConstVisitor + '_ {
    fn dispatch<O: ?Sized + Object>(&mut self, object: &O) {
        object.accept_const(self);
    }

    fn is_enabled(&self, mask: Mask) -> bool {
        self.traversal_mask().admits(self.override_mask(), mask)
    }
}

impl Traversal for RecordTraversal<'_> {
    fn dispatch<O: ?Sized + Object>(&mut self, object: &O) {
        object.accept_record(self);
    }

    fn is_enabled(&self, mask: Mask) -> bool {
        self.traversal_mask.admits(self.override_mask, mask)
    }
}

/// Visit a list of children in order
pub fn traverse_children<C, V>(children: &[RefPtr<C>], visitor: &mut V)
where
    C: ?Sized + Object,
    V: Traversal + ?Sized,
{
    for child in children {
        visitor.dispatch(&**child);
    }
}

/// Visit a fixed number of optional children in slot order
pub fn traverse_array<C, V, const N: usize>(children: &[Option<RefPtr<C>>; N], visitor: &mut V)
where
    C: ?Sized + Object,
    V: Traversal + ?Sized,
{
    for child in children.iter().flatten() {
        visitor.dispatch(&**child);
    }
}

/// Visit a single optional child
pub fn traverse_single<C, V>(child: Option<&RefPtr<C>>, visitor: &mut V)
where
    C: ?Sized + Object,
    V: Traversal + ?Sized,
{
    if let Some(child) = child {
        visitor.dispatch(&**child);
    }
}

/// Run a default-constructed read-only visitor over `object` and return it
pub fn visit<V, O>(object: &O) -> V
where
    V: ConstVisitor + Default,
    O: ?Sized + Object,
{
    let mut visitor = V::default();
    object.accept_const(&mut visitor);
    visitor
}
