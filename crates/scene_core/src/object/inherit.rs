//! Per-leaf dispatch glue
//!
//! Every concrete type implements [`crate::object::Object`] the same way: the
//! `accept*` entry points call the visitor overload named for the leaf, so
//! overload selection happens once per leaf type at compile time instead of
//! in every visitor. The macro writes that boilerplate.
//!
//! ```text
//! node.accept(visitor)          // virtual: Object vtable of the leaf
//!   └─► visitor.apply_group(g)  // static: overload named in inherit!
//!         └─► apply_node(g)     // default forwards to the parent category
//!               └─► apply_object(g)
//! ```

/// Implement [`crate::object::Object`] for a leaf type.
///
/// The leaf must have a field `base: ObjectBase`.
///
/// ```ignore
/// inherit!(Group => apply_group, traverse = t_traverse, affinity = Nodes);
/// inherit!(impl[T: Pod + Send + Sync] Array<T> => apply_data);
/// ```
///
/// - `=> apply_x` names the overload on `Visitor`, `ConstVisitor` and
///   `RecordTraversal` that receives the leaf.
/// - `traverse = m` routes the three `traverse*` methods to a generic
///   `fn m<V: Traversal + ?Sized>(&self, visitor: &mut V)` on the leaf.
/// - `affinity = A` picks the allocator pool (default `Objects`).
#[macro_export]
macro_rules! inherit {
    (@object [$($generics:tt)*] [$leaf:ty] [$name:expr] [$apply:ident] [$($traverse:ident)?] [$($affinity:ident)?]) => {
        impl<$($generics)*> $crate::object::Object for $leaf {
            fn object_base(&self) -> &$crate::object::ObjectBase {
                &self.base
            }

            fn object_base_mut(&mut self) -> &mut $crate::object::ObjectBase {
                &mut self.base
            }

            fn class_name(&self) -> &'static str {
                $name
            }

            fn size_of(&self) -> usize {
                ::std::mem::size_of::<Self>()
            }

            $(
                fn affinity(&self) -> $crate::memory::AllocatorAffinity {
                    $crate::memory::AllocatorAffinity::$affinity
                }
            )?

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_object(&self) -> &dyn $crate::object::Object {
                self
            }

            fn accept(&self, visitor: &mut dyn $crate::visit::Visitor) {
                visitor.$apply(self);
            }

            fn accept_const(&self, visitor: &mut dyn $crate::visit::ConstVisitor) {
                visitor.$apply(self);
            }

            fn accept_record(&self, traversal: &mut $crate::render::RecordTraversal<'_>) {
                traversal.$apply(self);
            }

            $(
                fn traverse(&self, visitor: &mut dyn $crate::visit::Visitor) {
                    self.$traverse(visitor);
                }

                fn traverse_const(&self, visitor: &mut dyn $crate::visit::ConstVisitor) {
                    self.$traverse(visitor);
                }

                fn traverse_record(&self, traversal: &mut $crate::render::RecordTraversal<'_>) {
                    self.$traverse(traversal);
                }
            )?
        }
    };

    (impl[$($generics:tt)*] $leaf:ty => $apply:ident $(, traverse = $traverse:ident)? $(, affinity = $affinity:ident)? $(,)?) => {
        $crate::inherit!(
            @object [$($generics)*] [$leaf] [::std::any::type_name::<Self>()] [$apply] [$($traverse)?] [$($affinity)?]
        );
    };

    ($leaf:ty => $apply:ident $(, traverse = $traverse:ident)? $(, affinity = $affinity:ident)? $(,)?) => {
        $crate::inherit!(
            @object [] [$leaf] [stringify!($leaf)] [$apply] [$($traverse)?] [$($affinity)?]
        );
    };
}
