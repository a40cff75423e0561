//! # Object Model
//!
//! Intrusively reference-counted objects, weak observers and dynamic
//! properties.
//!
//! ```text
//! RefPtr<T> ──owns──► T { base: ObjectBase { ref_count, auxiliary ─┐ }, .. }
//!                                                                  │ (lazy)
//! ObserverPtr<T> ──Arc──► Auxiliary { connected ◄──────────────────┘,
//!                                     properties: ObjectKey -> RefPtr<dyn Object> }
//! ```
//!
//! ## Organization
//!
//! - **Base**: `Object` trait, `ObjectBase` header and the `Properties` API
//! - **Auxiliary**: weak back-reference and property map
//! - **Handles**: `RefPtr` (owning) and `ObserverPtr` (weak)
//! - **Values**: `Value<T>` boxes for property payloads
//! - **Inherit**: the `inherit!` macro implementing `Object` for leaf types

pub mod auxiliary;
pub mod base;
pub mod inherit;
pub mod key;
pub mod observer_ptr;
pub mod ref_ptr;
pub mod value;

pub use auxiliary::Auxiliary;
pub use base::{Object, ObjectBase, Properties};
pub use key::ObjectKey;
pub use observer_ptr::ObserverPtr;
pub use ref_ptr::{RefMut, RefPtr};
pub use value::{
    BoolValue, DoubleValue, FloatValue, IntValue, StringValue, UIntValue, Value, ValueObject,
};
