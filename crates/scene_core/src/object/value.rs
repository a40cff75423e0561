//! Typed property values boxed as objects

use std::any::Any;
use std::fmt;

use crate::object::{Object, ObjectBase};

/// Object category for boxed property values
///
/// Visitors see every [`Value`] through `apply_value`, whatever `T` is.
pub trait ValueObject: Object {
    /// The wrapped value
    fn value_any(&self) -> &dyn Any;

    /// Name of the wrapped type
    fn value_type_name(&self) -> &'static str;

    /// Debug rendering of the wrapped value
    fn value_debug(&self) -> String;
}

/// Object holding a single value of type `T`
#[derive(Clone, Default)]
pub struct Value<T> {
    base: ObjectBase,
    value: T,
}

impl<T> Value<T> {
    /// Wrap `value`
    pub fn new(value: T) -> Self {
        Self {
            base: ObjectBase::new(),
            value,
        }
    }

    /// The wrapped value
    pub fn value(&self) -> &T {
        &self.value
    }

    /// The wrapped value, mutably
    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Unwrap the value
    pub fn into_inner(self) -> T {
        self.value
    }
}

crate::inherit!(impl[T: fmt::Debug + Send + Sync + 'static] Value<T> => apply_value);

impl<T: fmt::Debug + Send + Sync + 'static> ValueObject for Value<T> {
    fn value_any(&self) -> &dyn Any {
        &self.value
    }

    fn value_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn value_debug(&self) -> String {
        format!("{:?}", self.value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Value").field(&self.value).finish()
    }
}

/// Boxed `i32`
pub type IntValue = Value<i32>;
/// Boxed `u32`
pub type UIntValue = Value<u32>;
/// Boxed `f32`
pub type FloatValue = Value<f32>;
/// Boxed `f64`
pub type DoubleValue = Value<f64>;
/// Boxed `bool`
pub type BoolValue = Value<bool>;
/// Boxed `String`
pub type StringValue = Value<String>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Properties, RefPtr};
    use crate::visit::ConstVisitor;

    #[derive(Default)]
    struct ValueCollector {
        seen: Vec<String>,
    }

    impl ConstVisitor for ValueCollector {
        fn apply_value(&mut self, value: &dyn ValueObject) {
            self.seen.push(format!("{}={}", value.value_type_name(), value.value_debug()));
        }
    }

    #[test]
    fn test_values_dispatch_to_apply_value() {
        let int = RefPtr::new(IntValue::new(3));
        let text = RefPtr::new(StringValue::new("name".to_string()));

        let mut collector = ValueCollector::default();
        int.accept_const(&mut collector);
        text.accept_const(&mut collector);

        assert_eq!(collector.seen.len(), 2);
        assert_eq!(collector.seen[0], "i32=3");
        assert!(collector.seen[1].ends_with("String=\"name\""));
    }

    #[test]
    fn test_value_class_name_includes_type() {
        let value = FloatValue::new(1.5);
        assert!(value.class_name().contains("Value<f32>"));
        assert_eq!(value.size_of(), std::mem::size_of::<FloatValue>());
    }

    #[test]
    fn test_values_can_carry_properties() {
        let value = RefPtr::new(BoolValue::new(true));
        value.set_value("units", "none".to_string());
        assert_eq!(value.get_value::<String>("units").as_deref(), Some("none"));
        assert!(*value.value());
    }
}
