//! Composite property key

use std::fmt;

/// Key of a dynamic property: a name plus an index
///
/// Both parts take part in ordering and equality, so `("uv", 0)` and
/// `("uv", 1)` address independent entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    /// Property name
    pub name: String,
    /// Index distinguishing properties that share a name
    pub index: u32,
}

impl ObjectKey {
    /// Create a key from a name and index
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

impl From<&str> for ObjectKey {
    fn from(name: &str) -> Self {
        Self::new(name, 0)
    }
}

impl From<String> for ObjectKey {
    fn from(name: String) -> Self {
        Self::new(name, 0)
    }
}

impl From<(&str, u32)> for ObjectKey {
    fn from((name, index): (&str, u32)) -> Self {
        Self::new(name, index)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_index_both_distinguish() {
        assert_eq!(ObjectKey::from("x"), ObjectKey::new("x", 0));
        assert_ne!(ObjectKey::from(("x", 0)), ObjectKey::from(("x", 1)));
        assert_ne!(ObjectKey::from("x"), ObjectKey::from("y"));
        assert!(ObjectKey::from(("a", 5)) < ObjectKey::from(("b", 0)));
        assert_eq!(ObjectKey::from(("uv", 2)).to_string(), "uv[2]");
    }
}
