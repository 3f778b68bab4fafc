//! Attribute storage for DOM elements
//!
//! Attributes keep source order. Lookups are linear: elements rarely carry
//! more than a handful of attributes, so a small inline vector beats a map.

use compact_str::CompactString;
use smallvec::SmallVec;

/// Element attributes as ordered name/value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs(SmallVec<[(CompactString, String); 4]>);

impl Attrs {
    /// Create an empty attribute list
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Get an attribute value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Check if an attribute exists
    pub fn has(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k.as_str() == name)
    }

    /// Set an attribute value (insert or update)
    pub fn set(&mut self, name: impl Into<CompactString>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(attr) = self.0.iter_mut().find(|(k, _)| *k == name) {
            attr.1 = value;
        } else {
            self.0.push((name, value));
        }
    }

    /// Remove an attribute by name, returning the old value if present
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0
            .iter()
            .position(|(k, _)| k.as_str() == name)
            .map(|pos| self.0.remove(pos).1)
    }

    /// Whitespace-separated entries of the `class` attribute
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.get("class").unwrap_or_default().split_ascii_whitespace()
    }

    /// Check if the `class` attribute contains `class_name`
    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes().any(|c| c == class_name)
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no attributes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in source order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Attrs
where
    K: Into<CompactString>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attrs::new();
        for (k, v) in iter {
            attrs.set(k, v);
        }
        attrs
    }
}

// =============================================================================
// Tests
// =============================================================================
