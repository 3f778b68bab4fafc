//! Element payload: tag name plus attributes.

use compact_str::CompactString;

use crate::attr::Attrs;

/// HTML element payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name
    pub tag: CompactString,
    /// Element attributes
    pub attrs: Attrs,
}

impl Element {
    /// Create an element without attributes; the tag is lowercased
    pub fn new(tag: &str) -> Self {
        Self {
            tag: CompactString::from(tag.to_ascii_lowercase()),
            attrs: Attrs::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.set(name, value);
        self
    }

    /// Check the tag name
    #[inline]
    pub fn is(&self, tag: &str) -> bool {
        self.tag.as_str() == tag
    }

    /// Value of the `style` attribute, empty if absent
    pub fn style(&self) -> &str {
        self.attrs.get("style").unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_basics() {
        let elem = Element::new("SPAN").attr("style", "font-weight:700");
        assert!(elem.is("span"));
        assert_eq!(elem.style(), "font-weight:700");
        assert_eq!(Element::new("p").style(), "");
    }
}
