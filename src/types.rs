//! Rich-text object model produced by the deserializer.
//!
//! Final output is a flat `Vec<Block>`. While the walker runs, the tree also
//! holds transient variants (placeholders and hoisted blocks) that are
//! resolved away before normalization finishes.
//!
//! Serialization follows the Portable Text JSON shape (`_type`, `_key`,
//! `markDefs`, `listItem`).

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

/// Style assigned to blocks when no specific style applies.
pub const DEFAULT_STYLE: &str = "normal";

/// Style of blockquote blocks.
pub const QUOTE_STYLE: &str = "quote";

/// Annotation type produced for hyperlinks.
pub const LINK_ANNOTATION: &str = "link";

// =============================================================================
// TypedObject
// =============================================================================

/// Node of the rich-text tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedObject {
    Block(Block),
    Span(Span),
    InlineObject(InlineObject),
    /// Applies a decorator to every span below it; transient
    Decorator(PlaceholderDecorator),
    /// Applies an annotation to every span below it; transient
    Annotation(PlaceholderAnnotation),
    /// Block that must be lifted to the top level as-is; transient
    Hoisted(Box<Block>),
}

impl TypedObject {
    /// Short name of the variant, used in logs and errors
    pub fn type_name(&self) -> &str {
        match self {
            TypedObject::Block(_) => "block",
            TypedObject::Span(_) => "span",
            TypedObject::InlineObject(o) => &o.type_name,
            TypedObject::Decorator(_) => "__decorator",
            TypedObject::Annotation(_) => "__annotation",
            TypedObject::Hoisted(_) => "__block",
        }
    }

    #[inline]
    pub fn as_span(&self) -> Option<&Span> {
        match self {
            TypedObject::Span(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_span_mut(&mut self) -> Option<&mut Span> {
        match self {
            TypedObject::Span(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            TypedObject::Block(b) => Some(b),
            _ => None,
        }
    }

    #[inline]
    pub fn is_span(&self) -> bool {
        matches!(self, TypedObject::Span(_))
    }

    /// Whether this node is a placeholder that still needs resolving
    #[inline]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, TypedObject::Decorator(_) | TypedObject::Annotation(_))
    }

    /// Child list for variants that carry one
    pub fn children_mut(&mut self) -> Option<&mut Vec<TypedObject>> {
        match self {
            TypedObject::Block(b) => Some(&mut b.children),
            TypedObject::Hoisted(b) => Some(&mut b.children),
            TypedObject::Decorator(d) => Some(&mut d.children),
            TypedObject::Annotation(a) => Some(&mut a.children),
            TypedObject::Span(_) | TypedObject::InlineObject(_) => None,
        }
    }

    /// Check the object against the shape rules enforce on their output.
    ///
    /// Returns a description of the first problem found.
    pub fn shape_error(&self) -> Option<&'static str> {
        match self {
            TypedObject::Block(b) => b.shape_error(),
            TypedObject::Hoisted(b) => b.shape_error(),
            TypedObject::Span(_) => None,
            TypedObject::InlineObject(o) if o.type_name.is_empty() => {
                Some("inline object without a type name")
            }
            TypedObject::InlineObject(_) => None,
            TypedObject::Decorator(d) if d.mark_name.is_empty() => {
                Some("decorator placeholder without a mark name")
            }
            TypedObject::Decorator(d) => d.children.iter().find_map(TypedObject::shape_error),
            TypedObject::Annotation(a) => a
                .mark_def
                .shape_error()
                .or_else(|| a.children.iter().find_map(TypedObject::shape_error)),
        }
    }

    /// Serialize to Portable Text JSON
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<Block> for TypedObject {
    fn from(block: Block) -> Self {
        TypedObject::Block(block)
    }
}

impl From<Span> for TypedObject {
    fn from(span: Span) -> Self {
        TypedObject::Span(span)
    }
}

// =============================================================================
// Block
// =============================================================================

/// Paragraph-level unit of content
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub key: Option<String>,
    pub style: String,
    pub list_item: Option<String>,
    pub level: Option<u32>,
    pub mark_defs: Vec<MarkDef>,
    pub children: Vec<TypedObject>,
}

impl Default for Block {
    fn default() -> Self {
        Self::new(DEFAULT_STYLE)
    }
}

impl Block {
    /// Empty block with the given style
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            key: None,
            style: style.into(),
            list_item: None,
            level: None,
            mark_defs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// List item block at level 1
    pub fn list_item(list_item: impl Into<String>) -> Self {
        Self {
            list_item: Some(list_item.into()),
            level: Some(1),
            ..Self::default()
        }
    }

    /// Builder-style children setter
    pub fn with_children(mut self, children: Vec<TypedObject>) -> Self {
        self.children = children;
        self
    }

    /// Builder-style style setter
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Builder-style level setter
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    /// Whether this block is a list item
    pub fn is_list_item(&self) -> bool {
        self.list_item.is_some()
    }

    /// Iterate over span children
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.children.iter().filter_map(TypedObject::as_span)
    }

    /// Concatenated text of all span children
    pub fn plain_text(&self) -> String {
        self.spans().map(|s| s.text.as_str()).collect()
    }

    fn shape_error(&self) -> Option<&'static str> {
        if self.style.is_empty() {
            return Some("block without a style");
        }
        if self.level == Some(0) {
            return Some("list level must start at 1");
        }
        self.mark_defs
            .iter()
            .find_map(MarkDef::shape_error)
            .or_else(|| self.children.iter().find_map(TypedObject::shape_error))
    }
}

// =============================================================================
// Span / InlineObject / MarkDef
// =============================================================================

/// Run of text carrying mark references
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub key: Option<String>,
    pub text: String,
    pub marks: Vec<String>,
}

impl Span {
    /// Unmarked span
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            key: None,
            text: text.into(),
            marks: Vec::new(),
        }
    }

    /// Span with marks
    pub fn marked<I, S>(text: impl Into<String>, marks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: None,
            text: text.into(),
            marks: marks.into_iter().map(Into::into).collect(),
        }
    }
}

/// Non-text child of a block, such as an inline image
#[derive(Debug, Clone, PartialEq)]
pub struct InlineObject {
    pub key: Option<String>,
    pub type_name: String,
    pub payload: serde_json::Map<String, Value>,
}

impl InlineObject {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            key: None,
            type_name: type_name.into(),
            payload: serde_json::Map::new(),
        }
    }

    /// Builder-style payload field setter
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(name.to_string(), value.into());
        self
    }
}

/// Out-of-line annotation payload referenced by key from spans
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub type_name: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl MarkDef {
    pub fn new(key: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Link annotation pointing at `href`
    pub fn link(key: impl Into<String>, href: impl Into<String>) -> Self {
        Self::new(key, LINK_ANNOTATION).field("href", href.into())
    }

    /// Builder-style field setter
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// `href` of a link annotation
    pub fn href(&self) -> Option<&str> {
        self.fields.get("href").and_then(Value::as_str)
    }

    fn shape_error(&self) -> Option<&'static str> {
        if self.key.is_empty() {
            Some("mark definition without a key")
        } else if self.type_name.is_empty() {
            Some("mark definition without a type")
        } else {
            None
        }
    }
}

// =============================================================================
// Placeholders
// =============================================================================

/// Wraps content that should carry the decorator `mark_name`
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderDecorator {
    pub mark_name: String,
    pub children: Vec<TypedObject>,
}

/// Wraps content that should reference `mark_def`
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderAnnotation {
    pub mark_def: MarkDef,
    pub children: Vec<TypedObject>,
}

// =============================================================================
// Serialization
// =============================================================================

impl Serialize for TypedObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypedObject::Block(b) => b.serialize(serializer),
            TypedObject::Span(s) => s.serialize(serializer),
            TypedObject::InlineObject(o) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("_type", &o.type_name)?;
                if let Some(key) = &o.key {
                    map.serialize_entry("_key", key)?;
                }
                for (k, v) in &o.payload {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            TypedObject::Decorator(d) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("_type", "__decorator")?;
                map.serialize_entry("name", &d.mark_name)?;
                map.serialize_entry("children", &d.children)?;
                map.end()
            }
            TypedObject::Annotation(a) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("_type", "__annotation")?;
                map.serialize_entry("markDef", &a.mark_def)?;
                map.serialize_entry("children", &a.children)?;
                map.end()
            }
            TypedObject::Hoisted(b) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("_type", "__block")?;
                map.serialize_entry("block", b)?;
                map.end()
            }
        }
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("_type", "block")?;
        if let Some(key) = &self.key {
            map.serialize_entry("_key", key)?;
        }
        map.serialize_entry("style", &self.style)?;
        if let Some(list_item) = &self.list_item {
            map.serialize_entry("listItem", list_item)?;
        }
        if let Some(level) = self.level {
            map.serialize_entry("level", &level)?;
        }
        map.serialize_entry("markDefs", &self.mark_defs)?;
        map.serialize_entry("children", &self.children)?;
        map.end()
    }
}

impl Serialize for Span {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("_type", "span")?;
        if let Some(key) = &self.key {
            map.serialize_entry("_key", key)?;
        }
        map.serialize_entry("text", &self.text)?;
        map.serialize_entry("marks", &self.marks)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_serializes_as_portable_text() {
        let mut block = Block::list_item("bullet").with_children(vec![
            Span::new("Hello ").into(),
            Span::marked("world", ["strong", "k1"]).into(),
        ]);
        block.key = Some("abc".into());
        block.mark_defs.push(MarkDef::link("k1", "https://example.com"));

        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({
                "_type": "block",
                "_key": "abc",
                "style": "normal",
                "listItem": "bullet",
                "level": 1,
                "markDefs": [{"_key": "k1", "_type": "link", "href": "https://example.com"}],
                "children": [
                    {"_type": "span", "text": "Hello ", "marks": []},
                    {"_type": "span", "text": "world", "marks": ["strong", "k1"]}
                ]
            })
        );
    }

    #[test]
    fn test_inline_object_uses_its_type_name() {
        let image = InlineObject::new("image").field("src", "a.png");
        let value = TypedObject::InlineObject(image).to_json();
        assert_eq!(value, json!({"_type": "image", "src": "a.png"}));
    }

    #[test]
    fn test_shape_errors() {
        assert_eq!(TypedObject::from(Block::new("")).shape_error(), Some("block without a style"));
        assert_eq!(TypedObject::from(Block::default()).shape_error(), None);

        let annotation = TypedObject::Annotation(PlaceholderAnnotation {
            mark_def: MarkDef::new("", "link"),
            children: vec![],
        });
        assert_eq!(annotation.shape_error(), Some("mark definition without a key"));

        let nested = TypedObject::Decorator(PlaceholderDecorator {
            mark_name: "em".into(),
            children: vec![TypedObject::InlineObject(InlineObject::new(""))],
        });
        assert_eq!(nested.shape_error(), Some("inline object without a type name"));
    }

    #[test]
    fn test_plain_text_skips_inline_objects() {
        let block = Block::default().with_children(vec![
            Span::new("a").into(),
            TypedObject::InlineObject(InlineObject::new("image")),
            Span::new("b").into(),
        ]);
        assert_eq!(block.plain_text(), "ab");
        assert_eq!(block.spans().count(), 2);
    }
}
