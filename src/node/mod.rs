//! Arena-backed DOM used by the deserializer.
//!
//! Every conversion owns a fresh [`DomTree`]; nodes are addressed by
//! [`NodeId`] handles into that arena, so preprocessing and rules can
//! insert, detach and clone nodes while the walker holds only handles.
//!
//! # Key Features
//!
//! - Four node kinds: document, element, text, comment
//! - Parent links and sibling navigation
//! - Detached nodes stay in the arena until the tree is dropped

mod document;
mod element;
mod text;

pub use document::{Descendants, DomTree};
pub use element::Element;
pub use text::Text;

use smallvec::SmallVec;

/// Handle to a node inside one [`DomTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a handle from its raw arena index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw arena index.
    #[inline]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of a DOM node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    Comment,
}

/// Payload of a DOM node.
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element(Element),
    Text(Text),
    Comment(String),
}

impl NodeData {
    /// Kind of this payload.
    #[inline]
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Document => NodeKind::Document,
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
        }
    }

    /// Get as element reference.
    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get as mutable element reference.
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get as text reference.
    #[inline]
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Child handle list.
pub type Children = SmallVec<[NodeId; 8]>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId, NodeId) {
        let mut dom = DomTree::new();
        let body = dom.body();
        let p = dom.create_element("p");
        dom.append_child(body, p);
        let text = dom.create_text("Hello ");
        dom.append_child(p, text);
        let b = dom.create_element("b");
        dom.append_child(p, b);
        let inner = dom.create_text("world");
        dom.append_child(b, inner);
        (dom, p, b)
    }

    #[test]
    fn test_new_tree_has_html_skeleton() {
        let dom = DomTree::new();
        let body = dom.body();
        assert_eq!(dom.tag(body), "body");
        let html = dom.parent(body).unwrap();
        assert_eq!(dom.tag(html), "html");
        assert_eq!(dom.parent(html), Some(dom.root()));
        assert_eq!(dom.kind(dom.root()), NodeKind::Document);
    }

    #[test]
    fn test_text_content_and_tags() {
        let (dom, p, b) = sample();
        assert_eq!(dom.text_content(p), "Hello world");
        assert_eq!(dom.tag(p), "p");
        let text = dom.first_child(p).unwrap();
        assert_eq!(dom.tag(text), "");
        assert_eq!(dom.kind(text), NodeKind::Text);
        assert_eq!(dom.next_sibling(text), Some(b));
        assert_eq!(dom.prev_sibling(b), Some(text));
        assert_eq!(dom.next_sibling(b), None);
    }

    #[test]
    fn test_replace_with_and_unwrap() {
        let (mut dom, p, b) = sample();
        dom.unwrap_node(b);
        assert_eq!(dom.children(p).len(), 2);
        assert!(dom.children(p).iter().all(|&c| dom.kind(c) == NodeKind::Text));
        assert_eq!(dom.parent(b), None);
        assert_eq!(dom.text_content(p), "Hello world");
    }

    #[test]
    fn test_deep_clone_is_detached_copy() {
        let (mut dom, p, _) = sample();
        let copy = dom.deep_clone(p);
        assert_ne!(copy, p);
        assert_eq!(dom.parent(copy), None);
        assert_eq!(dom.text_content(copy), "Hello world");

        // Mutating the clone leaves the original alone
        let first = dom.first_child(copy).unwrap();
        dom.set_text(first, "Bye ");
        assert_eq!(dom.text_content(p), "Hello world");
        assert_eq!(dom.text_content(copy), "Bye world");
    }

    #[test]
    fn test_find_all_and_descendants() {
        let (dom, p, b) = sample();
        let found = dom.find_all(dom.root(), |dom, id| dom.tag(id) == "b");
        assert_eq!(found, vec![b]);

        let tags: Vec<_> = dom.descendants(p).map(|id| dom.tag(id).to_string()).collect();
        assert_eq!(tags, vec!["p", "", "b", ""]);
    }

    #[test]
    fn test_append_moves_existing_child() {
        let (mut dom, p, b) = sample();
        let body = dom.body();
        dom.append_child(body, b);
        assert_eq!(dom.parent(b), Some(body));
        assert_eq!(dom.children(p).len(), 1);
        assert_eq!(dom.children(body), &[p, b]);
    }
}
