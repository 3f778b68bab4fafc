//! DOM arena and its navigation / mutation API
//!
//! The root container for one conversion's tree, with query and traversal
//! helpers used by preprocessing and rules.

use crate::attr::Attrs;

use super::{Children, Element, NodeData, NodeId, NodeKind, Text};

// =============================================================================
// DomTree
// =============================================================================

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Children,
}

/// Arena-backed DOM tree
///
/// Handles stay valid for the lifetime of the tree, including handles to
/// detached nodes. Accessors panic on handles from a different tree; use
/// [`DomTree::contains`] to check foreign handles first.
#[derive(Debug, Clone)]
pub struct DomTree {
    slots: Vec<Slot>,
    root: NodeId,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree with an empty `html > (head, body)` skeleton
    pub fn new() -> Self {
        let mut dom = Self::empty();
        let html = dom.create_element("html");
        let head = dom.create_element("head");
        let body = dom.create_element("body");
        dom.append_child(dom.root, html);
        dom.append_child(html, head);
        dom.append_child(html, body);
        dom
    }

    /// Create a tree holding only a document node
    pub fn empty() -> Self {
        Self {
            slots: vec![Slot {
                data: NodeData::Document,
                parent: None,
                children: Children::new(),
            }],
            root: NodeId::from_raw(0),
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes ever allocated (attached or not)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// A tree always holds its document node
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check whether a handle belongs to this arena
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.slots.len()
    }

    #[inline]
    fn slot(&self, id: NodeId) -> &Slot {
        &self.slots[id.index()]
    }

    #[inline]
    fn slot_mut(&mut self, id: NodeId) -> &mut Slot {
        &mut self.slots[id.index()]
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId::from_raw(self.slots.len() as u32);
        self.slots.push(Slot {
            data,
            parent: None,
            children: Children::new(),
        });
        id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Node inspection
    // ─────────────────────────────────────────────────────────────────────────

    /// Node payload
    #[inline]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.slot(id).data
    }

    /// Node kind
    #[inline]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.slot(id).data.kind()
    }

    /// Lowercase tag name, empty for non-element nodes
    pub fn tag(&self, id: NodeId) -> &str {
        match &self.slot(id).data {
            NodeData::Element(e) => e.tag.as_str(),
            _ => "",
        }
    }

    /// Check whether `id` is an element with any of the given tags
    pub fn is_any(&self, id: NodeId, tags: &[&str]) -> bool {
        let tag = self.tag(id);
        !tag.is_empty() && tags.contains(&tag)
    }

    /// Element payload
    #[inline]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.slot(id).data.as_element()
    }

    /// Mutable element payload
    #[inline]
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.slot_mut(id).data.as_element_mut()
    }

    /// Attribute value of an element
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attrs.get(name))
    }

    /// Set an attribute; ignored for non-element nodes
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(e) = self.element_mut(id) {
            e.attrs.set(name, value);
        }
    }

    /// Direct text of a text node, or the content of a comment
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.slot(id).data {
            NodeData::Text(t) => Some(&t.content),
            NodeData::Comment(c) => Some(c),
            _ => None,
        }
    }

    /// Replace the content of a text node
    pub fn set_text(&mut self, id: NodeId, content: impl Into<String>) {
        if let NodeData::Text(t) = &mut self.slot_mut(id).data {
            t.content = content.into();
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut buf = String::new();
        self.collect_text(id, &mut buf);
        buf
    }

    fn collect_text(&self, id: NodeId, buf: &mut String) {
        match &self.slot(id).data {
            NodeData::Text(t) => buf.push_str(&t.content),
            NodeData::Comment(_) => {}
            _ => {
                for &child in &self.slot(id).children {
                    self.collect_text(child, buf);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────

    /// Parent node, `None` for the root and detached nodes
    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).parent
    }

    /// Child handles in document order
    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slot(id).children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    fn position(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let pos = self.children(parent).iter().position(|&c| c == id)?;
        Some((parent, pos))
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, pos) = self.position(id)?;
        pos.checked_sub(1).map(|p| self.children(parent)[p])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, pos) = self.position(id)?;
        self.children(parent).get(pos + 1).copied()
    }

    /// Nearest preceding sibling that is an element
    pub fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, pos) = self.position(id)?;
        self.children(parent)[..pos]
            .iter()
            .rev()
            .copied()
            .find(|&c| self.kind(c) == NodeKind::Element)
    }

    /// Nearest following sibling that is an element
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, pos) = self.position(id)?;
        self.children(parent)[pos + 1..]
            .iter()
            .copied()
            .find(|&c| self.kind(c) == NodeKind::Element)
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&p| self.parent(p))
    }

    /// Pre-order traversal of `id` and everything below it
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            dom: self,
            stack: vec![id],
        }
    }

    /// All nodes under `from` (inclusive) matching `predicate`, in document order
    pub fn find_all<F>(&self, from: NodeId, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&DomTree, NodeId) -> bool,
    {
        self.descendants(from).filter(|&id| predicate(self, id)).collect()
    }

    /// First node under `from` (inclusive) matching `predicate`
    pub fn find_first<F>(&self, from: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&DomTree, NodeId) -> bool,
    {
        self.descendants(from).find(|&id| predicate(self, id))
    }

    /// The `html` element, if present
    pub fn html(&self) -> Option<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|&c| self.tag(c) == "html")
    }

    /// The `head` element, if present
    pub fn head(&self) -> Option<NodeId> {
        let html = self.html()?;
        self.children(html).iter().copied().find(|&c| self.tag(c) == "head")
    }

    /// The `body` element, falling back to the document node
    pub fn body(&self) -> NodeId {
        self.html()
            .and_then(|html| {
                self.children(html)
                    .iter()
                    .copied()
                    .find(|&c| self.tag(c) == "body")
            })
            .unwrap_or(self.root)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Construction and mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Allocate a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element(Element::new(tag)))
    }

    /// Allocate a detached element with attributes
    pub fn create_element_with(&mut self, tag: &str, attrs: Attrs) -> NodeId {
        let mut element = Element::new(tag);
        element.attrs = attrs;
        self.alloc(NodeData::Element(element))
    }

    /// Allocate a detached text node
    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(Text::new(content)))
    }

    /// Allocate a detached comment node
    pub fn create_comment(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment(content.into()))
    }

    /// Remove a node from its parent. The subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some((parent, pos)) = self.position(id) {
            self.slot_mut(parent).children.remove(pos);
        }
        self.slot_mut(id).parent = None;
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.slot_mut(child).parent = Some(parent);
        self.slot_mut(parent).children.push(child);
    }

    /// Insert `child` before `reference`, which must be a child of `parent`
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.detach(child);
        let pos = self
            .children(parent)
            .iter()
            .position(|&c| c == reference)
            .unwrap_or(self.children(parent).len());
        self.slot_mut(child).parent = Some(parent);
        self.slot_mut(parent).children.insert(pos, child);
    }

    /// Put `replacements` where `id` is and detach `id`
    pub fn replace_with(&mut self, id: NodeId, replacements: &[NodeId]) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        for &new in replacements {
            self.insert_before(parent, new, id);
        }
        self.detach(id);
    }

    /// Replace an element with its own children
    pub fn unwrap_node(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self.children(id).to_vec();
        self.replace_with(id, &children);
    }

    /// Remove all children of a node
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.slot_mut(id).children);
        for child in children {
            self.slot_mut(child).parent = None;
        }
    }

    /// Copy a subtree; the copy is detached
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let data = self.slot(id).data.clone();
        let copy = self.alloc(data);
        let children: Vec<NodeId> = self.children(id).to_vec();
        for child in children {
            let child_copy = self.deep_clone(child);
            self.append_child(copy, child_copy);
        }
        copy
    }
}

// =============================================================================
// Descendants
// =============================================================================

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    dom: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.dom.children(id).iter().rev().copied());
        Some(id)
    }
}
