//! Conversion from an html5ever `RcDom` to a [`DomTree`]
//!
//! html5ever builds a reference-counted tree; we copy it once into the
//! per-conversion arena and drop the `RcDom`.
//!
//! # Flow
//!
//! ```text
//! &str
//!   │
//!   ▼ html5ever::parse_document()
//! RcDom  (html > head + body, always)
//!   │
//!   ▼ Converter::convert_children()
//! DomTree
//! ```

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::attr::Attrs;
use crate::error::DeserializeResult;
use crate::node::{DomTree, NodeId};

use super::HtmlParser;

/// HTML5-compliant parser backed by html5ever
#[derive(Debug, Clone, Copy, Default)]
pub struct Html5everParser;

impl HtmlParser for Html5everParser {
    fn parse(&self, html: &str) -> DeserializeResult<DomTree> {
        let opts = ParseOpts {
            tree_builder: TreeBuilderOpts {
                drop_doctype: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let rc = parse_document(RcDom::default(), opts).one(html);

        let mut dom = DomTree::empty();
        let root = dom.root();
        Converter { dom: &mut dom }.convert_children(&rc.document, root);
        Ok(dom)
    }
}

// =============================================================================
// Converter
// =============================================================================

struct Converter<'a> {
    dom: &'a mut DomTree,
}

impl Converter<'_> {
    fn convert_children(&mut self, handle: &Handle, parent: NodeId) {
        for child in handle.children.borrow().iter() {
            if let Some(id) = self.convert_node(child) {
                self.dom.append_child(parent, id);
            }
        }
    }

    /// Returns `None` for doctypes and processing instructions
    fn convert_node(&mut self, handle: &Handle) -> Option<NodeId> {
        match &handle.data {
            RcNodeData::Text { contents } => Some(self.dom.create_text(contents.borrow().to_string())),
            RcNodeData::Comment { contents } => Some(self.dom.create_comment(contents.to_string())),
            RcNodeData::Element { name, attrs, template_contents, .. } => {
                let attrs: Attrs = attrs
                    .borrow()
                    .iter()
                    .map(|a| (a.name.local.to_string(), a.value.to_string()))
                    .collect();
                let id = self.dom.create_element_with(&name.local, attrs);
                // <template> content lives outside the child list in html5ever
                match template_contents.borrow().as_ref() {
                    Some(contents) => self.convert_children(contents, id),
                    None => self.convert_children(handle, id),
                }
                Some(id)
            }
            RcNodeData::Document
            | RcNodeData::Doctype { .. }
            | RcNodeData::ProcessingInstruction { .. } => None,
        }
    }
}
