//! HTML rendering for DOM trees
//!
//! Renders a [`DomTree`] subtree back to markup. Used to trace what each
//! preprocessing stage did and to assert on rewrites in tests.

use crate::node::{DomTree, NodeData, NodeId};

// =============================================================================
// Document Rendering
// =============================================================================

/// Render the children of `body` (or the document node) to HTML.
pub fn render_body(dom: &DomTree) -> String {
    let mut output = String::new();
    for &child in dom.children(dom.body()) {
        render_node(dom, child, &mut output);
    }
    output
}

/// Render a node and its subtree to HTML.
pub fn render_subtree(dom: &DomTree, id: NodeId) -> String {
    let mut output = String::new();
    render_node(dom, id, &mut output);
    output
}

fn render_node(dom: &DomTree, id: NodeId, output: &mut String) {
    match dom.data(id) {
        NodeData::Document => {
            for &child in dom.children(id) {
                render_node(dom, child, output);
            }
        }
        NodeData::Text(text) => {
            if is_raw_text_parent(dom, id) {
                output.push_str(&text.content);
            } else {
                escape_text(&text.content, output);
            }
        }
        NodeData::Comment(comment) => {
            output.push_str("<!--");
            output.push_str(comment);
            output.push_str("-->");
        }
        NodeData::Element(elem) => {
            output.push('<');
            output.push_str(&elem.tag);
            for (name, value) in elem.attrs.iter() {
                output.push(' ');
                output.push_str(name);
                output.push_str("=\"");
                escape_attr(value, output);
                output.push('"');
            }

            if is_void_element(&elem.tag) {
                output.push_str(" />");
                return;
            }
            output.push('>');

            for &child in dom.children(id) {
                render_node(dom, child, output);
            }

            output.push_str("</");
            output.push_str(&elem.tag);
            output.push('>');
        }
    }
}

fn is_raw_text_parent(dom: &DomTree, id: NodeId) -> bool {
    dom.parent(id)
        .is_some_and(|p| matches!(dom.tag(p), "script" | "style"))
}

/// Check if tag is a void element (self-closing)
fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input"
            | "link" | "meta" | "source" | "track" | "wbr"
    )
}

fn escape_text(s: &str, output: &mut String) {
    for c in s.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

fn escape_attr(s: &str, output: &mut String) {
    for c in s.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            _ => output.push(c),
        }
    }
}
