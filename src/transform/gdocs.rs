//! Google Docs clipboard cleanup.
//!
//! Docs wraps a copied selection in `<b id="docs-internal-guid-...">`. The
//! wrapper is unwrapped after tagging, so rules see the content the way any
//! other paste would lay it out, plus the `data-is-*` markers.

use crate::node::{DomTree, NodeId, NodeKind};

use super::{is_blank, tag_elements, Preprocessor, WhitespaceMode, DATA_IS_GOOGLE_DOCS, DATA_IS_ROOT_NODE};

const GUID_MARKER: &str = "docs-internal-guid";

/// Locate the Docs marker element, if the tree came from Google Docs
pub fn find_google_docs_marker(dom: &DomTree) -> Option<NodeId> {
    dom.find_first(dom.root(), |dom, id| {
        dom.attr(id, "id").is_some_and(|v| v.contains(GUID_MARKER))
    })
}

/// Tags Google Docs markup and applies the whitespace policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagGoogleDocs {
    mode: WhitespaceMode,
}

impl TagGoogleDocs {
    pub fn new(mode: WhitespaceMode) -> Self {
        Self { mode }
    }

    fn element_children(dom: &DomTree, id: NodeId) -> Vec<NodeId> {
        dom.children(id)
            .iter()
            .copied()
            .filter(|&c| dom.kind(c) == NodeKind::Element)
            .collect()
    }

    fn is_empty_block(dom: &DomTree, id: NodeId) -> bool {
        dom.is_any(id, &["p", "br"]) && is_blank(&dom.text_content(id))
    }

    /// Keep the first of each run of whitespace-only paragraphs
    fn normalize_whitespace(dom: &mut DomTree, id: NodeId) {
        let mut previous_empty = false;
        for child in Self::element_children(dom, id) {
            if Self::is_empty_block(dom, child) {
                if previous_empty {
                    dom.detach(child);
                }
                previous_empty = true;
            } else {
                previous_empty = false;
                Self::normalize_whitespace(dom, child);
            }
        }
    }

    /// Drop whitespace-only paragraphs and line breaks between paragraphs
    fn remove_whitespace(dom: &mut DomTree, id: NodeId) {
        let children = Self::element_children(dom, id);
        let doomed: Vec<NodeId> = children
            .iter()
            .copied()
            .filter(|&child| match dom.tag(child) {
                "br" => {
                    dom.prev_element_sibling(child).is_some_and(|s| dom.tag(s) == "p")
                        || dom.next_element_sibling(child).is_some_and(|s| dom.tag(s) == "p")
                }
                "p" => is_blank(&dom.text_content(child)),
                _ => false,
            })
            .collect();
        for child in children {
            if doomed.contains(&child) {
                dom.detach(child);
            } else {
                Self::remove_whitespace(dom, child);
            }
        }
    }

    /// Checklist items start with a checkbox image
    fn remove_checkbox_images(dom: &mut DomTree, root: NodeId) {
        let images = dom.find_all(root, |dom, id| {
            dom.tag(id) == "img"
                && dom.parent(id).is_some_and(|p| {
                    dom.tag(p) == "li" && Self::element_children(dom, p).first() == Some(&id)
                })
        });
        for img in images {
            dom.detach(img);
        }
    }
}

impl Preprocessor for TagGoogleDocs {
    fn preprocess(&self, _html: &str, dom: &mut DomTree) {
        let Some(marker) = find_google_docs_marker(dom) else {
            return;
        };
        let root = if dom.tag(marker) == "b" { marker } else { dom.body() };

        match self.mode {
            WhitespaceMode::Preserve => {}
            WhitespaceMode::Normalize => Self::normalize_whitespace(dom, root),
            WhitespaceMode::Remove => Self::remove_whitespace(dom, root),
        }

        tag_elements(dom, root, DATA_IS_GOOGLE_DOCS);
        for child in Self::element_children(dom, root) {
            dom.set_attr(child, DATA_IS_ROOT_NODE, "true");
        }
        Self::remove_checkbox_images(dom, root);

        if root == marker {
            dom.unwrap_node(marker);
        }
    }
}

#[cfg(all(test, feature = "html-parser"))]
mod tests {
    use super::*;
    use crate::transform::test_support::run;

    const T: &str = r#"data-is-google-docs="true""#;

    fn doc(inner: &str) -> String {
        format!(r#"<meta charset="utf-8"><b style="font-weight:normal;" id="docs-internal-guid-1">{inner}</b>"#)
    }

    #[test]
    fn test_unwraps_and_tags() {
        let html = doc("<p><span>Hi</span></p><ul><li><img src=\"c.png\"><span>Task</span></li></ul>");
        let expected = format!(
            r#"<p {T} data-is-root-node="true"><span {T}>Hi</span></p><ul {T} data-is-root-node="true"><li {T}><span {T}>Task</span></li></ul>"#
        );
        assert_eq!(run(TagGoogleDocs::default(), &html), expected);
    }

    #[test]
    fn test_whitespace_modes() {
        let html = doc("<p>a</p><br><p> </p><p></p><p>b</p>");

        let preserved = run(TagGoogleDocs::new(WhitespaceMode::Preserve), &html);
        assert_eq!(preserved.matches("<p ").count(), 4);
        assert!(preserved.contains("<br "));

        let normalized = run(TagGoogleDocs::new(WhitespaceMode::Normalize), &html);
        assert_eq!(normalized.matches("<p ").count(), 2);
        assert!(normalized.contains("<br "));

        let removed = run(TagGoogleDocs::new(WhitespaceMode::Remove), &html);
        assert_eq!(removed.matches("<p ").count(), 2);
        assert!(!removed.contains("<br"));
    }

    #[test]
    fn test_plain_html_untouched() {
        assert_eq!(run(TagGoogleDocs::default(), "<p>x</p>"), "<p>x</p>");
    }
}
