//! Generic cleanup, run after every dialect pass.

use crate::node::{DomTree, NodeId, NodeKind};

use super::Preprocessor;

const UNWANTED_TAGS: &[&str] = &["style", "xml", "script", "meta", "link"];

/// Wraps bare body text in spans and drops non-content nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanHtml;

impl CleanHtml {
    /// Browsers wrap loose body text in a span before it reaches the clipboard
    fn wrap_body_text(dom: &mut DomTree, body: NodeId) {
        let texts: Vec<NodeId> = dom
            .children(body)
            .iter()
            .copied()
            .filter(|&c| dom.kind(c) == NodeKind::Text)
            .collect();
        for text in texts {
            let span = dom.create_element("span");
            dom.insert_before(body, span, text);
            dom.append_child(span, text);
        }
    }

    /// Text directly under structural containers carries no content
    fn structural_texts(dom: &DomTree, body: NodeId) -> Vec<NodeId> {
        let mut containers: Vec<NodeId> = dom.html().into_iter().chain(dom.head()).collect();
        containers.extend(
            dom.children(body)
                .iter()
                .copied()
                .filter(|&c| dom.is_any(c, &["ul", "ol"])),
        );
        containers
            .into_iter()
            .flat_map(|c| dom.children(c).iter().copied())
            .filter(|&c| dom.kind(c) == NodeKind::Text)
            .collect()
    }
}

impl Preprocessor for CleanHtml {
    fn preprocess(&self, _html: &str, dom: &mut DomTree) {
        let body = dom.body();
        if body != dom.root() {
            Self::wrap_body_text(dom, body);
        }

        let mut doomed = Self::structural_texts(dom, body);
        doomed.extend(dom.find_all(dom.root(), |dom, id| {
            dom.kind(id) == NodeKind::Comment || dom.is_any(id, UNWANTED_TAGS)
        }));
        for id in doomed {
            dom.detach(id);
        }
    }
}

#[cfg(all(test, feature = "html-parser"))]
mod tests {
    use super::*;
    use crate::transform::test_support::run;

    #[test]
    fn test_wraps_bare_text() {
        assert_eq!(run(CleanHtml, "loose <b>bold</b> text"), "<span>loose </span><b>bold</b><span> text</span>");
    }

    #[test]
    fn test_removes_unwanted_nodes() {
        let html = "<p>a<!-- c --></p><style>p{}</style><ul>\n<li>x</li>\n</ul><link rel=\"x\">";
        assert_eq!(run(CleanHtml, html), "<p>a</p><ul><li>x</li></ul>");
    }
}
