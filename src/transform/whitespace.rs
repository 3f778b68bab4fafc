//! Whitespace normalization for text nodes.

use std::sync::LazyLock;

use regex::Regex;

use crate::node::{DomTree, NodeKind};

use super::Preprocessor;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s\s+").unwrap());
static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]+").unwrap());

/// Collapse whitespace runs and line breaks to single spaces
pub(crate) fn collapse_runs(text: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(text, " ");
    LINE_BREAKS.replace_all(&collapsed, " ").into_owned()
}

/// Collapse whitespace runs only; single line breaks survive
pub(crate) fn collapse_spaces(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").into_owned()
}

/// Whether `text` holds nothing but whitespace
#[inline]
pub(crate) fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Collapses whitespace in every text node outside `<pre>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeWhitespace;

impl Preprocessor for NormalizeWhitespace {
    fn preprocess(&self, _html: &str, dom: &mut DomTree) {
        let body = dom.body();
        let texts = dom.find_all(body, |dom, id| {
            dom.kind(id) == NodeKind::Text && !dom.ancestors(id).any(|a| dom.tag(a) == "pre")
        });
        for id in texts {
            let Some(content) = dom.text(id) else { continue };
            let collapsed = collapse_runs(content);
            if collapsed != content {
                dom.set_text(id, collapsed);
            }
        }
    }
}
