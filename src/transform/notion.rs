//! Notion clipboard detection.

use std::sync::LazyLock;

use regex::Regex;

use crate::node::DomTree;

use super::{tag_elements, Preprocessor, DATA_IS_NOTION};

static NOTION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- notionvc:.*?-->").unwrap());

/// Whether the raw HTML was copied out of Notion
pub fn is_notion(html: &str) -> bool {
    NOTION_MARKER.is_match(html)
}

/// Tags every element of a Notion document with `data-is-notion`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagNotion;

impl Preprocessor for TagNotion {
    fn preprocess(&self, _html: &str, dom: &mut DomTree) {
        let root = dom.root();
        tag_elements(dom, root, DATA_IS_NOTION);
    }
}
