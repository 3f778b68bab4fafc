//! Microsoft Word list paragraphs.
//!
//! Word has no list markup: list items are `<p class="MsoListParagraph...">`
//! siblings whose nesting lives in `mso-list: l0 level2 lfo1`. The cleaner
//! has already recorded the bullet type in `data-word-list`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::DeserializeResult;
use crate::node::{DomTree, NodeId};
use crate::transform::{DATA_IS_WORD, DATA_WORD_LIST};
use crate::types::Block;
use crate::walker::WalkContext;

use super::{css_property, rule_fn, RuleOutcome, RuleSet};

static LIST_LEVEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bl\d+\s+level(\d+)").unwrap());

pub fn rules() -> RuleSet {
    RuleSet::new("word")
        .trusted()
        .rule(rule_fn("word-list-paragraph", list_paragraph))
}

fn is_list_paragraph(dom: &DomTree, node: NodeId) -> bool {
    dom.tag(node) == "p"
        && dom.attr(node, DATA_IS_WORD).is_some()
        && (dom.attr(node, DATA_WORD_LIST).is_some()
            || dom
                .element(node)
                .is_some_and(|e| e.attrs.classes().any(|c| c.starts_with("MsoListParagraph"))))
}

/// Nesting level from the paragraph's `mso-list` style, 1 if absent
pub fn word_list_level(style: &str) -> u32 {
    css_property(style, "mso-list")
        .and_then(|value| LIST_LEVEL.captures(value))
        .and_then(|caps| caps[1].parse().ok())
        .filter(|&level| level > 0)
        .unwrap_or(1)
}

fn list_paragraph(node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
    let dom = cx.dom();
    if !is_list_paragraph(dom, node) {
        return Ok(RuleOutcome::NoMatch);
    }
    let list_type = match dom.attr(node, DATA_WORD_LIST) {
        Some("number") => "number",
        _ => "bullet",
    };
    let level = word_list_level(dom.attr(node, "style").unwrap_or_default());

    let children = cx.next_children(node)?;
    if !cx.features().has_list(list_type) {
        return Ok(cx.make_block(Block::default().with_children(children)).into());
    }
    Ok(Block::list_item(list_type)
        .with_level(level)
        .with_children(children)
        .into())
}
