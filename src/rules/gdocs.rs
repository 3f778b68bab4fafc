//! Google Docs rules.
//!
//! Docs puts all formatting in inline styles on leaf spans and flattens
//! nested lists into sibling `<li>`s carrying `aria-level`.

use crate::error::DeserializeResult;
use crate::node::{DomTree, NodeId, NodeKind};
use crate::transform::{DATA_IS_GOOGLE_DOCS, DATA_IS_ROOT_NODE};
use crate::types::{Block, Span, DEFAULT_STYLE};
use crate::walker::{list_nesting, WalkContext};

use super::html::list_type_for;
use super::{rule_fn, RuleOutcome, RuleSet, TextStyle};

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

pub fn rules() -> RuleSet {
    RuleSet::new("gdocs")
        .trusted()
        .rule(rule_fn("gdocs-span", styled_span))
        .rule(rule_fn("gdocs-list-item", list_item))
        .rule(rule_fn("gdocs-br", line_break))
}

fn is_google_docs(dom: &DomTree, node: NodeId) -> bool {
    dom.attr(node, DATA_IS_GOOGLE_DOCS).is_some()
}

/// Leaf spans carry their formatting as CSS
fn styled_span(node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
    let dom = cx.dom();
    if dom.tag(node) != "span" || !is_google_docs(dom, node) {
        return Ok(RuleOutcome::NoMatch);
    }
    if dom.children(node).iter().any(|&c| dom.kind(c) != NodeKind::Text) {
        return Ok(RuleOutcome::NoMatch);
    }

    let mut style = TextStyle::parse(dom.attr(node, "style").unwrap_or_default());
    // Docs underlines every link; the annotation already says so
    if dom.parent(node).is_some_and(|p| dom.tag(p) == "a") {
        style.underline = false;
    }
    let features = cx.features();
    let marks = style.decorators().into_iter().filter(|d| features.has_decorator(d));
    Ok(Span::marked(dom.text_content(node), marks).into())
}

/// Heading style of a list item's first child, if enabled
fn item_style(cx: &WalkContext<'_>, first: Option<NodeId>) -> &'static str {
    let dom = cx.dom();
    first
        .and_then(|id| HEADINGS.iter().copied().find(|&h| h == dom.tag(id)))
        .filter(|h| cx.features().has_style(h))
        .unwrap_or(DEFAULT_STYLE)
}

/// Level from `aria-level`, falling back to the number of list containers
fn aria_level(dom: &DomTree, node: NodeId) -> u32 {
    dom.attr(node, "aria-level")
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|&level| level > 0)
        .unwrap_or_else(|| {
            dom.ancestors(node)
                .filter(|&a| list_type_for(dom.tag(a)).is_some())
                .count()
                .max(1) as u32
        })
}

fn list_item(node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
    let dom = cx.dom();
    if dom.tag(node) != "li" || !is_google_docs(dom, node) {
        return Ok(RuleOutcome::NoMatch);
    }
    let list_type = dom
        .parent(node)
        .and_then(|p| list_type_for(dom.tag(p)))
        .unwrap_or("bullet");
    let first = dom
        .children(node)
        .iter()
        .copied()
        .find(|&c| dom.kind(c) == NodeKind::Element);
    let content_root = first
        .filter(|&f| dom.tag(f) == "p" || HEADINGS.contains(&dom.tag(f)))
        .unwrap_or(node);
    // The walker adds one level per enclosing `li`
    let nesting = list_nesting(dom, node);
    let level = aria_level(dom, node).saturating_sub(nesting).max(1);
    let style = item_style(cx, first);

    let children = cx.next_children(content_root)?;
    if !cx.features().has_list(list_type) {
        return Ok(cx.make_block(Block::new(style).with_children(children)).into());
    }
    Ok(Block::list_item(list_type)
        .with_style(style)
        .with_level(level)
        .with_children(children)
        .into())
}

fn line_break(node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
    let dom = cx.dom();
    if dom.tag(node) != "br" || !is_google_docs(dom, node) {
        return Ok(RuleOutcome::NoMatch);
    }
    let interchange = dom
        .element(node)
        .is_some_and(|e| e.attrs.has_class("apple-interchange-newline"));
    let parent_empty = dom.parent(node).is_some_and(|p| dom.text_content(p).is_empty());
    if interchange || parent_empty {
        return Ok(Span::new("").into());
    }
    if dom.attr(node, DATA_IS_ROOT_NODE).is_some() {
        return Ok(Block::default().with_children(vec![Span::new("").into()]).into());
    }
    Ok(RuleOutcome::NoMatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aria_level() {
        let mut dom = DomTree::new();
        let body = dom.body();
        let ul = dom.create_element("ul");
        let li = dom.create_element("li");
        dom.append_child(body, ul);
        dom.append_child(ul, li);
        assert_eq!(aria_level(&dom, li), 1);
        dom.set_attr(li, "aria-level", "3");
        assert_eq!(aria_level(&dom, li), 3);
        dom.set_attr(li, "aria-level", "zero");
        assert_eq!(aria_level(&dom, li), 1);
    }
}
