//! Generic HTML semantics.
//!
//! These rules run after every dialect set and map plain markup: text to
//! spans, paragraph and heading tags to blocks, list items to list blocks,
//! inline formatting to decorators and anchors to link annotations.

use crate::error::DeserializeResult;
use crate::node::{NodeData, NodeId, NodeKind};
use crate::transform::{collapse_runs, collapse_spaces};
use crate::types::{
    Block, InlineObject, MarkDef, PlaceholderAnnotation, PlaceholderDecorator, Span, TypedObject,
    DEFAULT_STYLE, LINK_ANNOTATION, QUOTE_STYLE,
};
use crate::walker::{WalkContext, QUOTE_BOUNDARY};

use super::{rule_fn, RuleOutcome, RuleSet};

/// Block tags and the style each maps to
const BLOCK_STYLES: &[(&str, &str)] = &[
    ("p", DEFAULT_STYLE),
    ("h1", "h1"),
    ("h2", "h2"),
    ("h3", "h3"),
    ("h4", "h4"),
    ("h5", "h5"),
    ("h6", "h6"),
];

/// Inline formatting tags and the decorator each maps to
pub const DECORATOR_TAGS: &[(&str, &str)] = &[
    ("b", "strong"),
    ("strong", "strong"),
    ("i", "em"),
    ("em", "em"),
    ("u", "underline"),
    ("s", "strike-through"),
    ("strike", "strike-through"),
    ("del", "strike-through"),
    ("code", "code"),
    ("sup", "sup"),
    ("sub", "sub"),
    ("ins", "ins"),
    ("mark", "mark"),
    ("small", "small"),
];

/// Inline object type produced for `<img>`
pub const IMAGE_TYPE: &str = "image";

/// Style a block tag maps to, if it is one
pub fn block_style(tag: &str) -> Option<&'static str> {
    BLOCK_STYLES.iter().find(|(t, _)| *t == tag).map(|&(_, style)| style)
}

/// Decorator an inline tag maps to, if it is one
pub fn decorator_for(tag: &str) -> Option<&'static str> {
    DECORATOR_TAGS.iter().find(|(t, _)| *t == tag).map(|&(_, name)| name)
}

/// List type a list container implies
pub fn list_type_for(container: &str) -> Option<&'static str> {
    match container {
        "ul" => Some("bullet"),
        "ol" => Some("number"),
        _ => None,
    }
}

pub fn rules() -> RuleSet {
    RuleSet::new("html")
        .trusted()
        .rule(rule_fn("text", text))
        .rule(rule_fn("pre", pre))
        .rule(rule_fn("blockquote", blockquote))
        .rule(rule_fn("block", block))
        .rule(rule_fn("wrapper", wrapper))
        .rule(rule_fn("br", line_break))
        .rule(rule_fn("list", list))
        .rule(rule_fn("list-item", list_item))
        .rule(rule_fn("decorator", decorator))
        .rule(rule_fn("link", link))
        .rule(rule_fn("image", image))
}

/// Text nodes become spans.
///
/// A lone space is kept only between two non-text siblings, where it
/// separates words; text directly on `body` is left to the cleaner's spans.
fn text(node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
    let dom = cx.dom();
    let NodeData::Text(text) = dom.data(node) else {
        return Ok(RuleOutcome::NoMatch);
    };
    let is_non_text = |id: Option<NodeId>| id.is_some_and(|id| dom.kind(id) != NodeKind::Text);
    let separates_elements = collapse_runs(&text.content) == " "
        && is_non_text(dom.next_sibling(node))
        && is_non_text(dom.prev_sibling(node));
    let under_body = dom.parent(node).is_some_and(|p| dom.tag(p) == "body");

    if (separates_elements || text.content != " ") && !under_body {
        Ok(Span::new(collapse_spaces(&text.content)).into())
    } else {
        Ok(RuleOutcome::NoMatch)
    }
}

/// Preformatted text: one block, one span, content taken verbatim
fn pre(node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
    if cx.dom().tag(node) != "pre" {
        return Ok(RuleOutcome::NoMatch);
    }
    let text = cx.dom().text_content(node);
    let marks: &[&str] = if cx.features().has_decorator("code") { &["code"] } else { &[] };
    let block = Block::default().with_children(vec![Span::marked(text, marks.iter().copied()).into()]);
    Ok(block.into())
}

/// Quotes keep nested paragraphs as boundary-separated spans
fn blockquote(node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
    if cx.dom().tag(node) != "blockquote" {
        return Ok(RuleOutcome::NoMatch);
    }

    let dom = cx.dom_mut();
    let mut children: Vec<NodeId> = Vec::new();
    for child in dom.children(node).to_vec() {
        if block_style(dom.tag(child)).is_none() {
            children.push(child);
            continue;
        }
        let span = dom.create_element("span");
        let after_text = children
            .last()
            .and_then(|&prev| dom.text(prev).filter(|_| dom.kind(prev) == NodeKind::Text))
            .is_some_and(|t| !t.trim().is_empty());
        if after_text {
            let boundary = dom.create_text(QUOTE_BOUNDARY);
            dom.append_child(span, boundary);
        }
        for grandchild in dom.children(child).to_vec() {
            let copy = dom.deep_clone(grandchild);
            dom.append_child(span, copy);
        }
        let boundary = dom.create_text(QUOTE_BOUNDARY);
        dom.append_child(span, boundary);
        children.push(span);
    }

    let style = if cx.features().has_style(QUOTE_STYLE) { QUOTE_STYLE } else { DEFAULT_STYLE };
    let children = cx.next(children)?;
    Ok(Block::new(style).with_children(children).into())
}

/// Paragraphs and headings; disabled styles fall back to `normal`
fn block(node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
    let dom = cx.dom();
    let Some(style) = block_style(dom.tag(node)) else {
        return Ok(RuleOutcome::NoMatch);
    };
    if dom.parent(node).is_some_and(|p| dom.tag(p) == "li") {
        return Ok(RuleOutcome::Many(cx.next_children(node)?));
    }
    let style = if cx.features().has_style(style) { style } else { DEFAULT_STYLE };
    let children = cx.next_children(node)?;
    Ok(Block::new(style).with_children(children).into())
}

fn wrapper(node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
    if !cx.dom().is_any(node, &["span", "div"]) {
        return Ok(RuleOutcome::NoMatch);
    }
    Ok(RuleOutcome::Many(cx.next_children(node)?))
}

fn line_break(node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
    if cx.dom().tag(node) != "br" {
        return Ok(RuleOutcome::NoMatch);
    }
    Ok(Span::new("\n").into())
}

fn list(node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
    if list_type_for(cx.dom().tag(node)).is_none() {
        return Ok(RuleOutcome::NoMatch);
    }
    Ok(RuleOutcome::Many(cx.next_children(node)?))
}

/// List items take their type from the container; a disabled type
/// degrades to a plain block
fn list_item(node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
    let dom = cx.dom();
    if dom.tag(node) != "li" {
        return Ok(RuleOutcome::NoMatch);
    }
    let Some(list_type) = dom.parent(node).and_then(|p| list_type_for(dom.tag(p))) else {
        return Ok(RuleOutcome::NoMatch);
    };
    let children = cx.next_children(node)?;
    if !cx.features().has_list(list_type) {
        return Ok(cx.make_block(Block::default().with_children(children)).into());
    }
    Ok(Block::list_item(list_type).with_children(children).into())
}

/// Inline formatting; disabled decorators are transparent
fn decorator(node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
    let Some(name) = decorator_for(cx.dom().tag(node)) else {
        return Ok(RuleOutcome::NoMatch);
    };
    if !cx.features().has_decorator(name) {
        return Ok(RuleOutcome::NoMatch);
    }
    let children = cx.next_children(node)?;
    Ok(TypedObject::Decorator(PlaceholderDecorator {
        mark_name: name.to_string(),
        children,
    })
    .into())
}

/// Anchors become link annotations, or trailing ` (href)` text when links
/// are disabled
fn link(node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
    if cx.dom().tag(node) != "a" {
        return Ok(RuleOutcome::NoMatch);
    }
    let Some(href) = cx.dom().attr(node, "href").map(str::to_string) else {
        return Ok(RuleOutcome::Many(cx.next_children(node)?));
    };

    if !cx.features().has_annotation(LINK_ANNOTATION) {
        let dom = cx.dom_mut();
        let suffix = dom.create_text(format!(" ({href})"));
        dom.append_child(node, suffix);
        return Ok(RuleOutcome::Many(cx.next_children(node)?));
    }

    let mark_def = MarkDef::link(cx.generate_key(), href);
    let children = cx.next_children(node)?;
    Ok(TypedObject::Annotation(PlaceholderAnnotation { mark_def, children }).into())
}

fn image(node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
    let dom = cx.dom();
    if dom.tag(node) != "img" || !cx.features().has_inline_object(IMAGE_TYPE) {
        return Ok(RuleOutcome::NoMatch);
    }
    let mut object = InlineObject::new(IMAGE_TYPE);
    for field in ["src", "alt"] {
        if let Some(value) = dom.attr(node, field) {
            object = object.field(field, value);
        }
    }
    Ok(TypedObject::InlineObject(object).into())
}
