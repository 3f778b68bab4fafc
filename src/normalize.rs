//! Tree normalization passes.
//!
//! Run in this order on the walker output:
//!
//! 1. [`ensure_root_is_blocks`] - wrap loose inline content in blocks
//! 2. [`flatten_nested_blocks`] - lift nested blocks to the top level
//! 3. [`trim_whitespace`] - trim and collapse whitespace across spans
//! 4. [`attach_mark_defs`] - give each block the definitions it references
//! 5. [`normalize_block`] - merge spans, re-key, prune marks (idempotent)

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashSet;

use crate::features::EnabledFeatures;
use crate::hash::KeyGenerator;
use crate::placeholder::MarkDefAccumulator;
use crate::types::{Block, Span, TypedObject};

static LEADING_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\S\n]+").unwrap());
static TRAILING_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+$").unwrap());

/// Which neighbor absorbs a lone whitespace span when both qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhitespaceMergePolicy {
    #[default]
    PreferPrevious,
    PreferNext,
}

// =============================================================================
// Root wrapping and flattening
// =============================================================================

/// Make every top-level object a block.
///
/// Inline objects following other inline objects share one block; inline
/// content after a block opens a new `normal` block instead of joining it.
/// Blank spans never open a block on their own.
pub fn ensure_root_is_blocks(objects: Vec<TypedObject>) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::with_capacity(objects.len());
    let mut previous_was_block = true;
    for object in objects {
        match object {
            TypedObject::Block(block) => {
                blocks.push(block);
                previous_was_block = true;
            }
            TypedObject::Hoisted(block) => {
                blocks.push(*block);
                previous_was_block = true;
            }
            inline => {
                match blocks.last_mut() {
                    Some(last) if !previous_was_block => last.children.push(inline),
                    _ if is_blank_span(&inline) => continue,
                    _ => blocks.push(Block::default().with_children(vec![inline])),
                }
                previous_was_block = false;
            }
        }
    }
    blocks
}

fn is_blank_span(object: &TypedObject) -> bool {
    object.as_span().is_some_and(|s| s.text.trim().is_empty())
}

/// Lift nested blocks into a flat sequence, parents before their nested
/// blocks, in traversal order.
pub fn flatten_nested_blocks(blocks: Vec<Block>) -> Vec<Block> {
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        flatten_into(block, &mut out);
    }
    out
}

fn flatten_into(mut block: Block, out: &mut Vec<Block>) {
    let children = std::mem::take(&mut block.children);
    let mut nested = Vec::new();
    for child in children {
        match child {
            TypedObject::Block(b) => nested.push(b),
            TypedObject::Hoisted(b) => nested.push(*b),
            other => block.children.push(other),
        }
    }
    out.push(block);
    for b in nested {
        flatten_into(b, out);
    }
}

// =============================================================================
// Whitespace
// =============================================================================

/// Neighbor tests count line breaks; stripping never removes them.
fn starts_with_ws(text: &str) -> bool {
    text.starts_with(char::is_whitespace)
}

fn ends_with_ws(text: &str) -> bool {
    text.ends_with(char::is_whitespace)
}

fn is_single_whitespace(text: &str) -> bool {
    matches!(text, " " | "\u{a0}")
}

fn span_at(children: &[TypedObject], index: Option<usize>) -> Option<&Span> {
    children.get(index?).and_then(TypedObject::as_span)
}

/// Trim and collapse whitespace across a block's spans.
pub fn trim_whitespace(mut block: Block, policy: WhitespaceMergePolicy) -> Block {
    let children = &mut block.children;
    let mut i = 0;
    while i < children.len() {
        if !children[i].is_span() {
            i += 1;
            continue;
        }
        let last = children.len() - 1;
        let next_led = span_at(children, Some(i + 1)).is_some_and(|s| starts_with_ws(&s.text));
        let prev_trailed = span_at(children, i.checked_sub(1)).is_some_and(|s| ends_with_ws(&s.text));

        let Some(span) = children[i].as_span_mut() else { break };
        if i == 0 || prev_trailed {
            span.text = LEADING_WS.replace(&span.text, "").into_owned();
        }
        if i == last || next_led {
            span.text = TRAILING_WS.replace(&span.text, "").into_owned();
        }
        if span.text.is_empty() {
            children.remove(i);
            continue;
        }
        if is_single_whitespace(&span.text) {
            let marks = span.marks.clone();
            let text = span.text.clone();
            let prev = i.checked_sub(1).filter(|&p| span_at(children, Some(p)).is_some_and(|s| s.marks == marks));
            let next = Some(i + 1).filter(|&n| span_at(children, Some(n)).is_some_and(|s| s.marks == marks));
            let target = match policy {
                WhitespaceMergePolicy::PreferPrevious => prev.or(next),
                WhitespaceMergePolicy::PreferNext => next.or(prev),
            };
            if let Some(target) = target {
                if let Some(neighbor) = children[target].as_span_mut() {
                    if target < i {
                        neighbor.text.push_str(&text);
                    } else {
                        neighbor.text.insert_str(0, &text);
                    }
                }
                children.remove(i);
                continue;
            }
        }
        i += 1;
    }
    block
}

// =============================================================================
// Mark definitions and per-block normalization
// =============================================================================

/// Append to each block the registered definitions its spans reference
pub fn attach_mark_defs(blocks: &mut [Block], mark_defs: &MarkDefAccumulator) {
    for block in blocks {
        let missing: Vec<_> = mark_defs
            .referenced_by(block)
            .filter(|def| !block.mark_defs.iter().any(|d| d.key == def.key))
            .cloned()
            .collect();
        block.mark_defs.extend(missing);
    }
}

/// Canonicalize one block. Re-running on its own output changes nothing.
///
/// Assigns a key, drops marks that are neither enabled decorators nor
/// definition keys, merges equally marked neighbors, re-keys children as
/// `{blockKey}{index}` and prunes unreferenced definitions.
pub fn normalize_block(
    mut block: Block,
    features: &EnabledFeatures,
    keys: &mut dyn KeyGenerator,
) -> Block {
    let key = block.key.get_or_insert_with(|| keys.generate()).clone();

    let mut seen = FxHashSet::default();
    block.mark_defs.retain(|d| seen.insert(d.key.clone()));

    let def_keys: FxHashSet<String> = block.mark_defs.iter().map(|d| d.key.clone()).collect();
    let mut children = std::mem::take(&mut block.children);
    for child in &mut children {
        if let Some(span) = child.as_span_mut() {
            span.marks
                .retain(|m| features.has_decorator(m) || def_keys.contains(m));
        }
    }
    while children.len() > 1
        && children
            .last()
            .and_then(TypedObject::as_span)
            .is_some_and(|s| s.text.is_empty())
    {
        children.pop();
    }

    let mut merged: Vec<TypedObject> = Vec::with_capacity(children.len());
    for child in children {
        let mergeable = matches!(
            (merged.last(), &child),
            (Some(TypedObject::Span(prev)), TypedObject::Span(next)) if prev.marks == next.marks
        );
        if mergeable {
            if let (Some(TypedObject::Span(prev)), TypedObject::Span(next)) = (merged.last_mut(), &child) {
                prev.text.push_str(&next.text);
            }
        } else {
            merged.push(child);
        }
    }
    if merged.is_empty() {
        merged.push(Span::new("").into());
    }

    for (index, child) in merged.iter_mut().enumerate() {
        let child_key = Some(format!("{key}{index}"));
        match child {
            TypedObject::Span(s) => s.key = child_key,
            TypedObject::InlineObject(o) => o.key = child_key,
            _ => {}
        }
    }
    block.children = merged;

    let used: FxHashSet<&str> = block
        .children
        .iter()
        .filter_map(TypedObject::as_span)
        .flat_map(|s| s.marks.iter().map(String::as_str))
        .collect();
    block.mark_defs.retain(|d| used.contains(d.key.as_str()));
    block
}
