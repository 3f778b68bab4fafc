//! Notion inline styles.

use crate::error::DeserializeResult;
use crate::node::NodeId;
use crate::transform::DATA_IS_NOTION;
use crate::types::{PlaceholderDecorator, TypedObject};
use crate::walker::WalkContext;

use super::{rule_fn, RuleOutcome, RuleSet, TextStyle};

pub fn rules() -> RuleSet {
    RuleSet::new("notion")
        .trusted()
        .rule(rule_fn("notion-styled-span", styled_span))
}

/// Notion expresses bold, italic and strikethrough as span styles
fn styled_span(node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
    let dom = cx.dom();
    if dom.tag(node) != "span" || dom.attr(node, DATA_IS_NOTION).is_none() {
        return Ok(RuleOutcome::NoMatch);
    }
    let style = TextStyle::parse(dom.attr(node, "style").unwrap_or_default());
    let features = cx.features();
    let decorators: Vec<&str> = style
        .decorators()
        .into_iter()
        .filter(|d| features.has_decorator(d))
        .collect();
    if decorators.is_empty() {
        return Ok(RuleOutcome::NoMatch);
    }

    let mut children = cx.next_children(node)?;
    for name in decorators.into_iter().rev() {
        children = vec![TypedObject::Decorator(PlaceholderDecorator {
            mark_name: name.to_string(),
            children,
        })];
    }
    Ok(RuleOutcome::Many(children))
}
