//! Rule resolution over the DOM.
//!
//! [`WalkContext`] drives the recursive walk: for each node it tries every
//! rule of every rule set in order, resolves placeholders the winning rule
//! returned, and applies the list/quote fix-ups to block results. Nodes no
//! rule claims are transparent: their children are walked in their place.

use tracing::{trace, warn};

use crate::error::{DeserializeError, DeserializeResult};
use crate::features::EnabledFeatures;
use crate::hash::KeyGenerator;
use crate::node::{DomTree, NodeId};
use crate::placeholder::{resolve, MarkDefAccumulator};
use crate::rules::{RuleOutcome, RuleSet};
use crate::types::{Block, TypedObject, QUOTE_STYLE};

/// Marks a paragraph boundary inside a multi-paragraph quote
pub const QUOTE_BOUNDARY: &str = "\r";

// =============================================================================
// NextInput
// =============================================================================

/// What the `next` continuation can walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextInput {
    One(NodeId),
    Many(Vec<NodeId>),
    /// The child list of a node
    ChildrenOf(NodeId),
}

impl From<NodeId> for NextInput {
    fn from(id: NodeId) -> Self {
        NextInput::One(id)
    }
}

impl From<Vec<NodeId>> for NextInput {
    fn from(ids: Vec<NodeId>) -> Self {
        NextInput::Many(ids)
    }
}

impl From<&[NodeId]> for NextInput {
    fn from(ids: &[NodeId]) -> Self {
        NextInput::Many(ids.to_vec())
    }
}

// =============================================================================
// WalkContext
// =============================================================================

/// Per-invocation walk state handed to every rule.
pub struct WalkContext<'a> {
    dom: &'a mut DomTree,
    features: &'a EnabledFeatures,
    rule_sets: &'a [RuleSet],
    keys: &'a mut dyn KeyGenerator,
    mark_defs: MarkDefAccumulator,
    depth: usize,
    max_depth: Option<usize>,
}

impl<'a> WalkContext<'a> {
    pub fn new(
        dom: &'a mut DomTree,
        features: &'a EnabledFeatures,
        rule_sets: &'a [RuleSet],
        keys: &'a mut dyn KeyGenerator,
    ) -> Self {
        Self {
            dom,
            features,
            rule_sets,
            keys,
            mark_defs: MarkDefAccumulator::new(),
            depth: 0,
            max_depth: None,
        }
    }

    /// Fail with `DepthLimitExceeded` past `limit` nested nodes
    pub fn with_max_depth(mut self, limit: Option<usize>) -> Self {
        self.max_depth = limit;
        self
    }

    #[inline]
    pub fn dom(&self) -> &DomTree {
        self.dom
    }

    /// Rules may rewrite the tree, e.g. to append fallback text
    #[inline]
    pub fn dom_mut(&mut self) -> &mut DomTree {
        self.dom
    }

    #[inline]
    pub fn features(&self) -> &'a EnabledFeatures {
        self.features
    }

    /// Fresh key, unique within this conversion
    pub fn generate_key(&mut self) -> String {
        self.keys.generate()
    }

    /// Wrap a block so it is lifted to the top level unchanged
    pub fn make_block(&self, block: Block) -> TypedObject {
        TypedObject::Hoisted(Box::new(block))
    }

    /// Mark definitions registered so far
    pub fn mark_defs(&self) -> &MarkDefAccumulator {
        &self.mark_defs
    }

    /// Finish the walk, keeping the registered mark definitions
    pub fn into_mark_defs(self) -> MarkDefAccumulator {
        self.mark_defs
    }

    /// Resume the walk on one node, many nodes, or a node's children.
    ///
    /// Results are concatenated in input order.
    pub fn next(&mut self, input: impl Into<NextInput>) -> DeserializeResult<Vec<TypedObject>> {
        let nodes = match input.into() {
            NextInput::One(id) => vec![id],
            NextInput::Many(ids) => ids,
            NextInput::ChildrenOf(id) => {
                self.check_handle(id)?;
                self.dom.children(id).to_vec()
            }
        };
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            self.check_handle(node)?;
            out.extend(self.walk_node(node)?);
        }
        Ok(out)
    }

    /// Walk the children of `node`
    #[inline]
    pub fn next_children(&mut self, node: NodeId) -> DeserializeResult<Vec<TypedObject>> {
        self.next(NextInput::ChildrenOf(node))
    }

    fn check_handle(&self, id: NodeId) -> DeserializeResult<()> {
        if self.dom.contains(id) {
            Ok(())
        } else {
            Err(DeserializeError::unknown_shape(format!(
                "node handle {} does not belong to this tree",
                id.as_raw()
            )))
        }
    }

    fn walk_node(&mut self, node: NodeId) -> DeserializeResult<Vec<TypedObject>> {
        if let Some(limit) = self.max_depth {
            if self.depth >= limit {
                return Err(DeserializeError::DepthLimitExceeded { limit });
            }
        }
        self.depth += 1;
        let result = self.dispatch(node);
        self.depth -= 1;
        result
    }

    fn dispatch(&mut self, node: NodeId) -> DeserializeResult<Vec<TypedObject>> {
        let rule_sets = self.rule_sets;
        for set in rule_sets {
            for rule in set.rules() {
                let objects = match rule.deserialize(node, self)? {
                    RuleOutcome::NoMatch => continue,
                    RuleOutcome::Suppressed => {
                        trace!(set = set.name(), rule = rule.name(), tag = self.dom.tag(node), "suppressed");
                        return Ok(Vec::new());
                    }
                    RuleOutcome::One(object) => vec![object],
                    RuleOutcome::Many(objects) => objects,
                };
                trace!(set = set.name(), rule = rule.name(), tag = self.dom.tag(node), count = objects.len(), "matched");

                let mut out = Vec::with_capacity(objects.len());
                for object in objects {
                    let problem = if set.is_checked() { object.shape_error() } else { None };
                    if let Some(reason) = problem {
                        let value = object.to_json().to_string();
                        warn!(rule = rule.name(), reason, %value, "rule returned an invalid object");
                        return Err(DeserializeError::RuleContractViolation {
                            rule: rule.name().to_string(),
                            reason,
                            value,
                        });
                    }
                    for resolved in resolve(object, &mut self.mark_defs) {
                        out.push(self.fix_up(node, resolved));
                    }
                }
                return Ok(out);
            }
        }
        self.next_children(node)
    }

    /// List nesting and quote boundaries for block results
    fn fix_up(&self, node: NodeId, object: TypedObject) -> TypedObject {
        let TypedObject::Block(mut block) = object else {
            return object;
        };
        if block.list_item.is_some() {
            let base = block.level.unwrap_or(1);
            block.level = Some(base + list_nesting(self.dom, node));
        }
        if block.style == QUOTE_STYLE || self.dom.tag(node) == "blockquote" {
            split_quote_boundaries(&mut block);
        }
        TypedObject::Block(block)
    }
}

/// Number of `li` elements a list item is nested in.
///
/// Steps two levels at a time (`li > ul > li`), the way list markup nests.
pub fn list_nesting(dom: &DomTree, node: NodeId) -> u32 {
    let grandparent = |id: NodeId| dom.parent(id).and_then(|p| dom.parent(p));
    let mut nesting = 0;
    let mut cursor = grandparent(node);
    while let Some(ancestor) = cursor {
        if dom.tag(ancestor) != "li" {
            break;
        }
        nesting += 1;
        cursor = grandparent(ancestor);
    }
    nesting
}

fn split_quote_boundaries(block: &mut Block) {
    let last = block.children.len().saturating_sub(1);
    let children = std::mem::take(&mut block.children);
    for (index, mut child) in children.into_iter().enumerate() {
        if let TypedObject::Span(span) = &mut child {
            if span.text == QUOTE_BOUNDARY {
                if index == 0 || index == last {
                    continue;
                }
                span.text = "\n\n".to_string();
            }
        }
        block.children.push(child);
    }
}
