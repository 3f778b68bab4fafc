//! Deserialization rules.
//!
//! # Module Structure
//!
//! - `DeserializationRule` - Core trait: map one DOM node to typed objects
//! - `RuleOutcome` - Closed set of rule results
//! - `RuleSet` - Ordered, named group of rules
//! - `html` - Generic HTML semantics, always last
//! - `word` / `notion` / `gdocs` - Dialect rules, inert on untagged trees
//!
//! Rule sets are consulted per node in a fixed order: custom, Word, Notion,
//! Google Docs, generic HTML. The first rule that does not return
//! [`RuleOutcome::NoMatch`] wins.
//!
//! # Example
//!
//! ```ignore
//! use html_blocks::rules::{rule_fn, RuleOutcome};
//! use html_blocks::types::{Block, DEFAULT_STYLE};
//!
//! // Render every <section> as its own block
//! let sections = rule_fn("section", |node, cx| {
//!     if cx.dom().tag(node) != "section" {
//!         return Ok(RuleOutcome::NoMatch);
//!     }
//!     let children = cx.next_children(node)?;
//!     Ok(RuleOutcome::One(Block::new(DEFAULT_STYLE).with_children(children).into()))
//! });
//! ```

pub mod gdocs;
pub mod html;
pub mod notion;
pub mod word;

use smallvec::SmallVec;

use crate::error::DeserializeResult;
use crate::node::NodeId;
use crate::types::{Block, Span, TypedObject};
use crate::walker::WalkContext;

// =============================================================================
// RuleOutcome
// =============================================================================

/// What a rule made of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// The rule does not apply; try the next one
    NoMatch,
    /// The rule applies and the node (with its subtree) yields nothing
    Suppressed,
    One(TypedObject),
    Many(Vec<TypedObject>),
}

impl From<TypedObject> for RuleOutcome {
    fn from(object: TypedObject) -> Self {
        RuleOutcome::One(object)
    }
}

impl From<Block> for RuleOutcome {
    fn from(block: Block) -> Self {
        RuleOutcome::One(TypedObject::Block(block))
    }
}

impl From<Span> for RuleOutcome {
    fn from(span: Span) -> Self {
        RuleOutcome::One(TypedObject::Span(span))
    }
}

impl From<Vec<TypedObject>> for RuleOutcome {
    fn from(objects: Vec<TypedObject>) -> Self {
        RuleOutcome::Many(objects)
    }
}

// =============================================================================
// DeserializationRule
// =============================================================================

/// Map a DOM node to typed objects.
///
/// Rules receive the walk context, which gives access to the tree, the
/// enabled features, the `next` continuation and `make_block`.
pub trait DeserializationRule: Send + Sync {
    /// Name used in logs and contract-violation errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn deserialize(&self, node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome>;
}

/// Rule backed by a function or closure. Created by [`rule_fn`].
pub struct FnRule<F> {
    name: String,
    f: F,
}

impl<F> DeserializationRule for FnRule<F>
where
    F: Fn(NodeId, &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn deserialize(&self, node: NodeId, cx: &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> {
        (self.f)(node, cx)
    }
}

impl<F> std::fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnRule").field("name", &self.name).finish()
    }
}

/// Wrap a function as a named rule.
pub fn rule_fn<F>(name: impl Into<String>, f: F) -> FnRule<F>
where
    F: Fn(NodeId, &mut WalkContext<'_>) -> DeserializeResult<RuleOutcome> + Send + Sync,
{
    FnRule { name: name.into(), f }
}

// =============================================================================
// RuleSet
// =============================================================================

/// Ordered group of rules tried in declaration order.
pub struct RuleSet {
    name: String,
    rules: Vec<Box<dyn DeserializationRule>>,
    trusted: bool,
}

impl RuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            trusted: false,
        }
    }

    /// Build from already boxed rules
    pub fn from_rules(name: impl Into<String>, rules: Vec<Box<dyn DeserializationRule>>) -> Self {
        Self {
            name: name.into(),
            rules,
            trusted: false,
        }
    }

    /// Append a rule
    pub fn rule<R: DeserializationRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Skip output shape checks; only for rules that cannot build invalid objects
    pub(crate) fn trusted(mut self) -> Self {
        self.trusted = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether rule output is checked against the block contract
    pub fn is_checked(&self) -> bool {
        !self.trusted
    }

    pub fn rules(&self) -> &[Box<dyn DeserializationRule>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("name", &self.name)
            .field("trusted", &self.trusted)
            .field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Rule sets in evaluation order, custom rules first
pub fn standard_rule_sets(custom: Vec<Box<dyn DeserializationRule>>) -> Vec<RuleSet> {
    vec![
        RuleSet::from_rules("custom", custom),
        word::rules(),
        notion::rules(),
        gdocs::rules(),
        html::rules(),
    ]
}

// =============================================================================
// Inline style helpers
// =============================================================================

/// Value of one property in an inline `style` attribute
pub(crate) fn css_property<'s>(style: &'s str, name: &str) -> Option<&'s str> {
    style.split(';').find_map(|decl| {
        let (key, value) = decl.split_once(':')?;
        key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
    })
}

/// Decorators expressed through inline CSS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TextStyle {
    pub strong: bool,
    pub em: bool,
    pub underline: bool,
    pub strike: bool,
}

impl TextStyle {
    pub fn parse(style: &str) -> Self {
        let weight = css_property(style, "font-weight").unwrap_or_default();
        let decoration = [
            css_property(style, "text-decoration"),
            css_property(style, "text-decoration-line"),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase();

        Self {
            strong: matches!(weight, "600" | "700" | "800" | "900" | "bold" | "bolder"),
            em: css_property(style, "font-style").is_some_and(|v| v.eq_ignore_ascii_case("italic")),
            underline: decoration.contains("underline"),
            strike: decoration.contains("line-through"),
        }
    }

    /// Decorator names in application order, outermost first
    pub fn decorators(&self) -> SmallVec<[&'static str; 4]> {
        let mut out = SmallVec::new();
        if self.strong {
            out.push("strong");
        }
        if self.em {
            out.push("em");
        }
        if self.underline {
            out.push("underline");
        }
        if self.strike {
            out.push("strike-through");
        }
        out
    }
}
