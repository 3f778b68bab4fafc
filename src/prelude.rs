//! Prelude module for common imports.
//!
//! ```ignore
//! use html_blocks::prelude::*;
//! ```

// Engine
pub use crate::deserializer::{html_to_blocks, DeserializerOptions, HtmlDeserializer};

// Features
pub use crate::features::{resolve_features, ArraySchema, BlockContentFeatures, EnabledFeatures};

// Output model
pub use crate::types::{
    Block, InlineObject, MarkDef, PlaceholderAnnotation, PlaceholderDecorator, Span, TypedObject,
    DEFAULT_STYLE, LINK_ANNOTATION, QUOTE_STYLE,
};

// Rules
pub use crate::rules::{rule_fn, DeserializationRule, RuleOutcome, RuleSet};
pub use crate::walker::{NextInput, WalkContext};

// Node types
pub use crate::node::{DomTree, NodeData, NodeId, NodeKind};

// Parsing
pub use crate::convert::HtmlParser;

#[cfg(feature = "html-parser")]
pub use crate::convert::Html5everParser;

// Preprocessing and normalization options
pub use crate::normalize::WhitespaceMergePolicy;
pub use crate::transform::{Pipeline, Preprocessor, WhitespaceMode};

// Keys
pub use crate::hash::{KeyGenerator, StableKeys};

// Render
pub use crate::render::{render_body, render_subtree};

// Error
pub use crate::error::{ConfigurationError, DeserializeError, DeserializeResult};
