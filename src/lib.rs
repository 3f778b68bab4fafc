//! html-blocks - HTML to structured rich-text blocks
//!
//! ## Core Concepts
//!
//! **Feature-gated output**: every conversion runs against an
//! [`EnabledFeatures`] allow-list of styles, decorators, list types and
//! annotations. Anything outside it degrades to plain content.
//!
//! **Dialect-aware**: Word, Notion and Google Docs clipboard markup is
//! detected, cleaned and tagged before rules run.
//!
//! **First match wins**: rule sets (custom, Word, Notion, Google Docs, HTML)
//! are tried in order per DOM node; unclaimed nodes are transparent.
//!
//! ## Modules
//! - `node`: Arena DOM (`DomTree`, `NodeId`)
//! - `convert`: HTML parser capability
//! - `transform`: Preprocessing pipeline
//! - `rules`: Deserialization rules and rule sets
//! - `walker`: Rule resolution over the DOM
//! - `placeholder`: Decorator / annotation resolution
//! - `normalize`: Block normalization passes
//! - `features`: Enabled features and schema resolution
//! - `types`: Output object model
//!
//! ## Usage
//!
//! ```ignore
//! use html_blocks::prelude::*;
//!
//! let features = EnabledFeatures::builder()
//!     .styles(["normal"])
//!     .decorators(["strong"])
//!     .build();
//!
//! let blocks = html_to_blocks("<p>Hello <b>world</b></p>", &features)?;
//! assert_eq!(blocks[0].plain_text(), "Hello world");
//! ```

// =============================================================================
// Core modules
// =============================================================================

/// Node types: DomTree, NodeId, Element, Text
pub mod node;

/// Attribute storage
pub mod attr;

/// HTML parsing capability
pub mod convert;

/// Preprocessing: dialect detection and cleanup
pub mod transform;

/// Deserialization rules
pub mod rules;

/// Rule resolution over the DOM
pub mod walker;

/// Placeholder resolution
pub mod placeholder;

/// Normalization passes
pub mod normalize;

/// Conversion engine
pub mod deserializer;

/// Enabled features and schema resolution
pub mod features;

/// Output object model
pub mod types;

/// Key generation
pub mod hash;

/// Error types
pub mod error;

/// DOM rendering for tracing and tests
pub mod render;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// Engine
pub use deserializer::{html_to_blocks, DeserializerOptions, HtmlDeserializer, KeyGeneratorFactory};

// Features
pub use features::{resolve_features, ArraySchema, BlockContentFeatures, EnabledFeatures};

// Output model
pub use types::{Block, InlineObject, MarkDef, Span, TypedObject};

// Rules
pub use rules::{rule_fn, DeserializationRule, RuleOutcome, RuleSet};
pub use walker::{NextInput, WalkContext};

// Preprocessing
pub use transform::WhitespaceMode;
pub use normalize::WhitespaceMergePolicy;

// DOM
pub use convert::HtmlParser;
pub use node::{DomTree, NodeId};

// Keys
pub use hash::{KeyGenerator, StableKeys};

// Error types
pub use error::{ConfigurationError, DeserializeError, DeserializeResult};
