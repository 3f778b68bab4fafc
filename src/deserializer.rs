//! The conversion engine.
//!
//! [`HtmlDeserializer`] is immutable after construction and can be shared
//! across threads. Every [`HtmlDeserializer::deserialize`] call parses into
//! its own tree and collects mark definitions into its own accumulator.
//!
//! # Example
//!
//! ```ignore
//! use html_blocks::prelude::*;
//!
//! let features = EnabledFeatures::builder()
//!     .styles(["normal", "h1"])
//!     .decorators(["strong", "em"])
//!     .lists(["bullet"])
//!     .annotations(["link"])
//!     .build();
//!
//! let engine = HtmlDeserializer::new(features, DeserializerOptions::default());
//! let blocks = engine.deserialize("<p>Hello <b>world</b></p>")?;
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::convert::{default_parser, HtmlParser};
use crate::error::{DeserializeError, DeserializeResult};
use crate::features::EnabledFeatures;
use crate::hash::{KeyGenerator, StableKeys};
use crate::normalize::{
    attach_mark_defs, ensure_root_is_blocks, flatten_nested_blocks, normalize_block,
    trim_whitespace, WhitespaceMergePolicy,
};
use crate::rules::{standard_rule_sets, DeserializationRule, RuleSet};
use crate::transform::{
    find_google_docs_marker, is_notion, is_word, preprocess, PreprocessOptions, WhitespaceMode,
};
use crate::types::Block;
use crate::walker::WalkContext;

/// Builds the key generator for one conversion from its input
pub type KeyGeneratorFactory = Arc<dyn Fn(&str) -> Box<dyn KeyGenerator> + Send + Sync>;

// =============================================================================
// DeserializerOptions
// =============================================================================

/// Construction options for [`HtmlDeserializer`].
#[derive(Default)]
pub struct DeserializerOptions {
    rules: Vec<Box<dyn DeserializationRule>>,
    whitespace_mode: WhitespaceMode,
    parser: Option<Arc<dyn HtmlParser>>,
    key_generator: Option<KeyGeneratorFactory>,
    merge_policy: WhitespaceMergePolicy,
    max_depth: Option<usize>,
}

impl DeserializerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom rules, consulted before every built-in rule set
    pub fn with_rules(mut self, rules: Vec<Box<dyn DeserializationRule>>) -> Self {
        self.rules = rules;
        self
    }

    /// Append one custom rule
    pub fn with_rule<R: DeserializationRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Google Docs whitespace policy
    pub fn with_whitespace_mode(mut self, mode: WhitespaceMode) -> Self {
        self.whitespace_mode = mode;
        self
    }

    /// Override the HTML parser
    pub fn with_parser(mut self, parser: impl HtmlParser + 'static) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Override key generation; called once per conversion with its input
    pub fn with_key_generator<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str) -> Box<dyn KeyGenerator> + Send + Sync + 'static,
    {
        self.key_generator = Some(Arc::new(factory));
        self
    }

    /// Tie-break for lone whitespace spans
    pub fn with_merge_policy(mut self, policy: WhitespaceMergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Fail conversions whose DOM nests deeper than `limit`
    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }
}

impl std::fmt::Debug for DeserializerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeserializerOptions")
            .field("rules", &self.rules.len())
            .field("whitespace_mode", &self.whitespace_mode)
            .field("parser", &self.parser.is_some())
            .field("key_generator", &self.key_generator.is_some())
            .field("merge_policy", &self.merge_policy)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

// =============================================================================
// HtmlDeserializer
// =============================================================================

/// Converts HTML fragments to blocks under a fixed feature set.
pub struct HtmlDeserializer {
    features: EnabledFeatures,
    rule_sets: Vec<RuleSet>,
    preprocess: PreprocessOptions,
    parser: Option<Arc<dyn HtmlParser>>,
    key_generator: Option<KeyGeneratorFactory>,
    merge_policy: WhitespaceMergePolicy,
    max_depth: Option<usize>,
}

impl HtmlDeserializer {
    pub fn new(features: EnabledFeatures, options: DeserializerOptions) -> Self {
        let parser = options
            .parser
            .or_else(|| default_parser().map(Arc::from));
        Self {
            features,
            rule_sets: standard_rule_sets(options.rules),
            preprocess: PreprocessOptions {
                whitespace_mode: options.whitespace_mode,
            },
            parser,
            key_generator: options.key_generator,
            merge_policy: options.merge_policy,
            max_depth: options.max_depth,
        }
    }

    pub fn features(&self) -> &EnabledFeatures {
        &self.features
    }

    pub fn rule_sets(&self) -> &[RuleSet] {
        &self.rule_sets
    }

    fn keys_for(&self, html: &str) -> Box<dyn KeyGenerator> {
        match &self.key_generator {
            Some(factory) => factory(html),
            None => Box::new(StableKeys::for_input(html)),
        }
    }

    /// Convert one HTML fragment.
    pub fn deserialize(&self, html: &str) -> DeserializeResult<Vec<Block>> {
        let html = html.trim();
        let parser = self.parser.as_deref().ok_or_else(|| {
            DeserializeError::environment(
                "no default parser compiled in; enable the `html-parser` feature or supply one",
            )
        })?;

        let dom = parser.parse(html)?;
        debug!(
            len = html.len(),
            word = is_word(html),
            notion = is_notion(html),
            google_docs = find_google_docs_marker(&dom).is_some(),
            "deserializing html"
        );
        let mut dom = preprocess(html, dom, &self.preprocess);

        let mut keys = self.keys_for(html);
        let body = dom.body();
        let (objects, mark_defs) = {
            let mut cx = WalkContext::new(&mut dom, &self.features, &self.rule_sets, keys.as_mut())
                .with_max_depth(self.max_depth);
            let objects = cx.next_children(body)?;
            (objects, cx.into_mark_defs())
        };

        let blocks = flatten_nested_blocks(ensure_root_is_blocks(objects));
        let mut blocks: Vec<Block> = blocks
            .into_iter()
            .map(|b| trim_whitespace(b, self.merge_policy))
            .collect();
        attach_mark_defs(&mut blocks, &mark_defs);
        let blocks: Vec<Block> = blocks
            .into_iter()
            .map(|b| normalize_block(b, &self.features, keys.as_mut()))
            .collect();

        debug!(blocks = blocks.len(), mark_defs = mark_defs.len(), "deserialized");
        Ok(blocks)
    }

    /// Convert many fragments in parallel against this engine.
    #[cfg(feature = "parallel")]
    pub fn deserialize_batch(&self, inputs: &[&str]) -> Vec<DeserializeResult<Vec<Block>>> {
        use rayon::prelude::*;

        inputs.par_iter().map(|html| self.deserialize(html)).collect()
    }
}

impl std::fmt::Debug for HtmlDeserializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlDeserializer")
            .field("features", &self.features)
            .field("rule_sets", &self.rule_sets)
            .field("preprocess", &self.preprocess)
            .field("parser", &self.parser.is_some())
            .field("merge_policy", &self.merge_policy)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// One-off conversion with default options.
pub fn html_to_blocks(html: &str, features: &EnabledFeatures) -> DeserializeResult<Vec<Block>> {
    HtmlDeserializer::new(features.clone(), DeserializerOptions::default()).deserialize(html)
}
