//! Error types for html-blocks.
//!
//! Every error is local to a single conversion and deterministic for a given
//! input; there is no partial-result mode.

use thiserror::Error;

/// Invalid schema or feature configuration, detected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The block-content array has no member deriving from `block`
    #[error("'block' type is not defined in this schema (required)")]
    MissingBlockType,

    /// A required field is not declared on the block type
    #[error("a field with name '{0}' is not defined in the block type (required)")]
    MissingField(&'static str),

    /// The `style` field declares no usable style
    #[error("the style field needs at least one style defined, e.g. {{title: 'Normal', value: 'normal'}}")]
    EmptyStyles,

    /// The `list` field has no option list at all
    #[error("the list field needs at least an empty list of options")]
    MissingListOptions,

    /// The block type has no `children` field, or it holds no `span` type
    #[error("the block type's 'children' field must allow the 'span' type")]
    MissingSpanType,
}

/// Errors that can occur while converting HTML to blocks.
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// Configuration problem surfaced through a conversion call
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// No HTML parser available and none supplied
    #[error("no HTML parser available: {0}")]
    Environment(String),

    /// The HTML parser failed
    #[error("failed to parse HTML: {0}")]
    Parse(String),

    /// A rule returned a value outside the allowed shape
    #[error("rule `{rule}` returned an invalid deserialized representation ({reason}): {value}")]
    RuleContractViolation {
        /// Name of the offending rule
        rule: String,
        /// What is wrong with the value
        reason: &'static str,
        /// The offending value, serialized
        value: String,
    },

    /// The walker continuation received something it cannot walk
    #[error("cannot walk child shape: {0}")]
    UnknownChildShape(String),

    /// The DOM is nested deeper than the configured budget
    #[error("maximum walk depth of {limit} exceeded")]
    DepthLimitExceeded {
        /// Configured maximum depth
        limit: usize,
    },
}

/// Result type alias for conversion operations.
pub type DeserializeResult<T> = Result<T, DeserializeError>;

impl DeserializeError {
    /// Create an environment error with a message.
    pub fn environment(msg: impl Into<String>) -> Self {
        Self::Environment(msg.into())
    }

    /// Create a parse error from any error type.
    pub fn parse(err: impl std::fmt::Display) -> Self {
        Self::Parse(err.to_string())
    }

    /// Create an unknown-shape error with a description of the input.
    pub fn unknown_shape(desc: impl Into<String>) -> Self {
        Self::UnknownChildShape(desc.into())
    }
}
