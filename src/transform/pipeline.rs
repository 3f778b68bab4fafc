//! Preprocessing pipeline.

use tracing::trace;

use crate::node::DomTree;
use crate::render::render_body;

use super::Preprocessor;

// =============================================================================
// Pipeline
// =============================================================================

/// Synchronous pipeline over one parsed tree.
///
/// Wraps a `DomTree` together with the raw HTML it came from and provides a
/// fluent API for chaining preprocessors.
///
/// # Example
///
/// ```ignore
/// use html_blocks::transform::{Pipeline, NormalizeWhitespace, CleanHtml};
///
/// let dom = Pipeline::new(html, dom)
///     .pipe(NormalizeWhitespace)
///     .pipe(CleanHtml)
///     .into_inner();
/// ```
pub struct Pipeline<'h> {
    html: &'h str,
    dom: DomTree,
}

impl<'h> Pipeline<'h> {
    /// Create a new pipeline from a tree and its source.
    #[inline]
    pub fn new(html: &'h str, dom: DomTree) -> Self {
        Self { html, dom }
    }

    /// Apply a preprocessor to the tree.
    pub fn pipe<T>(mut self, preprocessor: T) -> Self
    where
        T: Preprocessor,
    {
        preprocessor.preprocess(self.html, &mut self.dom);
        trace!(stage = preprocessor.name(), html = %render_body(&self.dom), "preprocessed");
        self
    }

    /// Conditionally apply a preprocessor.
    ///
    /// Only applies the preprocessor if `condition` is true.
    #[inline]
    pub fn pipe_if<T>(self, condition: bool, preprocessor: T) -> Self
    where
        T: Preprocessor,
    {
        if condition {
            self.pipe(preprocessor)
        } else {
            self
        }
    }

    /// Consume the pipeline and return the tree.
    #[inline]
    pub fn into_inner(self) -> DomTree {
        self.dom
    }
}

impl From<Pipeline<'_>> for DomTree {
    #[inline]
    fn from(pipeline: Pipeline<'_>) -> Self {
        pipeline.into_inner()
    }
}
