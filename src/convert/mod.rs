//! HTML parsing capability
//!
//! The deserializer never parses HTML itself; it asks an [`HtmlParser`] for
//! a fresh [`DomTree`]. Parsers are injectable so hosts can bring their own.
//!
//! # Supported Backends
//!
//! | Backend | Feature | Type |
//! |---------|---------|------|
//! | html5ever | `html-parser` | [`Html5everParser`] |
//!
//! # Adding New Parsers
//!
//! A parser only needs to produce a `DomTree` whose document node holds an
//! `html > body` skeleton (or content directly under the document node) with
//! lowercase tag names.

use crate::error::DeserializeResult;
use crate::node::DomTree;

#[cfg(feature = "html-parser")]
mod html;

#[cfg(feature = "html-parser")]
pub use self::html::Html5everParser;

/// Given a string of HTML, produce a navigable DOM tree.
pub trait HtmlParser: Send + Sync {
    /// Parse `html` into a new tree owned by the caller.
    fn parse(&self, html: &str) -> DeserializeResult<DomTree>;
}

impl<F> HtmlParser for F
where
    F: Fn(&str) -> DeserializeResult<DomTree> + Send + Sync,
{
    fn parse(&self, html: &str) -> DeserializeResult<DomTree> {
        self(html)
    }
}

/// The parser used when the caller supplies none, if one is compiled in.
pub fn default_parser() -> Option<Box<dyn HtmlParser>> {
    #[cfg(feature = "html-parser")]
    {
        Some(Box::new(Html5everParser::default()))
    }
    #[cfg(not(feature = "html-parser"))]
    {
        None
    }
}
