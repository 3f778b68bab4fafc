//! DOM preprocessing: dialect detection and cleanup before rules run.
//!
//! # Module Structure
//!
//! - `Preprocessor` - Core trait for in-place DOM rewrites
//! - `Pipeline` - Chains preprocessors over one tree
//! - `NormalizeWhitespace` - Collapses whitespace outside `<pre>`
//! - `TagNotion` - Marks Notion-sourced markup
//! - `CleanWord` - Marks and cleans Microsoft Word markup
//! - `TagGoogleDocs` - Marks and cleans Google Docs markup
//! - `CleanHtml` - Generic cleanup, always last
//!
//! The order is fixed: dialect rules assume their preprocessor has already
//! tagged the tree, and the generic cleaner must not delete nodes a dialect
//! pass still inspects.
//!
//! # Example
//!
//! ```ignore
//! use html_blocks::transform::{preprocess, PreprocessOptions};
//!
//! let dom = preprocess(html, parser.parse(html)?, &PreprocessOptions::default());
//! ```

mod gdocs;
mod html;
mod notion;
mod pipeline;
mod whitespace;
mod word;

pub use gdocs::{find_google_docs_marker, TagGoogleDocs};
pub use html::CleanHtml;
pub use notion::{is_notion, TagNotion};
pub use pipeline::Pipeline;
pub use whitespace::NormalizeWhitespace;
pub use word::{is_word, CleanWord};

pub(crate) use whitespace::{collapse_runs, collapse_spaces, is_blank};

use crate::node::DomTree;

/// Set on every element of a Notion document
pub const DATA_IS_NOTION: &str = "data-is-notion";
/// Set on every element of a Word document
pub const DATA_IS_WORD: &str = "data-is-word";
/// List type (`bullet` / `number`) recovered from a Word list marker
pub const DATA_WORD_LIST: &str = "data-word-list";
/// Set on every element of a Google Docs document
pub const DATA_IS_GOOGLE_DOCS: &str = "data-is-google-docs";
/// Set on the top-level elements of a Google Docs document
pub const DATA_IS_ROOT_NODE: &str = "data-is-root-node";

// =============================================================================
// Preprocessor
// =============================================================================

/// Rewrite a freshly parsed tree in place.
pub trait Preprocessor {
    /// Name used in trace output.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Rewrite `dom`. `html` is the raw input the tree was parsed from.
    fn preprocess(&self, html: &str, dom: &mut DomTree);
}

/// How Google Docs whitespace-only paragraphs are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhitespaceMode {
    /// Keep every empty paragraph
    #[default]
    Preserve,
    /// Collapse runs of empty paragraphs to one
    Normalize,
    /// Drop all empty paragraphs and separating line breaks
    Remove,
}

/// Options for the standard preprocessing pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreprocessOptions {
    pub whitespace_mode: WhitespaceMode,
}

/// Run the standard preprocessors, in order, over a parsed tree.
///
/// Notion and Word passes only run when the raw HTML carries their markers.
pub fn preprocess(html: &str, dom: DomTree, options: &PreprocessOptions) -> DomTree {
    Pipeline::new(html, dom)
        .pipe(NormalizeWhitespace)
        .pipe_if(is_notion(html), TagNotion)
        .pipe_if(is_word(html), CleanWord)
        .pipe(TagGoogleDocs::new(options.whitespace_mode))
        .pipe(CleanHtml)
        .into_inner()
}

/// Tag every element under `from` (inclusive) with `name="true"`
pub(crate) fn tag_elements(dom: &mut DomTree, from: crate::node::NodeId, name: &str) {
    let elements = dom.find_all(from, |dom, id| dom.element(id).is_some());
    for id in elements {
        dom.set_attr(id, name, "true");
    }
}

#[cfg(all(test, feature = "html-parser"))]
pub(crate) mod test_support {
    use crate::convert::{Html5everParser, HtmlParser};
    use crate::node::DomTree;
    use crate::render::render_body;

    use super::Preprocessor;

    pub fn parse(html: &str) -> DomTree {
        Html5everParser.parse(html).unwrap()
    }

    /// Parse, run one preprocessor, render the body back
    pub fn run<P: Preprocessor>(p: P, html: &str) -> String {
        let mut dom = parse(html);
        p.preprocess(html, &mut dom);
        render_body(&dom)
    }
}

#[cfg(all(test, feature = "html-parser"))]
mod tests {
    use super::test_support::parse;
    use super::*;
    use crate::render::render_body;

    #[test]
    fn test_standard_pipeline_on_plain_html() {
        let html = "<p>Hello   <b>world</b></p>\n<!-- note --><script>x()</script>";
        let dom = preprocess(html, parse(html), &PreprocessOptions::default());
        assert_eq!(render_body(&dom), "<p>Hello <b>world</b></p><span> </span>");
    }

    #[test]
    fn test_plain_html_gets_no_dialect_tags() {
        let html = "<p>plain</p>";
        let dom = preprocess(html, parse(html), &PreprocessOptions::default());
        let rendered = render_body(&dom);
        assert!(!rendered.contains(DATA_IS_NOTION));
        assert!(!rendered.contains(DATA_IS_WORD));
        assert!(!rendered.contains(DATA_IS_GOOGLE_DOCS));
    }

    #[test]
    fn test_dialect_passes_follow_detection() {
        let html = "<!-- notionvc: 1 --><p>n</p>";
        let rendered = render_body(&preprocess(html, parse(html), &PreprocessOptions::default()));
        assert!(rendered.contains(DATA_IS_NOTION));
        assert!(!rendered.contains(DATA_IS_WORD));

        let html = "<p class=MsoNormal>w<o:p></o:p></p>";
        let rendered = render_body(&preprocess(html, parse(html), &PreprocessOptions::default()));
        assert!(rendered.contains(DATA_IS_WORD));
        assert!(!rendered.contains("o:p"));
        assert!(!rendered.contains(DATA_IS_NOTION));
    }
}
