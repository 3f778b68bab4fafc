//! Microsoft Word clipboard cleanup.
//!
//! Word pastes carry list bullets as literal text inside `mso-list:Ignore`
//! spans, `<o:p>` paragraph markers, and headings expressed only through
//! `Mso*` class names. This pass removes the cruft, remembers which list type
//! each bullet stood for, and turns the known classes into semantic tags.

use std::sync::LazyLock;

use regex::Regex;

use crate::node::{DomTree, NodeId};

use super::{tag_elements, Preprocessor, DATA_IS_WORD, DATA_WORD_LIST};

static WORD_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(class="?Mso|style=(?:"|')[^"]*?\bmso-|w:WordDocument|<o:\w+>|</font>)"#).unwrap()
});

/// Class name to the element chain that replaces it, outermost first
const CLASS_REMAPS: &[(&str, &[&str])] = &[
    ("MsoTitle", &["h1"]),
    ("MsoToaHeading", &["h2"]),
    ("MsoTocHeading", &["h3"]),
    ("MsoSubtitle", &["h5"]),
    ("MsoSubtleEmphasis", &["span", "em"]),
    ("MsoIntenseEmphasis", &["span", "em", "strong"]),
];

/// Whether the raw HTML was produced by Microsoft Word
pub fn is_word(html: &str) -> bool {
    WORD_MARKER.is_match(html)
}

/// Whether an inline style holds the `mso-list:Ignore` bullet marker
fn is_list_marker(style: &str) -> bool {
    let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
    compact.to_ascii_lowercase().contains("mso-list:ignore")
}

/// List type a bullet placeholder stands for: `number` for `1.`, `a)`, `iv.`
fn marker_list_type(marker: &str) -> &'static str {
    let marker = marker.trim_matches(|c: char| c.is_whitespace() || c == '\u{a0}');
    let numbered = marker.starts_with(|c: char| c.is_ascii_digit())
        || (marker.len() <= 5
            && (marker.ends_with('.') || marker.ends_with(')'))
            && marker[..marker.len() - 1].chars().all(|c| c.is_ascii_alphanumeric()));
    if numbered { "number" } else { "bullet" }
}

/// Cleans up Word markup and tags it with `data-is-word`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanWord;

impl CleanWord {
    fn remove_list_markers(dom: &mut DomTree, root: NodeId) {
        let markers = dom.find_all(root, |dom, id| {
            dom.tag(id) == "span" && dom.attr(id, "style").is_some_and(is_list_marker)
        });
        for marker in markers {
            let list_type = marker_list_type(&dom.text_content(marker));
            let paragraph = dom.ancestors(marker).find(|&a| dom.tag(a) == "p");
            if let Some(p) = paragraph {
                dom.set_attr(p, DATA_WORD_LIST, list_type);
            }
            dom.detach(marker);
        }
    }

    fn remove_paragraph_markers(dom: &mut DomTree, root: NodeId) {
        for id in dom.find_all(root, |dom, id| dom.tag(id) == "o:p") {
            dom.detach(id);
        }
    }

    fn remap_classes(dom: &mut DomTree, root: NodeId) {
        for &(class, chain) in CLASS_REMAPS {
            let matches = dom.find_all(root, |dom, id| {
                dom.element(id).is_some_and(|e| e.attrs.has_class(class))
            });
            for id in matches {
                let text = dom.text_content(id);
                let mut outer = None;
                let mut inner = None;
                for &tag in chain {
                    let el = dom.create_element(tag);
                    dom.set_attr(el, DATA_IS_WORD, "true");
                    match inner {
                        Some(parent) => dom.append_child(parent, el),
                        None => outer = Some(el),
                    }
                    inner = Some(el);
                }
                let (Some(outer), Some(inner)) = (outer, inner) else { continue };
                let text = dom.create_text(text);
                dom.append_child(inner, text);
                dom.replace_with(id, &[outer]);
            }
        }
    }
}

impl Preprocessor for CleanWord {
    fn preprocess(&self, _html: &str, dom: &mut DomTree) {
        let root = dom.root();
        tag_elements(dom, root, DATA_IS_WORD);
        Self::remove_list_markers(dom, root);
        Self::remove_paragraph_markers(dom, root);
        Self::remap_classes(dom, root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection() {
        assert!(is_word(r#"<p class=MsoNormal>x</p>"#));
        assert!(is_word(r#"<p class="MsoNormal">x</p>"#));
        assert!(is_word(r#"<p style="margin:0;mso-list:l0 level1 lfo1">x</p>"#));
        assert!(is_word("<xml><w:WordDocument></w:WordDocument></xml>"));
        assert!(is_word("<p>x<o:p></o:p></p>"));
        assert!(!is_word("<p class=\"normal\">plain</p>"));
    }

    #[test]
    fn test_marker_list_type() {
        assert_eq!(marker_list_type("1."), "number");
        assert_eq!(marker_list_type("12)"), "number");
        assert_eq!(marker_list_type("a)"), "number");
        assert_eq!(marker_list_type("iv.\u{a0}"), "number");
        assert_eq!(marker_list_type("·"), "bullet");
        assert_eq!(marker_list_type("o"), "bullet");
        assert_eq!(marker_list_type("§"), "bullet");
    }

    #[cfg(feature = "html-parser")]
    #[test]
    fn test_cleans_word_markup() {
        use crate::transform::test_support::run;

        let html = concat!(
            r#"<p class="MsoListParagraphCxSpFirst" style="mso-list:l0 level1 lfo1">"#,
            r#"<span style="mso-list:Ignore">1.<span> </span></span>One<o:p></o:p></p>"#,
            r#"<p class="MsoTitle">Title</p>"#,
        );
        assert_eq!(
            run(CleanWord, html),
            concat!(
                r#"<p class="MsoListParagraphCxSpFirst" style="mso-list:l0 level1 lfo1" data-is-word="true" data-word-list="number">One</p>"#,
                r#"<h1 data-is-word="true">Title</h1>"#,
            )
        );
    }

    #[cfg(feature = "html-parser")]
    #[test]
    fn test_emphasis_classes_become_chains() {
        use crate::transform::test_support::run;

        let html = r#"<p class="MsoNormal"><span class="MsoIntenseEmphasis">Loud</span></p>"#;
        assert_eq!(
            run(CleanWord, html),
            concat!(
                r#"<p class="MsoNormal" data-is-word="true">"#,
                r#"<span data-is-word="true"><em data-is-word="true"><strong data-is-word="true">Loud</strong></em></span></p>"#,
            )
        );
    }
}
