#![cfg(feature = "html-parser")]

use std::sync::Arc;

use html_blocks::prelude::*;
use rstest::rstest;
use rustc_hash::FxHashSet;
use serde_json::json;

fn features() -> EnabledFeatures {
    EnabledFeatures::builder()
        .styles(["normal", "h1", "h2", "quote"])
        .decorators(["strong", "em", "code"])
        .lists(["bullet", "number"])
        .annotations(["link"])
        .build()
}

fn convert(html: &str, features: &EnabledFeatures) -> Vec<Block> {
    html_to_blocks(html, features).unwrap()
}

fn spans(block: &Block) -> Vec<(&str, Vec<&str>)> {
    block
        .spans()
        .map(|s| (s.text.as_str(), s.marks.iter().map(String::as_str).collect()))
        .collect()
}

fn counter_keys() -> DeserializerOptions {
    DeserializerOptions::new().with_key_generator(|_| {
        let mut n = 0;
        Box::new(move || {
            n += 1;
            format!("key{n}")
        })
    })
}

/// Every markDef is used, and every non-decorator mark has a markDef
fn assert_mark_defs_consistent(blocks: &[Block], features: &EnabledFeatures) {
    for block in blocks {
        let defs: FxHashSet<&str> = block.mark_defs.iter().map(|d| d.key.as_str()).collect();
        let used: FxHashSet<&str> = block
            .spans()
            .flat_map(|s| s.marks.iter())
            .map(String::as_str)
            .filter(|m| !features.has_decorator(m))
            .collect();
        assert_eq!(defs, used);
        assert_eq!(defs.len(), block.mark_defs.len());
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_plain_paragraph() {
    let blocks = convert("<p>Hello <b>world</b></p>", &features());
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].style, "normal");
    assert_eq!(spans(&blocks[0]), vec![("Hello ", vec![]), ("world", vec!["strong"])]);
}

#[test]
fn test_disabled_decorator_degrades() {
    let features = EnabledFeatures::builder().styles(["normal"]).build();
    let blocks = convert("<p>Hello <b>world</b></p>", &features);
    assert_eq!(spans(&blocks[0]), vec![("Hello world", vec![])]);
}

#[test]
fn test_nested_list() {
    let blocks = convert("<ul><li>One<ul><li>Two</li></ul></li></ul>", &features());
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].list_item.as_deref(), Some("bullet"));
    assert_eq!(blocks[0].level, Some(1));
    assert_eq!(blocks[0].plain_text(), "One");
    assert_eq!(blocks[1].list_item.as_deref(), Some("bullet"));
    assert_eq!(blocks[1].level, Some(2));
    assert_eq!(blocks[1].plain_text(), "Two");
}

#[test]
fn test_ordered_list() {
    let blocks = convert("<ol><li>a</li><li>b</li></ol>", &features());
    assert!(blocks.iter().all(|b| b.list_item.as_deref() == Some("number") && b.level == Some(1)));
}

#[test]
fn test_disabled_list_type_becomes_plain_block() {
    let features = EnabledFeatures::builder().styles(["normal"]).lists(["number"]).build();
    let blocks = convert("<ul><li>x</li></ul>", &features);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].list_item, None);
    assert_eq!(blocks[0].level, None);
    assert_eq!(blocks[0].plain_text(), "x");
}

#[test]
fn test_disallowed_link() {
    let features = EnabledFeatures::builder().styles(["normal"]).build();
    let blocks = convert(r#"<a href="http://x">text</a>"#, &features);
    assert_eq!(blocks.len(), 1);
    assert_eq!(spans(&blocks[0]), vec![("text (http://x)", vec![])]);
    assert!(blocks[0].mark_defs.is_empty());
}

#[test]
fn test_allowed_link() {
    let blocks = convert(r#"<p>See <a href="https://example.com">docs</a></p>"#, &features());
    let block = &blocks[0];
    assert_eq!(block.mark_defs.len(), 1);
    let def = &block.mark_defs[0];
    assert_eq!(def.type_name, "link");
    assert_eq!(def.href(), Some("https://example.com"));
    assert_eq!(spans(block), vec![("See ", vec![]), ("docs", vec![def.key.as_str()])]);
}

#[test]
fn test_blockquote_with_paragraphs() {
    let blocks = convert("<blockquote><p>One</p><p>Two</p></blockquote>", &features());
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].style, "quote");
    assert_eq!(spans(&blocks[0]), vec![("One\n\nTwo", vec![])]);
}

#[test]
fn test_indented_blockquote_paragraphs() {
    let html = "<blockquote>\n  <p>One</p>\n  <p>Two</p>\n</blockquote>";
    let blocks = convert(html, &features());
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].style, "quote");
    assert_eq!(spans(&blocks[0]), vec![("One\n\nTwo", vec![])]);
}

#[test]
fn test_headings_fall_back_to_normal() {
    let blocks = convert("<h1>Title</h1><h3>Sub</h3>", &features());
    assert_eq!(blocks[0].style, "h1");
    assert_eq!(blocks[1].style, "normal");
}

#[test]
fn test_pre_keeps_whitespace() {
    let blocks = convert("<pre>a  b\n c</pre>", &features());
    assert_eq!(spans(&blocks[0]), vec![("a  b\n c", vec!["code"])]);
}

#[test]
fn test_line_break() {
    let blocks = convert("<p>a<br>b</p>", &features());
    assert_eq!(blocks[0].plain_text(), "a\nb");
}

#[test]
fn test_loose_text_is_wrapped() {
    let blocks = convert("Just text", &features());
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].style, "normal");
    assert_eq!(blocks[0].plain_text(), "Just text");
}

#[test]
fn test_empty_input() {
    assert!(convert("", &features()).is_empty());
    assert!(convert("   \n ", &features()).is_empty());
}

#[test]
fn test_inline_image() {
    let features = EnabledFeatures::builder()
        .styles(["normal"])
        .inline_objects(["image"])
        .build();
    let blocks = convert(r#"<p>Look <img src="a.png" alt="A"></p>"#, &features);
    let children = &blocks[0].children;
    assert_eq!(children.len(), 2);
    assert_eq!(children[1].type_name(), "image");
    assert_eq!(children[1].to_json()["src"], "a.png");
    assert_eq!(children[1].to_json()["alt"], "A");
}

#[rstest]
#[case("b", "strong")]
#[case("strong", "strong")]
#[case("i", "em")]
#[case("em", "em")]
#[case("u", "underline")]
#[case("s", "strike-through")]
#[case("strike", "strike-through")]
#[case("del", "strike-through")]
#[case("code", "code")]
#[case("sup", "sup")]
#[case("sub", "sub")]
#[case("ins", "ins")]
#[case("mark", "mark")]
#[case("small", "small")]
fn test_decorator_tags(#[case] tag: &str, #[case] decorator: &str) {
    let features = EnabledFeatures::builder()
        .styles(["normal"])
        .decorators([decorator])
        .build();
    let blocks = convert(&format!("<p><{tag}>x</{tag}></p>"), &features);
    assert_eq!(spans(&blocks[0]), vec![("x", vec![decorator])]);
}

#[test]
fn test_nested_decorators_order() {
    let blocks = convert("<p><b><i>both</i></b></p>", &features());
    assert_eq!(spans(&blocks[0]), vec![("both", vec!["strong", "em"])]);
}

// =============================================================================
// Dialects
// =============================================================================

#[test]
fn test_word_lists() {
    let html = concat!(
        r#"<html xmlns:o="urn:schemas-microsoft-com:office:office"><body>"#,
        "\n",
        r#"<p class=MsoListParagraphCxSpFirst style='mso-list:l0 level1 lfo1'><![if !supportLists]>"#,
        r#"<span style='mso-list:Ignore'>1.<span>&nbsp;&nbsp; </span></span><![endif]>First<o:p></o:p></p>"#,
        "\n",
        r#"<p class=MsoListParagraphCxSpLast style='mso-list:l0 level2 lfo1'><![if !supportLists]>"#,
        r#"<span style='mso-list:Ignore'>a.<span>&nbsp; </span></span><![endif]>Nested<o:p></o:p></p>"#,
        "\n</body></html>",
    );
    let blocks = convert(html, &features());
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].list_item.as_deref(), Some("number"));
    assert_eq!(blocks[0].level, Some(1));
    assert_eq!(blocks[0].plain_text(), "First");
    assert_eq!(blocks[1].list_item.as_deref(), Some("number"));
    assert_eq!(blocks[1].level, Some(2));
    assert_eq!(blocks[1].plain_text(), "Nested");
}

#[test]
fn test_word_title_becomes_heading() {
    let html = r#"<p class=MsoTitle>Report<o:p></o:p></p><p class=MsoNormal>Body</p>"#;
    let blocks = convert(html, &features());
    assert_eq!(blocks[0].style, "h1");
    assert_eq!(blocks[0].plain_text(), "Report");
    assert_eq!(blocks[1].style, "normal");
}

#[test]
fn test_notion_styles() {
    let html = r#"<!-- notionvc: 1 --><p>Plain <span style="font-weight:600">bold</span></p>"#;
    let blocks = convert(html, &features());
    assert_eq!(spans(&blocks[0]), vec![("Plain ", vec![]), ("bold", vec!["strong"])]);
}

#[test]
fn test_google_docs() {
    let html = concat!(
        r#"<meta charset="utf-8"><b style="font-weight:normal;" id="docs-internal-guid-abc">"#,
        r#"<p dir="ltr"><span style="font-weight:700;">Bold</span><span style="font-weight:400;"> text</span></p>"#,
        "<br>",
        r#"<ul><li dir="ltr" aria-level="1"><p dir="ltr"><span>One</span></p></li>"#,
        r#"<li dir="ltr" aria-level="2"><p dir="ltr"><span>Two</span></p></li></ul>"#,
        "</b>",
    );
    let blocks = convert(html, &features());
    assert_eq!(blocks.len(), 4);
    assert_eq!(spans(&blocks[0]), vec![("Bold", vec!["strong"]), (" text", vec![])]);
    assert_eq!(blocks[1].plain_text(), "");
    assert_eq!(blocks[2].list_item.as_deref(), Some("bullet"));
    assert_eq!(blocks[2].level, Some(1));
    assert_eq!(blocks[2].plain_text(), "One");
    assert_eq!(blocks[3].level, Some(2));
    assert_eq!(blocks[3].plain_text(), "Two");
}

#[test]
fn test_google_docs_whitespace_removal() {
    let html = concat!(
        r#"<b id="docs-internal-guid-1"><p><span>a</span></p><br><p><span> </span></p>"#,
        r#"<p><span>b</span></p></b>"#,
    );
    let options = DeserializerOptions::new().with_whitespace_mode(WhitespaceMode::Remove);
    let blocks = HtmlDeserializer::new(features(), options).deserialize(html).unwrap();
    let texts: Vec<String> = blocks.iter().map(Block::plain_text).collect();
    assert_eq!(texts, ["a", "b"]);
}

// =============================================================================
// Engine properties
// =============================================================================

#[test]
fn test_first_match_wins() {
    let first = rule_fn("first", |node, cx| {
        if cx.dom().tag(node) != "p" {
            return Ok(RuleOutcome::NoMatch);
        }
        Ok(Block::new("h2").with_children(vec![Span::new("first").into()]).into())
    });
    let second = rule_fn("second", |node, cx| {
        if cx.dom().tag(node) != "p" {
            return Ok(RuleOutcome::NoMatch);
        }
        Ok(Block::new("h1").with_children(vec![Span::new("second").into()]).into())
    });
    let options = DeserializerOptions::new().with_rule(first).with_rule(second);
    let blocks = HtmlDeserializer::new(features(), options).deserialize("<p>html</p>").unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].style, "h2");
    assert_eq!(blocks[0].plain_text(), "first");
}

#[test]
fn test_suppressed_nodes_are_dropped() {
    let drop_em = rule_fn("drop-em", |node, cx| {
        Ok(if cx.dom().tag(node) == "em" { RuleOutcome::Suppressed } else { RuleOutcome::NoMatch })
    });
    let options = DeserializerOptions::new().with_rule(drop_em);
    let blocks = HtmlDeserializer::new(features(), options)
        .deserialize("<p>keep<em> gone</em></p>")
        .unwrap();
    assert_eq!(blocks[0].plain_text(), "keep");
}

#[test]
fn test_rule_contract_violation() {
    let broken = rule_fn("broken", |node, cx| {
        if cx.dom().tag(node) != "p" {
            return Ok(RuleOutcome::NoMatch);
        }
        Ok(Block::new("").into())
    });
    let options = DeserializerOptions::new().with_rule(broken);
    let err = HtmlDeserializer::new(features(), options).deserialize("<p>x</p>").unwrap_err();
    match err {
        DeserializeError::RuleContractViolation { rule, value, .. } => {
            assert_eq!(rule, "broken");
            assert!(value.contains("\"_type\":\"block\""));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_depth_limit() {
    let html = "<div><div><div><div><p>deep</p></div></div></div></div>";
    let options = DeserializerOptions::new().with_max_depth(3);
    let err = HtmlDeserializer::new(features(), options).deserialize(html).unwrap_err();
    assert!(matches!(err, DeserializeError::DepthLimitExceeded { limit: 3 }));
}

#[test]
fn test_normalize_is_idempotent_on_output() {
    let html = r#"<p>a <b>b</b> <a href="https://x">c</a></p><ul><li>d</li></ul><blockquote>q</blockquote>"#;
    let features = features();
    let mut keys = StableKeys::from_seed(0);
    for block in convert(html, &features) {
        let again = html_blocks::normalize::normalize_block(block.clone(), &features, &mut keys);
        assert_eq!(again, block);
    }
}

#[test]
fn test_output_invariants() {
    let features = features();
    let inputs = [
        r#"<p>a <a href="https://x"><b>b</b></a> <a href="https://y">c</a></p>"#,
        "<ul><li>One<ul><li>Two<ol><li>Three</li></ol></li></ul></li></ul>",
        "<div><p>one</p>loose<h1>two</h1></div>",
        "<blockquote>lead<p>para</p></blockquote>",
    ];
    for html in inputs {
        let blocks = convert(html, &features);
        assert_mark_defs_consistent(&blocks, &features);
        for block in &blocks {
            assert!(!block.children.is_empty());
            assert!(block.children.iter().all(|c| c.as_block().is_none() && !c.is_placeholder()));
            let merged = block
                .children
                .windows(2)
                .all(|w| match (w[0].as_span(), w[1].as_span()) {
                    (Some(a), Some(b)) => a.marks != b.marks,
                    _ => true,
                });
            assert!(merged, "unmerged spans in {block:?}");
        }
    }
}

#[test]
fn test_keys_are_deterministic() {
    let html = r#"<p>x <a href="https://x">y</a></p>"#;
    assert_eq!(convert(html, &features()), convert(html, &features()));
}

#[test]
fn test_portable_text_json() {
    let engine = HtmlDeserializer::new(features(), counter_keys());
    let blocks = engine.deserialize(r#"<p>Hi <a href="https://x">there</a></p>"#).unwrap();
    assert_eq!(
        serde_json::to_value(&blocks).unwrap(),
        json!([{
            "_type": "block",
            "_key": "key2",
            "style": "normal",
            "markDefs": [{"_key": "key1", "_type": "link", "href": "https://x"}],
            "children": [
                {"_type": "span", "_key": "key20", "text": "Hi ", "marks": []},
                {"_type": "span", "_key": "key21", "text": "there", "marks": ["key1"]}
            ]
        }])
    );
}

#[test]
fn test_features_from_schema() {
    let schema: ArraySchema = serde_json::from_value(json!({
        "name": "body",
        "of": [{
            "name": "block",
            "fields": [
                {"name": "style", "type": {"name": "string", "options": {"list": [{"value": "normal"}]}}},
                {"name": "list", "type": {"name": "string", "options": {"list": []}}},
                {"name": "children", "type": {"name": "array", "of": [
                    {"name": "span", "decorators": [{"value": "em"}], "annotations": []}
                ]}}
            ]
        }]
    }))
    .unwrap();
    let features = resolve_features(&schema).unwrap().enabled;
    let blocks = convert("<h1><i>a</i> <b>b</b></h1><ul><li>c</li></ul>", &features);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].style, "normal");
    assert_eq!(spans(&blocks[0]), vec![("a", vec!["em"]), (" b", vec![])]);
    assert_eq!(blocks[1].list_item, None);
}

// =============================================================================
// Concurrency
// =============================================================================

static_assertions::assert_impl_all!(HtmlDeserializer: Send, Sync);

#[tokio::test]
async fn test_concurrent_invocations_share_one_engine() {
    let engine = Arc::new(HtmlDeserializer::new(features(), DeserializerOptions::default()));
    let mut handles = Vec::new();
    for i in 0..16 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::task::spawn_blocking(move || {
            let html = format!(r#"<p>doc {i} <a href="https://example.com/{i}">link</a></p>"#);
            (i, engine.deserialize(&html))
        }));
    }
    for handle in handles {
        let (i, result) = handle.await.unwrap();
        let blocks = result.unwrap();
        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.mark_defs.len(), 1);
        assert_eq!(block.mark_defs[0].href(), Some(format!("https://example.com/{i}").as_str()));
        assert_mark_defs_consistent(&blocks, engine.features());
    }
}
