//! Serialized Markdown must parse back to the tree it came from

use crate::common::*;
use proptest::prelude::*;
use std::sync::Arc;
use uniast_markdown::uniast::*;
use uniast_markdown::{MarkdownParser, MarkdownSerializer};

fn parser() -> MarkdownParser {
    fixture_parser().with_macros(Arc::new(fixture_macros()))
}

/// Parse, serialize, and check that both the tree and the text are stable from there on.
async fn assert_stable(markdown: &str) {
    let parser = parser();
    let serializer = fixture_serializer();

    let ast = parse(&parser, markdown).await;
    let written = serialize(&serializer, &ast).await;
    let reparsed = parse(&parser, &written).await;
    assert_eq!(reparsed, ast, "tree changed after writing {written:?}");
    assert_eq!(serialize(&serializer, &reparsed).await, written);
}

#[tokio::test]
async fn test_reference_documents_are_stable() {
    let documents = [
        "Normal **Bold** _Italic1_ _Italic2_ ~~Strikethrough~~ **Underline** ~~_**wow!**_~~",
        include_str!("fixtures/table.md"),
        "A [[title|documentReference]] B\nC ![[title|imageReference]] D\nE {{someInlineMacro /}} F",
        "{{macro param1=\"some \\\\\" escaped quote and }} closing braces and \\\\\\ escaped backslashes\" /}}",
        "{{outer}}```{{/outer}}```{{/outer}}",
    ];
    for markdown in documents {
        assert_stable(markdown).await;
    }
}

#[tokio::test]
async fn test_nested_structures_are_stable() {
    let documents = [
        "> # Quoted heading\n>\n> * quoted\n> * list",
        "1. first\n\n   continued paragraph\n2. second\n   * nested\n   * bullets",
        "* [ ] todo with **bold**\n* [x] done with [[a link|Main.Page]]",
        "{{info}}\n> quoted inside\n{{/info}}",
        "````md\n```\nfenced inside\n```\n````",
        "Superscript x^2^ and text",
        "---",
    ];
    for markdown in documents {
        assert_stable(markdown).await;
    }
}

#[tokio::test]
async fn test_escaped_markup_is_stable() {
    let ast = parse(&parser(), "a \\*b\\* c").await;
    assert_eq!(ast.blocks, vec![text_paragraph("a *b* c")]);

    let documents = [
        "a \\*b\\* c",
        "it\\`s 1\\. not a list",
        "\\# literal hash and \\[brackets\\] with a\\_b",
        "Type \\{{name}} and \\<tag> with \\&amp; and x\\^2\\^",
        "\\- not\n\\+ a\n2\\) list",
        "| a | b |\n| - | - |\n| x \\| y | \\~z\\~ |",
    ];
    for markdown in documents {
        assert_stable(markdown).await;
    }
}

#[tokio::test]
async fn test_adjacent_bullet_lists_merge() {
    let ast = UniAst::new(vec![bullets(&["a"]), bullets(&["b"])]);
    let written = serialize(&fixture_serializer(), &ast).await;
    assert_eq!(written, "* a\n\n* b");

    let reparsed = parse(&parser(), &written).await;
    assert_eq!(reparsed.blocks.len(), 1);
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
        .block_on(future)
}

fn macro_id() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9]{0,10}"
}

fn params() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[a-z][a-z0-9_-]{0,8}", "[ -~]{0,20}"), 0..4)
}

/// Words mixing letters with the punctuation Markdown reads as markup.
fn paragraph_text() -> impl Strategy<Value = String> {
    r"[A-Za-z0-9*_~`#>+=.()!&;<|{}\[\]\\-]{1,10}( [A-Za-z0-9*_~`#>+=.()!&;<|{}\[\]\\-]{1,10}){0,6}"
}

proptest! {
    #[test]
    fn prop_macro_params_survive(id in macro_id(), params in params()) {
        let invocation = params
            .into_iter()
            .fold(MacroInvocation::new(id), |call, (name, value)| call.with_param(name, value));
        let ast = UniAst::new(vec![Block::MacroBlock(invocation)]);

        let reparsed = block_on(async {
            let written = serialize(&MarkdownSerializer::default(), &ast).await;
            parse(&MarkdownParser::default(), &written).await
        });
        prop_assert_eq!(reparsed, ast);
    }

    #[test]
    fn prop_plain_paragraphs_survive(
        paragraphs in prop::collection::vec(paragraph_text(), 1..5)
    ) {
        // `[[` is wiki syntax once the escapes are gone
        prop_assume!(paragraphs.iter().all(|p| !p.contains("[[")));
        let ast = UniAst::new(paragraphs.iter().map(|p| text_paragraph(p)).collect());

        let reparsed = block_on(async {
            let written = serialize(&MarkdownSerializer::default(), &ast).await;
            parse(&MarkdownParser::default(), &written).await
        });
        prop_assert_eq!(reparsed, ast);
    }
}
