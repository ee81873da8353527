//! Macros declared in a registry: rich bodies, inline rendering and body errors

use crate::common::*;
use std::sync::Arc;
use uniast_markdown::error::ConversionError;
use uniast_markdown::uniast::*;
use uniast_markdown::MarkdownParser;

fn parser() -> MarkdownParser {
    fixture_parser().with_macros(Arc::new(fixture_macros()))
}

#[tokio::test]
async fn test_rich_block_body() {
    let markdown = "{{info title=\"Note\"}}\nSome **bold** text\n{{/info}}";
    let ast = parse(&parser(), markdown).await;

    assert_eq!(
        ast.blocks,
        vec![Block::MacroBlock(
            MacroInvocation::new("info")
                .with_param("title", "Note")
                .with_body(MacroBody::BlockContent {
                    block: Some(Box::new(paragraph(vec![
                        text("Some "),
                        styled("bold", plain().bold()),
                        text(" text"),
                    ]))),
                })
        )]
    );
    assert_eq!(serialize(&fixture_serializer(), &ast).await, markdown);
}

#[tokio::test]
async fn test_rich_body_holding_a_list() {
    let markdown = "{{warning}}\n* one\n* two\n{{/warning}}";
    let ast = parse(&parser(), markdown).await;

    assert_eq!(
        ast.blocks,
        vec![Block::MacroBlock(MacroInvocation::new("warning").with_body(
            MacroBody::BlockContent {
                block: Some(Box::new(bullets(&["one", "two"]))),
            }
        ))]
    );
    assert_eq!(serialize(&fixture_serializer(), &ast).await, markdown);
}

#[tokio::test]
async fn test_nested_rich_macros() {
    let markdown = "{{info}}\n{{warning}}\nCareful\n{{/warning}}\n{{/info}}";
    let ast = parse(&parser(), markdown).await;

    let inner = Block::MacroBlock(MacroInvocation::new("warning").with_body(
        MacroBody::BlockContent {
            block: Some(Box::new(text_paragraph("Careful"))),
        },
    ));
    assert_eq!(
        ast.blocks,
        vec![Block::MacroBlock(MacroInvocation::new("info").with_body(
            MacroBody::BlockContent {
                block: Some(Box::new(inner)),
            }
        ))]
    );
    assert_eq!(serialize(&fixture_serializer(), &ast).await, markdown);
}

#[tokio::test]
async fn test_empty_rich_body() {
    let ast = parse(&parser(), "{{info}}{{/info}}").await;
    assert_eq!(
        ast.blocks,
        vec![Block::MacroBlock(MacroInvocation::new("info").with_body(
            MacroBody::BlockContent { block: None }
        ))]
    );
    assert_eq!(
        serialize(&fixture_serializer(), &ast).await,
        "{{info}}{{/info}}"
    );
}

#[tokio::test]
async fn test_rich_macro_inside_a_paragraph() {
    let ast = parse(&parser(), "See {{info}}_this_{{/info}} now").await;
    assert_eq!(
        ast.blocks,
        vec![paragraph(vec![
            text("See "),
            InlineContent::InlineMacro(MacroInvocation::new("info").with_body(
                MacroBody::InlineContents {
                    inlines: vec![styled("this", plain().italic())],
                }
            )),
            text(" now"),
        ])]
    );
    assert_eq!(
        serialize(&fixture_serializer(), &ast).await,
        "See {{info}}_this_{{/info}} now"
    );
}

#[tokio::test]
async fn test_inline_macro_alone_stays_inline() {
    let ast = parse(&parser(), "{{icon name=\"home\" /}}").await;
    assert_eq!(
        ast.blocks,
        vec![paragraph(vec![InlineContent::InlineMacro(
            MacroInvocation::new("icon").with_param("name", "home")
        )])]
    );
}

#[tokio::test]
async fn test_raw_body_is_verbatim() {
    let markdown = "{{code language=\"rust\"}}let x = **not bold**;{{/code}}";
    let ast = parse(&parser(), markdown).await;
    assert_eq!(
        ast.blocks,
        vec![Block::MacroBlock(
            MacroInvocation::new("code")
                .with_param("language", "rust")
                .with_body(MacroBody::Raw {
                    content: "let x = **not bold**;".into(),
                })
        )]
    );
    assert_eq!(serialize(&fixture_serializer(), &ast).await, markdown);
}

#[tokio::test]
async fn test_macros_inside_code_are_text() {
    let ast = parse(&parser(), "Use `{{toc /}}` to list headings").await;
    assert_eq!(
        ast.blocks,
        vec![paragraph(vec![
            text("Use "),
            text("{{toc /}}"),
            text(" to list headings"),
        ])]
    );

    let ast = parse(&parser(), "```\n{{toc /}}\n```").await;
    assert_eq!(
        ast.blocks,
        vec![Block::Code(CodeBlock {
            content: "{{toc /}}".into(),
            language: None,
        })]
    );
}

#[tokio::test]
async fn test_unknown_unclosed_macro_is_text() {
    let ast = parse(&parser(), "Type {{name}} here").await;
    assert_eq!(ast.blocks, vec![text_paragraph("Type {{name}} here")]);

    let markdown = serialize(&fixture_serializer(), &ast).await;
    assert_eq!(markdown, "Type \\{{name}} here");
    assert_eq!(parse(&parser(), &markdown).await, ast);
}

#[tokio::test]
async fn test_stray_backticks_next_to_macros() {
    let ast = parse(&parser(), "it`s {{toc/}} and `` here").await;
    assert_eq!(
        ast.blocks,
        vec![paragraph(vec![
            text("it`s "),
            InlineContent::InlineMacro(MacroInvocation::new("toc")),
            text(" and `` here"),
        ])]
    );

    let markdown = serialize(&fixture_serializer(), &ast).await;
    assert_eq!(markdown, "it\\`s {{toc /}} and \\`\\` here");
    assert_eq!(parse(&parser(), &markdown).await, ast);

    let ast = parse(&parser(), "a ` b `` c {{icon/}}").await;
    assert_eq!(
        ast.blocks,
        vec![paragraph(vec![
            text("a ` b `` c "),
            InlineContent::InlineMacro(MacroInvocation::new("icon")),
        ])]
    );
}

#[tokio::test]
async fn test_unclosed_placeholders_do_not_blow_up() {
    let markdown = "Dear {{name}}, ".repeat(40);
    let ast = parse(&parser(), markdown.trim_end()).await;
    assert_eq!(ast.blocks, vec![text_paragraph(markdown.trim_end())]);
}

#[tokio::test]
async fn test_body_errors() {
    let cases = [
        "{{code /}}",
        "{{code}}never closed",
        "{{toc}}unexpected{{/toc}}",
        "{{info}}\nfirst\n\nsecond\n{{/info}}",
        "Inline {{info}}\n* a list\n{{/info}} here",
    ];
    for markdown in cases {
        let result = parser().parse_markdown(markdown).await;
        assert!(
            matches!(
                result,
                Err(ConversionError::Macro { .. } | ConversionError::UnclosedMacro { .. })
            ),
            "{markdown:?} gave {result:?}"
        );
    }
}
