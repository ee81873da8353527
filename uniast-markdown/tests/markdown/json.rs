//! JSON shape of converted documents

use crate::common::*;
use insta::assert_snapshot;
use uniast_markdown::uniast::UniAst;

#[tokio::test]
async fn test_document_json() {
    let ast = parse(
        &fixture_parser(),
        "# Title\n\nSee [[the page|Main.Page]] and ~~_old_~~.\n\n{{toc depth=\"2\" /}}",
    )
    .await;
    let json = serde_json::to_string_pretty(&ast).expect("ast to serialize");

    assert_snapshot!(json, @r#"
{
  "blocks": [
    {
      "type": "heading",
      "level": 1,
      "content": [
        {
          "type": "text",
          "content": "Title",
          "styles": {}
        }
      ]
    },
    {
      "type": "paragraph",
      "content": [
        {
          "type": "text",
          "content": "See ",
          "styles": {}
        },
        {
          "type": "link",
          "content": [
            {
              "type": "text",
              "content": "the page",
              "styles": {}
            }
          ],
          "target": {
            "type": "internal",
            "rawReference": "Main.Page",
            "parsedReference": null
          }
        },
        {
          "type": "text",
          "content": " and ",
          "styles": {}
        },
        {
          "type": "text",
          "content": "old",
          "styles": {
            "italic": true,
            "strikethrough": true
          }
        },
        {
          "type": "text",
          "content": ".",
          "styles": {}
        }
      ]
    },
    {
      "type": "macroBlock",
      "id": "toc",
      "params": {
        "depth": "2"
      },
      "body": {
        "type": "none"
      }
    }
  ]
}
"#);

    let decoded: UniAst = serde_json::from_str(&json).expect("json to deserialize");
    assert_eq!(decoded, ast);
}

#[test]
fn test_minimal_json_input() {
    let json = r#"{
        "blocks": [
            { "type": "paragraph", "content": [ { "type": "text", "content": "Hi" } ] },
            { "type": "macroBlock", "id": "toc" },
            { "type": "break" }
        ]
    }"#;
    let ast: UniAst = serde_json::from_str(json).expect("json to deserialize");
    assert_eq!(
        ast.blocks,
        vec![
            text_paragraph("Hi"),
            uniast_markdown::uniast::Block::MacroBlock(
                uniast_markdown::uniast::MacroInvocation::new("toc")
            ),
            uniast_markdown::uniast::Block::Break,
        ]
    );
}
