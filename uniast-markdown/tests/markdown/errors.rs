//! Constructs without a UniAst counterpart abort the conversion

use crate::common::*;
use uniast_markdown::error::ConversionError;
use uniast_markdown::uniast::*;

#[tokio::test]
async fn test_unsupported_markdown() {
    let parser = fixture_parser();
    for markdown in [
        "<div>raw html</div>",
        "Inline <span>html</span>",
        "Hard  \nbreak",
        "Hard\\\nbreak",
        "Note[^1]\n\n[^1]: the footnote",
    ] {
        let result = parser.parse_markdown(markdown).await;
        assert!(
            matches!(result, Err(ConversionError::Unimplemented(_))),
            "{markdown:?} gave {result:?}"
        );
    }
}

#[tokio::test]
async fn test_unsupported_nodes() {
    let serializer = fixture_serializer();

    let subscript = UniAst::new(vec![paragraph(vec![InlineContent::Subscript(ScriptText {
        content: "2".into(),
    })])]);
    assert!(matches!(
        serializer.to_markdown(&subscript).await,
        Err(ConversionError::Unimplemented(_))
    ));

    let heading = UniAst::new(vec![heading(0, "Nowhere")]);
    assert_eq!(
        serializer.to_markdown(&heading).await,
        Err(ConversionError::InvalidHeadingLevel(0))
    );
}
