//! Collaborator doubles and AST builders shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use uniast_markdown::error::{ConversionResult, ReferenceError};
use uniast_markdown::macros::{MacroBodyType, MacroDefinition, MacroRenderKind, StaticMacroRegistry};
use uniast_markdown::references::{
    DefaultReferenceHandler, InternalLinksSerializer, ModelReferenceHandler, ModelReferenceParser,
    ReferenceParserOptions,
};
use uniast_markdown::uniast::*;
use uniast_markdown::{MarkdownParser, MarkdownParserConfiguration, MarkdownSerializer};

/// Rejects every reference, so standard links stay external and wiki targets unresolved.
pub struct RejectingReferenceParser;

impl ModelReferenceParser for RejectingReferenceParser {
    fn parse(
        &self,
        raw: &str,
        options: &ReferenceParserOptions,
    ) -> Result<EntityReference, ReferenceError> {
        Err(ReferenceError::new(raw, options.entity_type, "not a wiki reference"))
    }
}

/// Titles are the bare entity name.
pub struct NameTitleHandler;

impl ModelReferenceHandler for NameTitleHandler {
    fn get_title(&self, reference: &EntityReference) -> String {
        reference.name.clone()
    }
}

/// Always writes the `[[label|reference]]` and `![[alt|reference]]` forms, even without a label.
pub struct PipedLinksSerializer;

#[async_trait]
impl InternalLinksSerializer for PipedLinksSerializer {
    async fn serialize(
        &self,
        content: &[InlineContent],
        target: &InternalTarget,
        parent: &MarkdownSerializer,
    ) -> ConversionResult<String> {
        let label = parent.convert_inline_contents(content).await?;
        Ok(format!("[[{label}|{}]]", target.raw_reference))
    }

    async fn serialize_image(
        &self,
        target: &InternalTarget,
        alt: Option<&str>,
    ) -> ConversionResult<String> {
        Ok(format!(
            "![[{}|{}]]",
            alt.unwrap_or_default(),
            target.raw_reference
        ))
    }
}

pub fn fixture_parser() -> MarkdownParser {
    MarkdownParser::new(
        Arc::new(RejectingReferenceParser),
        Arc::new(NameTitleHandler),
        Arc::new(MarkdownParserConfiguration::default()),
    )
}

pub fn fixture_serializer() -> MarkdownSerializer {
    MarkdownSerializer::new(Arc::new(PipedLinksSerializer))
}

/// Parser resolving references with `parser`, with the given internal links setting.
pub fn resolving_parser(
    parser: impl ModelReferenceParser + 'static,
    support_flexmark_internal_links: bool,
) -> MarkdownParser {
    MarkdownParser::new(
        Arc::new(parser),
        Arc::new(DefaultReferenceHandler),
        Arc::new(MarkdownParserConfiguration {
            support_flexmark_internal_links,
        }),
    )
}

/// The macros the fixtures rely on: rich callouts, a raw `code` macro and a bodiless `toc`.
pub fn fixture_macros() -> StaticMacroRegistry {
    let callout = MacroDefinition::new(MacroBodyType::Wysiwyg, MacroRenderKind::Block);
    StaticMacroRegistry::new()
        .with("info", callout)
        .with("warning", callout)
        .with(
            "code",
            MacroDefinition::new(MacroBodyType::Raw, MacroRenderKind::Block),
        )
        .with(
            "toc",
            MacroDefinition::new(MacroBodyType::None, MacroRenderKind::Block),
        )
        .with(
            "icon",
            MacroDefinition::new(MacroBodyType::None, MacroRenderKind::Inline),
        )
}

pub async fn parse(parser: &MarkdownParser, markdown: &str) -> UniAst {
    parser
        .parse_markdown(markdown)
        .await
        .unwrap_or_else(|err| panic!("failed to parse {markdown:?}: {err}"))
}

pub async fn serialize(serializer: &MarkdownSerializer, ast: &UniAst) -> String {
    serializer
        .to_markdown(ast)
        .await
        .unwrap_or_else(|err| panic!("failed to serialize {ast:?}: {err}"))
}

// AST builders

pub fn text(content: &str) -> InlineContent {
    InlineContent::text(content)
}

pub fn styled(content: &str, styles: TextStyles) -> InlineContent {
    InlineContent::Text(Text::new(content, styles))
}

pub fn plain() -> TextStyles {
    TextStyles::default()
}

pub fn paragraph(content: Vec<InlineContent>) -> Block {
    Block::Paragraph(Paragraph::new(content))
}

pub fn text_paragraph(content: &str) -> Block {
    paragraph(vec![text(content)])
}

pub fn heading(level: u8, content: &str) -> Block {
    Block::Heading(Heading {
        level,
        content: vec![text(content)],
    })
}

pub fn item(number: Option<u64>, checked: Option<bool>, content: Vec<Block>) -> ListItem {
    ListItem {
        number,
        checked,
        content,
    }
}

pub fn bullets(texts: &[&str]) -> Block {
    Block::List(List {
        items: texts
            .iter()
            .map(|t| item(None, None, vec![text_paragraph(t)]))
            .collect(),
    })
}

pub fn cell(content: Vec<InlineContent>) -> TableCell {
    TableCell { content }
}
