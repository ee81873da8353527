//! Markdown parsing (Markdown → UniAst)
//!
//! Pipeline: Markdown string → codified Markdown → owned mdast → UniAst
//!
//! The first two steps are synchronous. The last one is asynchronous because
//! reference resolution may be, and it recurses into rich macro bodies, which
//! are run through the whole pipeline again.

use super::mdast::{self, Node};
use super::wiki_syntax::{split_wiki_syntax, Segment};
use super::BoxFuture;
use crate::config::{MarkdownParserConfiguration, ParserConfigurationResolver};
use crate::error::{ConversionError, ConversionResult};
use crate::macros::{
    codify, token, CodifiedBody, EmptyMacroRegistry, MacroCall, MacroRegistry, MacroRenderKind,
};
use crate::references::{
    DefaultReferenceHandler, DefaultReferenceParser, ModelReferenceHandler, ModelReferenceParser,
    ReferenceParserOptions,
};
use crate::uniast::{
    Alignment, Block, CodeBlock, EntityReference, EntityType, Heading, Image, ImageStyles,
    InlineContent, Link, LinkTarget, List, ListItem, MacroBody, MacroInvocation, Paragraph, Quote,
    ScriptText, Table, TableCell, TableColumn, Text, TextStyles, UniAst,
};
use log::{debug, trace};
use std::sync::Arc;

/// Label of a `[[reference]]` link whose reference cannot be resolved.
pub const UNRESOLVED_LINK_TITLE: &str = "Unknown reference";

/// Converts Markdown into a [`UniAst`].
pub struct MarkdownParser {
    reference_parser: Arc<dyn ModelReferenceParser>,
    reference_handler: Arc<dyn ModelReferenceHandler>,
    configuration: Arc<dyn ParserConfigurationResolver>,
    macros: Arc<dyn MacroRegistry>,
}

impl MarkdownParser {
    pub fn new(
        reference_parser: Arc<dyn ModelReferenceParser>,
        reference_handler: Arc<dyn ModelReferenceHandler>,
        configuration: Arc<dyn ParserConfigurationResolver>,
    ) -> Self {
        MarkdownParser {
            reference_parser,
            reference_handler,
            configuration,
            macros: Arc::new(EmptyMacroRegistry),
        }
    }

    /// Use `macros` to decide body kinds and block/inline rendering.
    pub fn with_macros(mut self, macros: Arc<dyn MacroRegistry>) -> Self {
        self.macros = macros;
        self
    }

    /// Parse a complete Markdown document.
    pub async fn parse_markdown(&self, markdown: &str) -> ConversionResult<UniAst> {
        let context = ParseContext {
            parser: self,
            configuration: self.configuration.get(),
        };
        let blocks = context.parse_blocks(markdown).await?;
        debug!("parsed {} top-level blocks", blocks.len());
        Ok(UniAst::new(blocks))
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        MarkdownParser::new(
            Arc::new(DefaultReferenceParser::default()),
            Arc::new(DefaultReferenceHandler),
            Arc::new(MarkdownParserConfiguration::default()),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Block,
    Inline,
}

/// State of a single `parse_markdown` call.
struct ParseContext<'p> {
    parser: &'p MarkdownParser,
    configuration: MarkdownParserConfiguration,
}

impl<'p> ParseContext<'p> {
    fn parse_blocks<'a>(&'a self, markdown: &'a str) -> BoxFuture<'a, ConversionResult<Vec<Block>>> {
        Box::pin(async move {
            let codified = codify(markdown, self.parser.macros.as_ref())?;
            trace!("codified markdown: {codified:?}");
            let nodes = mdast::tokenize(&codified);
            self.convert_blocks(&nodes).await
        })
    }

    async fn convert_blocks(&self, nodes: &[Node]) -> ConversionResult<Vec<Block>> {
        let mut blocks = Vec::with_capacity(nodes.len());
        for node in nodes {
            blocks.push(self.convert_block(node).await?);
        }
        Ok(blocks)
    }

    fn convert_block<'a>(&'a self, node: &'a Node) -> BoxFuture<'a, ConversionResult<Block>> {
        Box::pin(async move {
            let block = match node {
                Node::Paragraph(children) => {
                    if let Some(call) = sole_macro(children)? {
                        if self.renders_as_block(&call.id) {
                            let invocation = self.expand_macro(call, Placement::Block).await?;
                            return Ok(Block::MacroBlock(invocation));
                        }
                    }
                    let content = self.convert_inlines(children, TextStyles::default()).await?;
                    Block::Paragraph(Paragraph::new(content))
                }
                Node::Heading { depth, children } => {
                    if !(1..=6).contains(depth) {
                        return Err(ConversionError::InvalidHeadingLevel(*depth));
                    }
                    Block::Heading(Heading {
                        level: *depth,
                        content: self.convert_inlines(children, TextStyles::default()).await?,
                    })
                }
                Node::Blockquote(children) => Block::Quote(Quote {
                    content: self.convert_blocks(children).await?,
                }),
                Node::List(list) => {
                    let mut items = Vec::with_capacity(list.items.len());
                    for (index, item) in list.items.iter().enumerate() {
                        items.push(ListItem {
                            number: list.start.map(|start| start + index as u64),
                            checked: item.checked,
                            content: self.convert_blocks(&item.children).await?,
                        });
                    }
                    Block::List(List { items })
                }
                Node::Code { value, lang } => Block::Code(CodeBlock {
                    content: value.clone(),
                    language: lang.clone(),
                }),
                Node::Table(rows) => Block::Table(self.convert_table(rows).await?),
                Node::ThematicBreak => Block::Break,
                Node::Image { url, alt } => Block::Image(self.convert_image(url, alt).await),
                Node::Unsupported(kind) => {
                    return Err(ConversionError::Unimplemented(format!(
                        "{kind} blocks are not supported"
                    )))
                }
                other => {
                    return Err(ConversionError::UnexpectedNode {
                        node: other.kind().to_string(),
                        context: "block",
                    })
                }
            };
            Ok(block)
        })
    }

    async fn convert_table(&self, rows: &[Vec<Vec<Node>>]) -> ConversionResult<Table> {
        let Some((header, body)) = rows.split_first() else {
            return Err(ConversionError::Internal("table without a header row".into()));
        };

        let mut columns = Vec::with_capacity(header.len());
        for cell in header {
            columns.push(TableColumn {
                header_cell: self.convert_cell(cell).await?,
            });
        }

        let mut converted = Vec::with_capacity(body.len());
        for row in body {
            let mut cells = Vec::with_capacity(row.len());
            for cell in row {
                cells.push(self.convert_cell(cell).await?);
            }
            converted.push(cells);
        }

        Ok(Table {
            columns,
            rows: converted,
        })
    }

    async fn convert_cell(&self, cell: &[Node]) -> ConversionResult<TableCell> {
        Ok(TableCell {
            content: self.convert_inlines(cell, TextStyles::default()).await?,
        })
    }

    /// Convert inline nodes, `styles` being those of the enclosing marks.
    fn convert_inlines<'a>(
        &'a self,
        nodes: &'a [Node],
        styles: TextStyles,
    ) -> BoxFuture<'a, ConversionResult<Vec<InlineContent>>> {
        Box::pin(async move {
            let mut inlines = Vec::with_capacity(nodes.len());
            for node in nodes {
                inlines.extend(self.convert_inline(node, styles).await?);
            }
            Ok(inlines)
        })
    }

    async fn convert_inline(
        &self,
        node: &Node,
        styles: TextStyles,
    ) -> ConversionResult<Vec<InlineContent>> {
        let inlines = match node {
            Node::Text(text) => self.convert_text(text, styles),
            Node::Strong(children) => return self.convert_inlines(children, styles.bold()).await,
            Node::Emphasis(children) => {
                return self.convert_inlines(children, styles.italic()).await
            }
            Node::Delete(children) => {
                return self
                    .convert_inlines(children, styles.strikethrough())
                    .await
            }
            Node::InlineCode(literal) => match token::decode(literal)? {
                Some(call) => vec![InlineContent::InlineMacro(
                    self.expand_macro(call, Placement::Inline).await?,
                )],
                None => vec![InlineContent::Text(Text::new(literal.clone(), styles))],
            },
            Node::Link { url, children } => {
                let content = self.convert_inlines(children, styles).await?;
                let target = self.resolve_target(url, EntityType::Document).await;
                vec![InlineContent::Link(Link { content, target })]
            }
            Node::Image { url, alt } => {
                vec![InlineContent::Image(self.convert_image(url, alt).await)]
            }
            Node::Superscript(children) => {
                let mut content = String::new();
                collect_plain_text(children, &mut content);
                vec![InlineContent::Superscript(ScriptText { content })]
            }
            Node::Break => {
                return Err(ConversionError::Unimplemented(
                    "hard line breaks are not supported".into(),
                ))
            }
            Node::Unsupported(kind) => {
                return Err(ConversionError::Unimplemented(format!(
                    "{kind} is not supported"
                )))
            }
            other => {
                return Err(ConversionError::UnexpectedNode {
                    node: other.kind().to_string(),
                    context: "inline",
                })
            }
        };
        Ok(inlines)
    }

    /// Split a text run on the XWiki `[[...]]` / `![[...]]` syntax.
    fn convert_text(&self, text: &str, styles: TextStyles) -> Vec<InlineContent> {
        let mut inlines = Vec::new();
        for segment in split_wiki_syntax(text) {
            match segment {
                Segment::Text(content) => {
                    inlines.push(InlineContent::Text(Text::new(content, styles)));
                }
                Segment::Link { title, reference } => {
                    let parsed = self.resolve_wiki_reference(&reference, EntityType::Document);
                    let title = match (title, &parsed) {
                        (Some(title), _) => title,
                        (None, Some(parsed)) => self.parser.reference_handler.get_title(parsed),
                        (None, None) => UNRESOLVED_LINK_TITLE.to_string(),
                    };
                    inlines.push(InlineContent::Link(Link {
                        content: vec![InlineContent::Text(Text::new(title, styles))],
                        target: LinkTarget::internal(reference, parsed),
                    }));
                }
                Segment::Image { alt, reference } => {
                    let parsed = self.resolve_wiki_reference(&reference, EntityType::Attachment);
                    inlines.push(InlineContent::Image(Image {
                        target: LinkTarget::internal(reference, parsed),
                        alt,
                        caption: None,
                        styles: internal_image_styles(),
                    }));
                }
            }
        }
        inlines
    }

    /// A standard `![alt](url)` image. Once resolved it is written back as `![[alt|url]]`,
    /// so it takes the styles of that syntax.
    async fn convert_image(&self, url: &str, alt: &str) -> Image {
        let target = self.resolve_target(url, EntityType::Attachment).await;
        let styles = match &target {
            LinkTarget::Internal(_) => internal_image_styles(),
            LinkTarget::External(_) => ImageStyles::default(),
        };
        Image {
            target,
            alt: (!alt.is_empty()).then(|| alt.to_string()),
            caption: None,
            styles,
        }
    }

    /// Target of a standard `[label](url)` link or `![alt](url)` image.
    async fn resolve_target(&self, url: &str, entity_type: EntityType) -> LinkTarget {
        if self.configuration.support_flexmark_internal_links {
            return LinkTarget::external(url);
        }
        match self.resolve_reference(url, entity_type).await {
            Some(parsed) => LinkTarget::internal(url, Some(parsed)),
            None => LinkTarget::external(url),
        }
    }

    async fn resolve_reference(&self, raw: &str, entity_type: EntityType) -> Option<EntityReference> {
        let options = ReferenceParserOptions::new(entity_type);
        match self.parser.reference_parser.parse_async(raw, &options).await {
            Ok(reference) => Some(reference),
            Err(err) => {
                debug!("leaving '{raw}' unresolved: {err}");
                None
            }
        }
    }

    /// Wiki syntax targets resolve on the synchronous path.
    fn resolve_wiki_reference(&self, raw: &str, entity_type: EntityType) -> Option<EntityReference> {
        let options = ReferenceParserOptions::new(entity_type);
        match self.parser.reference_parser.parse(raw, &options) {
            Ok(reference) => Some(reference),
            Err(err) => {
                debug!("leaving '{raw}' unresolved: {err}");
                None
            }
        }
    }

    fn renders_as_block(&self, id: &str) -> bool {
        self.parser
            .macros
            .lookup(id)
            .map_or(true, |definition| definition.render_as == MacroRenderKind::Block)
    }

    async fn expand_macro(
        &self,
        call: MacroCall,
        placement: Placement,
    ) -> ConversionResult<MacroInvocation> {
        let MacroCall { id, params, body } = call;
        let body = match body {
            CodifiedBody::None => MacroBody::None,
            CodifiedBody::Raw { content } => MacroBody::Raw { content },
            CodifiedBody::Wysiwyg { markdown } => {
                let mut blocks = self.parse_blocks(&markdown).await?;
                if blocks.len() > 1 {
                    return Err(ConversionError::Macro {
                        id,
                        message: format!(
                            "a rich body holds at most one block, found {}",
                            blocks.len()
                        ),
                    });
                }
                match (placement, blocks.pop()) {
                    (Placement::Block, block) => MacroBody::BlockContent {
                        block: block.map(Box::new),
                    },
                    (Placement::Inline, None) => MacroBody::InlineContents {
                        inlines: Vec::new(),
                    },
                    (Placement::Inline, Some(Block::Paragraph(paragraph))) => {
                        MacroBody::InlineContents {
                            inlines: paragraph.content,
                        }
                    }
                    (Placement::Inline, Some(_)) => {
                        return Err(ConversionError::Macro {
                            id,
                            message: "the body of an inline macro must be a single paragraph"
                                .into(),
                        })
                    }
                }
            }
        };
        Ok(MacroInvocation { id, params, body })
    }
}

fn internal_image_styles() -> ImageStyles {
    ImageStyles {
        alignment: Some(Alignment::Left),
    }
}

/// The macro call of a paragraph made of a single macro token.
fn sole_macro(children: &[Node]) -> ConversionResult<Option<MacroCall>> {
    match children {
        [Node::InlineCode(literal)] => token::decode(literal),
        _ => Ok(None),
    }
}

fn collect_plain_text(nodes: &[Node], output: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) | Node::InlineCode(text) => output.push_str(text),
            Node::Strong(children)
            | Node::Emphasis(children)
            | Node::Delete(children)
            | Node::Superscript(children)
            | Node::Link { children, .. } => collect_plain_text(children, output),
            Node::Image { alt, .. } => output.push_str(alt),
            _ => {}
        }
    }
}
