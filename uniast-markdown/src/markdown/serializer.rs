//! Markdown serialization (UniAst → Markdown)
//!
//! Text is written directly rather than through comrak's formatter: the output
//! must be stable under re-parsing, with XWiki link, image and macro syntaxes
//! embedded verbatim and normalized markers (`*` bullets, `_` emphasis).
//!
//! Blocks are separated by a blank line, list items by a single newline.
//! Text is backslash-escaped wherever the tokenizer would read markup, so a
//! written document parses back to the tree it came from.

use super::BoxFuture;
use crate::error::{ConversionError, ConversionResult};
use crate::references::{DefaultInternalLinksSerializer, InternalLinksSerializer};
use crate::uniast::{
    Block, CodeBlock, Image, InlineContent, LinkTarget, ListItem, MacroBody, MacroInvocation,
    Table, Text, UniAst,
};
use log::debug;
use std::sync::Arc;

/// Converts a [`UniAst`] into Markdown.
pub struct MarkdownSerializer {
    links: Arc<dyn InternalLinksSerializer>,
}

impl MarkdownSerializer {
    pub fn new(links: Arc<dyn InternalLinksSerializer>) -> Self {
        MarkdownSerializer { links }
    }

    /// Serialize a complete document.
    pub async fn to_markdown(&self, ast: &UniAst) -> ConversionResult<String> {
        let markdown = self.convert_blocks(&ast.blocks).await?;
        debug!(
            "serialized {} top-level blocks into {} bytes",
            ast.blocks.len(),
            markdown.len()
        );
        Ok(markdown)
    }

    /// Serialize inline contents, as used for link labels.
    pub async fn convert_inline_contents(
        &self,
        inlines: &[InlineContent],
    ) -> ConversionResult<String> {
        let mut output = String::new();
        for inline in inlines {
            output.push_str(&self.convert_inline_content(inline).await?);
        }
        Ok(output)
    }

    async fn convert_blocks(&self, blocks: &[Block]) -> ConversionResult<String> {
        let mut parts = Vec::with_capacity(blocks.len());
        for block in blocks {
            parts.push(self.convert_block(block).await?);
        }
        Ok(parts.join("\n\n"))
    }

    fn convert_block<'a>(&'a self, block: &'a Block) -> BoxFuture<'a, ConversionResult<String>> {
        Box::pin(async move {
            match block {
                Block::Paragraph(paragraph) => {
                    let content = self.convert_inline_contents(&paragraph.content).await?;
                    Ok(escape_line_start(&content))
                }
                Block::Heading(heading) => {
                    if !(1..=6).contains(&heading.level) {
                        return Err(ConversionError::InvalidHeadingLevel(heading.level));
                    }
                    let content = self.convert_inline_contents(&heading.content).await?;
                    Ok(format!("{} {content}", "#".repeat(heading.level as usize)))
                }
                Block::Quote(quote) => {
                    let content = self.convert_blocks(&quote.content).await?;
                    Ok(content
                        .split('\n')
                        .map(|line| format!("> {line}"))
                        .collect::<Vec<_>>()
                        .join("\n"))
                }
                Block::List(list) => {
                    let mut items = Vec::with_capacity(list.items.len());
                    for item in &list.items {
                        items.push(self.convert_list_item(item).await?);
                    }
                    Ok(items.join("\n"))
                }
                Block::Code(code) => Ok(convert_code_block(code)),
                Block::Table(table) => self.convert_table(table).await,
                Block::Image(image) => self.convert_image(image).await,
                Block::Break => Ok("---".to_string()),
                Block::MacroBlock(invocation) => self.convert_macro(invocation).await,
            }
        })
    }

    async fn convert_list_item(&self, item: &ListItem) -> ConversionResult<String> {
        let marker = match item.number {
            Some(number) => format!("{number}. "),
            None => "* ".to_string(),
        };
        let checkbox = match item.checked {
            Some(true) => "[x] ",
            Some(false) => "[ ] ",
            None => "",
        };
        let content = self.convert_blocks(&item.content).await?;
        let indent = " ".repeat(marker.len());

        let mut lines = content.split('\n');
        let first = lines.next().unwrap_or_default();
        let mut output = format!("{marker}{checkbox}{first}");
        for line in lines {
            output.push('\n');
            if !line.is_empty() {
                output.push_str(&indent);
                output.push_str(line);
            }
        }
        Ok(output.trim_end_matches(' ').to_string())
    }

    async fn convert_table(&self, table: &Table) -> ConversionResult<String> {
        let mut header = Vec::with_capacity(table.columns.len());
        for column in &table.columns {
            header.push(
                self.convert_inline_contents(&column.header_cell.content)
                    .await?,
            );
        }

        let mut lines = vec![table_row(&header), table_row(&vec![" - "; table.columns.len()])];
        for row in &table.rows {
            let mut cells = Vec::with_capacity(row.len());
            for cell in row {
                cells.push(self.convert_inline_contents(&cell.content).await?);
            }
            lines.push(table_row(&cells));
        }
        Ok(lines.join("\n"))
    }

    async fn convert_image(&self, image: &Image) -> ConversionResult<String> {
        match &image.target {
            LinkTarget::External(target) => Ok(format!(
                "![{}]({})",
                image.alt.as_deref().unwrap_or_default(),
                target.url
            )),
            LinkTarget::Internal(target) => {
                self.links
                    .serialize_image(target, image.alt.as_deref())
                    .await
            }
        }
    }

    fn convert_inline_content<'a>(
        &'a self,
        inline: &'a InlineContent,
    ) -> BoxFuture<'a, ConversionResult<String>> {
        Box::pin(async move {
            match inline {
                InlineContent::Text(text) => Ok(convert_text(text)),
                InlineContent::Link(link) => match &link.target {
                    LinkTarget::External(target) => {
                        let label = self.convert_inline_contents(&link.content).await?;
                        Ok(format!("[{label}]({})", target.url))
                    }
                    LinkTarget::Internal(target) => {
                        self.links.serialize(&link.content, target, self).await
                    }
                },
                InlineContent::Image(image) => self.convert_image(image).await,
                InlineContent::Superscript(script) => Ok(format!("^{}^", script.content)),
                InlineContent::Subscript(_) => Err(ConversionError::Unimplemented(
                    "subscript has no Markdown syntax".into(),
                )),
                InlineContent::InlineMacro(invocation) => self.convert_macro(invocation).await,
            }
        })
    }

    /// `{{id k="v" /}}` without body, `{{id k="v"}}body{{/id}}` otherwise.
    async fn convert_macro(&self, invocation: &MacroInvocation) -> ConversionResult<String> {
        let mut output = format!("{{{{{}", invocation.id);
        for (name, value) in &invocation.params {
            output.push_str(&format!(" {name}=\"{}\"", escape_param_value(value)));
        }

        let body = match &invocation.body {
            MacroBody::None => {
                output.push_str(" /}}");
                return Ok(output);
            }
            MacroBody::Raw { content } => content.clone(),
            MacroBody::InlineContents { inlines } => {
                escape_line_start(&self.convert_inline_contents(inlines).await?)
            }
            MacroBody::BlockContent { block: None } => String::new(),
            MacroBody::BlockContent { block: Some(block) } => {
                format!("\n{}\n", self.convert_block(block).await?)
            }
        };
        output.push_str("}}");
        output.push_str(&body);
        output.push_str(&format!("{{{{/{}}}}}", invocation.id));
        Ok(output)
    }
}

impl Default for MarkdownSerializer {
    fn default() -> Self {
        MarkdownSerializer::new(Arc::new(DefaultInternalLinksSerializer))
    }
}

/// Wrap a text run in its style markers, innermost first: code, bold, italic, strikethrough.
fn convert_text(text: &Text) -> String {
    if text.content.is_empty() {
        return String::new();
    }
    let styles = &text.styles;
    let mut output = if styles.code {
        code_span(&text.content)
    } else {
        escape_text(&text.content)
    };
    if styles.bold {
        output = format!("**{output}**");
    }
    if styles.italic {
        output = format!("_{output}_");
    }
    if styles.strikethrough {
        output = format!("~~{output}~~");
    }
    output
}

fn longest_backtick_run(content: &str) -> usize {
    content
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0)
}

fn code_span(content: &str) -> String {
    let fence = "`".repeat(longest_backtick_run(content) + 1);
    if content.starts_with('`') || content.ends_with('`') {
        format!("{fence} {content} {fence}")
    } else {
        format!("{fence}{content}{fence}")
    }
}

/// Escape inline markup characters in every line, and block markers on lines after the first.
fn escape_text(content: &str) -> String {
    let lines: Vec<String> = content
        .split('\n')
        .enumerate()
        .map(|(index, line)| {
            let line = escape_inline(line);
            if index == 0 {
                line
            } else {
                escape_line_start(&line)
            }
        })
        .collect();
    lines.join("\n")
}

fn escape_inline(line: &str) -> String {
    let mut output = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        let escape = match c {
            '\\' | '`' | '*' | '_' | '~' | '^' | '[' | ']' | '<' | '|' => true,
            '{' => chars.peek() == Some(&'{'),
            // entity or numeric character reference
            '&' => chars
                .peek()
                .is_some_and(|next| next.is_ascii_alphanumeric() || *next == '#'),
            _ => false,
        };
        if escape {
            output.push('\\');
        }
        output.push(c);
    }
    output
}

/// Escape a marker that would open a heading, quote, list or setext underline.
fn escape_line_start(line: &str) -> String {
    let trimmed = line.trim_start_matches(' ');
    let indent = &line[..line.len() - trimmed.len()];
    if trimmed.starts_with(['#', '>', '-', '+', '=']) {
        return format!("{indent}\\{trimmed}");
    }
    let digits = trimmed.bytes().take_while(|b| b.is_ascii_digit()).count();
    if (1..=9).contains(&digits) && trimmed[digits..].starts_with(['.', ')']) {
        return format!("{indent}{}\\{}", &trimmed[..digits], &trimmed[digits..]);
    }
    line.to_string()
}

fn convert_code_block(code: &CodeBlock) -> String {
    let fence = "`".repeat(longest_backtick_run(&code.content).max(2) + 1);
    format!(
        "{fence}{}\n{}\n{fence}",
        code.language.as_deref().unwrap_or_default(),
        code.content
    )
}

fn table_row<S: AsRef<str>>(cells: &[S]) -> String {
    let cells: Vec<&str> = cells.iter().map(AsRef::as_ref).collect();
    format!("| {} |", cells.join(" | "))
}

/// `\` becomes `\\\` and `"` becomes `\\"`, the two characters `\\` escaping the next one.
fn escape_param_value(value: &str) -> String {
    value.replace('\\', "\\\\\\").replace('"', "\\\\\"")
}
