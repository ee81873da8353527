//! Core data structures of the Universal AST.
//!
//! Every node serializes to JSON with a `type` discriminant and camelCase
//! field names, the shape consumed by editors and other converters.

use super::reference::EntityReference;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root of a converted document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniAst {
    pub blocks: Vec<Block>,
}

impl UniAst {
    pub fn new(blocks: Vec<Block>) -> Self {
        UniAst { blocks }
    }
}

/// A block-level node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Paragraph(Paragraph),
    Heading(Heading),
    Quote(Quote),
    List(List),
    Code(CodeBlock),
    Table(Table),
    Image(Image),
    Break,
    MacroBlock(MacroInvocation),
}

/// Represents a paragraph of inline content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub content: Vec<InlineContent>,
}

impl Paragraph {
    pub fn new(content: Vec<InlineContent>) -> Self {
        Paragraph { content }
    }
}

/// Represents a heading, `level` ranges from 1 to 6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub content: Vec<InlineContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub content: Vec<Block>,
}

/// Represents a list; ordered items carry a `number`, task items a `checked` flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    pub content: Vec<Block>,
}

/// Represents a fenced code block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Represents a table. Column alignment is not tracked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<TableCell>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    pub header_cell: TableCell,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub content: Vec<InlineContent>,
}

/// Represents an image, either standalone or inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub target: LinkTarget,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub styles: ImageStyles,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Represents inline content, such as styled text, links or inline macros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InlineContent {
    Text(Text),
    Link(Link),
    Image(Image),
    Superscript(ScriptText),
    Subscript(ScriptText),
    InlineMacro(MacroInvocation),
}

impl InlineContent {
    /// Unstyled text run.
    pub fn text(content: impl Into<String>) -> Self {
        InlineContent::Text(Text::new(content, TextStyles::default()))
    }
}

/// A run of text sharing one set of styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub content: String,
    #[serde(default)]
    pub styles: TextStyles,
}

impl Text {
    pub fn new(content: impl Into<String>, styles: TextStyles) -> Self {
        Text {
            content: content.into(),
            styles,
        }
    }
}

/// Style flags accumulated from the enclosing emphasis nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyles {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
}

impl TextStyles {
    pub fn bold(self) -> Self {
        TextStyles { bold: true, ..self }
    }

    pub fn italic(self) -> Self {
        TextStyles {
            italic: true,
            ..self
        }
    }

    pub fn strikethrough(self) -> Self {
        TextStyles {
            strikethrough: true,
            ..self
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == TextStyles::default()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub content: Vec<InlineContent>,
    pub target: LinkTarget,
}

/// Content of a superscript or subscript run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptText {
    pub content: String,
}

/// Destination of a link or image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LinkTarget {
    External(ExternalTarget),
    Internal(InternalTarget),
}

impl LinkTarget {
    pub fn external(url: impl Into<String>) -> Self {
        LinkTarget::External(ExternalTarget { url: url.into() })
    }

    pub fn internal(raw_reference: impl Into<String>, parsed: Option<EntityReference>) -> Self {
        LinkTarget::Internal(InternalTarget {
            raw_reference: raw_reference.into(),
            parsed_reference: parsed,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalTarget {
    pub url: String,
}

/// Wiki-internal destination. `parsed_reference` is `None` when the raw
/// reference could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalTarget {
    pub raw_reference: String,
    pub parsed_reference: Option<EntityReference>,
}

/// A macro call, used both as a block and inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroInvocation {
    pub id: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub body: MacroBody,
}

impl MacroInvocation {
    pub fn new(id: impl Into<String>) -> Self {
        MacroInvocation {
            id: id.into(),
            params: BTreeMap::new(),
            body: MacroBody::None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: MacroBody) -> Self {
        self.body = body;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MacroBody {
    #[default]
    None,
    Raw {
        content: String,
    },
    InlineContents {
        inlines: Vec<InlineContent>,
    },
    BlockContent {
        block: Option<Box<Block>>,
    },
}
