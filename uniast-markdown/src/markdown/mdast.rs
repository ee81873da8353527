//! Owned Markdown syntax tree
//!
//! Comrak produces an arena-allocated tree of `RefCell` nodes, which can
//! neither outlive the arena nor cross an await point. [`tokenize`] parses the
//! source and lowers the arena into this plain tree in one synchronous pass,
//! normalizing it on the way:
//!     - adjacent text fragments and soft breaks are merged into one text run
//!       (soft breaks become `\n`), so inline syntaxes spanning several comrak
//!       text nodes can be scanned as a whole
//!     - code block literals lose their trailing newline, and the language is
//!       the first word of the info string

use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // Blocks
    Paragraph(Vec<Node>),
    Heading { depth: u8, children: Vec<Node> },
    Blockquote(Vec<Node>),
    List(List),
    Code { value: String, lang: Option<String> },
    /// First row is the header row.
    Table(Vec<Vec<Vec<Node>>>),
    ThematicBreak,

    // Inlines
    Text(String),
    Strong(Vec<Node>),
    Emphasis(Vec<Node>),
    Delete(Vec<Node>),
    Superscript(Vec<Node>),
    InlineCode(String),
    Link { url: String, children: Vec<Node> },
    Image { url: String, alt: String },
    /// Hard line break.
    Break,

    /// Anything the converters do not handle (HTML, footnotes, ...).
    Unsupported(&'static str),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Paragraph(_) => "paragraph",
            Node::Heading { .. } => "heading",
            Node::Blockquote(_) => "blockquote",
            Node::List(_) => "list",
            Node::Code { .. } => "code",
            Node::Table(_) => "table",
            Node::ThematicBreak => "thematicBreak",
            Node::Text(_) => "text",
            Node::Strong(_) => "strong",
            Node::Emphasis(_) => "emphasis",
            Node::Delete(_) => "delete",
            Node::Superscript(_) => "superscript",
            Node::InlineCode(_) => "inlineCode",
            Node::Link { .. } => "link",
            Node::Image { .. } => "image",
            Node::Break => "break",
            Node::Unsupported(kind) => *kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    /// Number of the first item, `None` for bullet lists.
    pub start: Option<u64>,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub checked: Option<bool>,
    pub children: Vec<Node>,
}

/// Parse Markdown into top-level block nodes.
pub fn tokenize(source: &str) -> Vec<Node> {
    let arena = Arena::new();
    let options = default_comrak_options();
    let root = parse_document(&arena, source, &options);
    lower_children(root)
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.extension.superscript = true;
    options.extension.footnotes = true;
    options
}

fn lower_children<'a>(node: &'a AstNode<'a>) -> Vec<Node> {
    let mut nodes: Vec<Node> = Vec::new();
    for child in node.children() {
        let lowered = lower(child);
        if let (Node::Text(text), Some(Node::Text(previous))) = (&lowered, nodes.last_mut()) {
            previous.push_str(text);
            continue;
        }
        nodes.push(lowered);
    }
    nodes
}

fn lower<'a>(node: &'a AstNode<'a>) -> Node {
    let data = node.data.borrow();
    match &data.value {
        NodeValue::Paragraph => Node::Paragraph(lower_children(node)),
        NodeValue::Heading(heading) => Node::Heading {
            depth: heading.level,
            children: lower_children(node),
        },
        NodeValue::BlockQuote => Node::Blockquote(lower_children(node)),
        NodeValue::List(list) => Node::List(List {
            start: matches!(list.list_type, ListType::Ordered).then_some(list.start as u64),
            items: node.children().map(lower_item).collect(),
        }),
        NodeValue::CodeBlock(code) => {
            let value = code
                .literal
                .strip_suffix('\n')
                .unwrap_or(&code.literal)
                .to_string();
            Node::Code {
                value,
                lang: code.info.split_whitespace().next().map(str::to_string),
            }
        }
        NodeValue::Table(_) => Node::Table(
            node.children()
                .map(|row| row.children().map(lower_children).collect())
                .collect(),
        ),
        NodeValue::ThematicBreak => Node::ThematicBreak,
        NodeValue::Text(text) => Node::Text(text.clone()),
        NodeValue::SoftBreak => Node::Text("\n".to_string()),
        NodeValue::LineBreak => Node::Break,
        NodeValue::Code(code) => Node::InlineCode(code.literal.clone()),
        NodeValue::Emph => Node::Emphasis(lower_children(node)),
        NodeValue::Strong => Node::Strong(lower_children(node)),
        NodeValue::Strikethrough => Node::Delete(lower_children(node)),
        NodeValue::Superscript => Node::Superscript(lower_children(node)),
        NodeValue::Link(link) => Node::Link {
            url: link.url.clone(),
            children: lower_children(node),
        },
        NodeValue::Image(link) => {
            let mut alt = String::new();
            collect_text(node, &mut alt);
            Node::Image {
                url: link.url.clone(),
                alt,
            }
        }
        NodeValue::HtmlBlock(_) => Node::Unsupported("html"),
        NodeValue::HtmlInline(_) => Node::Unsupported("inline html"),
        NodeValue::FootnoteDefinition(_) => Node::Unsupported("footnoteDefinition"),
        NodeValue::FootnoteReference(_) => Node::Unsupported("footnoteReference"),
        NodeValue::Item(_) | NodeValue::TaskItem(_) => Node::Unsupported("listItem"),
        _ => Node::Unsupported("unknown"),
    }
}

fn lower_item<'a>(node: &'a AstNode<'a>) -> ListItem {
    let checked = match &node.data.borrow().value {
        NodeValue::TaskItem(symbol) => Some(symbol.is_some()),
        _ => None,
    };
    ListItem {
        checked,
        children: lower_children(node),
    }
}

/// Plain text of a subtree (image alt texts).
fn collect_text<'a>(node: &'a AstNode<'a>, output: &mut String) {
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Text(text) => output.push_str(text),
            NodeValue::Code(code) => output.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => output.push('\n'),
            _ => collect_text(child, output),
        }
    }
}
