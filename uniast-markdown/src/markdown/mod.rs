//! Markdown format implementation
//!
//! This module implements bidirectional conversion between XWiki-flavoured Markdown and UniAst.
//!
//! # Library Choice
//!
//! We use the `comrak` crate for Markdown tokenizing (CommonMark plus the GFM table,
//! strikethrough and task list extensions, and superscript). Serialization writes text
//! directly, see [serializer].
//!
//! # Element Mapping Table
//!
//! | UniAst node     | Markdown                       | Export Notes                      | Import Notes                           |
//! |-----------------|--------------------------------|-----------------------------------|----------------------------------------|
//! | paragraph       | Paragraph                      | Direct                            | Lone macro token → macroBlock          |
//! | heading         | # .. ######                    | Level 1-6 only                    | Direct                                 |
//! | quote           | > quote                        | `> ` on every line                | Direct                                 |
//! | list            | * item / N. item / [ ] task    | Always `*` bullets, stored numbers| number = start + index                 |
//! | code            | ```lang                        | Fence outgrows inner backticks    | First word of the info string          |
//! | table           | GFM table                      | ` - ` separators, no alignment    | First row becomes the columns          |
//! | image           | ![alt](url) / ![[alt\|ref]]    | Internal via links serializer     | Internal images aligned left           |
//! | break           | ---                            | Direct                            | Both `---` and `***`                   |
//! | macroBlock      | {{id /}} / {{id}}..{{/id}}     | Params quoted and escaped         | From codified tokens                   |
//! | Inline:         |                                |                                   |                                        |
//! |   text          | **b** _i_ ~~s~~ `c`            | Markers innermost first: c, b, i, s | Styles accumulated from marks        |
//! |   link          | [label](url) / [[label\|ref]]  | Internal via links serializer     | Resolution failure keeps it unresolved |
//! |   superscript   | ^x^                            | Direct                            | Direct                                 |
//! |   subscript     | (none)                         | Fatal                             | n/a                                    |
//! |   inlineMacro   | {{id /}}                       | Same as macroBlock                | Macro token among other inlines        |
//!
//! # Lossy Conversions
//!
//! - Bullet characters normalize to `*`, emphasis to `_`, strong to `**`
//! - Table column alignment is dropped
//! - Inline code without a macro becomes unstyled text
//! - Adjacent bullet lists separated by a blank line merge when re-parsed
//!
//! # Unsupported
//!
//! Raw HTML, hard line breaks and footnotes abort the conversion.

pub mod mdast;
pub mod parser;
pub mod serializer;
pub mod wiki_syntax;

use std::future::Future;
use std::pin::Pin;

/// Boxed future used for the recursive steps of the conversions.
pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub use parser::MarkdownParser;
pub use serializer::MarkdownSerializer;
