//! Two-way conversion between XWiki-flavoured Markdown and the Universal AST
//!
//!     This crate parses Markdown written for XWiki (CommonMark + GFM tables, strikethrough and task
//!     lists, plus XWiki macros `{{id /}}`, links `[[label|reference]]` and images `![[alt|reference]]`)
//!     into a UniAst, and serializes a UniAst back into Markdown that parses to the same tree.
//!
//!     This is a pure lib: it powers uniast-cli but is shell agnostic, no code should suppose a
//!     shell environment, be it std print, env vars etc. Diagnostics go through the `log` facade.
//!
//! Architecture
//!
//!     Parsing is a three-step pipeline:
//!         1. Codify   (./macros/codifier.rs): macro calls are swapped for opaque inline-code
//!            tokens on the raw source, so that the Markdown tokenizer never sees macro syntax.
//!         2. Tokenize (./markdown/mdast.rs): comrak parses the codified source, and its arena is
//!            lowered into an owned tree.
//!         3. Convert  (./markdown/parser.rs): the owned tree becomes UniAst. Tokens are decoded back
//!            into macros, text runs are scanned for the XWiki link and image syntax
//!            (./markdown/wiki_syntax.rs), and references are resolved through collaborators.
//!
//!     Serialization (./markdown/serializer.rs) is a direct walk of the UniAst.
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # ConversionError (fatal) and ReferenceError (recoverable)
//!     ├── config.rs               # MarkdownParserConfiguration and its resolver
//!     ├── uniast                  # The Universal AST and entity references
//!     ├── macros                  # Codifier, token format, macro registry
//!     ├── references              # Collaborator traits and default implementations
//!     ├── markdown
//!     │   ├── mdast.rs            # comrak → owned tree
//!     │   ├── wiki_syntax.rs      # [[..]] / ![[..]] scanner
//!     │   ├── parser.rs           # Markdown → UniAst
//!     │   └── serializer.rs       # UniAst → Markdown
//!     └── lib.rs
//!
//! Collaborators
//!
//!     Reference parsing, reference titles, internal link serialization and the parser
//!     configuration are injected as trait objects (./references/mod.rs, ./config.rs). Reference
//!     failures never abort a conversion, the target is kept unresolved instead.
//!
//! Testing
//!     tests
//!     ├── common                  # Collaborator doubles
//!     └── markdown
//!         ├── <testname>.rs
//!         └── fixtures
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.

pub mod config;
pub mod error;
pub mod macros;
pub mod markdown;
pub mod references;
pub mod uniast;

pub use config::{MarkdownParserConfiguration, ParserConfigurationResolver};
pub use error::{ConversionError, ConversionResult, ReferenceError};
pub use markdown::{MarkdownParser, MarkdownSerializer};
pub use uniast::UniAst;

/// Parse Markdown with the default collaborators.
pub async fn parse_markdown(markdown: &str) -> ConversionResult<UniAst> {
    MarkdownParser::default().parse_markdown(markdown).await
}

/// Serialize a UniAst with the default collaborators.
pub async fn to_markdown(ast: &UniAst) -> ConversionResult<String> {
    MarkdownSerializer::default().to_markdown(ast).await
}
