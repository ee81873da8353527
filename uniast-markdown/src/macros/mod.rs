//! XWiki macro support
//!
//!     Macros are recognized on the raw Markdown source, before tokenization:
//!         - [codifier]: scans the source and swaps every macro call for an opaque token
//!         - [token]:    the inline-code token format and its decoder
//!         - [registry]: body kind and rendering of known macros
//!
//!     The converter later turns tokens back into `macroBlock` / `inlineMacro` nodes.

pub mod codifier;
pub mod registry;
pub mod token;

pub use codifier::{codify, codify_with, eat_macro, CodifiedBody, HandlerOutcome, MacroCall};
pub use registry::{
    EmptyMacroRegistry, MacroBodyType, MacroDefinition, MacroRegistry, MacroRenderKind,
    StaticMacroRegistry,
};
