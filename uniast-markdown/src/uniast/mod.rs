//! Universal AST (UniAst)
//!
//!     The editor-facing, format-neutral document tree. Markdown is parsed into it and serialized
//!     back from it. See [nodes] for the node kinds and [reference] for parsed wiki references.

pub mod nodes;
pub mod reference;

pub use nodes::*;
pub use reference::{EntityReference, EntityType};
