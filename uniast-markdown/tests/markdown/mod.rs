//! Markdown format tests
//!
//! Tests for bidirectional Markdown ↔ UniAst conversion.

mod errors;
mod json;
mod macros;
mod roundtrip;
