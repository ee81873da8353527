//! Error types for conversion operations
//!
//! Two tiers exist. [`ConversionError`] is fatal: it aborts a whole
//! `parse_markdown` / `to_markdown` call and is returned to the caller.
//! [`ReferenceError`] is recoverable: the converters catch it, log it and fall
//! back to an unresolved or external target.

use crate::uniast::EntityType;
use thiserror::Error;

/// Errors that abort a conversion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Construct that is recognized but deliberately not supported
    #[error("unimplemented: {0}")]
    Unimplemented(String),

    /// Node kind that cannot appear where it was found
    #[error("unexpected {node} node in {context} context")]
    UnexpectedNode { node: String, context: &'static str },

    /// Heading level outside of 1..=6
    #[error("invalid heading level {0}, expected a value between 1 and 6")]
    InvalidHeadingLevel(u8),

    /// Macro call that does not match its registered body kind
    #[error("macro '{id}': {message}")]
    Macro { id: String, message: String },

    /// Macro with a registered body whose closing tag was never found
    #[error("macro '{id}' is opened but never closed")]
    UnclosedMacro { id: String },

    /// Code span carrying the macro prefix but an undecodable payload
    #[error("invalid codified macro token: {0}")]
    InvalidToken(String),

    /// Broken internal contract (should never surface to users)
    #[error("internal error: {0}")]
    Internal(String),

    /// Internal links serializer failed
    #[error("failed to serialize internal link: {0}")]
    LinkSerialization(String),
}

/// Result alias used throughout the crate
pub type ConversionResult<T> = Result<T, ConversionError>;

/// A reference string could not be resolved into an entity reference
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot resolve '{raw}' as {expected}: {reason}")]
pub struct ReferenceError {
    pub raw: String,
    pub expected: EntityType,
    pub reason: String,
}

impl ReferenceError {
    pub fn new(raw: impl Into<String>, expected: EntityType, reason: impl Into<String>) -> Self {
        ReferenceError {
            raw: raw.into(),
            expected,
            reason: reason.into(),
        }
    }
}
