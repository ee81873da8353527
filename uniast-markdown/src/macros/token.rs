//! Opaque inline-code tokens standing in for macro calls
//!
//! A codified macro is written as a Markdown code span whose literal is
//! [`CODIFIED_MACRO_PREFIX`] followed by the base64 encoded JSON of the
//! [`MacroCall`]. Code spans are atomic to the Markdown tokenizer, so the call
//! survives tokenization untouched and is decoded back by the converter.

use super::codifier::MacroCall;
use crate::error::{ConversionError, ConversionResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

pub const CODIFIED_MACRO_PREFIX: &str = "XWIKI_CODIFIED_MACRO:";

/// Encode a call as a complete code span fenced by `fence` backticks.
///
/// The payload holds no backtick, so any fence length closes the span.
pub fn encode(call: &MacroCall, fence: usize) -> ConversionResult<String> {
    let json = serde_json::to_vec(call).map_err(|e| {
        ConversionError::Internal(format!("cannot encode macro '{}': {e}", call.id))
    })?;
    let fence = "`".repeat(fence.max(1));
    Ok(format!("{fence}{CODIFIED_MACRO_PREFIX}{}{fence}", STANDARD.encode(json)))
}

/// Decode the literal of a code span.
///
/// Returns `Ok(None)` for ordinary inline code.
pub fn decode(literal: &str) -> ConversionResult<Option<MacroCall>> {
    let Some(payload) = literal.strip_prefix(CODIFIED_MACRO_PREFIX) else {
        return Ok(None);
    };
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ConversionError::InvalidToken(e.to_string()))?;
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| ConversionError::InvalidToken(e.to_string()))
}
