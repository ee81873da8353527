//! Macro codifier (Markdown → Markdown with opaque macro tokens)
//!
//! XWiki macros (`{{id param="v" /}}`, `{{id}}body{{/id}}`) are not Markdown
//! and would be torn apart by the tokenizer. Before tokenizing, the codifier
//! scans the raw source, hands every `{{` found outside of code to a handler,
//! and replaces each accepted call with the code span built by
//! [`token::encode`](super::token::encode).
//!
//! Scanning rules:
//!     - `\` escapes the next character outside of code.
//!     - A backtick run of length >= 3 opens a fenced block, closed by a run at
//!       least as long. Shorter runs open a code span when a run of the same
//!       length follows, otherwise they are literal.
//!     - A token is fenced with a backtick run no literal run before it has, so
//!       the tokenizer never pairs a stray backtick with the token.
//!     - Macro bodies are scanned recursively with a handler that stops on the
//!       matching `{{/id}}`, so nested calls with the same id are balanced.
//!       Outcomes are cached by position, keeping unclosed openers linear.

use super::registry::{MacroBodyType, MacroRegistry};
use super::token;
use crate::error::{ConversionError, ConversionResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A macro call as recognized in the source, before conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroCall {
    pub id: String,
    pub params: BTreeMap<String, String>,
    pub body: CodifiedBody,
}

/// Body of a recognized call. Rich bodies stay Markdown until conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CodifiedBody {
    None,
    Raw { content: String },
    Wysiwyg { markdown: String },
}

/// Decision of a handler for the text following a `{{`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Not a macro, keep scanning.
    Ignore,
    /// A macro occupying `chars` bytes after the `{{`, up to but excluding its final `}}`.
    ParseAs { call: MacroCall, chars: usize },
    /// Stop scanning at this `{{`.
    Break,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codified {
    pub content: String,
    /// Byte offset of the `{{` where a handler broke off, if any.
    pub broke_at: Option<usize>,
}

/// Codify a complete document with the default handler.
pub fn codify(markdown: &str, registry: &dyn MacroRegistry) -> ConversionResult<String> {
    let mut eater = MacroEater::new(registry);
    let codified = codify_with(markdown, |rest| eater.eat(rest))?;
    match codified.broke_at {
        None => Ok(codified.content),
        Some(offset) => Err(ConversionError::Internal(format!(
            "document codification stopped at offset {offset}"
        ))),
    }
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    Text,
    InlineCode(usize),
    FencedCode(usize),
}

/// Scan `markdown`, letting `handler` decide on every `{{` outside of code.
pub fn codify_with<H>(markdown: &str, mut handler: H) -> ConversionResult<Codified>
where
    H: FnMut(&str) -> ConversionResult<HandlerOutcome>,
{
    let bytes = markdown.as_bytes();
    let mut content = String::with_capacity(markdown.len());
    let mut copied = 0;
    let mut state = ScanState::Text;
    // literal_runs[n] is set once a literal run of n backticks was copied
    let mut literal_runs = [false; 3];
    let mut i = 0;

    while i < bytes.len() {
        match state {
            ScanState::Text => match bytes[i] {
                b'\\' => i += 2,
                b'`' => {
                    let run = backtick_run(bytes, i);
                    if run >= 3 {
                        state = ScanState::FencedCode(run);
                    } else if has_closing_run(bytes, i + run, run) {
                        state = ScanState::InlineCode(run);
                    } else {
                        literal_runs[run] = true;
                    }
                    i += run;
                }
                b'{' if bytes.get(i + 1) == Some(&b'{') => match handler(&markdown[i + 2..])? {
                    HandlerOutcome::Ignore => i += 1,
                    HandlerOutcome::Break => {
                        content.push_str(&markdown[copied..i]);
                        return Ok(Codified {
                            content,
                            broke_at: Some(i),
                        });
                    }
                    HandlerOutcome::ParseAs { call, chars } => {
                        let end = i + 2 + chars;
                        let closed = markdown
                            .get(end..)
                            .is_some_and(|tail| tail.starts_with("}}"));
                        if !closed {
                            return Err(ConversionError::Internal(format!(
                                "handler for macro '{}' did not stop before the closing braces",
                                call.id
                            )));
                        }
                        let fence = (1..3).find(|&n| !literal_runs[n]).unwrap_or(3);
                        content.push_str(&markdown[copied..i]);
                        content.push_str(&token::encode(&call, fence)?);
                        i = end + 2;
                        copied = i;
                    }
                },
                _ => i += 1,
            },
            ScanState::InlineCode(len) | ScanState::FencedCode(len) => {
                if bytes[i] == b'`' {
                    let run = backtick_run(bytes, i);
                    let closes = match state {
                        ScanState::InlineCode(_) => run == len,
                        _ => run >= len,
                    };
                    if closes {
                        state = ScanState::Text;
                    }
                    i += run;
                } else {
                    i += 1;
                }
            }
        }
    }

    content.push_str(&markdown[copied..]);
    Ok(Codified {
        content,
        broke_at: None,
    })
}

fn backtick_run(bytes: &[u8], from: usize) -> usize {
    bytes[from..].iter().take_while(|&&b| b == b'`').count()
}

fn has_closing_run(bytes: &[u8], from: usize, len: usize) -> bool {
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let run = backtick_run(bytes, i);
            if run == len {
                return true;
            }
            i += run;
        } else {
            i += 1;
        }
    }
    false
}

/// Default handler: recognize a macro call starting right after `{{`.
pub fn eat_macro(rest: &str, registry: &dyn MacroRegistry) -> ConversionResult<HandlerOutcome> {
    MacroEater::new(registry).eat(rest)
}

/// Default handler over one document.
///
/// Every handler call receives a suffix of that document, so the suffix length
/// identifies the opener and its outcome is computed once.
struct MacroEater<'r> {
    registry: &'r dyn MacroRegistry,
    outcomes: HashMap<usize, HandlerOutcome>,
}

impl<'r> MacroEater<'r> {
    fn new(registry: &'r dyn MacroRegistry) -> Self {
        MacroEater {
            registry,
            outcomes: HashMap::new(),
        }
    }

    fn eat(&mut self, rest: &str) -> ConversionResult<HandlerOutcome> {
        if let Some(outcome) = self.outcomes.get(&rest.len()) {
            return Ok(outcome.clone());
        }
        let outcome = self.scan(rest)?;
        self.outcomes.insert(rest.len(), outcome.clone());
        Ok(outcome)
    }

    fn scan(&mut self, rest: &str) -> ConversionResult<HandlerOutcome> {
        let Some(opening) = scan_opening_tag(rest) else {
            return Ok(HandlerOutcome::Ignore);
        };
        let body_type = self.registry.lookup(&opening.id).map(|d| d.body_type);

        if opening.self_closing {
            if matches!(
                body_type,
                Some(MacroBodyType::Raw | MacroBodyType::Wysiwyg)
            ) {
                return Err(ConversionError::Macro {
                    id: opening.id,
                    message: "a body is required but the call is self-closed".into(),
                });
            }
            return Ok(opening.into_outcome(CodifiedBody::None));
        }

        let body_start = opening.length + 2;
        let body_source = &rest[body_start..];
        let scanned = codify_with(body_source, |inner| {
            if closing_tag_length(inner, &opening.id).is_some() {
                Ok(HandlerOutcome::Break)
            } else {
                self.eat(inner)
            }
        })?;

        let Some(body_length) = scanned.broke_at else {
            return match body_type {
                Some(MacroBodyType::None) => Ok(opening.into_outcome(CodifiedBody::None)),
                Some(_) => Err(ConversionError::UnclosedMacro { id: opening.id }),
                None => {
                    debug!("'{{{{{}' is never closed, keeping it as text", opening.id);
                    Ok(HandlerOutcome::Ignore)
                }
            };
        };

        let body = &body_source[..body_length];
        let close_at = body_start + body_length + 2;
        let tail = closing_tag_length(&rest[close_at..], &opening.id).ok_or_else(|| {
            ConversionError::Internal(format!("lost closing tag of macro '{}'", opening.id))
        })?;
        let chars = close_at + tail;

        let body = match body_type {
            Some(MacroBodyType::None) if body.trim().is_empty() => CodifiedBody::None,
            Some(MacroBodyType::None) => {
                return Err(ConversionError::Macro {
                    id: opening.id,
                    message: "the macro takes no body but one was provided".into(),
                })
            }
            Some(MacroBodyType::Wysiwyg) => CodifiedBody::Wysiwyg {
                markdown: body.to_string(),
            },
            Some(MacroBodyType::Raw) | None => CodifiedBody::Raw {
                content: body.to_string(),
            },
        };

        Ok(HandlerOutcome::ParseAs {
            call: MacroCall {
                id: opening.id,
                params: opening.params,
                body,
            },
            chars,
        })
    }
}

/// Length of `/id` plus trailing whitespace when `inner` starts a closing tag for `id`.
fn closing_tag_length(inner: &str, id: &str) -> Option<usize> {
    let after = inner.strip_prefix('/')?.strip_prefix(id)?;
    let trimmed = after.trim_start();
    trimmed
        .starts_with("}}")
        .then(|| inner.len() - trimmed.len())
}

#[derive(Debug)]
struct OpeningTag {
    id: String,
    params: BTreeMap<String, String>,
    self_closing: bool,
    /// Bytes up to the `}}` ending the opening tag.
    length: usize,
}

impl OpeningTag {
    fn into_outcome(self, body: CodifiedBody) -> HandlerOutcome {
        HandlerOutcome::ParseAs {
            chars: self.length,
            call: MacroCall {
                id: self.id,
                params: self.params,
                body,
            },
        }
    }
}

fn scan_opening_tag(rest: &str) -> Option<OpeningTag> {
    let mut cursor = Cursor::new(rest);
    cursor.skip_whitespace();
    let id = cursor.take_while(is_macro_id_char);
    if id.is_empty() {
        return None;
    }

    let mut params = BTreeMap::new();
    loop {
        let before = cursor.pos;
        cursor.skip_whitespace();

        if cursor.eat("/") {
            cursor.skip_whitespace();
            return cursor.rest().starts_with("}}").then(|| OpeningTag {
                id: id.to_string(),
                params,
                self_closing: true,
                length: cursor.pos,
            });
        }
        if cursor.rest().starts_with("}}") {
            return Some(OpeningTag {
                id: id.to_string(),
                params,
                self_closing: false,
                length: cursor.pos,
            });
        }
        // parameters are whitespace separated
        if cursor.pos == before {
            return None;
        }

        let name = cursor.take_while(is_param_name_char);
        if name.is_empty() || !cursor.eat("=") {
            return None;
        }
        let value = if cursor.eat("\"") {
            scan_quoted_value(&mut cursor)?
        } else {
            let digits = cursor.take_while(|c| c.is_ascii_digit());
            if digits.is_empty() {
                return None;
            }
            digits.to_string()
        };
        params.insert(name.to_string(), value);
    }
}

/// Read a quoted value after its opening quote. `\\` takes the next character literally.
fn scan_quoted_value(cursor: &mut Cursor<'_>) -> Option<String> {
    let mut value = String::new();
    loop {
        if cursor.eat("\\\\") {
            value.push(cursor.next_char()?);
            continue;
        }
        match cursor.next_char()? {
            '"' => return Some(value),
            c => value.push(c),
        }
    }
}

fn is_macro_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || (('\u{C0}'..='\u{FF}').contains(&c) && c != '×' && c != '÷')
}

fn is_param_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Cursor { source, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let end = rest
            .char_indices()
            .find(|(_, c)| !predicate(*c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += end;
        &rest[..end]
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.rest().chars().next()?;
        self.pos += c.len_utf8();
        Some(c)
    }
}
