//! Standalone implementations of the reference collaborators
//!
//! [`DefaultReferenceParser`] understands XWiki string references:
//!
//!     wiki:Space.SubSpace.Page@file.png
//!
//! where `\` escapes a separator, the wiki, space and page parts are optional
//! (falling back to `xwiki`, `Main` and `WebHome`), and strings that look like
//! URLs are rejected so that they stay external links.

use super::{
    InternalLinksSerializer, ModelReferenceHandler, ModelReferenceParser, ReferenceParserOptions,
};
use crate::error::{ConversionResult, ReferenceError};
use crate::markdown::serializer::MarkdownSerializer;
use crate::uniast::{EntityReference, EntityType, InlineContent, InternalTarget};
use async_trait::async_trait;

pub const DEFAULT_WIKI: &str = "xwiki";
pub const DEFAULT_SPACE: &str = "Main";
pub const DEFAULT_DOCUMENT: &str = "WebHome";

const URL_PREFIXES: &[&str] = &["mailto:", "data:", "#", "/"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultReferenceParser {
    default_wiki: String,
    default_space: String,
    default_document: String,
}

impl DefaultReferenceParser {
    pub fn new(
        default_wiki: impl Into<String>,
        default_space: impl Into<String>,
        default_document: impl Into<String>,
    ) -> Self {
        DefaultReferenceParser {
            default_wiki: default_wiki.into(),
            default_space: default_space.into(),
            default_document: default_document.into(),
        }
    }

    fn parse_document(&self, raw: &str) -> EntityReference {
        let (wiki, path) = self.split_wiki(raw);
        let mut segments = split_unescaped(path, '.');
        let page = segments
            .pop()
            .filter(|page| !page.is_empty())
            .unwrap_or_else(|| self.default_document.clone());
        EntityReference::new(EntityType::Document, page).with_parent(self.space_chain(wiki, segments))
    }

    fn parse_space(&self, raw: &str) -> EntityReference {
        let (wiki, path) = self.split_wiki(raw);
        self.space_chain(wiki, split_unescaped(path, '.'))
    }

    fn split_wiki<'a>(&self, raw: &'a str) -> (String, &'a str) {
        match split_once_unescaped(raw, ':') {
            Some((wiki, path)) if !wiki.is_empty() => (unescape(wiki), path),
            Some((_, path)) => (self.default_wiki.clone(), path),
            None => (self.default_wiki.clone(), raw),
        }
    }

    fn space_chain(&self, wiki: String, mut spaces: Vec<String>) -> EntityReference {
        spaces.retain(|space| !space.is_empty());
        if spaces.is_empty() {
            spaces.push(self.default_space.clone());
        }
        spaces.into_iter().fold(
            EntityReference::new(EntityType::Wiki, wiki),
            |parent, space| EntityReference::new(EntityType::Space, space).with_parent(parent),
        )
    }
}

impl Default for DefaultReferenceParser {
    fn default() -> Self {
        DefaultReferenceParser::new(DEFAULT_WIKI, DEFAULT_SPACE, DEFAULT_DOCUMENT)
    }
}

impl ModelReferenceParser for DefaultReferenceParser {
    fn parse(
        &self,
        raw: &str,
        options: &ReferenceParserOptions,
    ) -> Result<EntityReference, ReferenceError> {
        let expected = options.entity_type;
        if raw.trim().is_empty() {
            return Err(ReferenceError::new(raw, expected, "empty reference"));
        }
        if looks_like_url(raw) {
            return Err(ReferenceError::new(raw, expected, "looks like an external URL"));
        }

        match expected {
            EntityType::Wiki => Ok(EntityReference::new(EntityType::Wiki, unescape(raw))),
            EntityType::Space => Ok(self.parse_space(raw)),
            EntityType::Document => Ok(self.parse_document(raw)),
            EntityType::Attachment => {
                let (document, file) = rsplit_once_unescaped(raw, '@').unwrap_or(("", raw));
                if file.is_empty() {
                    return Err(ReferenceError::new(raw, expected, "missing attachment name"));
                }
                Ok(EntityReference::new(EntityType::Attachment, unescape(file))
                    .with_parent(self.parse_document(document)))
            }
        }
    }
}

fn looks_like_url(raw: &str) -> bool {
    raw.contains("://") || URL_PREFIXES.iter().any(|prefix| raw.starts_with(prefix))
}

fn unescaped_positions(source: &str, separator: char) -> impl Iterator<Item = usize> + '_ {
    let mut escaped = false;
    source.char_indices().filter_map(move |(i, c)| {
        if escaped {
            escaped = false;
            None
        } else if c == '\\' {
            escaped = true;
            None
        } else {
            (c == separator).then_some(i)
        }
    })
}

fn split_once_unescaped(source: &str, separator: char) -> Option<(&str, &str)> {
    let at = unescaped_positions(source, separator).next()?;
    Some((&source[..at], &source[at + separator.len_utf8()..]))
}

fn rsplit_once_unescaped(source: &str, separator: char) -> Option<(&str, &str)> {
    let at = unescaped_positions(source, separator).last()?;
    Some((&source[..at], &source[at + separator.len_utf8()..]))
}

fn split_unescaped(source: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    for at in unescaped_positions(source, separator) {
        parts.push(unescape(&source[start..at]));
        start = at + separator.len_utf8();
    }
    parts.push(unescape(&source[start..]));
    parts
}

fn unescape(source: &str) -> String {
    let mut result = String::with_capacity(source.len());
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => result.extend(chars.next()),
            c => result.push(c),
        }
    }
    result
}

/// Titles documents by their page name, or by their space for home pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultReferenceHandler;

impl ModelReferenceHandler for DefaultReferenceHandler {
    fn get_title(&self, reference: &EntityReference) -> String {
        match (&reference.entity_type, &reference.parent) {
            (EntityType::Document, Some(parent)) if reference.name == DEFAULT_DOCUMENT => {
                parent.name.clone()
            }
            _ => reference.name.clone(),
        }
    }
}

/// Writes `[[label|reference]]` links and `![[alt|reference]]` images.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInternalLinksSerializer;

#[async_trait]
impl InternalLinksSerializer for DefaultInternalLinksSerializer {
    async fn serialize(
        &self,
        content: &[InlineContent],
        target: &InternalTarget,
        parent: &MarkdownSerializer,
    ) -> ConversionResult<String> {
        let label = parent.convert_inline_contents(content).await?;
        Ok(if label.is_empty() {
            format!("[[{}]]", target.raw_reference)
        } else {
            format!("[[{label}|{}]]", target.raw_reference)
        })
    }

    async fn serialize_image(
        &self,
        target: &InternalTarget,
        alt: Option<&str>,
    ) -> ConversionResult<String> {
        Ok(match alt {
            Some(alt) if !alt.is_empty() => format!("![[{alt}|{}]]", target.raw_reference),
            _ => format!("![[{}]]", target.raw_reference),
        })
    }
}
