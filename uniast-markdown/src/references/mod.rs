//! Collaborators used to resolve and write wiki references
//!
//! The converters never interpret reference strings themselves. They delegate to:
//!     - [`ModelReferenceParser`]: raw reference string → [`EntityReference`]
//!     - [`ModelReferenceHandler`]: display title for a parsed reference
//!     - [`InternalLinksSerializer`]: writes internal links and images back to Markdown
//!
//! Failures of the first two are recoverable: the parser logs them and keeps the
//! target unresolved. [`defaults`] provides implementations for standalone use.

pub mod defaults;

use crate::error::{ConversionResult, ReferenceError};
use crate::markdown::serializer::MarkdownSerializer;
use crate::uniast::{EntityReference, EntityType, InlineContent, InternalTarget};
use async_trait::async_trait;

pub use defaults::{DefaultInternalLinksSerializer, DefaultReferenceHandler, DefaultReferenceParser};

/// Options for a single reference resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceParserOptions {
    /// Entity type the raw string is expected to denote.
    pub entity_type: EntityType,
}

impl ReferenceParserOptions {
    pub fn new(entity_type: EntityType) -> Self {
        ReferenceParserOptions { entity_type }
    }
}

/// Resolves raw reference strings.
#[async_trait]
pub trait ModelReferenceParser: Send + Sync {
    fn parse(
        &self,
        raw: &str,
        options: &ReferenceParserOptions,
    ) -> Result<EntityReference, ReferenceError>;

    /// Asynchronous resolution, defaults to [`ModelReferenceParser::parse`].
    async fn parse_async(
        &self,
        raw: &str,
        options: &ReferenceParserOptions,
    ) -> Result<EntityReference, ReferenceError> {
        self.parse(raw, options)
    }
}

/// Produces human-readable titles for references.
pub trait ModelReferenceHandler: Send + Sync {
    fn get_title(&self, reference: &EntityReference) -> String;
}

/// Writes internal links and images as Markdown.
#[async_trait]
pub trait InternalLinksSerializer: Send + Sync {
    /// `parent` is the calling serializer, used to render the link label.
    async fn serialize(
        &self,
        content: &[InlineContent],
        target: &InternalTarget,
        parent: &MarkdownSerializer,
    ) -> ConversionResult<String>;

    async fn serialize_image(
        &self,
        target: &InternalTarget,
        alt: Option<&str>,
    ) -> ConversionResult<String>;
}
