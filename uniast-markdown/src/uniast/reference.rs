//! Parsed references to wiki entities (wikis, spaces, documents, attachments).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Wiki,
    Space,
    Document,
    Attachment,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityType::Wiki => "wiki",
            EntityType::Space => "space",
            EntityType::Document => "document",
            EntityType::Attachment => "attachment",
        };
        f.write_str(name)
    }
}

/// A reference to a wiki entity, linked to its enclosing entity through `parent`.
///
/// `Main.Sub.Page` in wiki `xwiki` is stored as
/// `document(Page) -> space(Sub) -> space(Main) -> wiki(xwiki)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReference {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<EntityReference>>,
}

impl EntityReference {
    pub fn new(entity_type: EntityType, name: impl Into<String>) -> Self {
        EntityReference {
            entity_type,
            name: name.into(),
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: EntityReference) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Walk up the parent chain and return the first entity of the given type.
    pub fn extract(&self, entity_type: EntityType) -> Option<&EntityReference> {
        let mut current = Some(self);
        while let Some(reference) = current {
            if reference.entity_type == entity_type {
                return Some(reference);
            }
            current = reference.parent.as_deref();
        }
        None
    }
}
