//! Macro registry for body-kind and rendering lookups
//!
//! The codifier asks the registry how a macro's body must be read, and the
//! converter asks whether a lone macro in a paragraph renders as a block or
//! stays inline. Unknown macros are accepted with permissive defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How the body of a macro is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroBodyType {
    /// The macro takes no body.
    #[default]
    None,
    /// The body is kept verbatim.
    Raw,
    /// The body is Markdown and is converted like the surrounding document.
    Wysiwyg,
}

/// Where a macro renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroRenderKind {
    #[default]
    Block,
    Inline,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MacroDefinition {
    pub body_type: MacroBodyType,
    pub render_as: MacroRenderKind,
}

impl MacroDefinition {
    pub fn new(body_type: MacroBodyType, render_as: MacroRenderKind) -> Self {
        MacroDefinition {
            body_type,
            render_as,
        }
    }
}

/// Lookup of macro definitions by id.
pub trait MacroRegistry: Send + Sync {
    fn lookup(&self, id: &str) -> Option<MacroDefinition>;
}

/// Registry that knows no macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyMacroRegistry;

impl MacroRegistry for EmptyMacroRegistry {
    fn lookup(&self, _id: &str) -> Option<MacroDefinition> {
        None
    }
}

/// Registry backed by an in-memory map
///
/// # Examples
///
/// ```ignore
/// let registry = StaticMacroRegistry::new()
///     .with("info", MacroDefinition::new(MacroBodyType::Wysiwyg, MacroRenderKind::Block));
/// assert!(registry.has("info"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticMacroRegistry {
    definitions: HashMap<String, MacroDefinition>,
}

impl StaticMacroRegistry {
    pub fn new() -> Self {
        StaticMacroRegistry {
            definitions: HashMap::new(),
        }
    }

    /// Register a macro
    ///
    /// If a macro with the same id already exists, it will be replaced.
    pub fn register(&mut self, id: impl Into<String>, definition: MacroDefinition) {
        self.definitions.insert(id.into(), definition);
    }

    /// Builder-style variant of [`StaticMacroRegistry::register`].
    pub fn with(mut self, id: impl Into<String>, definition: MacroDefinition) -> Self {
        self.register(id, definition);
        self
    }

    pub fn has(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// List all registered macro ids (sorted)
    pub fn list_macros(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.definitions.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl MacroRegistry for StaticMacroRegistry {
    fn lookup(&self, id: &str) -> Option<MacroDefinition> {
        self.definitions.get(id).copied()
    }
}
