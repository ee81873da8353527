//! Shared configuration loader for the uniast converters.
//!
//! `defaults/uniast.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`UniastConfig`].
//!
//! Note that arrays are replaced, not merged: a file declaring `[[macros]]`
//! replaces the whole default macro list.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use uniast_markdown::macros::{
    MacroBodyType, MacroDefinition, MacroRenderKind, StaticMacroRegistry,
};
use uniast_markdown::MarkdownParserConfiguration;

const DEFAULT_TOML: &str = include_str!("../defaults/uniast.default.toml");

/// Top-level configuration consumed by uniast applications.
#[derive(Debug, Clone, Deserialize)]
pub struct UniastConfig {
    pub parser: ParserConfig,
    #[serde(default)]
    pub macros: Vec<MacroConfig>,
}

impl UniastConfig {
    /// Registry holding every configured macro. Later entries win on duplicate ids.
    pub fn macro_registry(&self) -> StaticMacroRegistry {
        self.macros
            .iter()
            .fold(StaticMacroRegistry::new(), |registry, entry| {
                registry.with(entry.id.clone(), MacroDefinition::from(entry))
            })
    }
}

/// Markdown parsing knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    pub support_flexmark_internal_links: bool,
}

impl From<&ParserConfig> for MarkdownParserConfiguration {
    fn from(config: &ParserConfig) -> Self {
        MarkdownParserConfiguration {
            support_flexmark_internal_links: config.support_flexmark_internal_links,
        }
    }
}

/// One `[[macros]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct MacroConfig {
    pub id: String,
    #[serde(default)]
    pub body_type: MacroBodyType,
    #[serde(default)]
    pub render_as: MacroRenderKind,
}

impl From<&MacroConfig> for MacroDefinition {
    fn from(config: &MacroConfig) -> Self {
        MacroDefinition::new(config.body_type, config.render_as)
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<UniastConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<UniastConfig, ConfigError> {
    Loader::new().build()
}
