//! Parser configuration consulted on every conversion

/// Knobs of the Markdown parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownParserConfiguration {
    /// When set, `[label](target)` links are always external; internal links
    /// only come from the `[[label|reference]]` syntax.
    pub support_flexmark_internal_links: bool,
}

/// Source of the current parser configuration.
///
/// Resolved once per `parse_markdown` call so that a changing backend is
/// picked up without rebuilding the parser.
pub trait ParserConfigurationResolver: Send + Sync {
    fn get(&self) -> MarkdownParserConfiguration;
}

impl ParserConfigurationResolver for MarkdownParserConfiguration {
    fn get(&self) -> MarkdownParserConfiguration {
        self.clone()
    }
}
