//! Parser configuration.

/// Settings for one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// [§ 13.2.6.4.4](https://html.spec.whatwg.org/multipage/parsing.html#scripting-flag)
    ///
    /// "The scripting flag is set to "enabled" if scripting was enabled for the
    /// Document with which the parser is associated when the parser was
    /// created, and "disabled" otherwise."
    ///
    /// When enabled `<noscript>` content is raw text; when disabled it is
    /// parsed as markup (in head through the "in head noscript" mode).
    pub scripting_enabled: bool,
    /// Record a source location for every element created from a tag token.
    pub source_locations: bool,
    /// Keep the list of parse errors.
    pub record_issues: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            scripting_enabled: true,
            source_locations: false,
            record_issues: true,
        }
    }
}
