use crate::dialect::Language;

/// Nesting allowed before the parser gives up.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options shared by every parse entry point.
///
/// ```
/// use cql_lang::{Language, ParseOptions};
///
/// let options = ParseOptions::new().language(Language::Ecql).max_depth(16);
/// assert_eq!(options.language, Language::Ecql);
/// assert_eq!(ParseOptions::default().max_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub language: Language,
    /// Maximum nesting of groups, negations, calls, chained arithmetic and
    /// geometry parentheses
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            language: Language::Cql,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl From<Language> for ParseOptions {
    fn from(language: Language) -> Self {
        ParseOptions::new().language(language)
    }
}
