//! Language identification and detection
//!
//! Maps file extensions and editor language ids to language IDs.

use std::path::Path;

/// Supported language identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LanguageId {
    #[default]
    PlainText,
    /// PRQL source, the input language
    Prql,
    /// SQL, the compiled output language
    Sql,
}

impl LanguageId {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "prql" => LanguageId::Prql,
            "sql" => LanguageId::Sql,
            _ => LanguageId::PlainText,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(LanguageId::PlainText)
    }

    /// Detect language from an editor language id (e.g. "prql", "sql")
    pub fn from_language_id(id: &str) -> Self {
        match id.to_lowercase().as_str() {
            "prql" => LanguageId::Prql,
            "sql" => LanguageId::Sql,
            _ => LanguageId::PlainText,
        }
    }

    /// Language tag used on rendered markup (`language-sql`)
    pub fn tag(&self) -> &'static str {
        match self {
            LanguageId::PlainText => "text",
            LanguageId::Prql => "prql",
            LanguageId::Sql => "sql",
        }
    }

    /// Check if this language has syntax highlighting support
    pub fn has_highlighting(&self) -> bool {
        matches!(self, LanguageId::Sql)
    }
}
