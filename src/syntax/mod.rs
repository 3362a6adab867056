//! Syntax highlighting module
//!
//! Renders compiled SQL as themed HTML using the tree-sitter SQL grammar:
//! - Language detection from file extensions and editor language ids
//! - Token classification with the grammar's highlight query
//! - A lazily built, theme-bound highlighter with explicit invalidation

mod highlighter;
mod highlights;
mod languages;

pub use highlighter::{HighlightError, Highlighter, HighlighterCache};
pub use highlights::{
    highlight_id_for_capture, highlight_id_for_name, parent_highlight, HighlightId,
    HighlightToken, HIGHLIGHT_NAMES,
};
pub use languages::LanguageId;
