//! Highlight categories
//!
//! Capture names from the SQL grammar's highlight query are mapped onto these
//! categories, which the theme palette colors by name.

/// Category names mapped to theme colors.
/// Index into this array is the HighlightId.
pub const HIGHLIGHT_NAMES: &[&str] = &[
    "attribute",             // ASC, DESC, NULLS FIRST
    "boolean",               // TRUE, FALSE
    "comment",               // -- and /* */
    "constant.builtin",      // NULL
    "function",              // COUNT(...)
    "keyword",               // SELECT, FROM
    "keyword.operator",      // AND, OR, NOT, IN
    "number",                // 42, 3.14
    "operator",              // =, <>, +
    "property",              // table.column
    "punctuation",           // general
    "punctuation.bracket",   // ( )
    "punctuation.delimiter", // , ; .
    "string",                // 'text'
    "type",                  // table names
    "type.builtin",          // INT, VARCHAR
    "variable",              // column names
    "variable.parameter",    // $1, ?
];

/// Index into HIGHLIGHT_NAMES
pub type HighlightId = u16;

/// A single highlighted span of the rendered text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightToken {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Index into HIGHLIGHT_NAMES
    pub highlight: HighlightId,
}

/// Look up highlight ID by category name
pub fn highlight_id_for_name(name: &str) -> Option<HighlightId> {
    // Handle hierarchical names: try exact match first, then progressively shorter
    // parents (e.g. "keyword.operator.logical" -> "keyword.operator" -> "keyword").
    let mut current = name;
    loop {
        if let Some(pos) = HIGHLIGHT_NAMES.iter().position(|&n| n == current) {
            return Some(pos as HighlightId);
        }

        let Some(dot_pos) = current.rfind('.') else {
            break;
        };
        current = &current[..dot_pos];
    }

    None
}

/// Parent category of a highlight (e.g. "keyword.operator" -> "keyword")
pub fn parent_highlight(id: HighlightId) -> Option<HighlightId> {
    let name = HIGHLIGHT_NAMES.get(id as usize)?;
    let dot_pos = name.rfind('.')?;
    highlight_id_for_name(&name[..dot_pos])
}

/// Capture names in the SQL grammar's query that predate the dotted names
const CAPTURE_ALIASES: &[(&str, &str)] = &[
    ("conditional", "keyword"),
    ("field", "property"),
    ("float", "number"),
    ("parameter", "variable.parameter"),
    ("storageclass", "keyword"),
];

/// Look up highlight ID for a query capture name
pub fn highlight_id_for_capture(name: &str) -> Option<HighlightId> {
    let name = CAPTURE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name, |(_, category)| category);
    highlight_id_for_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_id_lookup() {
        assert!(highlight_id_for_name("keyword").is_some());
        assert!(highlight_id_for_name("keyword.operator").is_some());
        assert_eq!(
            highlight_id_for_name("keyword.operator.logical"),
            highlight_id_for_name("keyword.operator")
        );
        assert!(highlight_id_for_name("nonexistent").is_none());
    }

    #[test]
    fn test_parent_highlight() {
        let op = highlight_id_for_name("keyword.operator").unwrap();
        assert_eq!(parent_highlight(op), highlight_id_for_name("keyword"));
        let kw = highlight_id_for_name("keyword").unwrap();
        assert_eq!(parent_highlight(kw), None);
    }

    #[test]
    fn test_capture_names_map_to_categories() {
        assert_eq!(
            highlight_id_for_capture("function.call"),
            highlight_id_for_name("function")
        );
        assert_eq!(highlight_id_for_capture("float"), highlight_id_for_name("number"));
        assert_eq!(highlight_id_for_capture("field"), highlight_id_for_name("property"));
        assert_eq!(
            highlight_id_for_capture("type.qualifier"),
            highlight_id_for_name("type")
        );
        assert_eq!(highlight_id_for_capture("spell"), None);
    }
}
