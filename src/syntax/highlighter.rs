//! SQL highlighter and its cache
//!
//! A [`Highlighter`] is built for one theme: it loads the palette, prepares a
//! tree-sitter parser for the SQL grammar and compiles the grammar's highlight
//! query. It is never re-themed in place; [`HighlighterCache`] drops it and
//! builds a new one after invalidation.

use std::path::{Path, PathBuf};

use streaming_iterator::StreamingIterator;
use tree_sitter::{Parser, Query, QueryCursor, Tree};

use super::highlights::{highlight_id_for_capture, HighlightId, HighlightToken};
use super::languages::LanguageId;
use crate::theme::{load_theme_from, resolve_theme_name, HighlightTheme, ThemeId};

/// Failure to construct a highlighter
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    #[error("Failed to load theme '{id}': {message}")]
    Theme { id: ThemeId, message: String },
    #[error("Failed to load SQL grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),
    #[error("Invalid SQL highlight query: {0}")]
    Query(#[from] tree_sitter::QueryError),
}

/// The grammar's query writes `#match?` patterns in Lua syntax (`%d`); the
/// query cursor evaluates them as regular expressions.
fn sql_highlights_query() -> String {
    tree_sitter_sequel::HIGHLIGHTS_QUERY.replace("%d", "\\\\d")
}

/// Converts code to themed HTML markup
pub struct Highlighter {
    theme_id: ThemeId,
    theme: HighlightTheme,
    parser: Parser,
    query: Query,
    /// Highlight for each capture index of `query`
    capture_highlights: Vec<Option<HighlightId>>,
}

impl Highlighter {
    /// Build a highlighter for a theme, honoring user theme overrides
    pub fn new(theme_id: ThemeId) -> Result<Self, HighlightError> {
        Self::with_user_themes(theme_id, crate::config_paths::themes_dir().as_deref())
    }

    /// Build a highlighter, looking for palette overrides in `user_dir`
    pub fn with_user_themes(
        theme_id: ThemeId,
        user_dir: Option<&Path>,
    ) -> Result<Self, HighlightError> {
        let theme = load_theme_from(theme_id, user_dir).map_err(|message| {
            HighlightError::Theme {
                id: theme_id,
                message,
            }
        })?;

        let language: tree_sitter::Language = tree_sitter_sequel::LANGUAGE.into();
        let mut parser = Parser::new();
        parser.set_language(&language)?;
        let query = Query::new(&language, &sql_highlights_query())?;
        let capture_highlights = query
            .capture_names()
            .iter()
            .map(|name| highlight_id_for_capture(name))
            .collect();

        tracing::debug!("Created highlighter for theme {}", theme_id);
        Ok(Self {
            theme_id,
            theme,
            parser,
            query,
            capture_highlights,
        })
    }

    pub fn theme_id(&self) -> ThemeId {
        self.theme_id
    }

    /// Render `code` as `<pre><code>` markup, one `<span class="line">` per line.
    ///
    /// Always returns non-empty markup, even for empty input.
    pub fn code_to_html(&mut self, code: &str, language: LanguageId) -> String {
        let code = code.strip_suffix('\n').unwrap_or(code);
        let tokens = if language.has_highlighting() {
            self.tokens(code)
        } else {
            Vec::new()
        };

        let mut html = String::with_capacity(code.len() * 2 + 128);
        html.push_str(&format!(
            r#"<pre class="prql-preview {} language-{}" style="background-color:{};color:{}" tabindex="0"><code><span class="line">"#,
            self.theme_id,
            language.tag(),
            self.theme.background.to_css(),
            self.theme.foreground.to_css(),
        ));

        let mut pos = 0;
        for token in &tokens {
            push_text(&mut html, &code[pos..token.start], None);
            let color = self.theme.color_for(token.highlight).map(|c| c.to_css());
            push_text(&mut html, &code[token.start..token.end], color.as_deref());
            pos = token.end;
        }
        push_text(&mut html, &code[pos..], None);

        html.push_str("</span></code></pre>");
        html
    }

    /// Classified spans of `code`, sorted and non-overlapping
    pub fn tokens(&mut self, code: &str) -> Vec<HighlightToken> {
        match self.parser.parse(code, None) {
            Some(tree) => self.collect_tokens(&tree, code),
            None => {
                tracing::warn!("SQL parse returned no tree, rendering without highlights");
                Vec::new()
            }
        }
    }

    /// Run the highlight query over the tree.
    ///
    /// Captures arrive in document order. When several patterns capture the
    /// same node the later pattern wins; a capture overlapping an earlier,
    /// different span is dropped.
    fn collect_tokens(&self, tree: &Tree, code: &str) -> Vec<HighlightToken> {
        let mut tokens: Vec<HighlightToken> = Vec::new();
        let mut cursor = QueryCursor::new();

        let mut captures = cursor.captures(&self.query, tree.root_node(), code.as_bytes());
        while let Some((query_match, capture_idx)) = captures.next() {
            let capture = &query_match.captures[*capture_idx];
            let Some(highlight) = self.capture_highlights[capture.index as usize] else {
                continue;
            };

            let range = capture.node.byte_range();
            if range.start >= range.end || range.end > code.len() {
                continue;
            }
            let token = HighlightToken {
                start: range.start,
                end: range.end,
                highlight,
            };

            match tokens.last_mut() {
                Some(last) if last.start == token.start && last.end == token.end => *last = token,
                Some(last) if token.start < last.end => {}
                _ => tokens.push(token),
            }
        }

        tokens
    }
}

/// Append text, splitting it into line spans and optionally coloring it
fn push_text(html: &mut String, text: &str, color: Option<&str>) {
    for (i, segment) in text.split('\n').enumerate() {
        if i > 0 {
            html.push_str("</span>\n<span class=\"line\">");
        }
        if segment.is_empty() {
            continue;
        }
        match color {
            Some(color) => {
                html.push_str("<span style=\"color:");
                html.push_str(color);
                html.push_str("\">");
                escape_html(html, segment);
                html.push_str("</span>");
            }
            None => escape_html(html, segment),
        }
    }
}

fn escape_html(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Holds at most one highlighter, built lazily for the configured theme
pub struct HighlighterCache {
    color_theme: Option<String>,
    user_themes_dir: Option<PathBuf>,
    highlighter: Option<Highlighter>,
}

impl HighlighterCache {
    pub fn new(color_theme: Option<String>) -> Self {
        Self {
            color_theme,
            user_themes_dir: crate::config_paths::themes_dir(),
            highlighter: None,
        }
    }

    /// Override where user palettes are looked up (`None` disables overrides)
    pub fn with_user_themes_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.user_themes_dir = dir;
        self
    }

    /// Return the cached highlighter, building it first if needed
    pub fn get(&mut self) -> Result<&mut Highlighter, HighlightError> {
        let highlighter = match self.highlighter.take() {
            Some(highlighter) => highlighter,
            None => {
                let theme_id = resolve_theme_name(self.color_theme.as_deref());
                Highlighter::with_user_themes(theme_id, self.user_themes_dir.as_deref())?
            }
        };
        Ok(self.highlighter.insert(highlighter))
    }

    /// Drop the cached highlighter; the next `get` builds one for `color_theme`
    pub fn invalidate(&mut self, color_theme: Option<String>) {
        if self.highlighter.take().is_some() {
            tracing::debug!("Highlighter invalidated");
        }
        self.color_theme = color_theme;
    }

    pub fn is_cached(&self) -> bool {
        self.highlighter.is_some()
    }

    /// Theme of the cached highlighter, if any
    pub fn cached_theme(&self) -> Option<ThemeId> {
        self.highlighter.as_ref().map(Highlighter::theme_id)
    }
}
