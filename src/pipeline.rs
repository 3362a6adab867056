//! Compilation pipeline: PRQL source → SQL → highlighted HTML
//!
//! The compiler and highlighter are collaborators; this module sequences them
//! and turns every failure into a displayable [`CompilationResult::Error`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::PreviewConfig;
use crate::syntax::{HighlighterCache, LanguageId};

/// Payload posted to the panel.
///
/// Serializes as `{"status":"ok","content":"<pre>…"}` or
/// `{"status":"error","content":"…"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "content", rename_all = "lowercase")]
pub enum CompilationResult {
    /// Highlighted SQL markup
    Ok(String),
    /// Error message with the compiler's framing lines removed
    Error(String),
}

impl CompilationResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, CompilationResult::Ok(_))
    }

    pub fn content(&self) -> &str {
        match self {
            CompilationResult::Ok(content) | CompilationResult::Error(content) => content,
        }
    }
}

/// A compiler failure carrying the full, multi-line message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Compiles query source text to SQL
pub trait SqlCompiler: Send {
    fn to_sql(&self, source: &str) -> Result<String, CompileError>;

    /// Apply changed settings (target dialect, signature comment)
    fn configure(&mut self, _config: &PreviewConfig) {}
}

/// [`SqlCompiler`] backed by `prqlc`
pub struct PrqlCompiler {
    options: prqlc::Options,
}

impl PrqlCompiler {
    pub fn new(config: &PreviewConfig) -> Self {
        Self {
            options: Self::options_for(config),
        }
    }

    fn options_for(config: &PreviewConfig) -> prqlc::Options {
        let target = prqlc::Target::from_str(&config.target).unwrap_or_else(|e| {
            tracing::warn!(
                "Unknown compile target '{}' ({}), using {}",
                config.target,
                e,
                crate::config::DEFAULT_TARGET
            );
            prqlc::Target::Sql(None)
        });

        prqlc::Options::default()
            .with_format(true)
            .with_signature_comment(config.signature_comment)
            .with_target(target)
            .with_display(prqlc::DisplayOptions::Plain)
    }
}

impl SqlCompiler for PrqlCompiler {
    fn to_sql(&self, source: &str) -> Result<String, CompileError> {
        prqlc::compile(source, &self.options).map_err(|e| CompileError::new(framed_message(&e)))
    }

    fn configure(&mut self, config: &PreviewConfig) {
        self.options = Self::options_for(config);
    }
}

/// Render prqlc's messages so each one sits between a header and a closing line.
///
/// Messages with a source span carry the annotated display, which is framed
/// already. The others are a single `Error: reason` line followed by hints, so
/// the reason goes on its own line under a bare header.
fn framed_message(errors: &prqlc::ErrorMessages) -> String {
    let mut message = String::new();
    for error in &errors.inner {
        if error.display.is_some() {
            message.push_str(&error.to_string());
            continue;
        }
        if let Some(code) = &error.code {
            message.push_str(&format!("[{code}] "));
        }
        message.push_str("Error:\n");
        message.push_str(&error.reason);
        message.push('\n');
        for hint in &error.hints {
            message.push_str(&format!("↳ Hint: {hint}\n"));
        }
    }
    message
}

/// Drop the first and last lines of an error message.
///
/// The compiler's error formatter frames the useful detail with a header line
/// and a closing rule. This depends on that undocumented message layout; a
/// message with fewer than three lines yields an empty string.
pub fn strip_message_framing(message: &str) -> String {
    let lines: Vec<&str> = message.split('\n').collect();
    if lines.len() <= 2 {
        return String::new();
    }
    lines[1..lines.len() - 1].join("\n")
}

/// Compiles source text and renders the SQL with the cached highlighter
pub struct Pipeline<C> {
    compiler: C,
    highlighters: HighlighterCache,
}

impl<C: SqlCompiler> Pipeline<C> {
    pub fn new(compiler: C, highlighters: HighlighterCache) -> Self {
        Self {
            compiler,
            highlighters,
        }
    }

    /// Compile and highlight. Never fails: errors become `CompilationResult::Error`.
    pub fn compile(&mut self, source: &str) -> CompilationResult {
        match self.compile_and_highlight(source) {
            Ok(html) => CompilationResult::Ok(html),
            Err(message) => {
                tracing::debug!("Compilation failed: {}", message);
                CompilationResult::Error(strip_message_framing(&message))
            }
        }
    }

    fn compile_and_highlight(&mut self, source: &str) -> Result<String, String> {
        let sql = self.compiler.to_sql(source).map_err(|e| e.message)?;
        let highlighter = self.highlighters.get().map_err(|e| {
            tracing::warn!("Highlighter unavailable: {}", e);
            e.to_string()
        })?;
        Ok(highlighter.code_to_html(&sql, LanguageId::Sql))
    }

    /// Apply new settings: reconfigure the compiler and drop the highlighter
    pub fn reconfigure(&mut self, config: &PreviewConfig) {
        self.compiler.configure(config);
        self.highlighters.invalidate(config.color_theme.clone());
    }

    pub fn highlighters(&self) -> &HighlighterCache {
        &self.highlighters
    }
}
