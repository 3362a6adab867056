//! Mirror of the host editor's open documents and active editor
//!
//! The editor bridge and watch mode both feed [`EditorState`]; the panel only
//! sees it through [`EditorHost`].

use std::collections::HashMap;
use std::path::Path;

use crate::syntax::LanguageId;

/// An open document as last reported by the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    pub uri: String,
    pub language: LanguageId,
    pub text: String,
}

impl TextDocument {
    pub fn new(uri: impl Into<String>, language: LanguageId, text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            language,
            text: text.into(),
        }
    }

    /// Language from an explicit editor language id, else from the URI's extension
    pub fn detect_language(uri: &str, language_id: Option<&str>) -> LanguageId {
        match language_id.map(LanguageId::from_language_id) {
            Some(language) if language != LanguageId::PlainText => language,
            _ => LanguageId::from_path(Path::new(uri)),
        }
    }
}

/// What the panel needs to know about the editor
pub trait EditorHost {
    /// The document shown in the active editor, if any
    fn active_document(&self) -> Option<&TextDocument>;

    /// Whether the active editor shows a PRQL document
    fn is_prql_active(&self) -> bool {
        self.active_document()
            .is_some_and(|doc| doc.language == LanguageId::Prql)
    }
}

/// Open documents plus the active one
#[derive(Debug, Default)]
pub struct EditorState {
    documents: HashMap<String, TextDocument>,
    active: Option<String>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly opened document (replaces one with the same URI)
    pub fn open(&mut self, document: TextDocument) {
        self.documents.insert(document.uri.clone(), document);
    }

    /// Replace a document's text. Unknown URIs are opened with a detected language.
    pub fn change(&mut self, uri: &str, text: String) {
        match self.documents.get_mut(uri) {
            Some(document) => document.text = text,
            None => {
                let language = TextDocument::detect_language(uri, None);
                self.open(TextDocument::new(uri, language, text));
            }
        }
    }

    /// Switch the active editor; `None` means no editor is focused
    pub fn activate(&mut self, uri: Option<String>) {
        if let Some(uri) = &uri {
            if !self.documents.contains_key(uri) {
                tracing::debug!("Activated unknown document {}", uri);
            }
        }
        self.active = uri;
    }

    pub fn close(&mut self, uri: &str) {
        self.documents.remove(uri);
        if self.active.as_deref() == Some(uri) {
            self.active = None;
        }
    }

    pub fn document(&self, uri: &str) -> Option<&TextDocument> {
        self.documents.get(uri)
    }

    pub fn active_uri(&self) -> Option<&str> {
        self.active.as_deref()
    }
}

impl EditorHost for EditorState {
    fn active_document(&self) -> Option<&TextDocument> {
        self.active.as_deref().and_then(|uri| self.documents.get(uri))
    }
}
