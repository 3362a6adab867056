//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::path::PathBuf;

use prql_preview::config::PreviewConfig;
use prql_preview::editor::{EditorState, TextDocument};
use prql_preview::panel::{PanelOptions, PanelSurface, Placement, WebviewHost};
use prql_preview::pipeline::{CompileError, SqlCompiler};
use prql_preview::syntax::LanguageId;
use prql_preview::template::ResourceRoot;
use prql_preview::worker::{CompileJob, CompileScheduler};
use prql_preview::CompilationResult;

/// The bundled panel assets
pub fn resource_root() -> ResourceRoot {
    ResourceRoot::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources"))
}

/// Editor with one active PRQL document
pub fn prql_editor(text: &str) -> EditorState {
    let mut editor = EditorState::new();
    editor.open(TextDocument::new("file:///query.prql", LanguageId::Prql, text));
    editor.activate(Some("file:///query.prql".to_string()));
    editor
}

/// Replace the active PRQL document's text
pub fn edit(editor: &mut EditorState, text: &str) {
    editor.change("file:///query.prql", text.to_string());
}

/// Compiler that echoes the source upper-cased, or fails with a framed message
/// when the source contains "error"
pub struct FakeCompiler;

impl SqlCompiler for FakeCompiler {
    fn to_sql(&self, source: &str) -> Result<String, CompileError> {
        if source.contains("error") {
            Err(CompileError::new(format!(
                "Error:\n  unexpected `{}`\n  hint: check the pipeline\n",
                source
            )))
        } else {
            Ok(source.to_uppercase())
        }
    }
}

/// Scheduler that records jobs instead of compiling them
#[derive(Default)]
pub struct RecordingScheduler {
    pub jobs: Vec<CompileJob>,
    pub reconfigured: Vec<PreviewConfig>,
}

impl CompileScheduler for RecordingScheduler {
    fn schedule(&mut self, job: CompileJob) {
        self.jobs.push(job);
    }

    fn reconfigure(&mut self, config: &PreviewConfig) {
        self.reconfigured.push(config.clone());
    }
}

/// In-memory panel recording everything the controller does to it
#[derive(Debug, Default)]
pub struct MockPanel {
    pub html: Option<String>,
    pub posts: Vec<CompilationResult>,
    pub reveals: Vec<(Option<Placement>, bool)>,
    pub visible: bool,
    pub position: Option<Placement>,
}

impl PanelSurface for MockPanel {
    fn set_html(&mut self, html: String) {
        self.html = Some(html);
    }

    fn post_message(&mut self, result: &CompilationResult) {
        self.posts.push(result.clone());
    }

    fn reveal(&mut self, placement: Option<Placement>, preserve_focus: bool) {
        self.reveals.push((placement, preserve_focus));
        self.visible = true;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn placement(&self) -> Option<Placement> {
        self.position
    }

    fn csp_source(&self) -> String {
        "mock:".to_string()
    }

    fn as_webview_uri(&self, asset: &str) -> String {
        format!("mock://assets/{}", asset)
    }
}

/// Host that creates [`MockPanel`]s and counts them
#[derive(Debug, Default)]
pub struct MockHost {
    pub created: usize,
    pub options: Vec<PanelOptions>,
    pub fail: bool,
}

impl WebviewHost for MockHost {
    type Panel = MockPanel;

    fn create_panel(&mut self, options: &PanelOptions) -> anyhow::Result<MockPanel> {
        if self.fail {
            anyhow::bail!("webview unavailable");
        }
        self.created += 1;
        self.options.push(options.clone());
        Ok(MockPanel {
            visible: true,
            position: Some(Placement::At {
                x: 100 * self.created as i32,
                y: 50,
            }),
            ..Default::default()
        })
    }
}
