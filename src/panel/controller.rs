//! SQL output panel controller
//!
//! Owns one webview panel and the last text sent for compilation, and decides
//! when an editor event warrants a recompile.
//!
//! ```text
//! (create) ──open()──▶ Active ──dispose()──▶ Disposed
//!                        │
//!     editor event ──▶ sync(force) ──▶ CompileJob ──▶ worker
//!                        ▲                              │
//!                        └──── deliver(CompileOutcome) ◀┘ ──▶ post_message
//! ```

use anyhow::Context;

use super::host::{PanelOptions, PanelSurface, Placement, WebviewHost};
use crate::config::PreviewConfig;
use crate::editor::EditorHost;
use crate::template::{compile_template, ResourceRoot, SCRIPT_FILE, STYLE_FILE};
use crate::worker::{CompileJob, CompileOutcome, CompileScheduler, PanelId};

/// Lifecycle phase of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPhase {
    Active,
    /// Terminal: no more syncs or posts
    Disposed,
}

/// Events the panel subscribes to while active
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    /// Text of some document changed
    DocumentChanged,
    /// The active editor switched (or went away)
    ActiveEditorChanged,
    /// Settings changed; may affect the theme or compile target
    ConfigurationChanged(PreviewConfig),
}

pub struct PanelController<P> {
    id: PanelId,
    panel: P,
    previous_text: String,
    next_seq: u64,
    last_posted: Option<u64>,
    phase: PanelPhase,
}

impl<P: PanelSurface> PanelController<P> {
    /// Create the webview panel, load its page, and run the first sync.
    ///
    /// Fails if the host cannot create the panel or the template is missing.
    pub fn open<H>(
        host: &mut H,
        id: PanelId,
        options: &PanelOptions,
        editor: &dyn EditorHost,
        scheduler: &mut dyn CompileScheduler,
    ) -> anyhow::Result<Self>
    where
        H: WebviewHost<Panel = P>,
    {
        let mut panel = host
            .create_panel(options)
            .context("Failed to create SQL output panel")?;
        let html = panel_html(&options.resource_root, &panel)?;
        panel.set_html(html);

        tracing::info!(panel = id.0, "SQL output panel opened");

        let mut controller = Self {
            id,
            panel,
            previous_text: String::new(),
            next_seq: 0,
            last_posted: None,
            phase: PanelPhase::Active,
        };
        controller.sync(editor, false, scheduler);
        Ok(controller)
    }

    /// The change filter.
    ///
    /// With `force`, recompiles `previous_text` unconditionally. Otherwise only
    /// compiles when the panel is visible, the active editor shows PRQL, and its
    /// text differs from `previous_text`. Returns whether a compile was scheduled.
    pub fn sync(
        &mut self,
        editor: &dyn EditorHost,
        force: bool,
        scheduler: &mut dyn CompileScheduler,
    ) -> bool {
        if self.phase == PanelPhase::Disposed {
            return false;
        }

        if force {
            let source = self.previous_text.clone();
            self.request_compile(source, scheduler);
            return true;
        }

        if !self.panel.is_visible() || !editor.is_prql_active() {
            return false;
        }
        let Some(document) = editor.active_document() else {
            return false;
        };
        if document.text == self.previous_text {
            return false;
        }

        self.previous_text = document.text.clone();
        let source = self.previous_text.clone();
        self.request_compile(source, scheduler);
        true
    }

    /// Route a subscribed event through the change filter
    pub fn handle_event(
        &mut self,
        event: PanelEvent,
        editor: &dyn EditorHost,
        scheduler: &mut dyn CompileScheduler,
    ) -> bool {
        match event {
            PanelEvent::DocumentChanged | PanelEvent::ActiveEditorChanged => {
                self.sync(editor, false, scheduler)
            }
            PanelEvent::ConfigurationChanged(config) => {
                scheduler.reconfigure(&config);
                self.sync(editor, true, scheduler)
            }
        }
    }

    fn request_compile(&mut self, source: String, scheduler: &mut dyn CompileScheduler) {
        self.next_seq += 1;
        tracing::debug!(panel = self.id.0, seq = self.next_seq, "Requesting compile");
        scheduler.schedule(CompileJob {
            panel: self.id,
            seq: self.next_seq,
            source,
        });
    }

    /// Post a finished compile to the webview unless it is stale.
    ///
    /// Outcomes for another panel, or older than the last posted one, are dropped.
    pub fn deliver(&mut self, outcome: CompileOutcome) -> bool {
        if self.phase == PanelPhase::Disposed || outcome.panel != self.id {
            tracing::debug!(panel = outcome.panel.0, "Dropping outcome for inactive panel");
            return false;
        }
        if self.last_posted.is_some_and(|last| outcome.seq <= last) {
            tracing::debug!(seq = outcome.seq, "Dropping stale compile outcome");
            return false;
        }

        self.last_posted = Some(outcome.seq);
        self.panel.post_message(&outcome.result);
        true
    }

    /// Bring the panel to front, taking focus
    pub fn reveal(&mut self, placement: Option<Placement>) {
        self.panel.reveal(placement, false);
    }

    /// Active → Disposed
    pub fn dispose(&mut self) {
        if self.phase == PanelPhase::Active {
            tracing::info!(panel = self.id.0, "SQL output panel disposed");
            self.phase = PanelPhase::Disposed;
        }
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn phase(&self) -> PanelPhase {
        self.phase
    }

    pub fn previous_text(&self) -> &str {
        &self.previous_text
    }

    pub fn placement(&self) -> Option<Placement> {
        self.panel.placement()
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }
}

/// Load the template and resolve its tokens against the panel's webview
fn panel_html<P: PanelSurface>(root: &ResourceRoot, panel: &P) -> anyhow::Result<String> {
    let template = root
        .read_template()
        .context("Failed to load SQL output template")?;
    Ok(compile_template(
        &template,
        &panel.csp_source(),
        &panel.as_webview_uri(SCRIPT_FILE),
        &panel.as_webview_uri(STYLE_FILE),
    ))
}
