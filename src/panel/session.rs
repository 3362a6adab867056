//! Panel lifecycle
//!
//! Keeps at most one SQL output panel alive. Opening while one exists reveals
//! it in its last known placement instead of creating a second.

use super::controller::{PanelController, PanelEvent};
use super::host::{PanelOptions, PanelSurface, Placement, WebviewHost};
use crate::config::PreviewConfig;
use crate::editor::EditorHost;
use crate::template::ResourceRoot;
use crate::worker::{CompileOutcome, CompileScheduler, PanelId};

pub struct PreviewSession<P, S> {
    scheduler: S,
    resource_root: ResourceRoot,
    panel: Option<PanelController<P>>,
    /// Where the last panel was, reused on reveal
    placement: Option<Placement>,
    next_panel_id: u64,
}

impl<P: PanelSurface, S: CompileScheduler> PreviewSession<P, S> {
    pub fn new(scheduler: S, resource_root: ResourceRoot) -> Self {
        Self {
            scheduler,
            resource_root,
            panel: None,
            placement: None,
            next_panel_id: 1,
        }
    }

    /// The "open SQL output panel" command.
    ///
    /// Reveals the existing panel (taking focus) or creates a new one beside
    /// the editor.
    pub fn open_panel<H>(&mut self, host: &mut H, editor: &dyn EditorHost) -> anyhow::Result<()>
    where
        H: WebviewHost<Panel = P>,
    {
        if let Some(controller) = &mut self.panel {
            let placement = controller.placement().or(self.placement);
            tracing::debug!(panel = controller.id().0, "Revealing existing panel");
            controller.reveal(placement);
            return Ok(());
        }

        let id = PanelId(self.next_panel_id);
        self.next_panel_id += 1;

        let options = PanelOptions::sql_output(self.resource_root.clone());
        let controller =
            PanelController::open(host, id, &options, editor, &mut self.scheduler)?;
        self.placement = controller.placement();
        self.panel = Some(controller);
        Ok(())
    }

    /// Forward an editor or settings event to the live panel, if any
    pub fn handle_event(&mut self, event: PanelEvent, editor: &dyn EditorHost) -> bool {
        match &mut self.panel {
            Some(controller) => controller.handle_event(event, editor, &mut self.scheduler),
            None => {
                if let PanelEvent::ConfigurationChanged(config) = event {
                    self.scheduler.reconfigure(&config);
                }
                false
            }
        }
    }

    /// Settings changed
    pub fn reconfigure(&mut self, config: PreviewConfig, editor: &dyn EditorHost) -> bool {
        self.handle_event(PanelEvent::ConfigurationChanged(config), editor)
    }

    /// Hand a finished compile to the panel it was made for
    pub fn deliver(&mut self, outcome: CompileOutcome) -> bool {
        match &mut self.panel {
            Some(controller) => controller.deliver(outcome),
            None => {
                tracing::debug!(panel = outcome.panel.0, "No panel for compile outcome");
                false
            }
        }
    }

    /// The user closed the panel. The next open creates a fresh one.
    pub fn panel_disposed(&mut self) {
        if let Some(mut controller) = self.panel.take() {
            if let Some(placement) = controller.placement() {
                self.placement = Some(placement);
            }
            controller.dispose();
        }
    }

    /// Remember where the panel moved to
    pub fn panel_moved(&mut self, placement: Placement) {
        self.placement = Some(placement);
    }

    pub fn has_panel(&self) -> bool {
        self.panel.is_some()
    }

    pub fn panel(&self) -> Option<&PanelController<P>> {
        self.panel.as_ref()
    }

    pub fn panel_mut(&mut self) -> Option<&mut PanelController<P>> {
        self.panel.as_mut()
    }

    pub fn last_placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}
