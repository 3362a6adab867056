use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoopProxy};
use winit::window::WindowId;

use prql_preview::bridge::{BridgeMessage, SessionAction};
use prql_preview::cli::{StartupConfig, StartupMode};
use prql_preview::editor::EditorState;
use prql_preview::fs_watcher::{self, FileSystemWatcher, WatchEvent};
use prql_preview::panel::{PanelEvent, Placement, PreviewSession};
use prql_preview::worker::CompileWorker;
use prql_preview::{Msg, PreviewConfig};

use super::webview::{WryHost, WryPanel};

pub struct App {
    startup: StartupConfig,
    config: PreviewConfig,
    editor: EditorState,
    session: PreviewSession<WryPanel, CompileWorker>,
    proxy: EventLoopProxy<Msg>,
    /// Kept alive for watch mode
    watcher: Option<FileSystemWatcher>,
    started: bool,
}

impl App {
    pub fn new(
        startup: StartupConfig,
        config: PreviewConfig,
        session: PreviewSession<WryPanel, CompileWorker>,
        proxy: EventLoopProxy<Msg>,
    ) -> Self {
        Self {
            startup,
            config,
            editor: EditorState::new(),
            session,
            proxy,
            watcher: None,
            started: false,
        }
    }

    pub fn set_watcher(&mut self, watcher: FileSystemWatcher) {
        self.watcher = Some(watcher);
    }

    /// Watch mode: load every file, activate the newest, open the panel
    fn start_watch(&mut self, event_loop: &ActiveEventLoop) {
        let StartupMode::Watch(files) = &self.startup.mode else {
            return;
        };

        for path in files {
            if let Err(e) = fs_watcher::load_document(&mut self.editor, path) {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
            }
        }
        if let Some(newest) = fs_watcher::most_recently_modified(files) {
            if let Err(e) = fs_watcher::load_document(&mut self.editor, newest) {
                tracing::warn!("Failed to read {}: {}", newest.display(), e);
            }
        }

        if !self.open_panel(event_loop) {
            event_loop.exit();
        }
    }

    fn open_panel(&mut self, event_loop: &ActiveEventLoop) -> bool {
        let mut host = WryHost::new(event_loop, self.proxy.clone());
        match self.session.open_panel(&mut host, &self.editor) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to open SQL output panel: {:#}", e);
                false
            }
        }
    }

    fn panel_event(&mut self, event: PanelEvent) {
        let event = self.startup.override_event(event);
        if let PanelEvent::ConfigurationChanged(config) = &event {
            self.config = config.clone();
        }
        self.session.handle_event(event, &self.editor);
    }

    fn handle_bridge(&mut self, message: BridgeMessage, event_loop: &ActiveEventLoop) {
        match message {
            BridgeMessage::Event(event) => match event.apply(&mut self.editor) {
                Some(SessionAction::Panel(event)) => self.panel_event(event),
                Some(SessionAction::OpenPanel) => {
                    self.open_panel(event_loop);
                }
                None => {}
            },
            BridgeMessage::Closed => event_loop.exit(),
        }
    }

    fn handle_watch(&mut self, events: Vec<WatchEvent>) {
        for event in events {
            match event {
                WatchEvent::Document(path) => {
                    match fs_watcher::load_document(&mut self.editor, &path) {
                        Ok(()) => self.panel_event(PanelEvent::DocumentChanged),
                        Err(e) => tracing::warn!("Failed to read {}: {}", path.display(), e),
                    }
                }
                WatchEvent::Config => {
                    let config = self.startup.apply_overrides(PreviewConfig::load());
                    if config != self.config {
                        tracing::info!("Configuration changed");
                        self.panel_event(PanelEvent::ConfigurationChanged(config));
                    }
                }
            }
        }
    }

    fn is_panel_window(&self, window_id: WindowId) -> bool {
        self.session
            .panel()
            .is_some_and(|panel| panel.panel().window_id() == window_id)
    }
}

impl ApplicationHandler<Msg> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        if self.startup.is_watch() {
            self.start_watch(event_loop);
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, msg: Msg) {
        match msg {
            Msg::Bridge(message) => self.handle_bridge(message, event_loop),
            Msg::Watch(events) => self.handle_watch(events),
            Msg::Compiled(outcome) => {
                self.session.deliver(outcome);
            }
            Msg::PanelReady => {
                if let Some(controller) = self.session.panel_mut() {
                    controller.panel_mut().mark_ready();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if !self.is_panel_window(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.session.panel_disposed();
                if self.startup.is_watch() {
                    event_loop.exit();
                }
            }
            WindowEvent::Occluded(occluded) => {
                if let Some(controller) = self.session.panel_mut() {
                    controller.panel_mut().set_visible(!occluded);
                }
                // Catch up on edits made while hidden
                if !occluded {
                    self.session
                        .handle_event(PanelEvent::ActiveEditorChanged, &self.editor);
                }
            }
            WindowEvent::Moved(position) => {
                self.session.panel_moved(Placement::At {
                    x: position.x,
                    y: position.y,
                });
            }
            _ => {}
        }
    }
}
