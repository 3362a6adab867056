//! wry-backed SQL output panel
//!
//! The panel is its own top-level window hosting one webview. The page and its
//! assets are served through a custom protocol: the index returns the HTML
//! given to [`PanelSurface::set_html`], every other path is read from the
//! resource root.

use std::borrow::Cow;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event_loop::{ActiveEventLoop, EventLoopProxy};
use winit::window::{Window, WindowId};
use wry::http::{header::CONTENT_TYPE, Request, Response, StatusCode};
use wry::{WebView, WebViewBuilder};

use prql_preview::panel::{PanelOptions, PanelSurface, Placement, WebviewHost};
use prql_preview::template::{AssetError, ResourceRoot};
use prql_preview::{CompilationResult, Msg};

const PROTOCOL: &str = "prql-preview";
const INDEX_PATH: &str = "index.html";
const PANEL_WIDTH: f64 = 560.0;
const PANEL_HEIGHT: f64 = 720.0;

/// Origin the page is served from. Windows' webview maps custom protocols to http.
#[cfg(not(target_os = "windows"))]
const ORIGIN: &str = "prql-preview://localhost";
#[cfg(target_os = "windows")]
const ORIGIN: &str = "http://prql-preview.localhost";

/// Creates panels; borrows the active event loop for the duration of one call
pub struct WryHost<'a> {
    event_loop: &'a ActiveEventLoop,
    proxy: EventLoopProxy<Msg>,
}

impl<'a> WryHost<'a> {
    pub fn new(event_loop: &'a ActiveEventLoop, proxy: EventLoopProxy<Msg>) -> Self {
        Self { event_loop, proxy }
    }

    /// Right half of the primary monitor
    fn beside_position(&self) -> Option<PhysicalPosition<i32>> {
        let monitor = self
            .event_loop
            .primary_monitor()
            .or_else(|| self.event_loop.available_monitors().next())?;
        let origin = monitor.position();
        let size = monitor.size();
        Some(PhysicalPosition::new(
            origin.x + (size.width / 2) as i32,
            origin.y,
        ))
    }
}

impl WebviewHost for WryHost<'_> {
    type Panel = WryPanel;

    fn create_panel(&mut self, options: &PanelOptions) -> anyhow::Result<WryPanel> {
        let mut attributes = Window::default_attributes()
            .with_title(options.title)
            .with_inner_size(LogicalSize::new(PANEL_WIDTH, PANEL_HEIGHT))
            .with_active(!options.preserve_focus);

        let position = match options.placement {
            Placement::Beside => self.beside_position(),
            Placement::At { x, y } => Some(PhysicalPosition::new(x, y)),
        };
        if let Some(position) = position {
            attributes = attributes.with_position(position);
        }

        let window = self
            .event_loop
            .create_window(attributes)
            .context("Failed to create panel window")?;

        let html = Arc::new(Mutex::new(String::new()));
        let served_html = Arc::clone(&html);
        let root = options.resource_root.clone();
        let proxy = self.proxy.clone();

        if options.enable_find_widget {
            tracing::debug!("Find widget is not supported by this webview host");
        }

        let mut builder = WebViewBuilder::new()
            .with_custom_protocol(PROTOCOL.to_string(), move |_id, request| {
                serve(&root, &served_html, &request)
            })
            .with_ipc_handler(move |request: Request<String>| {
                if request.body() == "ready" {
                    let _ = proxy.send_event(Msg::PanelReady);
                }
            })
            .with_navigation_handler(|url| {
                if url.starts_with("http://") || url.starts_with("https://") {
                    if url.starts_with(ORIGIN) {
                        return true;
                    }
                    // External links open in the default browser
                    let _ = open::that(&url);
                    false
                } else {
                    true
                }
            })
            .with_devtools(cfg!(debug_assertions))
            .with_transparent(false);

        if !options.enable_scripts {
            builder = builder.with_javascript_disabled();
        }

        let webview = builder
            .build(&window)
            .context("Failed to create panel webview")?;

        tracing::debug!(view_type = options.view_type, "Created panel webview");

        Ok(WryPanel {
            window,
            webview,
            html,
            ready: false,
            visible: true,
            pending: None,
        })
    }
}

/// A panel window and its webview
pub struct WryPanel {
    window: Window,
    webview: WebView,
    /// Page served at the index path
    html: Arc<Mutex<String>>,
    /// The page's script has loaded and listens for posts
    ready: bool,
    visible: bool,
    /// Newest post issued before the page was ready
    pending: Option<String>,
}

impl WryPanel {
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    /// The page reported ready; flush the newest held post
    pub fn mark_ready(&mut self) {
        self.ready = true;
        if let Some(script) = self.pending.take() {
            self.run_script(&script);
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn run_script(&self, script: &str) {
        if let Err(e) = self.webview.evaluate_script(script) {
            tracing::warn!("Failed to post message to panel: {}", e);
        }
    }
}

impl PanelSurface for WryPanel {
    fn set_html(&mut self, html: String) {
        match self.html.lock() {
            Ok(mut current) => *current = html,
            Err(poisoned) => *poisoned.into_inner() = html,
        }
        self.ready = false;
        let url = format!("{}/{}", ORIGIN, INDEX_PATH);
        if let Err(e) = self.webview.load_url(&url) {
            tracing::error!("Failed to load panel page: {}", e);
        }
    }

    fn post_message(&mut self, result: &CompilationResult) {
        let json = match serde_json::to_string(result) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize compilation result: {}", e);
                return;
            }
        };
        let script = format!("window.postMessage({}, '*');", json);

        if self.ready {
            self.run_script(&script);
        } else {
            self.pending = Some(script);
        }
    }

    fn reveal(&mut self, placement: Option<Placement>, preserve_focus: bool) {
        if let Some(Placement::At { x, y }) = placement {
            self.window.set_outer_position(PhysicalPosition::new(x, y));
        }
        self.window.set_visible(true);
        self.window.set_minimized(false);
        if !preserve_focus {
            self.window.focus_window();
        }
        self.visible = true;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn placement(&self) -> Option<Placement> {
        self.window
            .outer_position()
            .ok()
            .map(|p| Placement::At { x: p.x, y: p.y })
    }

    fn csp_source(&self) -> String {
        #[cfg(not(target_os = "windows"))]
        {
            format!("{}:", PROTOCOL)
        }
        #[cfg(target_os = "windows")]
        {
            ORIGIN.to_string()
        }
    }

    fn as_webview_uri(&self, asset: &str) -> String {
        format!("{}/{}", ORIGIN, asset.trim_start_matches('/'))
    }
}

/// Answer a custom-protocol request
fn serve(
    root: &ResourceRoot,
    html: &Mutex<String>,
    request: &Request<Vec<u8>>,
) -> Response<Cow<'static, [u8]>> {
    let path = request.uri().path().trim_start_matches('/');

    if path.is_empty() || path == INDEX_PATH {
        let page = match html.lock() {
            Ok(page) => page.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        return respond(StatusCode::OK, "text/html", page.into_bytes());
    }

    match root.read(path) {
        Ok(bytes) => respond(StatusCode::OK, content_type(path), bytes),
        Err(AssetError::OutsideRoot(p)) => {
            tracing::warn!("Refused asset outside resource root: {}", p.display());
            respond(StatusCode::FORBIDDEN, "text/plain", Vec::new())
        }
        Err(e) => {
            tracing::warn!("{}", e);
            respond(StatusCode::NOT_FOUND, "text/plain", Vec::new())
        }
    }
}

fn respond(status: StatusCode, mime: &str, body: Vec<u8>) -> Response<Cow<'static, [u8]>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, mime)
        .body(Cow::Owned(body))
        .unwrap_or_else(|_| Response::new(Cow::Borrowed(&[][..])))
}

fn content_type(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("html") => "text/html",
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}
