//! Seams to the webview host

use crate::pipeline::CompilationResult;
use crate::template::ResourceRoot;

pub const PANEL_VIEW_TYPE: &str = "prqlSqlOutputPanel";
pub const PANEL_TITLE: &str = "PRQL - SQL Output";

/// Where a panel sits on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Next to the editor; the host picks the exact spot
    Beside,
    /// A concrete position in physical pixels
    At { x: i32, y: i32 },
}

/// Options for creating the panel
#[derive(Debug, Clone)]
pub struct PanelOptions {
    pub view_type: &'static str,
    pub title: &'static str,
    pub placement: Placement,
    /// Do not take focus from the editor when the panel appears
    pub preserve_focus: bool,
    pub enable_scripts: bool,
    pub enable_find_widget: bool,
    /// The only directory the panel may load local files from
    pub resource_root: ResourceRoot,
}

impl PanelOptions {
    pub fn sql_output(resource_root: ResourceRoot) -> Self {
        Self {
            view_type: PANEL_VIEW_TYPE,
            title: PANEL_TITLE,
            placement: Placement::Beside,
            preserve_focus: true,
            enable_scripts: true,
            enable_find_widget: false,
            resource_root,
        }
    }
}

/// A live webview panel
pub trait PanelSurface {
    /// Assign the page HTML
    fn set_html(&mut self, html: String);

    /// Deliver a result to the page's `message` listener; does not wait for it
    fn post_message(&mut self, result: &CompilationResult);

    /// Bring the panel to front, optionally at `placement`
    fn reveal(&mut self, placement: Option<Placement>, preserve_focus: bool);

    fn is_visible(&self) -> bool;

    /// Current placement, if the host knows it
    fn placement(&self) -> Option<Placement>;

    /// Source expression for the page's content-security-policy
    fn csp_source(&self) -> String;

    /// URI the page can load a resource-root asset from
    fn as_webview_uri(&self, asset: &str) -> String;
}

/// Creates webview panels
pub trait WebviewHost {
    type Panel: PanelSurface;

    fn create_panel(&mut self, options: &PanelOptions) -> anyhow::Result<Self::Panel>;
}
