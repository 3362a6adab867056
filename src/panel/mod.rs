//! SQL output panel
//!
//! - `host`: traits the webview host implements (`WebviewHost`, `PanelSurface`)
//! - `controller`: one panel's change filter and result delivery
//! - `session`: keeps at most one panel alive and routes events to it

mod controller;
mod host;
mod session;

pub use controller::{PanelController, PanelEvent, PanelPhase};
pub use host::{
    PanelOptions, PanelSurface, Placement, WebviewHost, PANEL_TITLE, PANEL_VIEW_TYPE,
};
pub use session::PreviewSession;
