//! Runtime module - winit/wry integration
//!
//! - `app` - ApplicationHandler routing bridge, watcher and worker messages
//! - `webview` - the wry panel window and its asset protocol

pub mod app;
pub mod webview;

pub use app::App;
