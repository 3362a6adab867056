//! PRQL SQL preview
//!
//! Compiles the active PRQL document to SQL in the background, highlights the
//! result with the configured color theme, and shows it in a webview panel
//! next to the editor.

pub mod bridge;
pub mod cli;
pub mod config;
pub mod config_paths;
pub mod editor;
pub mod fs_watcher;
pub mod messages;
pub mod panel;
pub mod pipeline;
pub mod syntax;
pub mod template;
pub mod theme;
pub mod tracing;
pub mod worker;

// Re-export commonly used types
pub use config::PreviewConfig;
pub use messages::Msg;
pub use panel::PreviewSession;
pub use pipeline::{CompilationResult, Pipeline, PrqlCompiler};
