//! Messages delivered to the event loop from background threads

use crate::bridge::BridgeMessage;
use crate::fs_watcher::WatchEvent;
use crate::worker::CompileOutcome;

/// Everything that wakes the event loop besides window events
#[derive(Debug, Clone)]
pub enum Msg {
    /// A line from the editor bridge, or its end
    Bridge(BridgeMessage),
    /// Watched files or the config file changed
    Watch(Vec<WatchEvent>),
    /// The compile worker finished a job
    Compiled(CompileOutcome),
    /// The panel page loaded its script and can receive posts
    PanelReady,
}
