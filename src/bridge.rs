//! Editor bridge
//!
//! An editor plugin spawns the process and writes one JSON object per line to
//! its stdin. Each line updates the [`EditorState`] mirror and may produce an
//! action for the session.
//!
//! ```text
//! {"type":"open","uri":"file:///q.prql","language_id":"prql","text":"from t"}
//! {"type":"change","uri":"file:///q.prql","text":"from t | take 1"}
//! {"type":"activate","uri":"file:///q.prql"}
//! {"type":"close","uri":"file:///q.prql"}
//! {"type":"configuration","color_theme":"GitHub Dark","target":"sql.any","signature_comment":false}
//! {"type":"command","command":"open_panel"}
//! ```

use std::io::BufRead;
use std::thread::JoinHandle;

use serde::Deserialize;

use crate::config::PreviewConfig;
use crate::editor::{EditorState, TextDocument};
use crate::panel::PanelEvent;

/// One line of the bridge protocol
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeEvent {
    Open {
        uri: String,
        #[serde(default)]
        language_id: Option<String>,
        #[serde(default)]
        text: String,
    },
    Change {
        uri: String,
        #[serde(default)]
        language_id: Option<String>,
        text: String,
    },
    Activate {
        #[serde(default)]
        uri: Option<String>,
    },
    Close {
        uri: String,
    },
    Configuration(PreviewConfig),
    Command {
        command: BridgeCommand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeCommand {
    OpenPanel,
}

/// What the session should do after an event was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    Panel(PanelEvent),
    OpenPanel,
}

/// Messages from the reader thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeMessage {
    Event(BridgeEvent),
    /// stdin reached EOF or failed
    Closed,
}

/// Parse one protocol line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<BridgeEvent>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

impl BridgeEvent {
    /// Update the editor mirror and report what changed
    pub fn apply(self, editor: &mut EditorState) -> Option<SessionAction> {
        match self {
            BridgeEvent::Open {
                uri,
                language_id,
                text,
            } => {
                let language = TextDocument::detect_language(&uri, language_id.as_deref());
                editor.open(TextDocument::new(uri, language, text));
                Some(SessionAction::Panel(PanelEvent::DocumentChanged))
            }
            BridgeEvent::Change {
                uri,
                language_id,
                text,
            } => {
                if editor.document(&uri).is_none() {
                    let language = TextDocument::detect_language(&uri, language_id.as_deref());
                    editor.open(TextDocument::new(uri, language, text));
                } else {
                    editor.change(&uri, text);
                }
                Some(SessionAction::Panel(PanelEvent::DocumentChanged))
            }
            BridgeEvent::Activate { uri } => {
                editor.activate(uri);
                Some(SessionAction::Panel(PanelEvent::ActiveEditorChanged))
            }
            BridgeEvent::Close { uri } => {
                let was_active = editor.active_uri() == Some(uri.as_str());
                editor.close(&uri);
                was_active.then_some(SessionAction::Panel(PanelEvent::ActiveEditorChanged))
            }
            BridgeEvent::Configuration(config) => Some(SessionAction::Panel(
                PanelEvent::ConfigurationChanged(config),
            )),
            BridgeEvent::Command {
                command: BridgeCommand::OpenPanel,
            } => Some(SessionAction::OpenPanel),
        }
    }
}

/// Read protocol lines on a background thread.
///
/// Malformed lines are logged and skipped. `on_message` gets
/// [`BridgeMessage::Closed`] once, when the input ends.
pub fn spawn_reader<R, F>(reader: R, mut on_message: F) -> std::io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
    F: FnMut(BridgeMessage) + Send + 'static,
{
    std::thread::Builder::new()
        .name("editor-bridge".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::error!("Failed to read from editor bridge: {}", e);
                        break;
                    }
                };

                match parse_line(&line) {
                    Ok(Some(event)) => on_message(BridgeMessage::Event(event)),
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Skipping malformed bridge line: {}", e),
                }
            }

            tracing::info!("Editor bridge closed");
            on_message(BridgeMessage::Closed);
        })
}
