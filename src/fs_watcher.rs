//! File watching for watch mode
//!
//! Uses the `notify` crate with debouncing to detect edits to the watched
//! `.prql` files and to `config.yaml`. The parent directories are watched
//! (non-recursively) so editors that save by rename are still seen.

use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEventKind, Debouncer};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::editor::{EditorState, TextDocument};

const DEBOUNCE: Duration = Duration::from_millis(200);

/// Events emitted by the file system watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A watched query file changed on disk
    Document(PathBuf),
    /// The config file changed
    Config,
}

/// The set of paths watch mode cares about
#[derive(Debug, Clone)]
pub struct WatchTargets {
    files: Vec<PathBuf>,
    config_file: Option<PathBuf>,
}

impl WatchTargets {
    pub fn new(files: &[PathBuf], config_file: Option<PathBuf>) -> Self {
        Self {
            files: files.iter().map(|p| canonical(p)).collect(),
            config_file: config_file.map(|p| canonical(&p)),
        }
    }

    /// Parent directories to register with the watcher
    pub fn directories(&self) -> BTreeSet<PathBuf> {
        self.files
            .iter()
            .chain(self.config_file.iter())
            .filter_map(|p| p.parent())
            .filter(|dir| dir.is_dir())
            .map(Path::to_path_buf)
            .collect()
    }

    /// Map raw changed paths to watch events, dropping unrelated paths and duplicates
    pub fn classify<'a>(&self, paths: impl IntoIterator<Item = &'a Path>) -> Vec<WatchEvent> {
        let mut events = Vec::new();
        for path in paths {
            let path = canonical(path);
            let event = if self.config_file.as_ref() == Some(&path) {
                WatchEvent::Config
            } else if self.files.contains(&path) {
                WatchEvent::Document(path)
            } else {
                continue;
            };
            if !events.contains(&event) {
                events.push(event);
            }
        }
        events
    }
}

/// Debounced watcher over [`WatchTargets`]
///
/// Events are delivered on the debouncer's thread through `on_events`.
pub struct FileSystemWatcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
}

impl FileSystemWatcher {
    pub fn new<F>(targets: WatchTargets, mut on_events: F) -> Result<Self, notify::Error>
    where
        F: FnMut(Vec<WatchEvent>) + Send + 'static,
    {
        let directories = targets.directories();
        let mut debouncer = new_debouncer(DEBOUNCE, move |result: DebounceEventResult| {
            match result {
                Ok(debounced) => {
                    // AnyContinuous fires repeatedly during long writes
                    let events = targets.classify(
                        debounced
                            .iter()
                            .filter(|e| e.kind != DebouncedEventKind::AnyContinuous)
                            .map(|e| e.path.as_path()),
                    );
                    if !events.is_empty() {
                        tracing::debug!("File watcher detected {} changes", events.len());
                        on_events(events);
                    }
                }
                Err(e) => tracing::warn!("File system watcher error: {:?}", e),
            }
        })?;

        for dir in directories {
            debouncer
                .watcher()
                .watch(&dir, notify::RecursiveMode::NonRecursive)?;
            tracing::info!("Watching {}", dir.display());
        }

        Ok(Self {
            _debouncer: debouncer,
        })
    }
}

/// Read a file from disk into the editor mirror and make it the active document.
///
/// Documents are keyed by canonical path, so a file named on the command line
/// and the same file reported by the watcher share one URI.
pub fn load_document(editor: &mut EditorState, path: &Path) -> std::io::Result<()> {
    let path = path.canonicalize()?;
    let text = std::fs::read_to_string(&path)?;
    let uri = path.display().to_string();
    if editor.document(&uri).is_some() {
        editor.change(&uri, text);
    } else {
        let language = TextDocument::detect_language(&uri, None);
        editor.open(TextDocument::new(uri.clone(), language, text));
    }
    editor.activate(Some(uri));
    Ok(())
}

/// The file with the newest modification time; unreadable files are skipped
pub fn most_recently_modified(paths: &[PathBuf]) -> Option<&PathBuf> {
    paths
        .iter()
        .filter_map(|p| {
            let modified = std::fs::metadata(p).and_then(|m| m.modified()).ok()?;
            Some((p, modified))
        })
        .max_by_key(|(_, modified)| *modified)
        .map(|(p, _)| p)
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
