//! Where prql-preview keeps its files
//!
//! ```text
//! <config root>/prql-preview/
//! ├── config.yaml
//! ├── themes/<theme-id>.yaml     palette overrides
//! └── logs/prql-preview.log.YYYY-MM-DD
//! ```
//!
//! The config root is `$XDG_CONFIG_HOME`, else `~/.config`. On Windows it is
//! the roaming application data folder.

use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "prql-preview";

/// Prefix of the daily rolling log files
pub const LOG_FILE_PREFIX: &str = "prql-preview.log";

/// The application's config directory and the files inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    root: PathBuf,
}

impl ConfigPaths {
    /// Paths under the platform config root, if one can be determined
    pub fn detect() -> Option<Self> {
        platform_config_root().map(Self::under)
    }

    /// Paths under an explicit config root
    pub fn under(config_root: impl AsRef<Path>) -> Self {
        Self {
            root: config_root.as_ref().join(APP_NAME),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    pub fn themes_dir(&self) -> PathBuf {
        self.root.join("themes")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Create the themes directory if needed and return it
    pub fn ensure_themes_dir(&self) -> Result<PathBuf, String> {
        create(self.themes_dir())
    }

    /// Create the logs directory if needed and return it
    pub fn ensure_logs_dir(&self) -> Result<PathBuf, String> {
        create(self.logs_dir())
    }
}

fn create(dir: PathBuf) -> Result<PathBuf, String> {
    std::fs::create_dir_all(&dir)
        .map_err(|e| format!("Failed to create directory {}: {}", dir.display(), e))?;
    Ok(dir)
}

#[cfg(not(target_os = "windows"))]
fn platform_config_root() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
}

#[cfg(target_os = "windows")]
fn platform_config_root() -> Option<PathBuf> {
    dirs::config_dir()
}

pub fn config_file() -> Option<PathBuf> {
    ConfigPaths::detect().map(|p| p.config_file())
}

pub fn themes_dir() -> Option<PathBuf> {
    ConfigPaths::detect().map(|p| p.themes_dir())
}

pub fn ensure_themes_dir() -> Result<PathBuf, String> {
    no_config_root()?.ensure_themes_dir()
}

pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    no_config_root()?.ensure_logs_dir()
}

fn no_config_root() -> Result<ConfigPaths, String> {
    ConfigPaths::detect().ok_or_else(|| "No config directory available".to_string())
}

/// Directory holding the panel's HTML template, script and stylesheet.
///
/// Packaged builds ship it as `resources/` next to the executable; otherwise
/// the source checkout's copy is used.
pub fn resources_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("resources")))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_root() {
        let paths = ConfigPaths::under("/cfg");
        assert_eq!(paths.root(), Path::new("/cfg/prql-preview"));
        assert_eq!(paths.config_file(), PathBuf::from("/cfg/prql-preview/config.yaml"));
        assert_eq!(paths.themes_dir(), PathBuf::from("/cfg/prql-preview/themes"));
        assert_eq!(paths.logs_dir(), PathBuf::from("/cfg/prql-preview/logs"));
    }

    #[test]
    fn test_ensure_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::under(dir.path());

        let themes = paths.ensure_themes_dir().unwrap();
        let logs = paths.ensure_logs_dir().unwrap();
        assert!(themes.is_dir());
        assert!(logs.is_dir());
        // Idempotent
        assert!(paths.ensure_logs_dir().is_ok());
    }
}
