//! Preview configuration
//!
//! Stores user preferences in `~/.config/prql-preview/config.yaml`.
//! The same settings arrive from the editor bridge as configuration changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Theme name used when nothing is configured
pub const DEFAULT_COLOR_THEME: &str = "default-dark";

/// Compile target used when nothing is configured
pub const DEFAULT_TARGET: &str = "sql.any";

/// Settings that affect compilation and highlighting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Editor color theme name (e.g., "GitHub Dark", "fleet-dark")
    #[serde(default)]
    pub color_theme: Option<String>,
    /// PRQL compile target (e.g., "sql.postgres")
    #[serde(default = "default_target")]
    pub target: String,
    /// Emit the "Generated by PRQL compiler" signature comment
    #[serde(default)]
    pub signature_comment: bool,
}

fn default_target() -> String {
    DEFAULT_TARGET.to_string()
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            color_theme: None,
            target: default_target(),
            signature_comment: false,
        }
    }
}

impl PreviewConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        Self::load_from(&path)
    }

    /// Load config from a specific file, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse config from a YAML string. An empty document yields defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
    }

    /// Save config to a file, creating the parent directory if needed
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Save config to `~/.config/prql-preview/config.yaml`
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    /// Configured theme name, or the default when unset
    pub fn color_theme_or_default(&self) -> &str {
        self.color_theme.as_deref().unwrap_or(DEFAULT_COLOR_THEME)
    }
}
