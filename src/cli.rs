//! Command-line argument parsing
//!
//! Supports:
//! - Bridge mode (default): editor events arrive as JSON lines on stdin
//! - Watch mode: preview `.prql` files straight from disk
//! - Overriding the configured theme and compile target

use clap::Parser;
use std::path::PathBuf;

use crate::config::PreviewConfig;
use crate::panel::PanelEvent;

/// Live SQL preview for PRQL
#[derive(Parser, Debug, Default)]
#[command(
    name = "prql-preview",
    version,
    about = "Live SQL preview for PRQL queries"
)]
pub struct CliArgs {
    /// Watch these .prql files instead of reading editor events from stdin
    #[arg(short = 'w', long, value_name = "FILE", num_args = 1..)]
    pub watch: Vec<PathBuf>,

    /// Color theme name (overrides config.yaml)
    #[arg(short = 't', long, value_name = "NAME")]
    pub theme: Option<String>,

    /// Compile target, e.g. sql.postgres (overrides config.yaml)
    #[arg(long, value_name = "DIALECT")]
    pub target: Option<String>,

    /// Directory holding the panel's HTML, JS and CSS
    #[arg(long, value_name = "DIR")]
    pub resources: Option<PathBuf>,

    /// Write a default config.yaml and exit
    #[arg(long)]
    pub init_config: bool,
}

/// How the session gets its editor events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupMode {
    /// JSON lines on stdin
    Bridge,
    /// Files on disk; the panel opens at startup
    Watch(Vec<PathBuf>),
    /// Write the default config file, then exit
    InitConfig,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub mode: StartupMode,
    pub resources: PathBuf,
    theme: Option<String>,
    target: Option<String>,
}

impl CliArgs {
    /// Convert parsed CLI args into startup configuration
    pub fn into_config(self) -> Result<StartupConfig, String> {
        let mode = if self.init_config {
            StartupMode::InitConfig
        } else if self.watch.is_empty() {
            StartupMode::Bridge
        } else {
            if let Some(dir) = self.watch.iter().find(|p| p.is_dir()) {
                return Err(format!(
                    "Cannot watch a directory: {} (pass .prql files)",
                    dir.display()
                ));
            }
            StartupMode::Watch(self.watch)
        };

        let resources = self
            .resources
            .unwrap_or_else(crate::config_paths::resources_dir);

        Ok(StartupConfig {
            mode,
            resources,
            theme: self.theme,
            target: self.target,
        })
    }
}

impl StartupConfig {
    /// Apply command-line overrides on top of a loaded config
    pub fn apply_overrides(&self, mut config: PreviewConfig) -> PreviewConfig {
        if let Some(theme) = &self.theme {
            config.color_theme = Some(theme.clone());
        }
        if let Some(target) = &self.target {
            config.target = target.clone();
        }
        config
    }

    /// Command-line flags take precedence over settings sent by the editor
    /// or reloaded from disk.
    pub fn override_event(&self, event: PanelEvent) -> PanelEvent {
        match event {
            PanelEvent::ConfigurationChanged(config) => {
                PanelEvent::ConfigurationChanged(self.apply_overrides(config))
            }
            other => other,
        }
    }

    pub fn is_watch(&self) -> bool {
        matches!(self.mode, StartupMode::Watch(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_args_gives_bridge_mode() {
        let config = CliArgs::default().into_config().unwrap();
        assert_eq!(config.mode, StartupMode::Bridge);
        assert!(!config.is_watch());
    }

    #[test]
    fn test_watch_files() {
        let args = CliArgs::parse_from(["prql-preview", "--watch", "a.prql", "b.prql"]);
        let config = args.into_config().unwrap();
        assert_eq!(
            config.mode,
            StartupMode::Watch(vec![PathBuf::from("a.prql"), PathBuf::from("b.prql")])
        );
    }

    #[test]
    fn test_watch_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = CliArgs {
            watch: vec![dir.path().to_path_buf()],
            ..Default::default()
        };
        assert!(args.into_config().is_err());
    }

    #[test]
    fn test_init_config_wins_over_watch() {
        let args = CliArgs::parse_from(["prql-preview", "--init-config", "--watch", "a.prql"]);
        assert_eq!(args.into_config().unwrap().mode, StartupMode::InitConfig);
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let args = CliArgs::parse_from([
            "prql-preview",
            "--theme",
            "GitHub Light",
            "--target",
            "sql.postgres",
        ]);
        let startup = args.into_config().unwrap();
        let config = startup.apply_overrides(PreviewConfig::default());
        assert_eq!(config.color_theme.as_deref(), Some("GitHub Light"));
        assert_eq!(config.target, "sql.postgres");
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let startup = CliArgs::default().into_config().unwrap();
        let loaded = PreviewConfig {
            color_theme: Some("fleet-dark".to_string()),
            ..Default::default()
        };
        assert_eq!(startup.apply_overrides(loaded.clone()), loaded);
    }

    #[test]
    fn test_editor_settings_keep_command_line_overrides() {
        let args = CliArgs::parse_from(["prql-preview", "--theme", "GitHub Light"]);
        let startup = args.into_config().unwrap();
        let from_editor = PreviewConfig {
            color_theme: Some("fleet-dark".to_string()),
            target: "sql.mysql".to_string(),
            signature_comment: true,
        };

        let PanelEvent::ConfigurationChanged(config) =
            startup.override_event(PanelEvent::ConfigurationChanged(from_editor))
        else {
            panic!("expected a configuration event");
        };
        assert_eq!(config.color_theme.as_deref(), Some("GitHub Light"));
        assert_eq!(config.target, "sql.mysql");
        assert!(config.signature_comment);

        assert_eq!(
            startup.override_event(PanelEvent::DocumentChanged),
            PanelEvent::DocumentChanged
        );
    }

    #[test]
    fn test_resources_flag() {
        let args = CliArgs::parse_from(["prql-preview", "--resources", "/opt/res"]);
        assert_eq!(args.into_config().unwrap().resources, PathBuf::from("/opt/res"));
    }
}
