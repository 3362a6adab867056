//! Highlight themes for the SQL output panel
//!
//! Provides YAML-based palettes with compile-time embedded themes and
//! user overrides from the config directory, plus resolution of the editor's
//! configured color theme name to a bundled theme id.
//!
//! Theme loading priority:
//! 1. User config: `~/.config/prql-preview/themes/{id}.yaml`
//! 2. Embedded: Built-in themes compiled into binary

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::syntax::{highlight_id_for_name, parent_highlight, HighlightId, HIGHLIGHT_NAMES};

// Embed theme YAML files at compile time
pub const DEFAULT_DARK_YAML: &str = include_str!("../themes/default-dark.yaml");
pub const DEFAULT_LIGHT_YAML: &str = include_str!("../themes/default-light.yaml");
pub const GITHUB_DARK_YAML: &str = include_str!("../themes/github-dark.yaml");
pub const GITHUB_LIGHT_YAML: &str = include_str!("../themes/github-light.yaml");
pub const FLEET_DARK_YAML: &str = include_str!("../themes/fleet-dark.yaml");
pub const CSS_VARIABLES_YAML: &str = include_str!("../themes/css-variables.yaml");

/// Theme used when the configured name matches nothing bundled
pub const FALLBACK_THEME_ID: &str = "css-variables";

/// A built-in theme entry
pub struct BuiltinTheme {
    /// Stable identifier (e.g. "default-dark", "github-light")
    pub id: &'static str,
    /// Embedded YAML content
    pub yaml: &'static str,
}

/// Registry of all built-in themes
pub const BUILTIN_THEMES: &[BuiltinTheme] = &[
    BuiltinTheme {
        id: "default-dark",
        yaml: DEFAULT_DARK_YAML,
    },
    BuiltinTheme {
        id: "default-light",
        yaml: DEFAULT_LIGHT_YAML,
    },
    BuiltinTheme {
        id: "github-dark",
        yaml: GITHUB_DARK_YAML,
    },
    BuiltinTheme {
        id: "github-light",
        yaml: GITHUB_LIGHT_YAML,
    },
    BuiltinTheme {
        id: "fleet-dark",
        yaml: FLEET_DARK_YAML,
    },
    BuiltinTheme {
        id: FALLBACK_THEME_ID,
        yaml: CSS_VARIABLES_YAML,
    },
];

/// Identifier of a bundled theme. Only constructible from the bundled set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThemeId(&'static str);

impl ThemeId {
    /// Look up a bundled theme id by exact name
    pub fn bundled(name: &str) -> Option<Self> {
        BUILTIN_THEMES
            .iter()
            .find(|t| t.id == name)
            .map(|t| ThemeId(t.id))
    }

    /// The fallback theme, always present
    pub fn fallback() -> Self {
        ThemeId(FALLBACK_THEME_ID)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    fn builtin(&self) -> &'static BuiltinTheme {
        BUILTIN_THEMES
            .iter()
            .find(|t| t.id == self.0)
            .unwrap_or(&BUILTIN_THEMES[BUILTIN_THEMES.len() - 1])
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Canonicalize an editor theme name: "GitHub Dark Theme" -> "github-dark"
pub fn normalize_theme_name(name: &str) -> String {
    let lower = name.to_lowercase().replace("theme", " ");
    lower
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Map the configured color theme name to a bundled theme id.
///
/// Tries the raw name, then its normalized form, and falls back to
/// [`FALLBACK_THEME_ID`]. `None` means "not configured" and uses the default name.
pub fn resolve_theme_name(configured: Option<&str>) -> ThemeId {
    let name = configured.unwrap_or(crate::config::DEFAULT_COLOR_THEME);

    if let Some(id) = ThemeId::bundled(name) {
        return id;
    }

    let normalized = normalize_theme_name(name);
    if let Some(id) = ThemeId::bundled(&normalized) {
        tracing::debug!("Theme '{}' resolved via normalized name '{}'", name, normalized);
        return id;
    }

    tracing::debug!(
        "Theme '{}' is not bundled, using {}",
        name,
        FALLBACK_THEME_ID
    );
    ThemeId::fallback()
}

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color from RGB values (alpha defaults to 255)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse from "#RRGGBB" or "#RRGGBBAA" hex string
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let s = s.trim_start_matches('#');
        if !s.is_ascii() {
            return Err(format!("Invalid color format: {}", s));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&s[range], 16).map_err(|e| e.to_string())
        };
        match s.len() {
            6 => Ok(Color {
                r: channel(0..2)?,
                g: channel(2..4)?,
                b: channel(4..6)?,
                a: 255,
            }),
            8 => Ok(Color {
                r: channel(0..2)?,
                g: channel(2..4)?,
                b: channel(4..6)?,
                a: channel(6..8)?,
            }),
            _ => Err(format!("Invalid color format: {}", s)),
        }
    }

    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// A palette entry: a concrete color or a CSS custom property reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorValue {
    Rgba(Color),
    /// `var(--name)`, resolved by the panel stylesheet
    Variable(String),
}

impl ColorValue {
    pub fn parse(s: &str) -> Result<Self, String> {
        let trimmed = s.trim();
        if trimmed.starts_with("var(--") && trimmed.ends_with(')') {
            Ok(ColorValue::Variable(trimmed.to_string()))
        } else {
            Color::from_hex(trimmed).map(ColorValue::Rgba)
        }
    }

    pub fn to_css(&self) -> String {
        match self {
            ColorValue::Rgba(color) => color.to_css(),
            ColorValue::Variable(var) => var.clone(),
        }
    }
}

/// Raw theme data as parsed from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeData {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub background: String,
    pub foreground: String,
    #[serde(default)]
    pub syntax: HashMap<String, String>,
}

/// Resolved highlight palette
#[derive(Debug, Clone)]
pub struct HighlightTheme {
    pub name: String,
    pub background: ColorValue,
    pub foreground: ColorValue,
    /// Indexed by HighlightId; `None` renders with the foreground color
    colors: Vec<Option<ColorValue>>,
}

impl HighlightTheme {
    /// Load theme from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        let data: ThemeData =
            serde_yaml::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))?;
        Self::from_data(data)
    }

    /// Convert raw theme data to a resolved palette
    pub fn from_data(data: ThemeData) -> Result<Self, String> {
        let mut colors = vec![None; HIGHLIGHT_NAMES.len()];
        for (name, value) in &data.syntax {
            let Some(id) = highlight_id_for_name(name) else {
                tracing::debug!("Ignoring unknown highlight name '{}' in theme", name);
                continue;
            };
            // Exact names win over a more specific name that fell back to them
            if HIGHLIGHT_NAMES[id as usize] == name.as_str() || colors[id as usize].is_none() {
                colors[id as usize] = Some(ColorValue::parse(value)?);
            }
        }

        Ok(Self {
            name: data.name,
            background: ColorValue::parse(&data.background)?,
            foreground: ColorValue::parse(&data.foreground)?,
            colors,
        })
    }

    /// Load a built-in palette
    pub fn from_builtin(id: ThemeId) -> Result<Self, String> {
        Self::from_yaml(id.builtin().yaml)
    }

    /// Color for a highlight, falling back through parent categories
    pub fn color_for(&self, highlight: HighlightId) -> Option<&ColorValue> {
        let mut current = Some(highlight);
        while let Some(id) = current {
            if let Some(Some(color)) = self.colors.get(id as usize) {
                return Some(color);
            }
            current = parent_highlight(id);
        }
        None
    }
}

/// Load a palette from a YAML file
pub fn from_file(path: &Path) -> Result<HighlightTheme, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read theme file {}: {}", path.display(), e))?;
    HighlightTheme::from_yaml(&content)
}

/// Load a palette, looking for `{id}.yaml` in `user_dir` first
pub fn load_theme_from(id: ThemeId, user_dir: Option<&Path>) -> Result<HighlightTheme, String> {
    if let Some(user_dir) = user_dir {
        let user_path = user_dir.join(format!("{}.yaml", id));
        if user_path.exists() {
            tracing::info!("Loading user theme from {}", user_path.display());
            return from_file(&user_path);
        }
    }

    tracing::info!("Loading builtin theme: {}", id);
    HighlightTheme::from_builtin(id)
}
