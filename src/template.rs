//! Panel HTML template and bundled assets
//!
//! The template carries placeholder tokens that are replaced with values only
//! the webview host knows: its content-security-policy source and the
//! webview-safe URIs of the script and stylesheet.

use std::path::{Component, Path, PathBuf};

pub const TEMPLATE_FILE: &str = "sql_output.html";
pub const SCRIPT_FILE: &str = "sql_output.js";
pub const STYLE_FILE: &str = "sql_output.css";

const CSP_SOURCE_TOKEN: &str = "##CSP_SOURCE##";
const JS_URI_TOKEN: &str = "##JS_URI##";
const CSS_URI_TOKEN: &str = "##CSS_URI##";

/// Failure to read a bundled asset
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Failed to read asset {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Asset path {} escapes the resource root", .0.display())]
    OutsideRoot(PathBuf),
}

/// The only directory the panel may load files from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoot {
    dir: PathBuf,
}

impl ResourceRoot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Join a relative asset path, refusing anything that leaves the root
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, AssetError> {
        let relative = Path::new(relative.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(AssetError::OutsideRoot(relative.to_path_buf()));
        }
        Ok(self.dir.join(relative))
    }

    /// Read an asset's bytes
    pub fn read(&self, relative: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.resolve(relative)?;
        std::fs::read(&path).map_err(|source| AssetError::Read { path, source })
    }

    /// Read the raw (unsubstituted) panel template
    pub fn read_template(&self) -> Result<String, AssetError> {
        let path = self.resolve(TEMPLATE_FILE)?;
        std::fs::read_to_string(&path).map_err(|source| AssetError::Read { path, source })
    }
}

/// Substitute the template's placeholder tokens.
///
/// Every CSP token is replaced; the script and stylesheet tokens are replaced once.
pub fn compile_template(template: &str, csp_source: &str, js_uri: &str, css_uri: &str) -> String {
    template
        .replace(CSP_SOURCE_TOKEN, csp_source)
        .replacen(JS_URI_TOKEN, js_uri, 1)
        .replacen(CSS_URI_TOKEN, css_uri, 1)
}
