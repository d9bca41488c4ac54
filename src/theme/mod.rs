//! Themes: scanning, packaging, default data and application to sites.
//!
//! A theme is a directory under the themes root. Nothing about a theme is
//! stored in the database except the name a site points at.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::error::{BcError, Result};

pub mod apply;
pub mod archive;
pub mod default_data;
pub mod descriptor;
pub mod manifest;
pub mod packaging;
pub mod scanner;

pub use apply::ThemeApplier;
pub use archive::{ArchiveReport, zip_dir};
pub use default_data::{DefaultDataLoader, LoadReport};
pub use manifest::{ThemeInfo, ThemeManifest};
pub use packaging::{PatternOptions, ThemePackager};
pub use scanner::ThemeScanner;

/// A theme as found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub name: String,
    pub path: PathBuf,
    pub title: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub screenshot: bool,
    pub bundled_plugins: Vec<String>,
    pub has_default_data: bool,
}

/// Paths inside the themes root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeLayout {
    pub themes_root: PathBuf,
    pub plugin_dir: String,
    pub default_data_dir: String,
    pub descriptor: String,
    pub manifest: String,
    pub screenshot: String,
    pub copy_suffix: String,
}

impl ThemeLayout {
    #[must_use]
    pub fn new(themes_root: impl Into<PathBuf>, config: &LayoutConfig) -> Self {
        Self {
            themes_root: themes_root.into(),
            plugin_dir: config.plugin_dir.clone(),
            default_data_dir: config.default_data_dir.clone(),
            descriptor: config.descriptor.clone(),
            manifest: config.manifest.clone(),
            screenshot: config.screenshot.clone(),
            copy_suffix: config.copy_suffix.clone(),
        }
    }

    /// Layout with default relative paths under `themes_root`.
    #[must_use]
    pub fn with_defaults(themes_root: impl Into<PathBuf>) -> Self {
        Self::new(themes_root, &LayoutConfig::default())
    }

    #[must_use]
    pub fn theme_dir(&self, name: &str) -> PathBuf {
        self.themes_root.join(name)
    }

    #[must_use]
    pub fn plugin_path(&self, name: &str) -> PathBuf {
        self.theme_dir(name).join(&self.plugin_dir)
    }

    #[must_use]
    pub fn default_data_path(&self, name: &str) -> PathBuf {
        self.theme_dir(name).join(&self.default_data_dir)
    }

    #[must_use]
    pub fn pattern_path(&self, name: &str, pattern: &str) -> PathBuf {
        self.default_data_path(name).join(pattern)
    }

    #[must_use]
    pub fn descriptor_path(&self, name: &str) -> PathBuf {
        self.theme_dir(name).join(&self.descriptor)
    }

    #[must_use]
    pub fn manifest_path(&self, name: &str) -> PathBuf {
        self.theme_dir(name).join(&self.manifest)
    }

    #[must_use]
    pub fn screenshot_path(&self, name: &str) -> PathBuf {
        self.theme_dir(name).join(&self.screenshot)
    }

    #[must_use]
    pub fn copy_name(&self, name: &str) -> String {
        format!("{name}{}", self.copy_suffix)
    }
}

/// Theme and pattern names become single path components.
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
        || Path::new(name).is_absolute();
    if invalid {
        return Err(BcError::ValidationFailed(format!("invalid {kind} name: {name:?}")));
    }
    Ok(())
}
