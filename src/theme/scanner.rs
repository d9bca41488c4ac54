//! Reads what a theme directory carries: bundled plugins, default data,
//! manifest.

use tracing::{debug, warn};

use crate::error::{BcError, Result};
use crate::storage::FileSystem;
use crate::theme::manifest::ThemeManifest;
use crate::theme::{Theme, ThemeLayout, validate_name};

pub const BUNDLED_PLUGINS_HEADER: &str = "このテーマは下記のプラグインを同梱しています。";

pub const DEFAULT_DATA_LINES: [&str; 2] = [
    "このテーマは初期データを保有しています。",
    "Webサイトにテーマに合ったデータを適用するには、初期データ読込を実行してください。",
];

pub struct ThemeScanner<'a> {
    fs: &'a dyn FileSystem,
    layout: &'a ThemeLayout,
}

impl<'a> ThemeScanner<'a> {
    #[must_use]
    pub const fn new(fs: &'a dyn FileSystem, layout: &'a ThemeLayout) -> Self {
        Self { fs, layout }
    }

    #[must_use]
    pub const fn layout(&self) -> &'a ThemeLayout {
        self.layout
    }

    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        validate_name("theme", name).is_ok() && self.fs.exists(&self.layout.theme_dir(name))
    }

    /// Fails with `NotFound` unless theme `name` exists.
    pub fn require(&self, name: &str) -> Result<()> {
        validate_name("theme", name)?;
        if self.fs.exists(&self.layout.theme_dir(name)) {
            Ok(())
        } else {
            Err(BcError::NotFound(format!("theme {name}")))
        }
    }

    /// Theme directory names under the themes root, sorted. Hidden entries
    /// are skipped.
    pub fn theme_names(&self) -> Result<Vec<String>> {
        let root = &self.layout.themes_root;
        if !self.fs.exists(root) {
            return Err(BcError::NotFound(format!("themes root {}", root.display())));
        }
        Ok(self
            .fs
            .subdirectories(root)?
            .into_iter()
            .filter(|name| !name.starts_with('.'))
            .collect())
    }

    /// Plugins bundled under the theme's plugin directory. Plain files there
    /// are ignored.
    pub fn bundled_plugin_names(&self, name: &str) -> Result<Vec<String>> {
        validate_name("theme", name)?;
        self.fs.subdirectories(&self.layout.plugin_path(name))
    }

    /// Default-data patterns shipped with the theme, sorted.
    pub fn default_data_pattern_names(&self, name: &str) -> Result<Vec<String>> {
        validate_name("theme", name)?;
        self.fs.subdirectories(&self.layout.default_data_path(name))
    }

    pub fn has_default_data(&self, name: &str) -> Result<bool> {
        Ok(!self.default_data_pattern_names(name)?.is_empty())
    }

    /// Header plus one tab-indented line per bundled plugin; empty when the
    /// theme bundles none.
    pub fn plugins_info(&self, name: &str) -> Result<Vec<String>> {
        let plugins = self.bundled_plugin_names(name)?;
        if plugins.is_empty() {
            return Ok(Vec::new());
        }
        let mut info = Vec::with_capacity(plugins.len() + 1);
        info.push(BUNDLED_PLUGINS_HEADER.to_string());
        info.extend(plugins.iter().map(|p| format!("\t・{p}")));
        Ok(info)
    }

    /// Append the default-data section to `info` when the theme has default
    /// data, separated by a blank line from an existing section.
    pub fn default_data_info(&self, name: &str, mut info: Vec<String>) -> Result<Vec<String>> {
        if !self.has_default_data(name)? {
            return Ok(info);
        }
        if !info.is_empty() {
            info.push(String::new());
        }
        info.extend(DEFAULT_DATA_LINES.iter().map(|l| (*l).to_string()));
        Ok(info)
    }

    /// Bundled-plugin section followed by the default-data section.
    pub fn describe_theme(&self, name: &str) -> Result<Vec<String>> {
        self.require(name)?;
        let info = self.plugins_info(name)?;
        self.default_data_info(name, info)
    }

    /// The theme's manifest, or the fallback when it has none.
    pub fn manifest(&self, name: &str) -> Result<ThemeManifest> {
        self.require(name)?;
        let path = self.layout.manifest_path(name);
        if !self.fs.exists(&path) {
            debug!(theme = name, "no manifest, using fallback");
            return Ok(ThemeManifest::fallback(name));
        }
        let manifest = ThemeManifest::from_toml_str(&self.fs.read_file(&path)?)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Human label for the theme; falls back to its name when the manifest
    /// cannot be read.
    #[must_use]
    pub fn title(&self, name: &str) -> String {
        match self.manifest(name) {
            Ok(manifest) => manifest.theme.title,
            Err(err) => {
                warn!(theme = name, error = %err, "unreadable manifest");
                name.to_string()
            }
        }
    }

    pub fn theme(&self, name: &str) -> Result<Theme> {
        self.require(name)?;
        let manifest = match self.manifest(name) {
            Ok(manifest) => manifest,
            Err(err @ BcError::Io(_)) => return Err(err),
            Err(err) => {
                warn!(theme = name, error = %err, "invalid manifest, using fallback");
                ThemeManifest::fallback(name)
            }
        };
        let info = manifest.theme;
        Ok(Theme {
            name: name.to_string(),
            path: self.layout.theme_dir(name),
            title: info.title,
            version: info.version,
            description: info.description,
            author: info.author,
            url: info.url,
            screenshot: self.fs.exists(&self.layout.screenshot_path(name)),
            bundled_plugins: self.bundled_plugin_names(name)?,
            has_default_data: self.has_default_data(name)?,
        })
    }
}
