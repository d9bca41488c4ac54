use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BcError, Result};
use crate::utils::read_optional;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub lock: LockConfig,
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub market: MarketConfig,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("BC_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides(&|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a config from TOML text and merge it over the defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let patch: ConfigPatch =
            toml::from_str(raw).map_err(|err| BcError::Config(format!("parse config: {err}")))?;
        let mut config = Self::default();
        config.merge_patch(patch);
        config.validate()?;
        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("bctheme/config.toml"))
    }

    fn load_project(root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&root.join("config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        let Some(raw) = read_optional(path)
            .map_err(|err| BcError::Config(format!("read config {}: {err}", path.display())))?
        else {
            return Ok(None);
        };
        let patch = toml::from_str(&raw)
            .map_err(|err| BcError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.paths {
            self.paths.merge(patch);
        }
        if let Some(patch) = patch.layout {
            self.layout.merge(patch);
        }
        if let Some(patch) = patch.export {
            self.export.merge(patch);
        }
        if let Some(patch) = patch.site {
            self.site.merge(patch);
        }
        if let Some(patch) = patch.lock {
            self.lock.merge(patch);
        }
        if let Some(patch) = patch.robot {
            self.robot.merge(patch);
        }
        if let Some(patch) = patch.market {
            self.market.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self, env: &dyn Fn(&str) -> Option<String>) -> Result<()> {
        if env_bool(env, "BC_ROBOT").unwrap_or(false) {
            self.robot.format = "json".to_string();
        }

        if let Some(value) = env_string(env, "BC_THEMES_ROOT") {
            self.paths.themes_root = value;
        }
        if let Some(value) = env_string(env, "BC_TMP_ROOT") {
            self.paths.tmp_root = value;
        }
        if let Some(value) = env_string(env, "BC_DATABASE") {
            self.paths.database = value;
        }

        if let Some(value) = env_string(env, "BC_COPY_SUFFIX") {
            self.layout.copy_suffix = value;
        }
        if let Some(values) = env_list(env, "BC_SENSITIVE_KEYS") {
            self.export.sensitive_keys = values;
        }
        if let Some(value) = env_string(env, "BC_DEFAULT_THEME") {
            self.site.default_theme = value;
        }
        if let Some(value) = env_u64(env, "BC_LOCK_TIMEOUT_MS")? {
            self.lock.timeout_ms = value;
        }
        if let Some(value) = env_string(env, "BC_MARKET_URL") {
            self.market.url = value;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("paths.themes_root", &self.paths.themes_root),
            ("paths.tmp_root", &self.paths.tmp_root),
            ("paths.database", &self.paths.database),
            ("layout.copy_suffix", &self.layout.copy_suffix),
            ("export.sensitive_table", &self.export.sensitive_table),
            ("market.url", &self.market.url),
        ] {
            if value.trim().is_empty() {
                return Err(BcError::Config(format!("{key} must not be empty")));
            }
        }
        if self.paths.themes_root == self.paths.tmp_root {
            return Err(BcError::Config(
                "paths.tmp_root must differ from paths.themes_root".to_string(),
            ));
        }
        if self.layout.copy_suffix.contains(['/', '\\']) {
            return Err(BcError::Config(format!(
                "layout.copy_suffix must be a plain name: {}",
                self.layout.copy_suffix
            )));
        }
        Ok(())
    }

    /// Absolute locations of the configured paths under `root`.
    #[must_use]
    pub fn resolve_paths(&self, root: &Path) -> ResolvedPaths {
        ResolvedPaths {
            themes_root: resolve_path(root, &self.paths.themes_root),
            tmp_root: resolve_path(root, &self.paths.tmp_root),
            database: resolve_path(root, &self.paths.database),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub themes_root: PathBuf,
    pub tmp_root: PathBuf,
    pub database: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default)]
    pub themes_root: String,
    #[serde(default)]
    pub tmp_root: String,
    #[serde(default)]
    pub database: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            themes_root: "themes".to_string(),
            tmp_root: "tmp".to_string(),
            database: "bctheme.db".to_string(),
        }
    }
}

impl PathsConfig {
    fn merge(&mut self, patch: PathsPatch) {
        if let Some(value) = patch.themes_root {
            self.themes_root = value;
        }
        if let Some(value) = patch.tmp_root {
            self.tmp_root = value;
        }
        if let Some(value) = patch.database {
            self.database = value;
        }
    }
}

/// Where things live inside a theme directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub plugin_dir: String,
    #[serde(default)]
    pub default_data_dir: String,
    #[serde(default)]
    pub descriptor: String,
    #[serde(default)]
    pub manifest: String,
    #[serde(default)]
    pub screenshot: String,
    #[serde(default)]
    pub copy_suffix: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            plugin_dir: "Plugin".to_string(),
            default_data_dir: "config/data".to_string(),
            descriptor: "src/Plugin.php".to_string(),
            manifest: "theme.toml".to_string(),
            screenshot: "screenshot.png".to_string(),
            copy_suffix: "Copy".to_string(),
        }
    }
}

impl LayoutConfig {
    fn merge(&mut self, patch: LayoutPatch) {
        if let Some(value) = patch.plugin_dir {
            self.plugin_dir = value;
        }
        if let Some(value) = patch.default_data_dir {
            self.default_data_dir = value;
        }
        if let Some(value) = patch.descriptor {
            self.descriptor = value;
        }
        if let Some(value) = patch.manifest {
            self.manifest = value;
        }
        if let Some(value) = patch.screenshot {
            self.screenshot = value;
        }
        if let Some(value) = patch.copy_suffix {
            self.copy_suffix = value;
        }
    }
}

pub const DEFAULT_SENSITIVE_KEYS: &[&str] = &[
    "email",
    "google_analytics_id",
    "first_access",
    "admin_theme",
    "login_credit",
    "address",
    "version",
    "google_maps_api_key",
    "use_update_notice",
    "smtp_host",
    "smtp_user",
    "smtp_password",
    "smtp_port",
    "smtp_tls",
    "mail_encode",
    "mail_additional_parameters",
    "outer_service_output_header",
    "outer_service_output_footer",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub sensitive_table: String,
    #[serde(default)]
    pub key_column: String,
    #[serde(default)]
    pub value_column: String,
    /// Keys whose values are blanked on export. A configured list replaces
    /// the defaults; it is not merged with them.
    #[serde(default)]
    pub sensitive_keys: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sensitive_table: "site_configs".to_string(),
            key_column: "name".to_string(),
            value_column: "value".to_string(),
            sensitive_keys: DEFAULT_SENSITIVE_KEYS.iter().map(|k| (*k).to_string()).collect(),
        }
    }
}

impl ExportConfig {
    fn merge(&mut self, patch: ExportPatch) {
        if let Some(value) = patch.sensitive_table {
            self.sensitive_table = value;
        }
        if let Some(value) = patch.key_column {
            self.key_column = value;
        }
        if let Some(value) = patch.value_column {
            self.value_column = value;
        }
        if let Some(values) = patch.sensitive_keys {
            self.sensitive_keys = values;
        }
    }
}

/// Values used when `init` creates the main site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub default_theme: String,
    #[serde(default)]
    pub default_title: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            default_theme: "BcFront".to_string(),
            default_title: "My Site".to_string(),
        }
    }
}

impl SiteConfig {
    fn merge(&mut self, patch: SitePatch) {
        if let Some(value) = patch.default_theme {
            self.default_theme = value;
        }
        if let Some(value) = patch.default_title {
            self.default_title = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    #[serde(default)]
    pub timeout_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

impl LockConfig {
    fn merge(&mut self, patch: LockPatch) {
        if let Some(value) = patch.timeout_ms {
            self.timeout_ms = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    #[serde(default)]
    pub format: String,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
        }
    }
}

impl RobotConfig {
    fn merge(&mut self, patch: RobotPatch) {
        if let Some(value) = patch.format {
            self.format = value;
        }
    }
}

/// Remote theme market RSS feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub timeout_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            url: "https://market.basercms.net/themes.rss".to_string(),
            timeout_secs: 10,
        }
    }
}

impl MarketConfig {
    fn merge(&mut self, patch: MarketPatch) {
        if let Some(value) = patch.url {
            self.url = value;
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub paths: Option<PathsPatch>,
    pub layout: Option<LayoutPatch>,
    pub export: Option<ExportPatch>,
    pub site: Option<SitePatch>,
    pub lock: Option<LockPatch>,
    pub robot: Option<RobotPatch>,
    pub market: Option<MarketPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PathsPatch {
    pub themes_root: Option<String>,
    pub tmp_root: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LayoutPatch {
    pub plugin_dir: Option<String>,
    pub default_data_dir: Option<String>,
    pub descriptor: Option<String>,
    pub manifest: Option<String>,
    pub screenshot: Option<String>,
    pub copy_suffix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ExportPatch {
    pub sensitive_table: Option<String>,
    pub key_column: Option<String>,
    pub value_column: Option<String>,
    pub sensitive_keys: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SitePatch {
    pub default_theme: Option<String>,
    pub default_title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LockPatch {
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RobotPatch {
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MarketPatch {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

fn resolve_path(root: &Path, value: &str) -> PathBuf {
    if let Some(rest) = value.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    let path = PathBuf::from(value);
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

fn env_string(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key)
}

fn env_bool(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    env(key).map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn env_u64(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    match env(key) {
        Some(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|err| BcError::Config(format!("invalid {key} value {value}: {err}"))),
        None => Ok(None),
    }
}

fn env_list(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<Vec<String>> {
    env(key).map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    })
}
