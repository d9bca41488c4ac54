use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::{BcError, Result};

/// Contents of a theme's `theme.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeManifest {
    pub theme: ThemeInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeInfo {
    pub title: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ThemeManifest {
    /// Manifest used for themes that ship without one: the title is the
    /// theme name.
    #[must_use]
    pub fn fallback(name: &str) -> Self {
        Self {
            theme: ThemeInfo {
                title: name.to_string(),
                version: None,
                description: None,
                author: None,
                url: None,
            },
        }
    }

    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|err| {
            BcError::ValidationFailed(format!("Theme manifest TOML parse error: {err}"))
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| {
            BcError::Serialization(format!("Theme manifest TOML serialize error: {err}"))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.theme.title.trim().is_empty() {
            return Err(BcError::ValidationFailed(
                "theme.title is required".to_string(),
            ));
        }
        if let Some(version) = self.theme.version.as_deref() {
            Version::parse(version).map_err(|err| {
                BcError::ValidationFailed(format!("theme.version must be semver ({version}): {err}"))
            })?;
        }
        Ok(())
    }
}
