//! The generator's site configuration (`hugo.toml`).
//!
//! Only a handful of fields are edited from the application. They are typed
//! on [`SiteConfig`]; everything else in the document rides along in
//! `extra` tables so a write never loses settings it doesn't know about.
//! Edits arrive as a [`SiteConfigPatch`] where `None` means "leave as is".

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::site::error::{SiteError, SiteResult};

/// The full configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default_content_language: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub copyright: String,
    #[serde(default)]
    pub author: Author,
    /// keys this application does not manage
    #[serde(flatten)]
    pub extra: toml::Table,
}

/// The `[author]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: toml::Table,
}

/// A partial update of the editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_content_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SiteConfig {
    /// Parse a configuration document.
    pub fn parse(text: &str) -> SiteResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load the configuration file.
    pub fn load(path: &Path) -> SiteResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| SiteError::io(path, e))?;
        Self::parse(&text)
    }

    /// Serialize the whole document.
    pub fn to_toml(&self) -> SiteResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Overwrite the fields present in `patch`.
    pub fn apply(&mut self, patch: SiteConfigPatch) {
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.default_content_language {
            self.default_content_language = v;
        }
        if let Some(v) = patch.theme {
            self.theme = v;
        }
        if let Some(v) = patch.copyright {
            self.copyright = v;
        }
        if let Some(name) = patch.author.and_then(|a| a.name) {
            self.author.name = name;
        }
    }
}

/// Read-modify-write: load the full document, apply `patch`, write it back.
pub fn update_site_config(path: &Path, patch: SiteConfigPatch) -> SiteResult<SiteConfig> {
    let mut config = SiteConfig::load(path)?;
    config.apply(patch);
    fs::write(path, config.to_toml()?).map_err(|e| SiteError::io(path, e))?;
    info!(path = %path.display(), "site configuration saved");
    Ok(config)
}
