//! Process configuration (`config.toml` in the application home).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable that overrides the application home.
pub const HOME_ENV: &str = "SWALLOW_HOME";

/// Name of the application home under the user's home directory.
pub const HOME_DIR_NAME: &str = ".swallow";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine the user's home directory")]
    NoHomeDir,

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot encode config: {0}")]
    Encode(#[from] toml::ser::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// tracing filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// generator executable; relative paths resolve against the app home
    #[serde(default = "default_hugo_bin")]
    pub hugo_bin: PathBuf,

    #[serde(default = "default_preview_url")]
    pub preview_url: String,

    /// open the browser when a preview starts
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_hugo_bin() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("hugo.exe")
    } else {
        PathBuf::from("hugo")
    }
}

fn default_preview_url() -> String {
    "http://localhost:1313/".to_string()
}

fn default_open_browser() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            hugo_bin: default_hugo_bin(),
            preview_url: default_preview_url(),
            open_browser: default_open_browser(),
        }
    }
}

impl AppConfig {
    /// Load `config.toml` from `home`, writing defaults when it is missing.
    pub fn load_or_init(home: &Path) -> ConfigResult<Self> {
        let path = Self::config_path(home);

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = AppConfig::default();
            config.save(home)?;
            Ok(config)
        }
    }

    pub fn save(&self, home: &Path) -> ConfigResult<()> {
        fs::create_dir_all(home).map_err(|source| ConfigError::Io {
            path: home.to_path_buf(),
            source,
        })?;
        let path = Self::config_path(home);
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content).map_err(|source| ConfigError::Io { path, source })
    }

    pub fn config_path(home: &Path) -> PathBuf {
        home.join("config.toml")
    }

    /// Absolute path of the generator executable.
    ///
    /// A bare program name (`hugo`) is left for `PATH` lookup unless a copy
    /// exists in the app home.
    pub fn resolve_hugo_bin(&self, home: &Path) -> PathBuf {
        if self.hugo_bin.is_absolute() {
            return self.hugo_bin.clone();
        }
        let local = home.join(&self.hugo_bin);
        if local.exists() || self.hugo_bin.components().count() > 1 {
            local
        } else {
            self.hugo_bin.clone()
        }
    }
}

/// Resolve the application home: `$SWALLOW_HOME`, else `~/.swallow`.
pub fn resolve_home() -> ConfigResult<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(HOME_DIR_NAME))
        .ok_or(ConfigError::NoHomeDir)
}
