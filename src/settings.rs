//! User settings store (`settings.toml`): publishing credentials and other
//! per-user preferences edited from the application.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Settings store errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// result type alias for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Everything stored in the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub github: GithubSettings,
}

/// Credentials for publishing to the remote repository.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSettings {
    pub username: String,
    /// access token, used as the basic-auth password
    pub token: String,
    pub email: String,
    /// HTTPS URL of the remote repository
    pub repository: String,
}

impl GithubSettings {
    /// check that every field needed for a push is filled in
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty()
            && !self.token.is_empty()
            && !self.email.is_empty()
            && !self.repository.is_empty()
    }
}

impl fmt::Debug for GithubSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubSettings")
            .field("username", &self.username)
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .field("email", &self.email)
            .field("repository", &self.repository)
            .finish()
    }
}

/// File-backed settings store.
pub struct SettingsStore {
    path: PathBuf,
    // serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all settings; a missing file yields defaults.
    pub fn load(&self) -> SettingsResult<Settings> {
        let _guard = self.lock.lock();
        self.load_unlocked()
    }

    fn load_unlocked(&self) -> SettingsResult<Settings> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(source) => Err(SettingsError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write_unlocked(&self, settings: &Settings) -> SettingsResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let text = toml::to_string_pretty(settings)?;
        fs::write(&self.path, text).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Publishing credentials.
    pub fn github(&self) -> SettingsResult<GithubSettings> {
        Ok(self.load()?.github)
    }

    /// Replace the publishing credentials, keeping other sections.
    pub fn save_github(&self, github: GithubSettings) -> SettingsResult<()> {
        let _guard = self.lock.lock();
        let mut settings = self.load_unlocked()?;
        settings.github = github;
        self.write_unlocked(&settings)?;
        info!(path = %self.path.display(), "github settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn github() -> GithubSettings {
        GithubSettings {
            username: "writer".into(),
            token: "ghp_secret".into(),
            email: "writer@example.org".into(),
            repository: "https://github.com/writer/writer.github.io.git".into(),
        }
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.toml"));
        assert_eq!(store.load().unwrap(), Settings::default());
        assert!(!store.github().unwrap().is_complete());
    }

    #[test]
    fn test_save_and_reload_github() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let store = SettingsStore::new(&path);

        store.save_github(github()).unwrap();

        let reopened = SettingsStore::new(&path);
        let loaded = reopened.github().unwrap();
        assert_eq!(loaded, github());
        assert!(loaded.is_complete());
    }

    #[test]
    fn test_debug_hides_token() {
        let printed = format!("{:?}", github());
        assert!(!printed.contains("ghp_secret"));
        assert!(printed.contains("writer@example.org"));
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[github\nusername=").unwrap();
        let store = SettingsStore::new(&path);
        assert!(matches!(store.load(), Err(SettingsError::Parse(_))));
    }
}
