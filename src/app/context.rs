//! Application paths and the long-lived components built from them.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::app::error::AppResult;
use crate::config::AppConfig;
use crate::content::DocumentStore;
use crate::deploy::DeployPipeline;
use crate::index::ArticleIndex;
use crate::settings::SettingsStore;
use crate::site::{Hugo, SiteGenerator, SiteLayout};

/// Every location the application reads or writes, fixed at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub home: PathBuf,
    /// SQLite index file
    pub db: PathBuf,
    pub config: PathBuf,
    pub settings: PathBuf,
    pub site: SiteLayout,
}

impl AppPaths {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            db: home.join("db"),
            config: AppConfig::config_path(&home),
            settings: home.join("settings.toml"),
            site: SiteLayout::new(home.join("site")),
            home,
        }
    }
}

/// Components shared by every operation. Built once; dropping it closes
/// the index connection.
pub struct AppContext {
    paths: AppPaths,
    config: AppConfig,
    store: DocumentStore,
    settings: SettingsStore,
    hugo: Hugo,
    pipeline: DeployPipeline,
}

impl AppContext {
    /// Build the context with Hugo as the site generator.
    pub fn open(home: impl Into<PathBuf>, config: AppConfig) -> AppResult<Self> {
        let paths = AppPaths::new(home);
        let hugo = Hugo::new(
            config.resolve_hugo_bin(&paths.home),
            paths.home.clone(),
            paths.site.clone(),
        );
        let generator: Arc<dyn SiteGenerator> = Arc::new(hugo.clone());
        Self::build(paths, config, hugo, generator)
    }

    /// Build the context with a custom generator for deployments.
    pub fn with_generator(
        home: impl Into<PathBuf>,
        config: AppConfig,
        generator: Arc<dyn SiteGenerator>,
    ) -> AppResult<Self> {
        let paths = AppPaths::new(home);
        let hugo = Hugo::new(
            config.resolve_hugo_bin(&paths.home),
            paths.home.clone(),
            paths.site.clone(),
        );
        Self::build(paths, config, hugo, generator)
    }

    fn build(
        paths: AppPaths,
        config: AppConfig,
        hugo: Hugo,
        generator: Arc<dyn SiteGenerator>,
    ) -> AppResult<Self> {
        fs::create_dir_all(&paths.home)?;
        let index = ArticleIndex::open(&paths.db)?;
        let store = DocumentStore::new(index, paths.site.clone());
        let settings = SettingsStore::new(&paths.settings);
        let pipeline = DeployPipeline::new(generator);

        info!(home = %paths.home.display(), "application context ready");
        Ok(Self {
            paths,
            config,
            store,
            settings,
            hugo,
            pipeline,
        })
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    pub fn home(&self) -> &Path {
        &self.paths.home
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn hugo(&self) -> &Hugo {
        &self.hugo
    }

    pub fn pipeline(&self) -> &DeployPipeline {
        &self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_layout() {
        let paths = AppPaths::new("/data/swallow");
        assert_eq!(paths.db, PathBuf::from("/data/swallow/db"));
        assert_eq!(paths.config, PathBuf::from("/data/swallow/config.toml"));
        assert_eq!(paths.settings, PathBuf::from("/data/swallow/settings.toml"));
        assert_eq!(paths.site.root(), Path::new("/data/swallow/site"));
    }

    #[test]
    fn test_open_creates_home_and_index() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let ctx = AppContext::open(&home, AppConfig::default()).unwrap();
        assert!(home.join("db").exists());
        assert_eq!(ctx.store().index().count().unwrap(), 0);
        assert_eq!(ctx.hugo().layout(), &ctx.paths().site);
    }
}
