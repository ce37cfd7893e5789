//! The caller-facing facade.
//!
//! Each operation runs against the shared [`AppContext`] and returns a
//! [`Response`] envelope. Failures are logged with their full cause and
//! reported as an error envelope; nothing here panics or retries.

use std::path::Path;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::app::context::AppContext;
use crate::app::error::{AppError, AppResult};
use crate::app::response::Response;
use crate::content::{ArticleId, Metadata};
use crate::deploy::DeployError;
use crate::settings::GithubSettings;
use crate::site::{replace_asset, update_site_config, PreviewServer, SiteConfig, SiteConfigPatch};

pub struct App {
    ctx: AppContext,
    preview: Mutex<Option<PreviewServer>>,
}

impl App {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            preview: Mutex::new(None),
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Create the site tree through the generator if it does not exist yet.
    /// `data` is `true` when a new site was created.
    pub fn site_init(&self) -> Response {
        respond("site init", self.ctx.hugo().new_site())
    }

    pub fn article_list(&self, search: &str) -> Response {
        respond("article list", self.ctx.store().list(search))
    }

    /// Save an article. An empty `aid` creates a new post; `data` is the
    /// resolved id.
    pub fn article_save(&self, aid: &str, meta: Metadata, content: &str) -> Response {
        let result = parse_optional_id(aid)
            .and_then(|id| Ok(self.ctx.store().save(id, meta, content)?));
        respond("article save", result)
    }

    /// `data` is `{ meta, content }`.
    pub fn article_get(&self, aid: &str) -> Response {
        let result = parse_id(aid).and_then(|id| Ok(self.ctx.store().read(id)?));
        respond("article get", result)
    }

    /// Remove several articles. Every id is validated before anything is
    /// deleted.
    pub fn article_remove(&self, aids: &[String]) -> Response {
        let result = aids
            .iter()
            .map(|aid| parse_id(aid))
            .collect::<AppResult<Vec<_>>>()
            .and_then(|ids| Ok(self.ctx.store().remove(&ids)?));
        respond("article remove", result)
    }

    /// Copy an image file into the article's image directory. `data` is the
    /// site path to embed.
    pub fn article_insert_image(&self, aid: &str, source: &Path) -> Response {
        let result = parse_id(aid).and_then(|id| Ok(self.ctx.store().attach_image(id, source)?));
        respond("article insert image", result)
    }

    pub fn article_insert_image_bytes(&self, aid: &str, bytes: &[u8]) -> Response {
        let result =
            parse_id(aid).and_then(|id| Ok(self.ctx.store().attach_image_bytes(id, bytes)?));
        respond("article insert image bytes", result)
    }

    /// Start the live preview, replacing any running one, and open the
    /// browser on it when configured to.
    pub fn site_preview(&self) -> Response {
        respond("site preview", self.start_preview())
    }

    fn start_preview(&self) -> AppResult<Value> {
        let mut slot = self.preview.lock();
        if let Some(previous) = slot.take() {
            info!(pid = previous.pid(), "stopping previous preview");
            if let Err(e) = previous.stop() {
                warn!(error = %e, "cannot stop previous preview");
            }
        }

        let server = self.ctx.hugo().preview()?;
        let pid = server.pid();
        *slot = Some(server);

        let url = &self.ctx.config().preview_url;
        if self.ctx.config().open_browser {
            if let Err(e) = open::that(url) {
                warn!(%url, error = %e, "cannot open browser");
            }
        }
        Ok(json!({ "pid": pid, "url": url }))
    }

    /// Stop the running preview.
    pub fn close_preview(&self) -> Response {
        let result = match self.preview.lock().take() {
            Some(server) => server.stop().map_err(AppError::from),
            None => Err(AppError::NoPreview),
        };
        respond("close preview", result)
    }

    /// Check whether the preview started by this facade is still alive.
    pub fn preview_running(&self) -> bool {
        self.preview
            .lock()
            .as_mut()
            .map(PreviewServer::is_running)
            .unwrap_or(false)
    }

    /// Generate and publish the site. `data` is the deploy report.
    pub fn site_deploy(&self) -> Response {
        respond("site deploy", self.deploy())
    }

    fn deploy(&self) -> AppResult<crate::deploy::DeployReport> {
        let github = self.ctx.settings().github()?;
        if !github.is_complete() {
            return Err(AppError::IncompleteSettings);
        }
        self.ctx.pipeline().run(&github).map_err(deploy_error)
    }

    pub fn site_config_get(&self) -> Response {
        let result = SiteConfig::load(&self.ctx.paths().site.config_file());
        respond("site config get", result)
    }

    /// Merge the patch into the site configuration; `data` is the result.
    pub fn site_config_save(&self, patch: SiteConfigPatch) -> Response {
        let result = update_site_config(&self.ctx.paths().site.config_file(), patch);
        respond("site config save", result)
    }

    /// Replace a site image such as the logo or favicon.
    pub fn select_conf_image(&self, relative: &str, source: &Path) -> Response {
        let result = replace_asset(&self.ctx.paths().site, relative, source);
        respond("select conf image", result)
    }

    pub fn conf_get_github(&self) -> Response {
        respond("conf get github", self.ctx.settings().github())
    }

    pub fn conf_save_github(&self, github: GithubSettings) -> Response {
        respond("conf save github", self.ctx.settings().save_github(github))
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(server) = self.preview.get_mut().take() {
            if let Err(e) = server.stop() {
                warn!(error = %e, "cannot stop preview on shutdown");
            }
        }
    }
}

fn deploy_error(e: DeployError) -> AppError {
    if e.is_auth() {
        AppError::CredentialsRejected(e)
    } else {
        AppError::Deploy(e)
    }
}

/// `""` means "new article".
fn parse_optional_id(aid: &str) -> AppResult<Option<ArticleId>> {
    if aid.trim().is_empty() {
        Ok(None)
    } else {
        parse_id(aid).map(Some)
    }
}

fn parse_id(aid: &str) -> AppResult<ArticleId> {
    Ok(aid.parse::<ArticleId>()?)
}

/// Turn an operation result into an envelope, logging failures.
fn respond<T, E>(op: &str, result: Result<T, E>) -> Response
where
    T: Serialize,
    AppError: From<E>,
{
    let data = result
        .map_err(AppError::from)
        .and_then(|data| Ok(serde_json::to_value(data)?));
    match data {
        Ok(data) => Response::success(data),
        Err(e) => {
            error!(op, error = %e, "operation failed");
            Response::error(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use crate::config::AppConfig;
    use crate::deploy::DeployStage;

    fn setup() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let config = AppConfig {
            hugo_bin: "swallow-test-missing-generator".into(),
            open_browser: false,
            ..AppConfig::default()
        };
        let ctx = AppContext::open(dir.path(), config).unwrap();
        (dir, App::new(ctx))
    }

    fn meta(title: &str, tags: &[&str]) -> Metadata {
        Metadata {
            title: title.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            description: "hello".into(),
            date: "2024-01-01 10:00:00".into(),
            lastmod: String::new(),
        }
    }

    #[test]
    fn test_save_then_get() {
        let (_dir, app) = setup();
        let saved = app.article_save("", meta("First Post", &["a", "b"]), "body\n");
        assert!(saved.is_success());
        let id = saved.data.as_str().unwrap().to_string();

        let got = app.article_get(&id);
        assert!(got.is_success());
        assert_eq!(got.data["meta"]["title"], json!("First Post"));
        assert_eq!(got.data["meta"]["tags"], json!(["a", "b"]));
        assert_eq!(got.data["content"], json!("body\n"));

        let listed = app.article_list("First");
        assert_eq!(listed.data.as_array().unwrap().len(), 1);
        assert_eq!(listed.data[0]["tags"], json!("a,b"));
        assert_eq!(listed.data[0]["createTime"], json!("2024-01-01 10:00:00"));
    }

    #[test]
    fn test_invalid_id_is_error_envelope() {
        let (_dir, app) = setup();
        let resp = app.article_get("../../etc/passwd");
        assert!(!resp.is_success());
        assert_eq!(resp.data, Value::Null);

        let resp = app.article_remove(&["1".into(), "x".into()]);
        assert!(!resp.is_success());
    }

    #[test]
    fn test_remove_validates_all_ids_first() {
        let (_dir, app) = setup();
        let id = app.article_save("", meta("Keep", &[]), "x").data;
        let id = id.as_str().unwrap().to_string();

        let resp = app.article_remove(&[id.clone(), "bogus".into()]);
        assert!(!resp.is_success());
        assert!(app.article_get(&id).is_success());

        let resp = app.article_remove(&[id.clone()]);
        assert!(resp.is_success());
        assert_eq!(resp.data, json!(1));
        assert!(!app.article_get(&id).is_success());
    }

    #[test]
    fn test_missing_article() {
        let (_dir, app) = setup();
        let resp = app.article_get("42");
        assert!(!resp.is_success());
        assert!(resp.msg.contains("not found"));
    }

    #[test]
    fn test_deploy_requires_complete_settings() {
        let (_dir, app) = setup();
        let resp = app.site_deploy();
        assert!(!resp.is_success());
        assert_eq!(resp.msg, "github settings are incomplete");
    }

    #[test]
    fn test_github_settings_round_trip() {
        let (_dir, app) = setup();
        let github = GithubSettings {
            username: "writer".into(),
            token: "t0k3n".into(),
            email: "writer@example.org".into(),
            repository: "https://example.org/site.git".into(),
        };
        assert!(app.conf_save_github(github).is_success());

        let resp = app.conf_get_github();
        assert_eq!(resp.data["username"], json!("writer"));
        assert_eq!(resp.data["repository"], json!("https://example.org/site.git"));
    }

    #[test]
    fn test_site_config_patch() {
        let (dir, app) = setup();
        let site = dir.path().join("site");
        fs::create_dir_all(&site).unwrap();
        fs::write(
            site.join("hugo.toml"),
            "title = \"Old\"\nbaseURL = \"https://example.org/\"\n",
        )
        .unwrap();

        let patch = SiteConfigPatch {
            title: Some("New".into()),
            ..SiteConfigPatch::default()
        };
        assert!(app.site_config_save(patch).is_success());

        let resp = app.site_config_get();
        assert_eq!(resp.data["title"], json!("New"));
        assert_eq!(resp.data["baseURL"], json!("https://example.org/"));
    }

    #[test]
    fn test_preview_without_generator_fails() {
        let (_dir, app) = setup();
        assert!(!app.site_preview().is_success());
        assert!(!app.preview_running());
        assert!(!app.close_preview().is_success());
    }

    #[test]
    fn test_insert_image_bytes() {
        let (_dir, app) = setup();
        let resp = app.article_insert_image_bytes("5", &[0x89, b'P', b'N', b'G']);
        assert!(resp.is_success());
        assert!(resp.data.as_str().unwrap().starts_with("/static/images/5/"));
    }

    #[test]
    fn test_rejected_credentials_get_their_own_message() {
        let refused = git2::Error::new(
            git2::ErrorCode::Auth,
            git2::ErrorClass::Http,
            "credentials rejected",
        );
        let err = deploy_error(DeployError::git(DeployStage::Push, refused));
        assert!(matches!(err, AppError::CredentialsRejected(_)));
        assert!(err.to_string().contains("check username and token"));

        let hung_up = git2::Error::from_str("remote hung up");
        let err = deploy_error(DeployError::git(DeployStage::Push, hung_up));
        assert!(matches!(err, AppError::Deploy(_)));
    }
}
