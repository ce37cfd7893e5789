//! The external static-site generator, driven as a subprocess.
//!
//! The generator is opaque: it is run with a working directory and an
//! argument list and judged by its exit status.
//!
//! | operation  | working dir | arguments           |
//! |------------|-------------|---------------------|
//! | new site   | app home    | `new site <path>`   |
//! | generate   | site        | (none)              |
//! | preview    | site        | `server`            |

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, error, info};

use crate::content::ArticleId;
use crate::site::error::{GeneratorError, GeneratorResult};
use crate::site::layout::SiteLayout;
use crate::site::preview::PreviewServer;

/// Anything that can turn the content tree into a publishable directory.
pub trait SiteGenerator: Send + Sync {
    /// Build the site. Must fail when the build did not succeed.
    fn generate(&self) -> GeneratorResult<()>;

    /// Directory holding the generated output.
    fn output_dir(&self) -> PathBuf;
}

/// A Hugo installation bound to one site directory.
#[derive(Debug, Clone)]
pub struct Hugo {
    binary: PathBuf,
    home: PathBuf,
    layout: SiteLayout,
}

impl Hugo {
    /// `binary` is the generator executable; `home` is the working
    /// directory used when creating the site.
    pub fn new(binary: impl Into<PathBuf>, home: impl Into<PathBuf>, layout: SiteLayout) -> Self {
        Self {
            binary: binary.into(),
            home: home.into(),
            layout,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    fn command(&self, dir: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args).current_dir(dir);
        cmd
    }

    fn describe(&self, args: &[&str]) -> String {
        let mut parts = vec![self.binary.display().to_string()];
        parts.extend(args.iter().map(|a| a.to_string()));
        parts.join(" ")
    }

    /// Run to completion; a non-zero exit is a build error.
    fn run(&self, dir: &Path, args: &[&str]) -> GeneratorResult<()> {
        let command = self.describe(args);
        info!(%command, dir = %dir.display(), "exec generator");

        let output = self
            .command(dir, args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| GeneratorError::Spawn {
                program: self.binary.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(%command, status = ?output.status.code(), %stderr, "generator failed");
            return Err(GeneratorError::Build {
                command,
                code: output.status.code(),
                stderr,
            });
        }

        debug!(%command, stdout = %String::from_utf8_lossy(&output.stdout), "generator done");
        Ok(())
    }

    /// Create the site when it does not exist yet.
    ///
    /// Runs `new site <path>` and lays out the content directories, an empty
    /// about page and an empty `CNAME`. Themes and the configuration template
    /// are provisioned separately. Returns `false` if the site already existed.
    pub fn new_site(&self) -> GeneratorResult<bool> {
        let root = self.layout.root();
        if root.exists() {
            debug!(site = %root.display(), "site exists");
            return Ok(false);
        }

        let site_arg = root.display().to_string();
        self.run(&self.home, &["new", "site", &site_arg])?;

        for dir in [
            self.layout.post_root(),
            self.layout.image_root(),
            self.layout.article_dir(ArticleId::About),
        ] {
            fs::create_dir_all(&dir).map_err(|source| GeneratorError::Io { path: dir, source })?;
        }
        for file in [self.layout.cname_file(), self.layout.article_file(ArticleId::About)] {
            if !file.exists() {
                fs::write(&file, "").map_err(|source| GeneratorError::Io { path: file, source })?;
            }
        }

        info!(site = %root.display(), "new site created");
        Ok(true)
    }

    /// Start the live preview server without waiting for it.
    pub fn preview(&self) -> GeneratorResult<PreviewServer> {
        let args = ["server"];
        let command = self.describe(&args);
        info!(%command, "start preview");

        let child = self
            .command(self.layout.root(), &args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| GeneratorError::Spawn {
                program: self.binary.display().to_string(),
                source,
            })?;

        Ok(PreviewServer::new(child, command))
    }
}

impl SiteGenerator for Hugo {
    fn generate(&self) -> GeneratorResult<()> {
        self.run(self.layout.root(), &[])
    }

    fn output_dir(&self) -> PathBuf {
        self.layout.public_dir()
    }
}
