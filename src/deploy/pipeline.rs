//! The deployment sequence:
//! `GENERATE → REPO_OPEN → STAGE → COMMIT → REMOTE_SET → PUSH → DONE`.
//!
//! Stages run once each, in order, with no retries and no rollback. A
//! failed push leaves the local commit in place; the next run commits on
//! top of it and pushes everything.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

use crate::deploy::commit::DEPLOY_MESSAGE;
use crate::deploy::error::{DeployError, DeployResult};
use crate::deploy::repository::PublishRepo;
use crate::deploy::types::{BasicAuth, CommitId, DeployStage, GitSignature};
use crate::settings::GithubSettings;
use crate::site::SiteGenerator;

/// Name of the single remote the site is published to.
pub const REMOTE_NAME: &str = "origin";

/// What a successful deployment produced.
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    #[serde(serialize_with = "serialize_commit")]
    pub commit: CommitId,
    pub branch: String,
    pub remote_url: String,
}

fn serialize_commit<S: serde::Serializer>(id: &CommitId, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(id)
}

pub struct DeployPipeline {
    generator: Arc<dyn SiteGenerator>,
    remote_name: String,
    message: String,
    /// held for the whole run; the output directory has one writer
    lock: Mutex<()>,
}

impl DeployPipeline {
    pub fn new(generator: Arc<dyn SiteGenerator>) -> Self {
        Self {
            generator,
            remote_name: REMOTE_NAME.to_string(),
            message: DEPLOY_MESSAGE.to_string(),
            lock: Mutex::new(()),
        }
    }

    /// Run every stage against the given credentials.
    pub fn run(&self, github: &GithubSettings) -> DeployResult<DeployReport> {
        let _guard = self.lock.lock();

        info!(stage = %DeployStage::Generate, "building site");
        self.generator.generate()?;

        let output = self.generator.output_dir();
        info!(stage = %DeployStage::RepoOpen, path = %output.display());
        let repo = PublishRepo::open_or_init(&output)
            .map_err(|e| DeployError::git(DeployStage::RepoOpen, e))?;

        info!(stage = %DeployStage::Stage);
        repo.stage_all()
            .map_err(|e| DeployError::git(DeployStage::Stage, e))?;

        let author = GitSignature::new(&github.username, &github.email);
        let commit = repo
            .commit(&author, &self.message)
            .map_err(|e| DeployError::git(DeployStage::Commit, e))?;
        info!(stage = %DeployStage::Commit, commit = %commit.short());

        match repo.set_remote(&self.remote_name, &github.repository) {
            Ok(update) => info!(stage = %DeployStage::RemoteSet, ?update, remote = %self.remote_name),
            Err(e) => warn!(stage = %DeployStage::RemoteSet, error = %e, "continuing without remote update"),
        }

        let auth = BasicAuth {
            username: github.username.clone(),
            password: github.token.clone(),
        };
        let branch = repo
            .current_branch()
            .map_err(|e| DeployError::git(DeployStage::Push, e))?;
        info!(stage = %DeployStage::Push, branch = %branch);
        repo.force_push(&self.remote_name, &auth)
            .map_err(|e| DeployError::git(DeployStage::Push, e))?;

        info!(stage = %DeployStage::Done, commit = %commit.short(), "site published");
        Ok(DeployReport {
            commit,
            branch,
            remote_url: github.repository.clone(),
        })
    }
}
