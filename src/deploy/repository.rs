//! The publish repository living inside the generated output directory.
//!
//! Every operation here maps onto one stage of the deployment sequence and
//! reports failures as plain `git2::Error`s; the pipeline tags them with
//! the stage that produced them.

use std::path::{Path, PathBuf};

use git2::{Cred, ErrorCode, IndexAddOption, PushOptions, RemoteCallbacks, Repository};
use tracing::debug;

use crate::deploy::commit::{self, CommitBuilder, CommitInfo};
use crate::deploy::types::{BasicAuth, CommitId, GitSignature};

/// How `set_remote` changed the remote configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteUpdate {
    Created,
    Updated,
    Unchanged,
}

/// A git repository rooted at the generated site output.
pub struct PublishRepo {
    repo: Repository,
    path: PathBuf,
}

impl PublishRepo {
    /// Open the repository at `path`, initializing it when there is none.
    pub fn open_or_init(path: impl AsRef<Path>) -> Result<Self, git2::Error> {
        let path = path.as_ref();
        let repo = if path.join(".git").exists() {
            Repository::open(path)?
        } else {
            debug!(path = %path.display(), "initializing publish repository");
            Repository::init(path)?
        };

        Ok(Self {
            repo,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stage every file of the working tree, including deletions.
    pub fn stage_all(&self) -> Result<(), git2::Error> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()
    }

    /// The commit HEAD points at, or `None` on an unborn branch.
    pub fn head(&self) -> Result<Option<CommitId>, git2::Error> {
        match self.repo.head() {
            Ok(reference) => Ok(Some(CommitId::new(reference.peel_to_commit()?.id()))),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Commit the staged index on top of HEAD. Empty commits are allowed.
    pub fn commit(&self, author: &GitSignature, message: &str) -> Result<CommitId, git2::Error> {
        let tree_id = self.repo.index()?.write_tree()?;

        let mut builder = CommitBuilder::new(&self.repo)
            .tree(tree_id)
            .message(message)
            .signature(author.clone())
            .update_ref("HEAD");
        if let Some(parent) = self.head()? {
            builder = builder.parent(parent);
        }

        builder.commit()
    }

    pub fn commit_info(&self, id: CommitId) -> Result<CommitInfo, git2::Error> {
        commit::get_commit(&self.repo, id)
    }

    /// Point `name` at `url`, creating the remote if needed.
    pub fn set_remote(&self, name: &str, url: &str) -> Result<RemoteUpdate, git2::Error> {
        match self.repo.find_remote(name) {
            Ok(remote) if remote.url() == Some(url) => Ok(RemoteUpdate::Unchanged),
            Ok(_) => {
                self.repo.remote_set_url(name, url)?;
                Ok(RemoteUpdate::Updated)
            }
            Err(e) if e.code() == ErrorCode::NotFound => {
                self.repo.remote(name, url)?;
                Ok(RemoteUpdate::Created)
            }
            Err(e) => Err(e),
        }
    }

    /// Short name of the branch HEAD refers to, born or not.
    pub fn current_branch(&self) -> Result<String, git2::Error> {
        let head = self.repo.find_reference("HEAD")?;
        let target = match head.symbolic_target() {
            Some(target) => target.to_string(),
            None => return Err(git2::Error::from_str("HEAD is detached")),
        };
        Ok(target
            .strip_prefix("refs/heads/")
            .unwrap_or(&target)
            .to_string())
    }

    /// Force-push the current branch to `remote`, returning the refspec used.
    ///
    /// Credentials are offered once; a second request from the transport
    /// means they were refused. A ref rejected by the server fails the push.
    pub fn force_push(&self, remote: &str, auth: &BasicAuth) -> Result<String, git2::Error> {
        let branch = self.current_branch()?;
        let refspec = format!("+refs/heads/{branch}:refs/heads/{branch}");

        let mut attempts = 0u32;
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |_url, _username, _allowed| {
            attempts += 1;
            if attempts > 1 {
                return Err(git2::Error::new(
                    ErrorCode::Auth,
                    git2::ErrorClass::Http,
                    "credentials rejected",
                ));
            }
            Cred::userpass_plaintext(&auth.username, &auth.password)
        });
        callbacks.push_update_reference(|refname, status| match status {
            Some(message) => Err(git2::Error::from_str(&format!(
                "remote rejected {refname}: {message}"
            ))),
            None => Ok(()),
        });

        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);

        let mut remote = self.repo.find_remote(remote)?;
        remote.push(&[refspec.as_str()], Some(&mut options))?;
        Ok(refspec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PublishRepo) {
        let dir = TempDir::new().unwrap();
        let repo = PublishRepo::open_or_init(dir.path()).unwrap();
        (dir, repo)
    }

    fn author() -> GitSignature {
        GitSignature::new("writer", "writer@example.org")
    }

    #[test]
    fn test_open_or_init_reuses_existing() {
        let (dir, repo) = setup();
        fs::write(dir.path().join("index.html"), "hi").unwrap();
        repo.stage_all().unwrap();
        let first = repo.commit(&author(), "deploy").unwrap();

        let reopened = PublishRepo::open_or_init(dir.path()).unwrap();
        assert_eq!(reopened.head().unwrap(), Some(first));
    }

    #[test]
    fn test_commit_chain_and_empty_commit() {
        let (dir, repo) = setup();
        assert_eq!(repo.head().unwrap(), None);

        fs::write(dir.path().join("index.html"), "hi").unwrap();
        repo.stage_all().unwrap();
        let first = repo.commit(&author(), "deploy").unwrap();
        assert!(repo.commit_info(first).unwrap().parent_ids.is_empty());

        repo.stage_all().unwrap();
        let second = repo.commit(&author(), "deploy").unwrap();
        let info = repo.commit_info(second).unwrap();
        assert_eq!(info.first_parent(), Some(first));
        assert_eq!(info.author_name, "writer");
    }

    #[test]
    fn test_stage_all_records_deletions() {
        let (dir, repo) = setup();
        fs::write(dir.path().join("a.html"), "a").unwrap();
        fs::write(dir.path().join("b.html"), "b").unwrap();
        repo.stage_all().unwrap();
        repo.commit(&author(), "deploy").unwrap();

        fs::remove_file(dir.path().join("b.html")).unwrap();
        repo.stage_all().unwrap();
        let id = repo.commit(&author(), "deploy").unwrap();

        let commit = repo.repo.find_commit(id.raw()).unwrap();
        let tree = commit.tree().unwrap();
        assert!(tree.get_name("a.html").is_some());
        assert!(tree.get_name("b.html").is_none());
    }

    #[test]
    fn test_set_remote_transitions() {
        let (_dir, repo) = setup();
        assert_eq!(
            repo.set_remote("origin", "https://example.org/a.git").unwrap(),
            RemoteUpdate::Created
        );
        assert_eq!(
            repo.set_remote("origin", "https://example.org/a.git").unwrap(),
            RemoteUpdate::Unchanged
        );
        assert_eq!(
            repo.set_remote("origin", "https://example.org/b.git").unwrap(),
            RemoteUpdate::Updated
        );
        let remote = repo.repo.find_remote("origin").unwrap();
        assert_eq!(remote.url(), Some("https://example.org/b.git"));
    }

    #[test]
    fn test_force_push_to_bare_remote() {
        let (dir, repo) = setup();
        let remote_dir = TempDir::new().unwrap();
        let bare = Repository::init_bare(remote_dir.path()).unwrap();

        fs::write(dir.path().join("index.html"), "hi").unwrap();
        repo.stage_all().unwrap();
        let id = repo.commit(&author(), "deploy").unwrap();

        let url = remote_dir.path().to_str().unwrap();
        repo.set_remote("origin", url).unwrap();
        let auth = BasicAuth {
            username: "writer".into(),
            password: "token".into(),
        };
        let refspec = repo.force_push("origin", &auth).unwrap();

        let branch = repo.current_branch().unwrap();
        assert_eq!(refspec, format!("+refs/heads/{branch}:refs/heads/{branch}"));
        let pushed = bare
            .find_reference(&format!("refs/heads/{branch}"))
            .unwrap()
            .target()
            .unwrap();
        assert_eq!(pushed, id.raw());
    }
}
