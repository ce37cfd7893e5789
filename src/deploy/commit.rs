//! Commit creation and inspection for the publish repository.

use chrono::{DateTime, TimeZone, Utc};
use git2::{Oid, Repository};

use crate::deploy::types::{CommitId, GitSignature};

/// Fixed message of every deployment commit.
pub const DEPLOY_MESSAGE: &str = "deploy";

/// information about a commit
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub id: CommitId,
    pub parent_ids: Vec<CommitId>,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    pub(crate) fn from_git2(commit: &git2::Commit<'_>) -> Self {
        let author = commit.author();
        let timestamp = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .unwrap_or_else(Utc::now);

        Self {
            id: CommitId::new(commit.id()),
            parent_ids: commit.parent_ids().map(CommitId::new).collect(),
            message: commit.message().unwrap_or("").to_string(),
            author_name: author.name().unwrap_or("Unknown").to_string(),
            author_email: author.email().unwrap_or("unknown@unknown").to_string(),
            timestamp,
        }
    }

    /// get the first (or only) parent
    pub fn first_parent(&self) -> Option<CommitId> {
        self.parent_ids.first().copied()
    }
}

/// builder for creating commits with a fluent interface
pub struct CommitBuilder<'a> {
    repo: &'a Repository,
    tree_id: Option<Oid>,
    parents: Vec<CommitId>,
    message: String,
    signature: Option<GitSignature>,
    update_ref: Option<String>,
}

impl<'a> CommitBuilder<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self {
            repo,
            tree_id: None,
            parents: Vec::new(),
            message: String::new(),
            signature: None,
            update_ref: None,
        }
    }

    /// set the tree for this commit
    pub fn tree(mut self, tree_id: Oid) -> Self {
        self.tree_id = Some(tree_id);
        self
    }

    /// add a parent commit
    pub fn parent(mut self, parent: CommitId) -> Self {
        self.parents.push(parent);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// set the author/committer signature
    pub fn signature(mut self, signature: GitSignature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// update a ref (branch) to point to this commit
    pub fn update_ref(mut self, refname: impl Into<String>) -> Self {
        self.update_ref = Some(refname.into());
        self
    }

    /// create the commit and return its ID
    pub fn commit(self) -> Result<CommitId, git2::Error> {
        let tree_id = self
            .tree_id
            .ok_or_else(|| git2::Error::from_str("commit requires a tree"))?;
        let signature = self
            .signature
            .ok_or_else(|| git2::Error::from_str("commit requires a signature"))?;

        let tree = self.repo.find_tree(tree_id)?;
        let sig = signature.to_git2_signature()?;

        let parent_commits: Vec<git2::Commit<'_>> = self
            .parents
            .iter()
            .map(|id| self.repo.find_commit(id.raw()))
            .collect::<Result<_, _>>()?;
        let parent_refs: Vec<&git2::Commit<'_>> = parent_commits.iter().collect();

        let oid = self.repo.commit(
            self.update_ref.as_deref(),
            &sig,
            &sig,
            &self.message,
            &tree,
            &parent_refs,
        )?;

        Ok(CommitId::new(oid))
    }
}

/// get information about a commit
pub fn get_commit(repo: &Repository, id: CommitId) -> Result<CommitInfo, git2::Error> {
    let commit = repo.find_commit(id.raw())?;
    Ok(CommitInfo::from_git2(&commit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn empty_tree(repo: &Repository) -> Oid {
        repo.treebuilder(None).unwrap().write().unwrap()
    }

    #[test]
    fn test_commit_builder_chain() {
        let (_dir, repo) = setup_repo();
        let sig = GitSignature::new("writer", "writer@example.org");
        let tree = empty_tree(&repo);

        let first = CommitBuilder::new(&repo)
            .tree(tree)
            .message(DEPLOY_MESSAGE)
            .signature(sig.clone())
            .update_ref("HEAD")
            .commit()
            .unwrap();

        let second = CommitBuilder::new(&repo)
            .tree(tree)
            .parent(first)
            .message(DEPLOY_MESSAGE)
            .signature(sig)
            .update_ref("HEAD")
            .commit()
            .unwrap();

        let info = get_commit(&repo, second).unwrap();
        assert_eq!(info.first_parent(), Some(first));
        assert_eq!(info.message, "deploy");
        assert_eq!(info.author_name, "writer");
        assert_eq!(info.author_email, "writer@example.org");

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.id(), second.raw());
    }

    #[test]
    fn test_commit_requires_tree_and_signature() {
        let (_dir, repo) = setup_repo();
        assert!(CommitBuilder::new(&repo)
            .signature(GitSignature::new("a", "a@b"))
            .commit()
            .is_err());
        let tree = empty_tree(&repo);
        assert!(CommitBuilder::new(&repo).tree(tree).commit().is_err());
    }
}
