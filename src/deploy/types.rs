//! Type-safe wrappers used by the publish sequence.

use std::fmt;

use git2::Oid;

/// A commit in the publish repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommitId(pub(crate) Oid);

impl CommitId {
    pub(crate) fn new(oid: Oid) -> Self {
        Self(oid)
    }

    pub(crate) fn raw(&self) -> Oid {
        self.0
    }

    /// parse CommitId from a hex string
    pub fn from_hex(hex: &str) -> Result<Self, git2::Error> {
        Oid::from_str(hex).map(CommitId)
    }

    /// short form of the commit ID
    pub fn short(&self) -> String {
        self.0.to_string()[..7].to_string()
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// git signature (author/committer info)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSignature {
    pub name: String,
    pub email: String,
}

impl GitSignature {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// convert to a git2 signature stamped with the current time
    pub(crate) fn to_git2_signature(&self) -> Result<git2::Signature<'static>, git2::Error> {
        git2::Signature::now(&self.name, &self.email)
    }
}

/// Basic-auth credentials for the push.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    /// access token or password
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// The stages of a deployment, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeployStage {
    Generate,
    RepoOpen,
    Stage,
    Commit,
    RemoteSet,
    Push,
    Done,
}

impl DeployStage {
    pub const ORDER: [DeployStage; 7] = [
        DeployStage::Generate,
        DeployStage::RepoOpen,
        DeployStage::Stage,
        DeployStage::Commit,
        DeployStage::RemoteSet,
        DeployStage::Push,
        DeployStage::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeployStage::Generate => "GENERATE",
            DeployStage::RepoOpen => "REPO_OPEN",
            DeployStage::Stage => "STAGE",
            DeployStage::Commit => "COMMIT",
            DeployStage::RemoteSet => "REMOTE_SET",
            DeployStage::Push => "PUSH",
            DeployStage::Done => "DONE",
        }
    }
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
