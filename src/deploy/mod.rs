//! Publishing the generated site to a remote git repository.
//!
//! [`DeployPipeline`] drives the whole sequence; [`PublishRepo`] wraps the
//! repository kept inside the generator's output directory.

mod commit;
mod error;
mod pipeline;
mod repository;
mod types;

pub use commit::{CommitBuilder, CommitInfo, DEPLOY_MESSAGE};
pub use error::{DeployError, DeployResult};
pub use pipeline::{DeployPipeline, DeployReport, REMOTE_NAME};
pub use repository::{PublishRepo, RemoteUpdate};
pub use types::{BasicAuth, CommitId, DeployStage, GitSignature};
