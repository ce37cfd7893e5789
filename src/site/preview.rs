//! Supervised handle over a running preview server.

use std::io;
use std::process::Child;

use tracing::{debug, info};

/// A background preview process.
///
/// Starting a preview does not wait for it; this handle lets the owner ask
/// whether it is still alive and stop it. Dropping the handle leaves the
/// process running.
#[derive(Debug)]
pub struct PreviewServer {
    child: Child,
    command: String,
}

impl PreviewServer {
    pub(crate) fn new(child: Child, command: String) -> Self {
        info!(pid = child.id(), %command, "preview started");
        Self { child, command }
    }

    /// OS process id.
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Check whether the process has not exited yet.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Terminate the process and reap it.
    pub fn stop(mut self) -> io::Result<()> {
        if self.is_running() {
            self.child.kill()?;
        }
        let status = self.child.wait()?;
        debug!(pid = self.child.id(), ?status, "preview stopped");
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn test_stop_running_process() {
        let child = Command::new("sleep").arg("30").spawn().unwrap();
        let mut server = PreviewServer::new(child, "sleep 30".into());
        assert!(server.is_running());
        assert_eq!(server.command(), "sleep 30");
        server.stop().unwrap();
    }

    #[test]
    fn test_stop_exited_process() {
        let mut child = Command::new("true").spawn().unwrap();
        child.wait().unwrap();
        let mut server = PreviewServer::new(child, "true".into());
        assert!(!server.is_running());
        server.stop().unwrap();
    }
}
