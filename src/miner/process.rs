// src/miner/process.rs
//! Supervision of the external miner process

use crate::utils::error::MinerError;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

/// Handle on at most one running miner process
///
/// The child is spawned with `kill_on_drop`, so dropping the handle (for
/// example when a backend instance is replaced) never leaves a miner behind.
#[derive(Debug)]
pub struct MinerProcess {
    /// Executable to launch
    program: PathBuf,
    /// The running child, if any
    child: Mutex<Option<Child>>,
}

impl MinerProcess {
    /// Creates a handle for `program`; nothing is launched yet
    pub fn new(program: impl Into<PathBuf>) -> Self {
        MinerProcess {
            program: program.into(),
            child: Mutex::new(None),
        }
    }

    /// Launches the executable with `args`, from the executable's directory
    ///
    /// The miner's stdio is detached; stdout of this process carries the UI
    /// transport.
    ///
    /// # Errors
    /// Returns `MinerError::Backend` if the process is already running or
    /// cannot be spawned
    pub async fn spawn(&self, args: &[String]) -> Result<(), MinerError> {
        let mut guard = self.child.lock().await;
        if let Some(child) = guard.as_mut() {
            if child.try_wait()?.is_none() {
                return Err(MinerError::Backend(format!(
                    "{} is already running",
                    self.program.display()
                )));
            }
        }

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = self.program.parent() {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|e| {
            MinerError::Backend(format!("failed to launch {}: {}", self.program.display(), e))
        })?;
        log::debug!(
            "Spawned {} with pid {:?}",
            self.program.display(),
            child.id()
        );
        *guard = Some(child);
        Ok(())
    }

    /// Kills the process and waits for it to exit
    ///
    /// Succeeds without doing anything when no process is running.
    pub async fn kill(&self) -> Result<(), MinerError> {
        let Some(mut child) = self.child.lock().await.take() else {
            return Ok(());
        };

        if let Some(status) = child.try_wait()? {
            log::debug!("{} had already exited: {}", self.program.display(), status);
            return Ok(());
        }

        child.kill().await.map_err(|e| {
            MinerError::Backend(format!("failed to kill {}: {}", self.program.display(), e))
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn kill_without_child_is_a_no_op() {
        let process = MinerProcess::new("/bin/sleep");
        process.kill().await.unwrap();
        process.kill().await.unwrap();
    }

    #[tokio::test]
    async fn spawn_then_kill() {
        let process = MinerProcess::new("/bin/sleep");
        process.spawn(&["30".to_string()]).await.unwrap();

        let second = process.spawn(&["30".to_string()]).await;
        assert!(matches!(second, Err(MinerError::Backend(_))));

        process.kill().await.unwrap();
        process.spawn(&["30".to_string()]).await.unwrap();
        process.kill().await.unwrap();
    }

    #[tokio::test]
    async fn spawn_of_missing_program_fails() {
        let process = MinerProcess::new("/nonexistent/xmrig");
        let err = process.spawn(&[]).await.unwrap_err();
        assert!(matches!(err, MinerError::Backend(_)));
    }
}
