//! Backend subprocess supervision.
//!
//! The host owns the backend server process. Stdout and stderr are captured
//! line by line and handed to a sink; the debug console records them and the
//! bridge pushes them to subscribed panels.

use crate::error::{Result, ShellError};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Which pipe a captured line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

pub type LineSink = Arc<dyn Fn(OutputStream, String) + Send + Sync>;

/// Owns at most one running child at a time.
pub struct Supervisor {
    name: String,
    child: Mutex<Option<Child>>,
}

impl Supervisor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            child: Mutex::new(None),
        }
    }

    /// Spawn the child with piped output, streaming each line to `sink`.
    ///
    /// Fails if a child is already running.
    pub async fn start(&self, mut command: Command, sink: LineSink) -> Result<()> {
        let mut guard = self.child.lock().await;
        if let Some(child) = guard.as_mut() {
            if child.try_wait().map_err(ShellError::from)?.is_none() {
                return Err(ShellError::Process {
                    name: self.name.clone(),
                    message: "already running".to_string(),
                });
            }
        }

        command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| ShellError::Process {
            name: self.name.clone(),
            message: format!("spawn failed: {}", e),
        })?;

        if let Some(stdout) = child.stdout.take() {
            let sink = Arc::clone(&sink);
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    sink(OutputStream::Stdout, line);
                }
            });
        }
        if let Some(stderr) = child.stderr.take() {
            let sink = Arc::clone(&sink);
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    sink(OutputStream::Stderr, line);
                }
            });
        }

        info!("{} started (pid {:?})", self.name, child.id());
        *guard = Some(child);
        Ok(())
    }

    /// Kill the child if it is still running. Returns whether one was killed.
    pub async fn stop(&self) -> Result<bool> {
        let mut guard = self.child.lock().await;
        match guard.take() {
            Some(mut child) => {
                if child.try_wait().map_err(ShellError::from)?.is_some() {
                    return Ok(false);
                }
                if let Err(e) = child.kill().await {
                    warn!("failed to kill {}: {}", self.name, e);
                }
                let _ = child.wait().await;
                info!("{} stopped", self.name);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn is_running(&self) -> bool {
        let mut guard = self.child.lock().await;
        match guard.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_both_streams() {
        let supervisor = Supervisor::new("test");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink: LineSink = Arc::new(move |stream, line| {
            let _ = tx.send((stream, line));
        });

        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo out-line; echo err-line >&2");
        supervisor.start(cmd, sink).await.unwrap();

        let mut seen = Vec::new();
        for _ in 0..2 {
            let item = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
                .await
                .expect("timed out waiting for output")
                .expect("sink closed");
            seen.push(item);
        }
        assert!(seen
            .iter()
            .any(|(s, l)| *s == OutputStream::Stdout && l == "out-line"));
        assert!(seen
            .iter()
            .any(|(s, l)| *s == OutputStream::Stderr && l == "err-line"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_kills_running_child() {
        let supervisor = Supervisor::new("test");
        let sink: LineSink = Arc::new(|_, _| {});

        let mut cmd = Command::new("sleep");
        cmd.arg("30");
        supervisor.start(cmd, sink).await.unwrap();
        assert!(supervisor.is_running().await);

        assert!(supervisor.stop().await.unwrap());
        assert!(!supervisor.is_running().await);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let supervisor = Supervisor::new("test");
        assert!(!supervisor.stop().await.unwrap());
    }
}
