//! Debug console: output capture, log export, connection watching.

use crate::config::{BackendConfig, DebugConfig};
use crate::error::{Result, ShellError};
use crate::state::ShellState;
use gangway_bridge::{channel, ConnectionStatus, ExportLogsRequest, LogExportKind};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Ring buffers of captured output, one per stream kind.
///
/// Capture is off until the panel asks for it; lines arriving while capture
/// is off are dropped, not queued.
pub struct DebugConsole {
    capturing: AtomicBool,
    /// Bumped on every start; lets a watcher from a previous capture run
    /// notice it has been superseded.
    epoch: AtomicU64,
    backend_lines: Mutex<VecDeque<String>>,
    worker_lines: Mutex<VecDeque<String>>,
}

impl DebugConsole {
    pub fn new() -> Self {
        Self {
            capturing: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            backend_lines: Mutex::new(VecDeque::new()),
            worker_lines: Mutex::new(VecDeque::new()),
        }
    }

    /// Begin a capture run. Returns its epoch for [`run_is_current`](Self::run_is_current).
    pub fn start(&self) -> u64 {
        self.capturing.store(true, Ordering::SeqCst);
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn stop(&self) {
        self.capturing.store(false, Ordering::SeqCst);
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    /// Whether the capture run identified by `epoch` is still the live one.
    pub fn run_is_current(&self, epoch: u64) -> bool {
        self.is_capturing() && self.epoch.load(Ordering::SeqCst) == epoch
    }

    pub fn record_backend(&self, line: &str) {
        if self.is_capturing() {
            push_capped(&self.backend_lines, line);
        }
    }

    pub fn record_worker(&self, line: &str) {
        if self.is_capturing() {
            push_capped(&self.worker_lines, line);
        }
    }

    pub fn clear(&self) {
        self.backend_lines.lock().expect("console lock").clear();
        self.worker_lines.lock().expect("console lock").clear();
    }

    /// Captured lines for one export kind, newline-joined.
    pub fn snapshot(&self, kind: LogExportKind) -> String {
        let backend = self.backend_lines.lock().expect("console lock");
        let workers = self.worker_lines.lock().expect("console lock");
        match kind {
            LogExportKind::Backend => backend.iter().cloned().collect::<Vec<_>>().join("\n"),
            LogExportKind::Workers => workers.iter().cloned().collect::<Vec<_>>().join("\n"),
            LogExportKind::All => {
                let mut all: Vec<String> = backend.iter().cloned().collect();
                all.extend(workers.iter().cloned());
                all.join("\n")
            }
        }
    }
}

impl Default for DebugConsole {
    fn default() -> Self {
        Self::new()
    }
}

fn push_capped(buffer: &Mutex<VecDeque<String>>, line: &str) {
    let mut lines = buffer.lock().expect("console lock");
    if lines.len() >= DebugConfig::MAX_CAPTURED_LINES {
        lines.pop_front();
    }
    lines.push_back(line.to_string());
}

/// Start capturing and spawn the backend connection watcher.
pub fn start_capture(state: Arc<ShellState>) {
    if state.console.is_capturing() {
        debug!("debug capture already running");
        return;
    }
    let epoch = state.console.start();
    state
        .sink
        .publish(channel::DEBUG_CONNECTION_STATUS, &ConnectionStatus::Connecting);
    tokio::spawn(watch_connection(state, epoch));
}

pub fn stop_capture(state: &ShellState) {
    state.console.stop();
}

pub fn clear_capture(state: &ShellState) {
    state.console.clear();
}

/// Poll the backend health endpoint while its capture run is live, pushing
/// the connection status whenever it changes. A stop/start cycle bumps the
/// epoch, so a watcher that wakes after a restart exits instead of running
/// alongside its replacement.
async fn watch_connection(state: Arc<ShellState>, epoch: u64) {
    let url = format!("{}{}", state.backend_base_url, BackendConfig::HEALTH_PATH);
    let mut last = ConnectionStatus::Connecting;
    while state.console.run_is_current(epoch) {
        let healthy = matches!(
            tokio::time::timeout(
                BackendConfig::HEALTH_REQUEST_TIMEOUT,
                state.http.get(&url).send(),
            )
            .await,
            Ok(Ok(resp)) if resp.status().is_success()
        );
        let current = if healthy {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        };
        if current != last {
            state.sink.publish(channel::DEBUG_CONNECTION_STATUS, &current);
            last = current;
        }
        tokio::time::sleep(BackendConfig::HEALTH_POLL_INTERVAL).await;
    }
    debug!("connection watcher stopped");
}

/// Write the panel-provided log text to a timestamped file under the logs
/// directory. Returns the written path.
pub async fn export_logs(state: &ShellState, req: &ExportLogsRequest) -> Result<PathBuf> {
    let logs_dir = state.logs_dir();
    tokio::fs::create_dir_all(&logs_dir)
        .await
        .map_err(|e| ShellError::io_with_path(e, &logs_dir))?;

    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let path = logs_dir.join(format!("gangway-{}-{}.log", req.kind.as_str(), stamp));
    tokio::fs::write(&path, &req.data)
        .await
        .map_err(|e| ShellError::io_with_path(e, &path))?;

    info!("exported {} logs to {}", req.kind.as_str(), path.display());
    Ok(path)
}

/// Notify-shape wrapper used by the dispatcher: failures are logged, never
/// surfaced to the caller.
pub fn spawn_export(state: Arc<ShellState>, req: ExportLogsRequest) {
    tokio::spawn(async move {
        if let Err(e) = export_logs(&state, &req).await {
            warn!("log export failed: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_gated_on_start() {
        let console = DebugConsole::new();
        console.record_backend("dropped");
        console.start();
        console.record_backend("kept");
        console.record_worker("worker kept");

        assert_eq!(console.snapshot(LogExportKind::Backend), "kept");
        assert_eq!(console.snapshot(LogExportKind::Workers), "worker kept");
        assert_eq!(console.snapshot(LogExportKind::All), "kept\nworker kept");
    }

    #[test]
    fn test_clear_empties_both_buffers() {
        let console = DebugConsole::new();
        console.start();
        console.record_backend("a");
        console.record_worker("b");
        console.clear();
        assert_eq!(console.snapshot(LogExportKind::All), "");
    }

    #[test]
    fn test_restart_supersedes_previous_capture_run() {
        let console = DebugConsole::new();
        let first = console.start();
        assert!(console.run_is_current(first));

        console.stop();
        assert!(!console.run_is_current(first));

        // A quick restart must not revive the old run.
        let second = console.start();
        assert!(console.run_is_current(second));
        assert!(!console.run_is_current(first));
    }

    #[test]
    fn test_buffer_is_capped() {
        let console = DebugConsole::new();
        console.start();
        for i in 0..(DebugConfig::MAX_CAPTURED_LINES + 10) {
            console.record_backend(&format!("line {}", i));
        }
        let snapshot = console.snapshot(LogExportKind::Backend);
        let lines: Vec<_> = snapshot.lines().collect();
        assert_eq!(lines.len(), DebugConfig::MAX_CAPTURED_LINES);
        assert_eq!(lines[0], "line 10");
    }
}
