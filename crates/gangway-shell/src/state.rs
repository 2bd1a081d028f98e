//! Shared host state.
//!
//! One [`ShellState`] per window, created by the composition root and shared
//! by every handler behind an `Arc`. Holds the install layout, the event
//! sink back to the panels, the download engine, and one cancel slot per
//! cancellable operation.

use crate::backend::Supervisor;
use crate::cancel::CancelToken;
use crate::config::{BackendConfig, DownloadConfig};
use crate::download::DownloadEngine;
use crate::error::Result;
use crate::handlers::debug::DebugConsole;
use crate::interpreter::InterpreterManager;
use gangway_bridge::{channel, BackendStatus, EventSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::debug;

pub struct ShellState {
    root: PathBuf,
    pub sink: EventSink,
    pub status: RwLock<BackendStatus>,
    pub engine: DownloadEngine,
    pub http: reqwest::Client,
    pub backend_base_url: String,
    pub console: Arc<DebugConsole>,
    pub interpreters: InterpreterManager,
    pub backend_process: Supervisor,
    pub worker_process: Supervisor,
    close_window: watch::Sender<bool>,
    download_cancel: Mutex<Option<CancelToken>>,
    probe_cancel: Mutex<Option<CancelToken>>,
    superuser_cancel: Mutex<Option<CancelToken>>,
}

impl ShellState {
    pub fn new(root: PathBuf, sink: EventSink) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DownloadConfig::REQUEST_TIMEOUT)
            .build()?;
        let python_dir = root.join(BackendConfig::PYTHON_DIR_NAME);
        Ok(Self {
            sink,
            status: RwLock::new(BackendStatus::default()),
            engine: DownloadEngine::new()?,
            http,
            backend_base_url: BackendConfig::BASE_URL.to_string(),
            console: Arc::new(DebugConsole::new()),
            interpreters: InterpreterManager::new(Some(python_dir)),
            backend_process: Supervisor::new("backend"),
            worker_process: Supervisor::new("worker"),
            close_window: watch::channel(false).0,
            download_cancel: Mutex::new(None),
            probe_cancel: Mutex::new(None),
            superuser_cancel: Mutex::new(None),
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn backend_dir(&self) -> PathBuf {
        self.root.join(BackendConfig::BACKEND_DIR_NAME)
    }

    pub fn valkey_dir(&self) -> PathBuf {
        self.root.join(BackendConfig::VALKEY_DIR_NAME)
    }

    pub fn python_dir(&self) -> PathBuf {
        self.root.join(BackendConfig::PYTHON_DIR_NAME)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(BackendConfig::LOGS_DIR_NAME)
    }

    /// Update the cached backend status and push the new snapshot to the
    /// status channel.
    pub async fn update_status(&self, apply: impl FnOnce(&mut BackendStatus)) {
        let snapshot = {
            let mut status = self.status.write().await;
            apply(&mut status);
            status.clone()
        };
        self.sink
            .publish(channel::BACKEND_SETUP_STATUS_UPDATE, &snapshot);
    }

    /// Install a fresh cancel token for the download slot, cancelling any
    /// operation already in flight.
    pub async fn begin_download(&self) -> CancelToken {
        Self::replace_token(&self.download_cancel).await
    }

    pub async fn cancel_download(&self) -> bool {
        Self::cancel_slot(&self.download_cancel).await
    }

    pub async fn begin_probe(&self) -> CancelToken {
        Self::replace_token(&self.probe_cancel).await
    }

    pub async fn cancel_probe(&self) -> bool {
        Self::cancel_slot(&self.probe_cancel).await
    }

    pub async fn begin_superuser(&self) -> CancelToken {
        Self::replace_token(&self.superuser_cancel).await
    }

    pub async fn cancel_superuser(&self) -> bool {
        Self::cancel_slot(&self.superuser_cancel).await
    }

    async fn replace_token(slot: &Mutex<Option<CancelToken>>) -> CancelToken {
        let mut guard = slot.lock().await;
        if let Some(old) = guard.take() {
            old.cancel();
        }
        let token = CancelToken::new();
        *guard = Some(token.clone());
        token
    }

    async fn cancel_slot(slot: &Mutex<Option<CancelToken>>) -> bool {
        let guard = slot.lock().await;
        match guard.as_ref() {
            Some(token) if !token.is_cancelled() => {
                token.cancel();
                true
            }
            _ => false,
        }
    }

    /// Request the window to close. The composition root watches this.
    pub fn request_close(&self) {
        debug!("window close requested");
        let _ = self.close_window.send(true);
    }

    pub fn close_requested(&self) -> watch::Receiver<bool> {
        self.close_window.subscribe()
    }

    /// Re-derive the installed/not-installed parts of the status from the
    /// filesystem. Does not touch fields owned by in-flight operations.
    pub async fn refresh_install_state(&self) {
        let backend_installed = self.backend_dir().is_dir();
        let valkey_installed = self.valkey_dir().is_dir();
        self.update_status(|status| {
            status.backend_installed = backend_installed;
            status.valkey_installed = valkey_installed;
        })
        .await;
    }
}
