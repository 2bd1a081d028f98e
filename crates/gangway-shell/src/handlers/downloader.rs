//! Shared download event wiring.
//!
//! Every surface that downloads something reports through the same three
//! channels: `download-progress`, `download-status`, `download-complete`.
//! This module owns that wiring so the terminal-event rule holds everywhere:
//! exactly one `download-complete` per started operation, including after
//! cancellation and failure.

use crate::cancel::CancelToken;
use crate::download::{extract_archive, ArchiveKind, FetchRequest};
use crate::error::{Result, ShellError};
use crate::state::ShellState;
use gangway_bridge::{channel, DownloadComplete, DownloadStatus, StatusSeverity};
use std::path::Path;
use tracing::{info, warn};

/// Run one download (and optional extraction), pushing the full event
/// sequence. Returns Ok only when the artifact landed and verified.
pub async fn run(
    state: &ShellState,
    token: &CancelToken,
    req: FetchRequest,
    extract_to: Option<&Path>,
) -> Result<()> {
    push_status(
        state,
        StatusSeverity::Info,
        format!("Downloading {}", req.url),
    );

    let fetch_result = state
        .engine
        .fetch(&req, token, |progress| {
            state.sink.publish(channel::DOWNLOAD_PROGRESS, &progress);
        })
        .await;

    let outcome: Result<()> = match fetch_result {
        Ok(_) => match extract_to {
            Some(dest_dir) => extract_step(state, token, &req, dest_dir).await,
            None => Ok(()),
        },
        Err(e) => Err(e),
    };

    match &outcome {
        Ok(()) => {
            push_status(state, StatusSeverity::Success, "Download complete");
            state.sink.publish(
                channel::DOWNLOAD_COMPLETE,
                &DownloadComplete {
                    success: true,
                    message: "Download complete".to_string(),
                },
            );
        }
        Err(ShellError::Cancelled) => {
            info!("download cancelled: {}", req.url);
            state.sink.publish(
                channel::DOWNLOAD_COMPLETE,
                &DownloadComplete {
                    success: false,
                    message: "Download cancelled".to_string(),
                },
            );
        }
        Err(e) => {
            warn!("download failed: {}", e);
            push_status(state, StatusSeverity::Error, e.to_string());
            state.sink.publish(
                channel::DOWNLOAD_COMPLETE,
                &DownloadComplete {
                    success: false,
                    message: e.to_string(),
                },
            );
        }
    }
    outcome
}

async fn extract_step(
    state: &ShellState,
    token: &CancelToken,
    req: &FetchRequest,
    dest_dir: &Path,
) -> Result<()> {
    token.check()?;
    let name = req
        .dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let Some(kind) = ArchiveKind::from_name(&name) else {
        return Ok(());
    };
    push_status(state, StatusSeverity::Info, "Extracting archive");
    extract_archive(&req.dest, dest_dir, kind).await?;
    // Keep the install tree clean once the contents are unpacked.
    let _ = tokio::fs::remove_file(&req.dest).await;
    Ok(())
}

pub fn push_status(state: &ShellState, severity: StatusSeverity, message: impl Into<String>) {
    state
        .sink
        .publish(channel::DOWNLOAD_STATUS, &DownloadStatus::new(severity, message));
}

/// `downloader-cancel` handler. Idempotent; a second cancel is a no-op.
pub async fn cancel(state: &ShellState) {
    if state.cancel_download().await {
        info!("active download cancelled by panel");
    }
}
