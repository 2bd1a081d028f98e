//! Interpreter selection surface: discovery, probing, portable download.

use crate::cancel::CancelToken;
use crate::config::InterpreterConfig;
use crate::download::FetchRequest;
use crate::error::Result;
use crate::handlers::downloader;
use crate::state::ShellState;
use gangway_bridge::{channel, CustomInterpreter, InterpreterCandidate};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// `python-selection-get-candidates`: scan and probe, reply with the list.
pub async fn get_candidates(state: &ShellState) -> Result<Vec<InterpreterCandidate>> {
    let token = state.begin_probe().await;
    let candidates = state.interpreters.discover(&token).await?;
    Ok(candidates)
}

/// `python-selection-select`: probe the chosen path, push the result.
pub fn select(state: Arc<ShellState>, path: String) {
    tokio::spawn(async move {
        let token = state.begin_probe().await;
        probe_and_push(&state, Path::new(&path), &token).await;
    });
}

/// `python-selection-browse`: validate a user-picked path before probing.
/// A path that is not a file is pushed as invalid without spawning anything.
pub fn browse(state: Arc<ShellState>, path: String) {
    tokio::spawn(async move {
        let candidate_path = Path::new(&path);
        if !candidate_path.is_file() {
            push_invalid(&state, path);
            return;
        }
        let token = state.begin_probe().await;
        probe_and_push(&state, candidate_path, &token).await;
    });
}

/// Probe `path` and push the outcome. Cancellation abandons the probe and
/// still pushes a terminal invalid payload; a cancelled probe never touches
/// the backend status.
async fn probe_and_push(state: &ShellState, path: &Path, token: &CancelToken) {
    let probe = state.interpreters.probe(path);
    tokio::pin!(probe);
    let candidate = loop {
        tokio::select! {
            candidate = &mut probe => break candidate,
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if token.is_cancelled() {
                    push_invalid(state, path.display().to_string());
                    return;
                }
            }
        }
    };
    if token.is_cancelled() {
        push_invalid(state, candidate.path);
        return;
    }

    let payload = CustomInterpreter {
        path: candidate.path.clone(),
        version: candidate.version.clone().unwrap_or_default(),
        valid: candidate.valid,
    };
    state.sink.publish(channel::PYTHON_SELECTION_CUSTOM, &payload);

    if candidate.valid {
        state
            .update_status(|status| {
                status.python_path = Some(candidate.path);
                status.python_version = candidate.version;
                status.python_valid = true;
            })
            .await;
    }
}

fn push_invalid(state: &ShellState, path: String) {
    state.sink.publish(
        channel::PYTHON_SELECTION_CUSTOM,
        &CustomInterpreter {
            path,
            version: String::new(),
            valid: false,
        },
    );
}

/// `python-selection-download-portable`: fetch and unpack the bundled
/// interpreter, then probe it and push the outcome like a selection.
pub fn download_portable(state: Arc<ShellState>) {
    tokio::spawn(async move {
        let token = state.begin_download().await;
        let python_dir = state.python_dir();
        let req = FetchRequest {
            url: InterpreterConfig::PORTABLE_URL.to_string(),
            dest: state.root().join("python-portable.tar.gz"),
            expected_sha256: None,
        };

        if downloader::run(&state, &token, req, Some(&python_dir))
            .await
            .is_ok()
        {
            probe_and_push(&state, &portable_binary(&python_dir), &token).await;
        }
    });
}

fn portable_binary(python_dir: &Path) -> PathBuf {
    #[cfg(unix)]
    {
        python_dir.join("bin").join("python3")
    }
    #[cfg(windows)]
    {
        python_dir.join("python.exe")
    }
}

/// `python-selection-cancel`: stops both a running scan and a running
/// portable download.
pub async fn cancel(state: &ShellState) {
    let probe = state.cancel_probe().await;
    let download = state.cancel_download().await;
    if probe || download {
        info!("interpreter operation cancelled by panel");
    }
}
