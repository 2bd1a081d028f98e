//! Backend setup surface: install state, component downloads, python choice.

use crate::config::BackendConfig;
use crate::download::FetchRequest;
use crate::handlers::downloader;
use crate::state::ShellState;
use gangway_bridge::{BackendInstallKind, BackendStatus};
use std::sync::Arc;
use tracing::warn;

/// `backend-setup-get-status`: refresh from disk, reply with the snapshot.
pub async fn get_status(state: &ShellState) -> BackendStatus {
    state.refresh_install_state().await;
    state.status.read().await.clone()
}

/// `backend-setup-refresh`: re-derive install state and re-probe the chosen
/// interpreter. The result arrives on `backend-setup-status-update`.
pub fn refresh(state: Arc<ShellState>) {
    tokio::spawn(async move {
        state.refresh_install_state().await;
        let chosen = state.status.read().await.python_path.clone();
        if let Some(path) = chosen {
            apply_probe(&state, &path).await;
        }
    });
}

pub fn download_portable(state: Arc<ShellState>) {
    spawn_component_download(
        state,
        "download-portable",
        BackendConfig::PORTABLE_URL,
        "backend-portable.tar.gz",
        Component::Backend(BackendInstallKind::Portable),
    );
}

pub fn download_source(state: Arc<ShellState>) {
    spawn_component_download(
        state,
        "download-source",
        BackendConfig::SOURCE_URL,
        "backend-source.tar.gz",
        Component::Backend(BackendInstallKind::Source),
    );
}

pub fn download_valkey(state: Arc<ShellState>) {
    spawn_component_download(
        state,
        "download-valkey",
        BackendConfig::VALKEY_URL,
        "valkey-bundle.tar.gz",
        Component::Valkey,
    );
}

#[derive(Clone, Copy)]
enum Component {
    Backend(BackendInstallKind),
    Valkey,
}

fn spawn_component_download(
    state: Arc<ShellState>,
    operation: &'static str,
    url: &'static str,
    archive_name: &'static str,
    component: Component,
) {
    tokio::spawn(async move {
        let token = state.begin_download().await;
        state
            .update_status(|status| {
                status.operation = Some(operation.to_string());
                status.message = None;
            })
            .await;

        let dest_dir = match component {
            Component::Backend(_) => state.backend_dir(),
            Component::Valkey => state.valkey_dir(),
        };
        let req = FetchRequest {
            url: url.to_string(),
            dest: state.root().join(archive_name),
            expected_sha256: None,
        };

        let result = downloader::run(&state, &token, req, Some(&dest_dir)).await;
        state
            .update_status(|status| {
                status.operation = None;
                match &result {
                    Ok(()) => match component {
                        Component::Backend(kind) => {
                            status.backend_installed = true;
                            status.install_kind = Some(kind);
                        }
                        Component::Valkey => status.valkey_installed = true,
                    },
                    Err(e) => status.message = Some(e.to_string()),
                }
            })
            .await;
    });
}

/// `backend-setup-change-python`: probe the given path and record the result.
pub fn change_python(state: Arc<ShellState>, path: String) {
    tokio::spawn(async move {
        apply_probe(&state, &path).await;
    });
}

async fn apply_probe(state: &Arc<ShellState>, path: &str) {
    let candidate = state.interpreters.probe(std::path::Path::new(path)).await;
    if !candidate.valid {
        warn!("interpreter at {} failed validation", path);
    }
    state
        .update_status(|status| {
            status.python_path = Some(candidate.path);
            status.python_version = candidate.version;
            status.python_valid = candidate.valid;
        })
        .await;
}
