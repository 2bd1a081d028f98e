//! End-to-end tests over a connected bridge: surface calls on one side, the
//! real dispatcher and handlers on the other.

use gangway_bridge::{
    connect_with_registry, BackendSetupSurface, BridgeError, BridgePair, DebugConsoleSurface,
    DownloaderSurface, EventRegistry, EventSink, InterpreterSurface, LogExportKind,
    SuperuserRequest, SuperuserSurface,
};
use gangway_shell::{ShellDispatcher, ShellState};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

struct Harness {
    pair: BridgePair,
    state: Arc<ShellState>,
    _dir: TempDir,
}

fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let events = Arc::new(EventRegistry::new());
    let sink = EventSink::new(events.clone());
    let state = Arc::new(ShellState::new(dir.path().to_path_buf(), sink).unwrap());
    let dispatch = Arc::new(ShellDispatcher::new(state.clone()));
    let pair = connect_with_registry(dispatch, events);
    Harness {
        pair,
        state,
        _dir: dir,
    }
}

async fn recv_within<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

#[tokio::test]
async fn get_status_reflects_install_root() {
    let h = harness();
    let surface = BackendSetupSurface::new(h.pair.dispatcher.clone(), h.pair.events.clone());

    let status = surface.get_status().await.unwrap();
    assert!(!status.backend_installed);
    assert!(!status.valkey_installed);

    std::fs::create_dir_all(h.state.backend_dir()).unwrap();
    let status = surface.get_status().await.unwrap();
    assert!(status.backend_installed);
}

#[tokio::test]
async fn superuser_validation_failure_is_a_terminal_event_not_an_error() {
    let h = harness();
    let surface = SuperuserSurface::new(h.pair.dispatcher.clone(), h.pair.events.clone());

    let (tx, mut rx) = mpsc::unbounded_channel();
    surface.on_created(move |result| {
        let _ = tx.send(result);
    });

    surface.create(&SuperuserRequest {
        username: "admin".to_string(),
        email: "admin@example.com".to_string(),
        password: "short".to_string(),
    });

    let result = recv_within(&mut rx).await;
    assert!(!result.success);
    assert!(result.message.contains("password"));
}

#[tokio::test]
async fn browse_with_missing_path_pushes_invalid_interpreter() {
    let h = harness();
    let surface = InterpreterSurface::new(h.pair.dispatcher.clone(), h.pair.events.clone());

    let (tx, mut rx) = mpsc::unbounded_channel();
    surface.on_custom_interpreter(move |payload| {
        let _ = tx.send(payload);
    });

    let missing = h.state.root().join("not-python").display().to_string();
    surface.browse(&missing);

    let payload = recv_within(&mut rx).await;
    assert_eq!(payload.path, missing);
    assert!(!payload.valid);
    assert_eq!(payload.version, "");
}

#[tokio::test]
async fn export_logs_writes_a_file_under_the_logs_dir() {
    let h = harness();
    let surface = DebugConsoleSurface::new(h.pair.dispatcher.clone(), h.pair.events.clone());

    surface.export_logs(LogExportKind::All, "line a\nline b");

    let logs_dir = h.state.logs_dir();
    let mut exported = None;
    for _ in 0..100 {
        if let Ok(entries) = std::fs::read_dir(&logs_dir) {
            if let Some(entry) = entries.flatten().next() {
                exported = Some(entry.path());
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let path = exported.expect("no log file was written");
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("gangway-all-"));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "line a\nline b");
}

#[tokio::test]
async fn unknown_request_channel_is_rejected() {
    let h = harness();
    let err = h
        .pair
        .dispatcher
        .request("no-such-channel", vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::UnknownChannel(_)));
}

#[tokio::test]
async fn cancel_without_a_download_emits_no_terminal_event() {
    let h = harness();
    let downloader = DownloaderSurface::new(h.pair.dispatcher.clone(), h.pair.events.clone());
    let backend = BackendSetupSurface::new(h.pair.dispatcher.clone(), h.pair.events.clone());

    let (tx, mut rx) = mpsc::unbounded_channel();
    downloader.on_complete(move |result| {
        let _ = tx.send(result);
    });

    downloader.cancel();
    // A request behind the send proves the queue was drained.
    let _ = backend.get_status().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn get_candidates_replies_with_a_list() {
    let h = harness();
    let surface = InterpreterSurface::new(h.pair.dispatcher.clone(), h.pair.events.clone());

    // Contents depend on the machine; the contract is a well-formed list
    // where every entry has a path.
    let candidates = surface.list_candidates().await.unwrap();
    for candidate in &candidates {
        assert!(!candidate.path.is_empty());
    }
}
