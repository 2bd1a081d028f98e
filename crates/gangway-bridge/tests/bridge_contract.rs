//! End-to-end contract tests for the bridge: surfaces, dispatcher, events.

use gangway_bridge::{
    channel, connect, BridgeError, CustomInterpreter, DownloadProgress, ShellDispatch,
    SurfaceRegistry,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Test shell that records fire-and-forget traffic and answers requests from
/// a canned table.
struct RecordingShell {
    notified: Mutex<Vec<(String, Vec<Value>)>>,
    replies: Mutex<std::collections::HashMap<String, Value>>,
}

impl RecordingShell {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            notified: Mutex::new(Vec::new()),
            replies: Mutex::new(std::collections::HashMap::new()),
        })
    }

    fn reply_with(&self, channel: &str, value: Value) {
        self.replies
            .lock()
            .unwrap()
            .insert(channel.to_string(), value);
    }

    fn sent(&self) -> Vec<(String, Vec<Value>)> {
        self.notified.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ShellDispatch for RecordingShell {
    async fn invoke(&self, channel: &str, _args: Vec<Value>) -> Result<Value, BridgeError> {
        self.replies
            .lock()
            .unwrap()
            .get(channel)
            .cloned()
            .ok_or_else(|| BridgeError::UnknownChannel(channel.to_string()))
    }

    async fn notify(&self, channel: &str, args: Vec<Value>) {
        self.notified
            .lock()
            .unwrap()
            .push((channel.to_string(), args));
    }
}

/// Drain the pump queue behind earlier fire-and-forget sends.
async fn flush(pair: &gangway_bridge::BridgePair, shell: &RecordingShell) {
    shell.reply_with("flush", json!(null));
    let _ = pair.dispatcher.request("flush", vec![]).await;
}

#[tokio::test]
async fn request_reply_resolves_once_with_host_payload() {
    let shell = RecordingShell::new();
    shell.reply_with(
        channel::BACKEND_SETUP_GET_STATUS,
        json!({
            "backend_installed": true,
            "install_kind": "portable",
            "python_path": "/usr/bin/python3",
            "python_version": "3.12.1",
            "python_valid": true,
            "valkey_installed": false,
            "operation": null,
            "message": null
        }),
    );
    let pair = connect(shell.clone());
    let surface = gangway_bridge::BackendSetupSurface::new(pair.dispatcher.clone(), pair.events.clone());

    let status = surface.get_status().await.unwrap();
    assert!(status.backend_installed);
    assert_eq!(status.python_version.as_deref(), Some("3.12.1"));
    assert!(!status.valkey_installed);
}

#[tokio::test]
async fn fire_and_forget_produces_one_message_with_documented_shape() {
    let shell = RecordingShell::new();
    let pair = connect(shell.clone());
    let surface = gangway_bridge::InterpreterSurface::new(pair.dispatcher.clone(), pair.events.clone());

    surface.select("/opt/python/bin/python3");
    flush(&pair, &shell).await;

    let sent = shell.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, channel::PYTHON_SELECTION_SELECT);
    assert_eq!(sent[0].1, vec![json!("/opt/python/bin/python3")]);
}

#[tokio::test]
async fn superuser_create_forwards_all_fields() {
    let shell = RecordingShell::new();
    let pair = connect(shell.clone());
    let surface = gangway_bridge::SuperuserSurface::new(pair.dispatcher.clone(), pair.events.clone());

    surface.create(&gangway_bridge::SuperuserRequest {
        username: "admin".into(),
        email: "admin@example.com".into(),
        password: "hunter2hunter2".into(),
    });
    flush(&pair, &shell).await;

    let sent = shell.sent();
    assert_eq!(sent[0].0, channel::CREATE_SUPERUSER);
    assert_eq!(
        sent[0].1,
        vec![json!({
            "username": "admin",
            "email": "admin@example.com",
            "password": "hunter2hunter2"
        })]
    );
}

#[tokio::test]
async fn event_pushes_arrive_in_order_untransformed() {
    // Three progress pushes; callback order must match push order exactly.
    let shell = RecordingShell::new();
    let pair = connect(shell);
    let surface = gangway_bridge::DownloaderSurface::new(pair.dispatcher.clone(), pair.events.clone());

    let seen: Arc<Mutex<Vec<DownloadProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    surface.on_progress(move |p| seen_clone.lock().unwrap().push(p));

    for (downloaded, percentage) in [(10u64, 10.0), (50, 50.0), (100, 100.0)] {
        pair.sink.publish(
            channel::DOWNLOAD_PROGRESS,
            &DownloadProgress {
                downloaded,
                total: 100,
                percentage,
                speed: 1024.0,
            },
        );
    }

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].downloaded, 10);
    assert_eq!(seen[1].downloaded, 50);
    assert_eq!(seen[2].downloaded, 100);
    assert_eq!(seen[2].percentage, 100.0);
}

#[tokio::test]
async fn custom_interpreter_payload_is_untransformed() {
    // The (path, version, isValid) triple must reach the callback exactly
    // as pushed.
    let shell = RecordingShell::new();
    let pair = connect(shell);
    let surface = gangway_bridge::InterpreterSurface::new(pair.dispatcher.clone(), pair.events.clone());

    let seen: Arc<Mutex<Option<CustomInterpreter>>> = Arc::new(Mutex::new(None));
    let seen_clone = seen.clone();
    surface.on_custom_interpreter(move |p| *seen_clone.lock().unwrap() = Some(p));

    pair.sink.publish_value(
        channel::PYTHON_SELECTION_CUSTOM,
        &json!({
            "path": "/usr/bin/python3.11",
            "version": "3.11.4",
            "isValid": true
        }),
    );

    let got = seen.lock().unwrap().clone().expect("callback not invoked");
    assert_eq!(got.path, "/usr/bin/python3.11");
    assert_eq!(got.version, "3.11.4");
    assert!(got.valid);
}

#[tokio::test]
async fn two_subscriptions_fan_out_until_one_is_removed() {
    let shell = RecordingShell::new();
    let pair = connect(shell);
    let surface = gangway_bridge::DebugConsoleSurface::new(pair.dispatcher.clone(), pair.events.clone());

    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(Mutex::new(Vec::new()));

    let f = first.clone();
    let first_id = surface.on_backend_output(move |line| f.lock().unwrap().push(line));
    let s = second.clone();
    surface.on_backend_output(move |line| s.lock().unwrap().push(line));

    pair.sink.publish(channel::BACKEND_OUTPUT, &"line one");
    pair.sink.publish(channel::BACKEND_OUTPUT, &"line two");

    assert!(pair.events.unsubscribe(first_id));
    pair.sink.publish(channel::BACKEND_OUTPUT, &"line three");

    assert_eq!(first.lock().unwrap().len(), 2);
    assert_eq!(
        *second.lock().unwrap(),
        vec!["line one", "line two", "line three"]
    );
}

#[tokio::test]
async fn installing_two_surfaces_under_one_name_is_rejected() {
    let shell = RecordingShell::new();
    let pair = connect(shell);
    let mut registry = SurfaceRegistry::new();

    registry
        .install_backend_setup(gangway_bridge::BackendSetupSurface::new(
            pair.dispatcher.clone(),
            pair.events.clone(),
        ))
        .unwrap();

    let err = registry
        .install_backend_setup(gangway_bridge::BackendSetupSurface::new(
            pair.dispatcher.clone(),
            pair.events.clone(),
        ))
        .unwrap_err();
    assert!(matches!(err, BridgeError::SurfaceCollision { .. }));

    // The original install is untouched.
    let surfaces = registry.seal();
    assert!(surfaces.backend_setup().is_some());
}

#[tokio::test]
async fn malformed_event_payload_is_skipped_not_delivered() {
    let shell = RecordingShell::new();
    let pair = connect(shell);
    let surface = gangway_bridge::DownloaderSurface::new(pair.dispatcher.clone(), pair.events.clone());

    let count = Arc::new(Mutex::new(0usize));
    let c = count.clone();
    surface.on_progress(move |_| *c.lock().unwrap() += 1);

    pair.sink
        .publish_value(channel::DOWNLOAD_PROGRESS, &json!({"garbage": true}));
    pair.sink.publish(
        channel::DOWNLOAD_PROGRESS,
        &DownloadProgress {
            downloaded: 1,
            total: 2,
            percentage: 50.0,
            speed: 0.0,
        },
    );

    assert_eq!(*count.lock().unwrap(), 1);
}
