//! Channel routing for the privileged host.
//!
//! [`ShellDispatcher`] is the single `ShellDispatch` implementation behind
//! the bridge: request channels return a value, send channels route to a
//! handler and never reply. Unknown request channels error back to the
//! caller; unknown sends are logged and dropped.

use crate::handlers::{backend_setup, debug, downloader, interpreter, superuser};
use crate::state::ShellState;
use async_trait::async_trait;
use gangway_bridge::{channel, BridgeError, Result as BridgeResult, ShellDispatch};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

pub struct ShellDispatcher {
    state: Arc<ShellState>,
}

impl ShellDispatcher {
    pub fn new(state: Arc<ShellState>) -> Self {
        Self { state }
    }

    async fn route_notify(&self, channel_name: &str, args: Vec<Value>) -> BridgeResult<()> {
        match channel_name {
            // Backend setup
            channel::BACKEND_SETUP_DOWNLOAD_PORTABLE => {
                backend_setup::download_portable(self.state.clone());
            }
            channel::BACKEND_SETUP_DOWNLOAD_SOURCE => {
                backend_setup::download_source(self.state.clone());
            }
            channel::BACKEND_SETUP_DOWNLOAD_VALKEY => {
                backend_setup::download_valkey(self.state.clone());
            }
            channel::BACKEND_SETUP_CHANGE_PYTHON => {
                let path = string_arg(channel_name, &args, 0)?;
                backend_setup::change_python(self.state.clone(), path);
            }
            channel::BACKEND_SETUP_REFRESH => {
                backend_setup::refresh(self.state.clone());
            }

            // Debug console
            channel::START_DEBUG_OUTPUT => debug::start_capture(self.state.clone()),
            channel::STOP_DEBUG_OUTPUT => debug::stop_capture(&self.state),
            channel::CLEAR_DEBUG_OUTPUT => debug::clear_capture(&self.state),
            channel::EXPORT_DEBUG_LOGS => {
                let req = typed_arg(channel_name, &args, 0)?;
                debug::spawn_export(self.state.clone(), req);
            }

            // Downloader
            channel::DOWNLOADER_CANCEL => downloader::cancel(&self.state).await,

            // Interpreter selection
            channel::PYTHON_SELECTION_SELECT => {
                let path = string_arg(channel_name, &args, 0)?;
                interpreter::select(self.state.clone(), path);
            }
            channel::PYTHON_SELECTION_DOWNLOAD_PORTABLE => {
                interpreter::download_portable(self.state.clone());
            }
            channel::PYTHON_SELECTION_BROWSE => {
                let path = string_arg(channel_name, &args, 0)?;
                interpreter::browse(self.state.clone(), path);
            }
            channel::PYTHON_SELECTION_CANCEL => interpreter::cancel(&self.state).await,

            // Superuser
            channel::CREATE_SUPERUSER => {
                let req = typed_arg(channel_name, &args, 0)?;
                superuser::create(self.state.clone(), req);
            }
            channel::CANCEL_SUPERUSER => superuser::cancel(&self.state).await,
            channel::CLOSE_SUPERUSER_WINDOW => superuser::close_window(&self.state),

            _ => return Err(BridgeError::UnknownChannel(channel_name.to_string())),
        }
        Ok(())
    }
}

#[async_trait]
impl ShellDispatch for ShellDispatcher {
    async fn invoke(&self, channel_name: &str, _args: Vec<Value>) -> BridgeResult<Value> {
        match channel_name {
            channel::BACKEND_SETUP_GET_STATUS => {
                let status = backend_setup::get_status(&self.state).await;
                to_reply(channel_name, &status)
            }
            channel::PYTHON_SELECTION_GET_CANDIDATES => {
                let candidates = interpreter::get_candidates(&self.state)
                    .await
                    .map_err(|e| e.to_bridge_error(channel_name))?;
                to_reply(channel_name, &candidates)
            }
            _ => Err(BridgeError::UnknownChannel(channel_name.to_string())),
        }
    }

    async fn notify(&self, channel_name: &str, args: Vec<Value>) {
        if let Err(e) = self.route_notify(channel_name, args).await {
            warn!("dropping message on {}: {}", channel_name, e);
        }
    }
}

fn to_reply(channel_name: &str, payload: &impl serde::Serialize) -> BridgeResult<Value> {
    serde_json::to_value(payload).map_err(|e| BridgeError::Dispatch {
        channel: channel_name.to_string(),
        message: format!("reply serialization failed: {}", e),
    })
}

fn string_arg(channel_name: &str, args: &[Value], idx: usize) -> BridgeResult<String> {
    args.get(idx)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            BridgeError::invalid_args(channel_name, format!("expected a string at position {}", idx))
        })
}

fn typed_arg<T: serde::de::DeserializeOwned>(
    channel_name: &str,
    args: &[Value],
    idx: usize,
) -> BridgeResult<T> {
    let value = args.get(idx).ok_or_else(|| {
        BridgeError::invalid_args(channel_name, format!("missing argument at position {}", idx))
    })?;
    serde_json::from_value(value.clone()).map_err(|e| BridgeError::decode(channel_name, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gangway_bridge::{EventRegistry, EventSink};
    use serde_json::json;
    use tempfile::TempDir;

    fn dispatcher(dir: &TempDir) -> ShellDispatcher {
        let registry = Arc::new(EventRegistry::new());
        let sink = EventSink::new(registry);
        let state = Arc::new(ShellState::new(dir.path().to_path_buf(), sink).unwrap());
        ShellDispatcher::new(state)
    }

    #[tokio::test]
    async fn test_unknown_request_channel_errors() {
        let dir = TempDir::new().unwrap();
        let d = dispatcher(&dir);
        let err = d.invoke("no-such-channel", vec![]).await.unwrap_err();
        assert!(matches!(err, BridgeError::UnknownChannel(_)));
    }

    #[tokio::test]
    async fn test_get_status_replies_with_snapshot() {
        let dir = TempDir::new().unwrap();
        let d = dispatcher(&dir);
        let reply = d
            .invoke(channel::BACKEND_SETUP_GET_STATUS, vec![])
            .await
            .unwrap();
        assert_eq!(reply["backend_installed"], json!(false));
        assert_eq!(reply["python_valid"], json!(false));
    }

    #[tokio::test]
    async fn test_change_python_rejects_non_string_arg() {
        let dir = TempDir::new().unwrap();
        let d = dispatcher(&dir);
        let err = d
            .route_notify(channel::BACKEND_SETUP_CHANGE_PYTHON, vec![json!(42)])
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgs { .. }));
    }

    #[tokio::test]
    async fn test_malformed_superuser_payload_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let d = dispatcher(&dir);
        let err = d
            .route_notify(channel::CREATE_SUPERUSER, vec![json!({"username": 1})])
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Decode { .. }));
    }
}
