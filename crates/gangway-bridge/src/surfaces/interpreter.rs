//! Interpreter selection surface: discover, validate and pick a Python.

use crate::channel;
use crate::dispatch::ChannelDispatcher;
use crate::error::{BridgeError, Result};
use crate::events::{subscribe_typed, EventRegistry, SubscriptionId};
use crate::payload::{CustomInterpreter, InterpreterCandidate};
use serde_json::json;
use std::sync::Arc;

pub struct InterpreterSurface {
    dispatcher: ChannelDispatcher,
    events: Arc<EventRegistry>,
}

impl InterpreterSurface {
    pub fn new(dispatcher: ChannelDispatcher, events: Arc<EventRegistry>) -> Self {
        Self { dispatcher, events }
    }

    /// Interpreters the host discovered on this machine. Request/reply; see
    /// [`ChannelDispatcher::request`] for the no-timeout contract.
    pub async fn list_candidates(&self) -> Result<Vec<InterpreterCandidate>> {
        let reply = self
            .dispatcher
            .request(channel::PYTHON_SELECTION_GET_CANDIDATES, vec![])
            .await?;
        serde_json::from_value(reply)
            .map_err(|e| BridgeError::decode(channel::PYTHON_SELECTION_GET_CANDIDATES, e))
    }

    /// Validate and select the interpreter at `path`. The outcome arrives on
    /// the custom-interpreter event.
    pub fn select(&self, path: &str) {
        self.dispatcher
            .send(channel::PYTHON_SELECTION_SELECT, vec![json!(path)]);
    }

    /// Start downloading a standalone portable interpreter build.
    pub fn download_portable(&self) {
        self.dispatcher
            .send(channel::PYTHON_SELECTION_DOWNLOAD_PORTABLE, vec![]);
    }

    /// Validate a path the user picked from the filesystem. Same validation
    /// pipeline and result event as [`select`](Self::select).
    pub fn browse(&self, path: &str) {
        self.dispatcher
            .send(channel::PYTHON_SELECTION_BROWSE, vec![json!(path)]);
    }

    /// Abandon the in-flight validation or download. A terminal event still
    /// follows.
    pub fn cancel(&self) {
        self.dispatcher
            .send(channel::PYTHON_SELECTION_CANCEL, vec![]);
    }

    /// Result of a select/browse probe: (path, version, validity),
    /// untransformed.
    pub fn on_custom_interpreter(
        &self,
        callback: impl Fn(CustomInterpreter) + Send + Sync + 'static,
    ) -> SubscriptionId {
        subscribe_typed(&self.events, channel::PYTHON_SELECTION_CUSTOM, callback)
    }
}
