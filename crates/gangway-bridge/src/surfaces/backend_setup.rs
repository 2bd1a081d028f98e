//! Backend setup surface: install the application backend, its cache store,
//! and point it at a Python interpreter.

use crate::channel;
use crate::dispatch::ChannelDispatcher;
use crate::error::{BridgeError, Result};
use crate::events::{subscribe_typed, EventRegistry, SubscriptionId};
use crate::payload::BackendStatus;
use serde_json::json;
use std::sync::Arc;

pub struct BackendSetupSurface {
    dispatcher: ChannelDispatcher,
    events: Arc<EventRegistry>,
}

impl BackendSetupSurface {
    pub fn new(dispatcher: ChannelDispatcher, events: Arc<EventRegistry>) -> Self {
        Self { dispatcher, events }
    }

    /// Current setup state. Request/reply; see
    /// [`ChannelDispatcher::request`] for the no-timeout contract.
    pub async fn get_status(&self) -> Result<BackendStatus> {
        let reply = self
            .dispatcher
            .request(channel::BACKEND_SETUP_GET_STATUS, vec![])
            .await?;
        serde_json::from_value(reply)
            .map_err(|e| BridgeError::decode(channel::BACKEND_SETUP_GET_STATUS, e))
    }

    /// Start downloading the portable backend build.
    pub fn download_portable(&self) {
        self.dispatcher
            .send(channel::BACKEND_SETUP_DOWNLOAD_PORTABLE, vec![]);
    }

    /// Start downloading the backend source archive.
    pub fn download_source(&self) {
        self.dispatcher
            .send(channel::BACKEND_SETUP_DOWNLOAD_SOURCE, vec![]);
    }

    /// Start downloading the Valkey cache store.
    pub fn download_valkey(&self) {
        self.dispatcher
            .send(channel::BACKEND_SETUP_DOWNLOAD_VALKEY, vec![]);
    }

    /// Switch the backend to the interpreter at `path`.
    pub fn change_python(&self, path: &str) {
        self.dispatcher
            .send(channel::BACKEND_SETUP_CHANGE_PYTHON, vec![json!(path)]);
    }

    /// Re-run the host's filesystem checks and push a fresh status update.
    pub fn refresh(&self) {
        self.dispatcher.send(channel::BACKEND_SETUP_REFRESH, vec![]);
    }

    /// Status update pushed after every setup state transition.
    pub fn on_status_update(
        &self,
        callback: impl Fn(BackendStatus) + Send + Sync + 'static,
    ) -> SubscriptionId {
        subscribe_typed(&self.events, channel::BACKEND_SETUP_STATUS_UPDATE, callback)
    }
}
