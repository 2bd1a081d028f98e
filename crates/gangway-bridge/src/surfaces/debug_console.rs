//! Debug console surface: live backend/worker output and log export.

use crate::channel;
use crate::dispatch::ChannelDispatcher;
use crate::events::{subscribe_typed, EventRegistry, SubscriptionId};
use crate::payload::{ConnectionStatus, ExportLogsRequest, LogExportKind};
use serde_json::json;
use std::sync::Arc;

pub struct DebugConsoleSurface {
    dispatcher: ChannelDispatcher,
    events: Arc<EventRegistry>,
}

impl DebugConsoleSurface {
    pub fn new(dispatcher: ChannelDispatcher, events: Arc<EventRegistry>) -> Self {
        Self { dispatcher, events }
    }

    /// Begin capturing backend/worker output.
    pub fn start_capture(&self) {
        self.dispatcher.send(channel::START_DEBUG_OUTPUT, vec![]);
    }

    /// Stop capturing. Already-captured lines are kept.
    pub fn stop_capture(&self) {
        self.dispatcher.send(channel::STOP_DEBUG_OUTPUT, vec![]);
    }

    /// Discard all captured lines.
    pub fn clear_capture(&self) {
        self.dispatcher.send(channel::CLEAR_DEBUG_OUTPUT, vec![]);
    }

    /// Ask the host to write `data` to a log file for `kind`.
    pub fn export_logs(&self, kind: LogExportKind, data: impl Into<String>) {
        let payload = ExportLogsRequest {
            kind,
            data: data.into(),
        };
        self.dispatcher
            .send(channel::EXPORT_DEBUG_LOGS, vec![json!(payload)]);
    }

    /// One line of backend process output.
    pub fn on_backend_output(
        &self,
        callback: impl Fn(String) + Send + Sync + 'static,
    ) -> SubscriptionId {
        subscribe_typed(&self.events, channel::BACKEND_OUTPUT, callback)
    }

    /// One line of worker process output.
    pub fn on_worker_output(
        &self,
        callback: impl Fn(String) + Send + Sync + 'static,
    ) -> SubscriptionId {
        subscribe_typed(&self.events, channel::WORKER_OUTPUT, callback)
    }

    /// Backend connection state transitions.
    pub fn on_connection_status(
        &self,
        callback: impl Fn(ConnectionStatus) + Send + Sync + 'static,
    ) -> SubscriptionId {
        subscribe_typed(&self.events, channel::DEBUG_CONNECTION_STATUS, callback)
    }
}
