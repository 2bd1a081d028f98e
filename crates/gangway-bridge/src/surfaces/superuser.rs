//! Superuser surface: create the initial admin account.

use crate::channel;
use crate::dispatch::ChannelDispatcher;
use crate::events::{subscribe_typed, EventRegistry, SubscriptionId};
use crate::payload::{CreationResult, SuperuserRequest};
use serde_json::json;
use std::sync::Arc;

pub struct SuperuserSurface {
    dispatcher: ChannelDispatcher,
    events: Arc<EventRegistry>,
}

impl SuperuserSurface {
    pub fn new(dispatcher: ChannelDispatcher, events: Arc<EventRegistry>) -> Self {
        Self { dispatcher, events }
    }

    /// Submit the account. Validation failures and backend errors arrive on
    /// the created event as failure payloads, never as call errors.
    pub fn create(&self, request: &SuperuserRequest) {
        self.dispatcher
            .send(channel::CREATE_SUPERUSER, vec![json!(request)]);
    }

    /// Abandon an in-flight creation. A terminal created event still follows.
    pub fn cancel(&self) {
        self.dispatcher.send(channel::CANCEL_SUPERUSER, vec![]);
    }

    /// Ask the host to close this panel's window.
    pub fn close_window(&self) {
        self.dispatcher
            .send(channel::CLOSE_SUPERUSER_WINDOW, vec![]);
    }

    /// The single terminal event per creation attempt.
    pub fn on_created(
        &self,
        callback: impl Fn(CreationResult) + Send + Sync + 'static,
    ) -> SubscriptionId {
        subscribe_typed(&self.events, channel::SUPERUSER_CREATED, callback)
    }
}
