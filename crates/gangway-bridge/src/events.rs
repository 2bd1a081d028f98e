//! Event subscription registry: host -> UI push with fan-out.
//!
//! Subscriptions to the same channel stack: every registered callback sees
//! every payload, in push order, until it is removed. Removal works the same
//! way for every surface: by subscription id, or wholesale by channel name.
//!
//! Callbacks are invoked synchronously on the publisher's task with the
//! registry lock released, so a callback may itself subscribe or unsubscribe.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{error, warn};

type Callback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Identifies one subscription for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Per-channel fan-out registry shared by the UI surfaces and the host sink.
pub struct EventRegistry {
    listeners: RwLock<HashMap<&'static str, Vec<(SubscriptionId, Callback)>>>,
    next_id: AtomicU64,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a callback for every future payload pushed on `channel`.
    pub fn subscribe(
        &self,
        channel: &'static str,
        callback: impl Fn(&Value) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .expect("event registry lock poisoned")
            .entry(channel)
            .or_default()
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove one subscription. Returns false if the id is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write().expect("event registry lock poisoned");
        for entries in listeners.values_mut() {
            if let Some(pos) = entries.iter().position(|(sid, _)| *sid == id) {
                entries.remove(pos);
                return true;
            }
        }
        false
    }

    /// Remove every subscription on `channel`. Returns how many were removed.
    pub fn clear_channel(&self, channel: &str) -> usize {
        self.listeners
            .write()
            .expect("event registry lock poisoned")
            .remove(channel)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    /// Number of live subscriptions on `channel`.
    pub fn listener_count(&self, channel: &str) -> usize {
        self.listeners
            .read()
            .expect("event registry lock poisoned")
            .get(channel)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    /// Deliver `payload` to every subscription on `channel`, in registration
    /// order. Payloads from one publisher arrive in push order.
    pub fn publish(&self, channel: &str, payload: &Value) {
        let callbacks: Vec<Callback> = {
            let listeners = self.listeners.read().expect("event registry lock poisoned");
            match listeners.get(channel) {
                Some(entries) => entries.iter().map(|(_, cb)| cb.clone()).collect(),
                None => return,
            }
        };
        for callback in callbacks {
            callback(payload);
        }
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Host-side handle for pushing event payloads to the UI.
#[derive(Clone)]
pub struct EventSink {
    registry: Arc<EventRegistry>,
}

impl EventSink {
    pub fn new(registry: Arc<EventRegistry>) -> Self {
        Self { registry }
    }

    /// Push a serializable payload on `channel`. Serialization failures are
    /// logged and dropped; the host never observes UI-side state.
    pub fn publish(&self, channel: &str, payload: &impl serde::Serialize) {
        match serde_json::to_value(payload) {
            Ok(value) => self.registry.publish(channel, &value),
            Err(e) => error!("failed to serialize event payload on {}: {}", channel, e),
        }
    }

    /// Push a raw JSON payload on `channel`.
    pub fn publish_value(&self, channel: &str, payload: &Value) {
        self.registry.publish(channel, payload);
    }
}

/// Subscribe with a typed, data-only callback. Payloads that do not match the
/// documented shape are logged and skipped.
pub(crate) fn subscribe_typed<T: serde::de::DeserializeOwned>(
    registry: &EventRegistry,
    channel: &'static str,
    callback: impl Fn(T) + Send + Sync + 'static,
) -> SubscriptionId {
    registry.subscribe(channel, move |value| {
        match serde_json::from_value::<T>(value.clone()) {
            Ok(payload) => callback(payload),
            Err(e) => warn!("dropping malformed payload on {}: {}", channel, e),
        }
    })
}
