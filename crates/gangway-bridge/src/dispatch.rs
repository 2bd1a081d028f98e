//! Channel dispatcher: the UI half of the bridge.
//!
//! One ordered queue carries every outbound message from the UI context to
//! the host, so messages on the same channel arrive in send order. Nothing is
//! guaranteed across different channels. Request/reply calls are resolved by
//! a oneshot the pump fulfils exactly once.
//!
//! # Thread safety
//!
//! `ChannelDispatcher` is cheap to clone and safe to use from multiple tasks;
//! the pump processes messages sequentially, so host handlers must return
//! promptly and spawn long-running work themselves.

use crate::error::{BridgeError, Result};
use crate::events::{EventRegistry, EventSink};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Host-side dispatch target for everything the UI sends.
///
/// Implemented by the privileged process. `invoke` serves request/reply
/// channels; `notify` serves fire-and-forget channels and must not assume a
/// listener for its outcome; failures are pushed back as event payloads.
#[async_trait::async_trait]
pub trait ShellDispatch: Send + Sync + 'static {
    /// Serve a request/reply call and return the reply payload.
    async fn invoke(&self, channel: &str, args: Vec<Value>) -> Result<Value>;

    /// Serve a fire-and-forget call. No acknowledgement exists.
    async fn notify(&self, channel: &str, args: Vec<Value>);
}

enum Outbound {
    Send {
        channel: &'static str,
        args: Vec<Value>,
    },
    Request {
        channel: &'static str,
        args: Vec<Value>,
        reply: oneshot::Sender<Result<Value>>,
    },
}

/// UI-side sender. Clones share the same ordered queue.
#[derive(Clone)]
pub struct ChannelDispatcher {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl ChannelDispatcher {
    /// Fire-and-forget: enqueue one message on `channel` and return
    /// immediately. No acknowledgement, no delivery guarantee beyond
    /// in-order, at-most-once per channel. A closed bridge drops the message
    /// with a warning.
    pub fn send(&self, channel: &'static str, args: Vec<Value>) {
        if self.tx.send(Outbound::Send { channel, args }).is_err() {
            warn!("bridge closed, dropping send on {}", channel);
        }
    }

    /// Request/reply: forward `args` verbatim and await the host's reply.
    ///
    /// The returned future resolves exactly once. There is **no built-in
    /// timeout**: a host handler that never replies leaves this call pending
    /// indefinitely, so callers that cannot tolerate that must wrap the call
    /// in their own bound.
    pub async fn request(&self, channel: &'static str, args: Vec<Value>) -> Result<Value> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Outbound::Request {
                channel,
                args,
                reply,
            })
            .map_err(|_| BridgeError::Closed)?;
        rx.await.map_err(|_| BridgeError::Closed)?
    }
}

/// A connected bridge: the UI-side dispatcher and event registry plus the
/// host-side event sink. Dropping the pair stops the pump.
pub struct BridgePair {
    pub dispatcher: ChannelDispatcher,
    pub events: Arc<EventRegistry>,
    pub sink: EventSink,
    pump: tokio::task::JoinHandle<()>,
}

impl BridgePair {
    /// Abort the pump, closing the bridge. In-flight requests resolve with
    /// [`BridgeError::Closed`].
    pub fn close(&self) {
        self.pump.abort();
    }
}

impl Drop for BridgePair {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// Connect the two halves of the bridge around a host dispatch target.
///
/// Spawns the pump task that drains the UI's ordered queue into `dispatch`.
pub fn connect(dispatch: Arc<dyn ShellDispatch>) -> BridgePair {
    connect_with_registry(dispatch, Arc::new(EventRegistry::new()))
}

/// Like [`connect`], but reuses an existing event registry. Composition roots
/// that hand the host an [`EventSink`] before the dispatch target exists use
/// this to keep both sides on one registry.
pub fn connect_with_registry(
    dispatch: Arc<dyn ShellDispatch>,
    events: Arc<EventRegistry>,
) -> BridgePair {
    let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();
    let sink = EventSink::new(events.clone());

    let pump = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match message {
                Outbound::Send { channel, args } => {
                    debug!("bridge send: {}", channel);
                    dispatch.notify(channel, args).await;
                }
                Outbound::Request {
                    channel,
                    args,
                    reply,
                } => {
                    debug!("bridge request: {}", channel);
                    let result = dispatch.invoke(channel, args).await;
                    // Receiver may have been dropped; nothing to do then.
                    let _ = reply.send(result);
                }
            }
        }
    });

    BridgePair {
        dispatcher: ChannelDispatcher { tx },
        events,
        sink,
        pump,
    }
}
