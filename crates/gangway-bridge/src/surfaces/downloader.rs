//! Downloader surface: progress for the one download the host is running.
//!
//! Downloads are started privileged-side (by backend setup or interpreter
//! selection); this surface only observes them and can request cancellation.
//! Cancel is fire-and-forget: the host abandons the transfer and still pushes
//! exactly one terminal completion event.

use crate::channel;
use crate::dispatch::ChannelDispatcher;
use crate::events::{subscribe_typed, EventRegistry, SubscriptionId};
use crate::payload::{DownloadComplete, DownloadProgress, DownloadStatus};
use std::sync::Arc;

pub struct DownloaderSurface {
    dispatcher: ChannelDispatcher,
    events: Arc<EventRegistry>,
}

impl DownloaderSurface {
    pub fn new(dispatcher: ChannelDispatcher, events: Arc<EventRegistry>) -> Self {
        Self { dispatcher, events }
    }

    /// Ask the host to abandon the in-flight download.
    pub fn cancel(&self) {
        self.dispatcher.send(channel::DOWNLOADER_CANCEL, vec![]);
    }

    /// Periodic progress snapshots, in push order.
    pub fn on_progress(
        &self,
        callback: impl Fn(DownloadProgress) + Send + Sync + 'static,
    ) -> SubscriptionId {
        subscribe_typed(&self.events, channel::DOWNLOAD_PROGRESS, callback)
    }

    /// Human-readable phase/status lines.
    pub fn on_status(
        &self,
        callback: impl Fn(DownloadStatus) + Send + Sync + 'static,
    ) -> SubscriptionId {
        subscribe_typed(&self.events, channel::DOWNLOAD_STATUS, callback)
    }

    /// The single terminal event per download, success or not.
    pub fn on_complete(
        &self,
        callback: impl Fn(DownloadComplete) + Send + Sync + 'static,
    ) -> SubscriptionId {
        subscribe_typed(&self.events, channel::DOWNLOAD_COMPLETE, callback)
    }
}
