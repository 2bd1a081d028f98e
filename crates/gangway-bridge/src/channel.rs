//! The channel contract between the UI context and the host process.
//!
//! Channel names are the wire protocol. Once shipped they are stable across
//! versions: both sides must agree without a negotiation step. Request
//! channels and event channels never share a name, and every name is
//! process-wide unique (`contract_channels_are_unique` enforces this).

/// How a channel is used. One channel has exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// UI -> host, reply required. One in-flight call per channel at a time
    /// is assumed by callers.
    Request,
    /// UI -> host, no acknowledgement.
    Send,
    /// Host -> UI push.
    Event,
}

// Backend setup
pub const BACKEND_SETUP_GET_STATUS: &str = "backend-setup-get-status";
pub const BACKEND_SETUP_DOWNLOAD_PORTABLE: &str = "backend-setup-download-portable";
pub const BACKEND_SETUP_DOWNLOAD_SOURCE: &str = "backend-setup-download-source";
pub const BACKEND_SETUP_DOWNLOAD_VALKEY: &str = "backend-setup-download-valkey";
pub const BACKEND_SETUP_CHANGE_PYTHON: &str = "backend-setup-change-python";
pub const BACKEND_SETUP_REFRESH: &str = "backend-setup-refresh";
pub const BACKEND_SETUP_STATUS_UPDATE: &str = "backend-setup-status-update";

// Debug console
pub const START_DEBUG_OUTPUT: &str = "start-debug-output";
pub const STOP_DEBUG_OUTPUT: &str = "stop-debug-output";
pub const CLEAR_DEBUG_OUTPUT: &str = "clear-debug-output";
pub const EXPORT_DEBUG_LOGS: &str = "export-debug-logs";
pub const BACKEND_OUTPUT: &str = "backend-output";
pub const WORKER_OUTPUT: &str = "worker-output";
pub const DEBUG_CONNECTION_STATUS: &str = "debug-connection-status";

// Downloader
pub const DOWNLOADER_CANCEL: &str = "downloader-cancel";
pub const DOWNLOAD_PROGRESS: &str = "download-progress";
pub const DOWNLOAD_STATUS: &str = "download-status";
pub const DOWNLOAD_COMPLETE: &str = "download-complete";

// Interpreter selection
pub const PYTHON_SELECTION_GET_CANDIDATES: &str = "python-selection-get-candidates";
pub const PYTHON_SELECTION_SELECT: &str = "python-selection-select";
pub const PYTHON_SELECTION_DOWNLOAD_PORTABLE: &str = "python-selection-download-portable";
pub const PYTHON_SELECTION_BROWSE: &str = "python-selection-browse";
pub const PYTHON_SELECTION_CANCEL: &str = "python-selection-cancel";
pub const PYTHON_SELECTION_CUSTOM: &str = "python-selection-custom";

// Superuser creation
pub const CREATE_SUPERUSER: &str = "create-superuser";
pub const CANCEL_SUPERUSER: &str = "cancel-superuser";
pub const CLOSE_SUPERUSER_WINDOW: &str = "close-superuser-window";
pub const SUPERUSER_CREATED: &str = "superuser-created";

/// The full wire contract: every channel and its kind.
pub const CONTRACT: &[(&str, ChannelKind)] = &[
    (BACKEND_SETUP_GET_STATUS, ChannelKind::Request),
    (BACKEND_SETUP_DOWNLOAD_PORTABLE, ChannelKind::Send),
    (BACKEND_SETUP_DOWNLOAD_SOURCE, ChannelKind::Send),
    (BACKEND_SETUP_DOWNLOAD_VALKEY, ChannelKind::Send),
    (BACKEND_SETUP_CHANGE_PYTHON, ChannelKind::Send),
    (BACKEND_SETUP_REFRESH, ChannelKind::Send),
    (BACKEND_SETUP_STATUS_UPDATE, ChannelKind::Event),
    (START_DEBUG_OUTPUT, ChannelKind::Send),
    (STOP_DEBUG_OUTPUT, ChannelKind::Send),
    (CLEAR_DEBUG_OUTPUT, ChannelKind::Send),
    (EXPORT_DEBUG_LOGS, ChannelKind::Send),
    (BACKEND_OUTPUT, ChannelKind::Event),
    (WORKER_OUTPUT, ChannelKind::Event),
    (DEBUG_CONNECTION_STATUS, ChannelKind::Event),
    (DOWNLOADER_CANCEL, ChannelKind::Send),
    (DOWNLOAD_PROGRESS, ChannelKind::Event),
    (DOWNLOAD_STATUS, ChannelKind::Event),
    (DOWNLOAD_COMPLETE, ChannelKind::Event),
    (PYTHON_SELECTION_GET_CANDIDATES, ChannelKind::Request),
    (PYTHON_SELECTION_SELECT, ChannelKind::Send),
    (PYTHON_SELECTION_DOWNLOAD_PORTABLE, ChannelKind::Send),
    (PYTHON_SELECTION_BROWSE, ChannelKind::Send),
    (PYTHON_SELECTION_CANCEL, ChannelKind::Send),
    (PYTHON_SELECTION_CUSTOM, ChannelKind::Event),
    (CREATE_SUPERUSER, ChannelKind::Send),
    (CANCEL_SUPERUSER, ChannelKind::Send),
    (CLOSE_SUPERUSER_WINDOW, ChannelKind::Send),
    (SUPERUSER_CREATED, ChannelKind::Event),
];

/// Look up the kind of a channel, if it is part of the contract.
pub fn kind_of(channel: &str) -> Option<ChannelKind> {
    CONTRACT
        .iter()
        .find(|(name, _)| *name == channel)
        .map(|(_, kind)| *kind)
}
