//! Error types for the privileged host.
//!
//! Most of these never cross the bridge as errors: handlers convert them to
//! failure payloads on the relevant event channel. Only request/reply
//! channels surface them to the caller, mapped through `to_bridge_error`.

use gangway_bridge::BridgeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("io error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("download failed for {url}: {message}")]
    DownloadFailed { url: String, message: String },

    #[error("download cancelled")]
    Cancelled,

    #[error("hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("archive extraction failed: {message}")]
    Archive { message: String },

    #[error("interpreter probe failed for {path}: {message}")]
    InterpreterProbe { path: String, message: String },

    #[error("process error for {name}: {message}")]
    Process { name: String, message: String },

    #[error("validation error for {field}: {message}")]
    Validation { field: String, message: String },
}

/// Result type alias for host operations.
pub type Result<T> = std::result::Result<T, ShellError>;

impl From<std::io::Error> for ShellError {
    fn from(err: std::io::Error) -> Self {
        ShellError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<crate::cancel::CancelledError> for ShellError {
    fn from(_: crate::cancel::CancelledError) -> Self {
        ShellError::Cancelled
    }
}

impl ShellError {
    /// IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ShellError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Map to the bridge-level error for a request/reply channel.
    pub fn to_bridge_error(&self, channel: &str) -> BridgeError {
        BridgeError::Dispatch {
            channel: channel.to_string(),
            message: self.to_string(),
        }
    }
}
