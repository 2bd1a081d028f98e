//! Error types for the bridge layer.
//!
//! Transport and installation failures live here. Domain failures (a download
//! that fails, an interpreter that is too old, wrong credentials) are *not*
//! errors at this layer: they arrive as successfully delivered payloads
//! carrying a failure flag and a message.

use thiserror::Error;

/// Main error type for bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A second surface was installed under an already-taken name. This is a
    /// programming error in the composition root, never a runtime merge.
    #[error("surface already installed under name: {name}")]
    SurfaceCollision { name: String },

    /// The host side of the bridge is gone (pump task stopped, window closing).
    #[error("bridge closed")]
    Closed,

    /// The host rejected or failed a request/reply call.
    #[error("dispatch failed on {channel}: {message}")]
    Dispatch { channel: String, message: String },

    /// A request was made on a channel the host does not serve.
    #[error("unknown request channel: {0}")]
    UnknownChannel(String),

    /// A reply or event payload did not match its documented shape.
    #[error("payload decode failed on {channel}: {source}")]
    Decode {
        channel: String,
        #[source]
        source: serde_json::Error,
    },

    /// Argument list did not match the documented shape for the channel.
    #[error("invalid arguments on {channel}: {message}")]
    InvalidArgs { channel: String, message: String },
}

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Decode helper carrying the channel name.
    pub fn decode(channel: &str, source: serde_json::Error) -> Self {
        BridgeError::Decode {
            channel: channel.to_string(),
            source,
        }
    }

    /// Invalid-arguments helper carrying the channel name.
    pub fn invalid_args(channel: &str, message: impl Into<String>) -> Self {
        BridgeError::InvalidArgs {
            channel: channel.to_string(),
            message: message.into(),
        }
    }
}
