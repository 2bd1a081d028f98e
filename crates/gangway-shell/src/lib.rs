//! Gangway Shell - the privileged half of the bridge.
//!
//! Owns every real resource: subprocess handles, file handles, network
//! sockets. The UI context can only name a channel and pass data; everything
//! it asks for is served here, behind [`dispatch::ShellDispatcher`].

pub mod backend;
pub mod cancel;
pub mod config;
pub mod dispatch;
pub mod download;
pub mod error;
pub mod handlers;
pub mod interpreter;
pub mod state;

pub use cancel::{CancelToken, CancelledError};
pub use dispatch::ShellDispatcher;
pub use error::{Result, ShellError};
pub use state::ShellState;
