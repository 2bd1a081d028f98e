//! Gangway Bridge - the permissioned boundary between the untrusted control
//! panel UI and the privileged host process.
//!
//! The UI never holds a privileged resource. It holds *surfaces*: small,
//! immutable method sets whose calls cross into the host over named channels.
//! Three call shapes exist and nothing else crosses the boundary:
//!
//! - **fire-and-forget**: one outbound message, no acknowledgement
//! - **request/reply**: arguments forwarded verbatim, a future resolved
//!   exactly once with the host's reply
//! - **event subscription**: a data-only callback invoked once per payload
//!   the host pushes, in push order
//!
//! # Example
//!
//! ```rust,ignore
//! use gangway_bridge::{connect, DownloaderSurface, ShellDispatch, SurfaceRegistry};
//!
//! let pair = connect(host_dispatch);
//! let mut registry = SurfaceRegistry::new();
//! registry.install_downloader(DownloaderSurface::new(
//!     pair.dispatcher.clone(),
//!     pair.events.clone(),
//! ))?;
//! let surfaces = registry.seal();
//!
//! let downloader = surfaces.downloader().unwrap();
//! downloader.on_progress(|p| println!("{:.1}%", p.percentage));
//! downloader.cancel();
//! ```

pub mod channel;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod install;
pub mod payload;
pub mod surfaces;

pub use dispatch::{connect, connect_with_registry, BridgePair, ChannelDispatcher, ShellDispatch};
pub use error::{BridgeError, Result};
pub use events::{EventRegistry, EventSink, SubscriptionId};
pub use install::{InstalledSurfaces, SurfaceRegistry};
pub use payload::{
    BackendInstallKind, BackendStatus, ConnectionStatus, CreationResult, CustomInterpreter,
    DownloadComplete, DownloadProgress, DownloadStatus, ExportLogsRequest, InterpreterCandidate,
    LogExportKind, StatusSeverity, SuperuserRequest,
};
pub use surfaces::{
    BackendSetupSurface, DebugConsoleSurface, DownloaderSurface, InterpreterSurface,
    SuperuserSurface,
};
