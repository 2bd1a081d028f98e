//! The five UI surfaces, one per panel.
//!
//! A surface is the entire API its panel can reach: a statically declared,
//! immutable set of methods over the channel dispatcher plus typed event
//! subscriptions. Constructed once at composition time, identical for the
//! lifetime of the window. Event callbacks are data-only.

mod backend_setup;
mod debug_console;
mod downloader;
mod interpreter;
mod superuser;

pub use backend_setup::BackendSetupSurface;
pub use debug_console::DebugConsoleSurface;
pub use downloader::DownloaderSurface;
pub use interpreter::InterpreterSurface;
pub use superuser::SuperuserSurface;
