//! Channel handlers, one module per surface.

pub mod backend_setup;
pub mod debug;
pub mod downloader;
pub mod interpreter;
pub mod superuser;
