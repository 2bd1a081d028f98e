//! Surface installation: the one-time step that decides what the UI can see.
//!
//! Instead of hanging surfaces off an ambient global, the composition root
//! builds a [`SurfaceRegistry`], installs each surface under its fixed name,
//! and seals the registry into an immutable [`InstalledSurfaces`] handle that
//! is handed to the UI. Installing two surfaces under one name is a
//! programming error and is rejected, never silently merged.

use crate::error::{BridgeError, Result};
use crate::surfaces::{
    BackendSetupSurface, DebugConsoleSurface, DownloaderSurface, InterpreterSurface,
    SuperuserSurface,
};
use std::collections::BTreeMap;

/// Fixed installation names, stable for the lifetime of the application.
pub mod names {
    pub const BACKEND_SETUP: &str = "backendSetup";
    pub const DEBUG_CONSOLE: &str = "debugConsole";
    pub const DOWNLOADER: &str = "downloader";
    pub const PYTHON_SELECTION: &str = "pythonSelection";
    pub const SUPERUSER: &str = "superuser";
}

/// One installed surface.
pub enum Surface {
    BackendSetup(BackendSetupSurface),
    DebugConsole(DebugConsoleSurface),
    Downloader(DownloaderSurface),
    Interpreter(InterpreterSurface),
    Superuser(SuperuserSurface),
}

/// Mutable registry used only during composition, before any UI code runs.
#[derive(Default)]
pub struct SurfaceRegistry {
    entries: BTreeMap<String, Surface>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `surface` under `name`. Fails on a name collision.
    pub fn install(&mut self, name: &str, surface: Surface) -> Result<()> {
        if self.entries.contains_key(name) {
            return Err(BridgeError::SurfaceCollision {
                name: name.to_string(),
            });
        }
        self.entries.insert(name.to_string(), surface);
        Ok(())
    }

    pub fn install_backend_setup(&mut self, surface: BackendSetupSurface) -> Result<()> {
        self.install(names::BACKEND_SETUP, Surface::BackendSetup(surface))
    }

    pub fn install_debug_console(&mut self, surface: DebugConsoleSurface) -> Result<()> {
        self.install(names::DEBUG_CONSOLE, Surface::DebugConsole(surface))
    }

    pub fn install_downloader(&mut self, surface: DownloaderSurface) -> Result<()> {
        self.install(names::DOWNLOADER, Surface::Downloader(surface))
    }

    pub fn install_interpreter(&mut self, surface: InterpreterSurface) -> Result<()> {
        self.install(names::PYTHON_SELECTION, Surface::Interpreter(surface))
    }

    pub fn install_superuser(&mut self, surface: SuperuserSurface) -> Result<()> {
        self.install(names::SUPERUSER, Surface::Superuser(surface))
    }

    /// Freeze the registry. The returned handle is read-only for the
    /// lifetime of the window.
    pub fn seal(self) -> InstalledSurfaces {
        InstalledSurfaces {
            entries: self.entries,
        }
    }
}

/// Immutable set of installed surfaces handed to the UI composition root.
pub struct InstalledSurfaces {
    entries: BTreeMap<String, Surface>,
}

impl InstalledSurfaces {
    pub fn get(&self, name: &str) -> Option<&Surface> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn backend_setup(&self) -> Option<&BackendSetupSurface> {
        match self.entries.get(names::BACKEND_SETUP) {
            Some(Surface::BackendSetup(surface)) => Some(surface),
            _ => None,
        }
    }

    pub fn debug_console(&self) -> Option<&DebugConsoleSurface> {
        match self.entries.get(names::DEBUG_CONSOLE) {
            Some(Surface::DebugConsole(surface)) => Some(surface),
            _ => None,
        }
    }

    pub fn downloader(&self) -> Option<&DownloaderSurface> {
        match self.entries.get(names::DOWNLOADER) {
            Some(Surface::Downloader(surface)) => Some(surface),
            _ => None,
        }
    }

    pub fn interpreter(&self) -> Option<&InterpreterSurface> {
        match self.entries.get(names::PYTHON_SELECTION) {
            Some(Surface::Interpreter(surface)) => Some(surface),
            _ => None,
        }
    }

    pub fn superuser(&self) -> Option<&SuperuserSurface> {
        match self.entries.get(names::SUPERUSER) {
            Some(Surface::Superuser(surface)) => Some(surface),
            _ => None,
        }
    }
}
