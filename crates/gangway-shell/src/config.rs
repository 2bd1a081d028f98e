//! Centralized configuration for the Gangway host.

use std::time::Duration;

/// Download engine parameters.
pub struct DownloadConfig;

impl DownloadConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);
    pub const TEMP_SUFFIX: &'static str = ".part";
}

/// Backend install layout and release sources.
pub struct BackendConfig;

impl BackendConfig {
    pub const BACKEND_DIR_NAME: &'static str = "backend";
    pub const VALKEY_DIR_NAME: &'static str = "valkey";
    pub const PYTHON_DIR_NAME: &'static str = "python-portable";
    pub const LOGS_DIR_NAME: &'static str = "logs";

    pub const PORTABLE_URL: &'static str =
        "https://releases.gangway.app/backend/latest/backend-portable.tar.gz";
    pub const SOURCE_URL: &'static str =
        "https://releases.gangway.app/backend/latest/backend-source.tar.gz";
    pub const VALKEY_URL: &'static str =
        "https://releases.gangway.app/valkey/latest/valkey-bundle.tar.gz";

    /// Local backend the panels talk to.
    pub const BASE_URL: &'static str = "http://127.0.0.1:8000";
    pub const HEALTH_PATH: &'static str = "/api/health/";
    pub const SUPERUSER_PATH: &'static str = "/api/setup/superuser/";

    pub const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(2);
    pub const HEALTH_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);
}

/// Debug console capture limits.
pub struct DebugConfig;

impl DebugConfig {
    /// Most recent lines kept per stream.
    pub const MAX_CAPTURED_LINES: usize = 5000;
}

/// Interpreter discovery and validation.
pub struct InterpreterConfig;

impl InterpreterConfig {
    /// Oldest interpreter the backend supports.
    pub const MIN_VERSION: &'static str = "3.9.0";
    pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
    pub const PORTABLE_URL: &'static str =
        "https://releases.gangway.app/python/latest/python-portable.tar.gz";
}

/// Dev bootstrap defaults (see `gangway-dev`).
pub struct BootstrapConfig;

impl BootstrapConfig {
    pub const READY_URL: &'static str = "http://localhost:4200";
    pub const READY_TIMEOUT: Duration = Duration::from_secs(300);
    pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
}
