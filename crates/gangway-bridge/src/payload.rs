//! Message contracts carried over the bridge channels.
//!
//! These are the only shapes that cross the boundary. Field names are part of
//! the wire contract (the UI deserializes them by name), so serde renames are
//! deliberate and stable.

use serde::{Deserialize, Serialize};

/// Progress snapshot pushed on `download-progress`. All fields numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    /// Bytes downloaded so far.
    pub downloaded: u64,
    /// Total bytes, 0 when the server did not report a length.
    pub total: u64,
    /// Percentage complete (0-100), 0 when total is unknown.
    pub percentage: f64,
    /// Download speed in bytes per second.
    pub speed: f64,
}

/// Severity of a `download-status` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusSeverity {
    Info,
    Success,
    Error,
    Warning,
}

/// Human-readable status line pushed on `download-status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadStatus {
    pub message: String,
    #[serde(rename = "type")]
    pub severity: StatusSeverity,
}

impl DownloadStatus {
    pub fn new(severity: StatusSeverity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

/// Terminal payload pushed exactly once on `download-complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadComplete {
    pub success: bool,
    pub message: String,
}

/// Connection state pushed on `debug-connection-status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Connecting,
}

/// Which capture buffer an `export-debug-logs` call refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogExportKind {
    Backend,
    Workers,
    All,
}

impl LogExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogExportKind::Backend => "backend",
            LogExportKind::Workers => "workers",
            LogExportKind::All => "all",
        }
    }
}

/// Payload of `export-debug-logs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportLogsRequest {
    #[serde(rename = "type")]
    pub kind: LogExportKind,
    pub data: String,
}

/// Payload of `create-superuser`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuperuserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Terminal payload pushed on `superuser-created`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreationResult {
    pub success: bool,
    pub message: String,
}

/// Payload pushed on `python-selection-custom` after a select/browse probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomInterpreter {
    pub path: String,
    /// Reported version string, empty when the probe failed.
    pub version: String,
    #[serde(rename = "isValid")]
    pub valid: bool,
}

/// One discovered interpreter, returned by `python-selection-get-candidates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpreterCandidate {
    pub path: String,
    pub version: Option<String>,
    pub valid: bool,
}

/// How the backend is installed, when it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendInstallKind {
    Portable,
    Source,
}

/// Full backend setup state, returned by `backend-setup-get-status` and
/// pushed on `backend-setup-status-update` after every transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendStatus {
    pub backend_installed: bool,
    pub install_kind: Option<BackendInstallKind>,
    pub python_path: Option<String>,
    pub python_version: Option<String>,
    pub python_valid: bool,
    pub valkey_installed: bool,
    /// Name of the operation currently in progress, if any.
    pub operation: Option<String>,
    /// Most recent human-readable status line.
    pub message: Option<String>,
}
