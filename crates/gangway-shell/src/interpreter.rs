//! Python interpreter discovery and validation.
//!
//! Candidates come from PATH plus a few well-known locations. Each candidate
//! is probed by running `<path> --version` with a timeout; the reported
//! version is parsed and compared against the minimum the backend supports.

use crate::cancel::CancelToken;
use crate::config::InterpreterConfig;
use crate::error::{Result, ShellError};
use gangway_bridge::InterpreterCandidate;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::{debug, warn};

/// Names probed inside each search directory, most specific first.
const BINARY_NAMES: &[&str] = &[
    "python3.13",
    "python3.12",
    "python3.11",
    "python3.10",
    "python3.9",
    "python3",
    "python",
];

#[cfg(unix)]
const WELL_KNOWN_DIRS: &[&str] = &[
    "/usr/bin",
    "/usr/local/bin",
    "/opt/homebrew/bin",
    "/opt/python/bin",
];

#[cfg(windows)]
const WELL_KNOWN_DIRS: &[&str] = &["C:\\Python312", "C:\\Python311", "C:\\Python310"];

pub struct InterpreterManager {
    min_version: semver::Version,
    /// Extra directory searched first (the portable install, once present).
    portable_dir: Option<PathBuf>,
}

impl InterpreterManager {
    pub fn new(portable_dir: Option<PathBuf>) -> Self {
        let min_version = semver::Version::parse(InterpreterConfig::MIN_VERSION)
            .unwrap_or_else(|_| semver::Version::new(3, 9, 0));
        Self {
            min_version,
            portable_dir,
        }
    }

    /// Enumerate candidate interpreters and probe each one.
    ///
    /// Probe failures downgrade the candidate to invalid instead of failing
    /// the whole scan. The cancel token aborts between probes.
    pub async fn discover(&self, cancel: &CancelToken) -> Result<Vec<InterpreterCandidate>> {
        let mut seen = BTreeSet::new();
        let mut candidates = Vec::new();

        for dir in self.search_dirs() {
            for name in BINARY_NAMES {
                cancel.check()?;
                let path = dir.join(name);
                if !path.is_file() {
                    continue;
                }
                let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
                if !seen.insert(canonical) {
                    continue;
                }
                candidates.push(self.probe(&path).await);
            }
        }

        debug!("discovered {} interpreter candidates", candidates.len());
        Ok(candidates)
    }

    /// Probe a single interpreter path. Never errors: a failed probe is an
    /// invalid candidate with no version.
    pub async fn probe(&self, path: &Path) -> InterpreterCandidate {
        let path_text = path.display().to_string();
        match self.query_version(path).await {
            Ok(version) => {
                let valid = self.meets_minimum(&version);
                InterpreterCandidate {
                    path: path_text,
                    version: Some(version),
                    valid,
                }
            }
            Err(e) => {
                warn!("interpreter probe failed for {}: {}", path_text, e);
                InterpreterCandidate {
                    path: path_text,
                    version: None,
                    valid: false,
                }
            }
        }
    }

    async fn query_version(&self, path: &Path) -> Result<String> {
        let output = tokio::time::timeout(
            InterpreterConfig::PROBE_TIMEOUT,
            Command::new(path).arg("--version").output(),
        )
        .await
        .map_err(|_| ShellError::InterpreterProbe {
            path: path.display().to_string(),
            message: "probe timed out".to_string(),
        })?
        .map_err(|e| ShellError::InterpreterProbe {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        // Python 2 printed the version on stderr; accept either stream.
        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };

        parse_version(&text).ok_or_else(|| ShellError::InterpreterProbe {
            path: path.display().to_string(),
            message: format!("unrecognized version output: {}", text.trim()),
        })
    }

    pub fn meets_minimum(&self, version: &str) -> bool {
        match semver::Version::parse(version) {
            Ok(v) => v >= self.min_version,
            Err(_) => false,
        }
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(portable) = &self.portable_dir {
            dirs.push(portable.clone());
            #[cfg(unix)]
            dirs.push(portable.join("bin"));
        }
        if let Some(path_var) = std::env::var_os("PATH") {
            dirs.extend(std::env::split_paths(&path_var));
        }
        dirs.extend(WELL_KNOWN_DIRS.iter().map(PathBuf::from));
        dirs
    }
}

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Python (\d+\.\d+\.\d+)").expect("version regex"));

/// Extract `X.Y.Z` from `Python X.Y.Z` style output.
fn parse_version(text: &str) -> Option<String> {
    VERSION_RE.captures(text).map(|c| c[1].to_string())
}
