//! Download engine with progress tracking, cancellation and verification.
//!
//! Provides:
//! - Streaming download with interval-throttled progress snapshots
//! - Cooperative cancellation (the caller still owns the terminal event)
//! - Atomic file operations (temp file -> final)
//! - Optional SHA-256 verification
//! - Archive extraction (zip, tar.gz)

use crate::cancel::CancelToken;
use crate::config::DownloadConfig;
use crate::error::{Result, ShellError};
use futures::StreamExt;
use gangway_bridge::DownloadProgress;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// What to fetch and where to put it.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub dest: PathBuf,
    /// Lowercase hex digest to verify against, when the release publishes one.
    pub expected_sha256: Option<String>,
}

/// Archive formats the engine can unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    /// Guess the format from a URL or file name.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.ends_with(".zip") {
            Some(ArchiveKind::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else {
            None
        }
    }
}

pub struct DownloadEngine {
    http: reqwest::Client,
    progress_interval: Duration,
}

impl DownloadEngine {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(DownloadConfig::REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            progress_interval: DownloadConfig::PROGRESS_INTERVAL,
        })
    }

    /// Download `req.url` to `req.dest`, reporting progress through
    /// `on_progress`. Writes to a `.part` file and renames on success.
    ///
    /// Returns total bytes downloaded. Cancellation surfaces as
    /// [`ShellError::Cancelled`]; the partial file is removed.
    pub async fn fetch(
        &self,
        req: &FetchRequest,
        cancel: &CancelToken,
        mut on_progress: impl FnMut(DownloadProgress),
    ) -> Result<u64> {
        info!("downloading {} -> {}", req.url, req.dest.display());

        if let Some(parent) = req.dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ShellError::io_with_path(e, parent))?;
        }

        let response = self
            .http
            .get(&req.url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ShellError::DownloadFailed {
                url: req.url.clone(),
                message: e.to_string(),
            })?;

        let total = response.content_length().unwrap_or(0);
        let temp = temp_path(&req.dest);
        let mut file = tokio::fs::File::create(&temp)
            .await
            .map_err(|e| ShellError::io_with_path(e, &temp))?;

        let started = Instant::now();
        let mut last_emit = Instant::now() - self.progress_interval;
        let mut downloaded: u64 = 0;
        let mut hasher = req.expected_sha256.as_ref().map(|_| Sha256::new());

        let mut stream = response.bytes_stream();
        let result: Result<()> = async {
            while let Some(chunk) = stream.next().await {
                cancel.check()?;
                let chunk = chunk.map_err(|e| ShellError::DownloadFailed {
                    url: req.url.clone(),
                    message: e.to_string(),
                })?;
                file.write_all(&chunk)
                    .await
                    .map_err(|e| ShellError::io_with_path(e, &temp))?;
                if let Some(ref mut hasher) = hasher {
                    hasher.update(&chunk);
                }
                downloaded += chunk.len() as u64;

                if last_emit.elapsed() >= self.progress_interval {
                    last_emit = Instant::now();
                    on_progress(snapshot(downloaded, total, started.elapsed()));
                }
            }
            file.flush()
                .await
                .map_err(|e| ShellError::io_with_path(e, &temp))?;
            Ok(())
        }
        .await;

        if let Err(e) = result {
            drop(file);
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e);
        }
        drop(file);

        if let (Some(expected), Some(hasher)) = (req.expected_sha256.as_deref(), hasher) {
            let actual = hex::encode(hasher.finalize());
            if !actual.eq_ignore_ascii_case(expected) {
                let _ = tokio::fs::remove_file(&temp).await;
                return Err(ShellError::HashMismatch {
                    expected: expected.to_string(),
                    actual,
                });
            }
            debug!("sha256 verified for {}", req.dest.display());
        }

        tokio::fs::rename(&temp, &req.dest)
            .await
            .map_err(|e| ShellError::io_with_path(e, &req.dest))?;

        // Final snapshot so observers always see the end state.
        on_progress(snapshot(downloaded, total, started.elapsed()));

        info!("downloaded {} bytes to {}", downloaded, req.dest.display());
        Ok(downloaded)
    }
}

fn temp_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());
    name.push_str(DownloadConfig::TEMP_SUFFIX);
    dest.with_file_name(name)
}

fn snapshot(downloaded: u64, total: u64, elapsed: Duration) -> DownloadProgress {
    let percentage = if total > 0 {
        (downloaded as f64 / total as f64) * 100.0
    } else {
        0.0
    };
    let speed = if elapsed.as_secs_f64() > 0.0 {
        downloaded as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };
    DownloadProgress {
        downloaded,
        total,
        percentage,
        speed,
    }
}

/// Unpack `archive` into `dest_dir`. Runs on the blocking pool.
pub async fn extract_archive(archive: &Path, dest_dir: &Path, kind: ArchiveKind) -> Result<()> {
    let archive = archive.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();
    tokio::task::spawn_blocking(move || extract_blocking(&archive, &dest_dir, kind))
        .await
        .map_err(|e| ShellError::Archive {
            message: format!("extraction task failed: {}", e),
        })?
}

fn extract_blocking(archive: &Path, dest_dir: &Path, kind: ArchiveKind) -> Result<()> {
    std::fs::create_dir_all(dest_dir).map_err(|e| ShellError::io_with_path(e, dest_dir))?;
    let file = std::fs::File::open(archive).map_err(|e| ShellError::io_with_path(e, archive))?;
    match kind {
        ArchiveKind::Zip => {
            let mut zip = zip::ZipArchive::new(file).map_err(|e| ShellError::Archive {
                message: e.to_string(),
            })?;
            zip.extract(dest_dir).map_err(|e| ShellError::Archive {
                message: e.to_string(),
            })?;
        }
        ArchiveKind::TarGz => {
            let decoder = flate2::read::GzDecoder::new(file);
            let mut tar = tar::Archive::new(decoder);
            tar.unpack(dest_dir).map_err(|e| ShellError::Archive {
                message: e.to_string(),
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_archive_kind_from_name() {
        assert_eq!(
            ArchiveKind::from_name("backend-portable.tar.gz"),
            Some(ArchiveKind::TarGz)
        );
        assert_eq!(ArchiveKind::from_name("tools.tgz"), Some(ArchiveKind::TarGz));
        assert_eq!(ArchiveKind::from_name("python.zip"), Some(ArchiveKind::Zip));
        assert_eq!(ArchiveKind::from_name("notes.txt"), None);
    }

    #[test]
    fn test_temp_path_appends_suffix() {
        let temp = temp_path(Path::new("/tmp/x/archive.tar.gz"));
        assert_eq!(temp, Path::new("/tmp/x/archive.tar.gz.part"));
    }

    #[test]
    fn test_snapshot_math() {
        let p = snapshot(50, 200, Duration::from_secs(2));
        assert_eq!(p.downloaded, 50);
        assert_eq!(p.total, 200);
        assert_eq!(p.percentage, 25.0);
        assert_eq!(p.speed, 25.0);

        let unknown = snapshot(10, 0, Duration::from_secs(1));
        assert_eq!(unknown.percentage, 0.0);
    }

    #[tokio::test]
    async fn test_extract_tar_gz() {
        let dir = TempDir::new().unwrap();
        let archive_path = dir.path().join("bundle.tar.gz");

        {
            let file = std::fs::File::create(&archive_path).unwrap();
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            let mut builder = tar::Builder::new(encoder);
            let data = b"hello from the bundle";
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, "inner/readme.txt", &data[..])
                .unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }

        let dest = dir.path().join("out");
        extract_archive(&archive_path, &dest, ArchiveKind::TarGz)
            .await
            .unwrap();

        let content = std::fs::read_to_string(dest.join("inner/readme.txt")).unwrap();
        assert_eq!(content, "hello from the bundle");
    }

    #[tokio::test]
    async fn test_extract_zip() {
        let dir = TempDir::new().unwrap();
        let archive_path = dir.path().join("bundle.zip");

        {
            let file = std::fs::File::create(&archive_path).unwrap();
            let mut writer = zip::ZipWriter::new(file);
            writer
                .start_file::<_, ()>("nested/data.txt", zip::write::FileOptions::default())
                .unwrap();
            writer.write_all(b"zipped payload").unwrap();
            writer.finish().unwrap();
        }

        let dest = dir.path().join("out");
        extract_archive(&archive_path, &dest, ArchiveKind::Zip)
            .await
            .unwrap();

        let content = std::fs::read_to_string(dest.join("nested/data.txt")).unwrap();
        assert_eq!(content, "zipped payload");
    }
}
