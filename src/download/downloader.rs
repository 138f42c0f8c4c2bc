//! Stream download execution and temp-file lifecycle.
//!
//! The selector decides *which* stream; this module fetches its bytes with
//! yt-dlp and hands back a [`DownloadedFile`] guard. The guard owns the
//! temp artifact: callers delete it explicitly after the upload, and `Drop`
//! removes it on every other exit path (error, early return, panic), so
//! repeated use never leaks files into the download folder.

use std::path::{Path, PathBuf};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use url::Url;

use crate::core::config::{self, Config};
use crate::download::error::DownloadError;
use crate::download::metadata::classify_ytdlp_stderr;
use crate::download::selector::StreamDescriptor;

/// A downloaded temp file, deleted at the end of its scope.
#[derive(Debug)]
pub struct DownloadedFile {
    path: PathBuf,
    armed: bool,
}

impl DownloadedFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Disarms the guard and hands the path over to the caller. Used by the
    /// CLI path, where the downloaded file is the product, not a temp.
    pub fn persist(mut self) -> PathBuf {
        self.armed = false;
        self.path.clone()
    }

    /// Deletes the file now. Preferred over waiting for `Drop` on the
    /// success path so send-then-delete is visible in the call sequence.
    pub fn cleanup(mut self) -> std::io::Result<()> {
        self.armed = false;
        match fs_err::remove_file(&self.path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

impl Drop for DownloadedFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = fs_err::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove temp file {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Downloads a selected stream via yt-dlp.
#[derive(Debug, Clone)]
pub struct StreamDownloader {
    bin: String,
    cookies_file: Option<String>,
    download_folder: String,
    download_timeout: Duration,
}

impl StreamDownloader {
    pub fn new(config: &Config) -> Self {
        Self {
            bin: config.ytdlp_bin.clone(),
            cookies_file: config.cookies_file.clone(),
            download_folder: config.download_folder.clone(),
            download_timeout: config::download::ytdlp_timeout(),
        }
    }

    /// Fetches the stream named by `stream.handle` and returns the file
    /// guard. Transient failures are retried with exponential backoff up to
    /// the configured attempt count.
    pub async fn download(
        &self,
        url: &Url,
        stream: &StreamDescriptor,
    ) -> Result<DownloadedFile, DownloadError> {
        fs_err::tokio::create_dir_all(&self.download_folder)
            .await
            .map_err(|e| DownloadError::Process(format!("cannot create download folder: {}", e)))?;

        let run = || async move { self.run_ytdlp(url, stream).await };
        run.retry(
            ExponentialBuilder::default()
                .with_min_delay(config::retry::delay())
                .with_max_times(config::retry::MAX_DOWNLOAD_ATTEMPTS - 1),
        )
        .when(DownloadError::is_transient)
        .notify(|err: &DownloadError, dur: Duration| {
            log::warn!("Download attempt failed ({}); retrying in {:?}", err, dur);
        })
        .await
    }

    async fn run_ytdlp(
        &self,
        url: &Url,
        stream: &StreamDescriptor,
    ) -> Result<DownloadedFile, DownloadError> {
        let output_template = format!("{}/%(id)s.f%(format_id)s.%(ext)s", self.download_folder);

        let mut args = vec![
            "-f".to_string(),
            stream.handle.clone(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "-o".to_string(),
            output_template,
            // Print the final path so we don't have to guess the extension
            "--no-simulate".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
        ];
        if let Some(ref cookies) = self.cookies_file {
            args.push("--cookies".to_string());
            args.push(cookies.clone());
        }
        args.push(url.as_str().to_string());

        log::info!("Downloading format {} from {}", stream.handle, url);

        let output = timeout(
            self.download_timeout,
            TokioCommand::new(&self.bin).args(&args).output(),
        )
        .await
        .map_err(|_| {
            DownloadError::Timeout(format!(
                "download exceeded {}s for {}",
                self.download_timeout.as_secs(),
                url
            ))
        })?
        .map_err(|e| DownloadError::Process(format!("failed to run {}: {}", self.bin, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_ytdlp_stderr(&stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| {
                DownloadError::Process("yt-dlp reported success but printed no file path".to_string())
            })?;

        if !path.exists() {
            return Err(DownloadError::FileNotFound(path.display().to_string()));
        }

        log::info!("Downloaded {} -> {}", stream.handle, path.display());
        Ok(DownloadedFile::new(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn cleanup_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.m4a");
        fs::write(&path, b"data").unwrap();

        let file = DownloadedFile::new(path.clone());
        assert_eq!(file.path(), path.as_path());
        file.cleanup().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn drop_removes_file_on_abandoned_scope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        fs::write(&path, b"data").unwrap();

        {
            let _file = DownloadedFile::new(path.clone());
            // scope exits without an explicit cleanup, e.g. on an error path
        }
        assert!(!path.exists());
    }

    #[test]
    fn persist_keeps_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keep.mp4");
        fs::write(&path, b"data").unwrap();

        let file = DownloadedFile::new(path.clone());
        let kept = file.persist();
        assert_eq!(kept, path);
        assert!(path.exists());
    }

    #[test]
    fn cleanup_tolerates_already_deleted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.mp4");
        fs::write(&path, b"data").unwrap();
        fs::remove_file(&path).unwrap();

        let file = DownloadedFile::new(path);
        assert!(file.cleanup().is_ok());
    }
}
